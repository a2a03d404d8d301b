//! Row types for the relational source tables.
//!
//! Each struct mirrors one table column-for-column. Primary keys are `i64`;
//! every other column, foreign keys included, is nullable and so `Option`.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ── Entity Rows ───────────────────────────────────────────────────

/// A row of `customers(id, name, join_date)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub name: Option<String>,
    pub join_date: Option<NaiveDate>,
}

/// A row of `categories(id, name)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: Option<String>,
}

/// A row of `products(id, name, price, category_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub category_id: Option<i64>,
}

/// A row of `orders(id, customer_id, ts)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub customer_id: Option<i64>,
    pub ts: Option<NaiveDateTime>,
}

/// A row of `order_items(order_id, product_id, quantity)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub order_id: Option<i64>,
    pub product_id: Option<i64>,
    pub quantity: Option<i64>,
}

/// A row of `events(customer_id, product_id, event_type, ts)`.
///
/// `event_type` is kept as the raw column value; use [`Event::kind`] to
/// classify it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub customer_id: Option<i64>,
    pub product_id: Option<i64>,
    pub event_type: String,
    pub ts: Option<NaiveDateTime>,
}

impl Event {
    /// The event kind, or `None` for an unrecognised `event_type`.
    pub fn kind(&self) -> Option<EventKind> {
        self.event_type.parse().ok()
    }
}

// ── Event Kinds ───────────────────────────────────────────────────

/// The closed set of customer→product interactions carried over to the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    View,
    Click,
    AddToCart,
}

impl EventKind {
    /// All kinds, in load order.
    pub const ALL: [EventKind; 3] = [EventKind::View, EventKind::Click, EventKind::AddToCart];

    /// The `event_type` column value for this kind.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Click => "click",
            Self::AddToCart => "add_to_cart",
        }
    }

    /// The graph relationship type created for this kind.
    pub const fn rel_type(&self) -> &'static str {
        match self {
            Self::View => "VIEW",
            Self::Click => "CLICK",
            Self::AddToCart => "ADD_TO_CART",
        }
    }

    /// Select the events of this kind, preserving source order.
    pub fn filter<'a>(&self, events: &'a [Event]) -> Vec<&'a Event> {
        events.iter().filter(|e| e.kind() == Some(*self)).collect()
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when an `event_type` value is not one of the known kinds.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown event type: {0:?}")]
pub struct ParseEventKindError(pub String);

impl FromStr for EventKind {
    type Err = ParseEventKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" => Ok(Self::View),
            "click" => Ok(Self::Click),
            "add_to_cart" => Ok(Self::AddToCart),
            other => Err(ParseEventKindError(other.to_string())),
        }
    }
}

// ── Snapshot ──────────────────────────────────────────────────────

/// Full contents of every source table, read once at extraction time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub customers: Vec<Customer>,
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
    pub orders: Vec<Order>,
    pub order_items: Vec<OrderItem>,
    pub events: Vec<Event>,
}

impl Snapshot {
    /// Number of events whose `event_type` matches no known kind.
    pub fn unknown_event_count(&self) -> usize {
        self.events.iter().filter(|e| e.kind().is_none()).count()
    }
}
