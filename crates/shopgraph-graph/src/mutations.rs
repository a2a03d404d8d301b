//! Batched write operations for the migrated graph.
//!
//! Every statement takes a whole batch as the single `$rows` list parameter
//! and `UNWIND`s it server-side. Nodes are `MERGE`d on `id`; relationships
//! `MATCH` both endpoints first, so a row whose endpoint is missing creates
//! no edge and raises no error.

use neo4rs::{query, BoltList, BoltMap, BoltNull, BoltString, BoltType};

use shopgraph_core::{Category, Customer, Event, EventKind, Order, OrderItem, Product};

use crate::client::{GraphClient, GraphError};

// ── Statements ───────────────────────────────────────────────────

const UPSERT_CATEGORIES: &str = "
UNWIND $rows AS row
MERGE (c:Category {id: row.id})
SET c.name = row.name";

const UPSERT_PRODUCTS: &str = "
UNWIND $rows AS row
MERGE (p:Product {id: row.id})
SET p.name = row.name,
    p.price = row.price
WITH p, row
MATCH (c:Category {id: row.category_id})
MERGE (p)-[:IN_CATEGORY]->(c)";

const UPSERT_CUSTOMERS: &str = "
UNWIND $rows AS row
MERGE (c:Customer {id: row.id})
SET c.name = row.name,
    c.join_date = row.join_date";

const UPSERT_ORDERS: &str = "
UNWIND $rows AS row
MERGE (o:Order {id: row.id})
SET o.ts = row.ts
WITH o, row
MATCH (c:Customer {id: row.customer_id})
MERGE (c)-[:PLACED]->(o)";

const UPSERT_ORDER_ITEMS: &str = "
UNWIND $rows AS row
MATCH (o:Order {id: row.order_id})
MATCH (p:Product {id: row.product_id})
MERGE (o)-[r:CONTAINS]->(p)
SET r.quantity = row.quantity";

const UPSERT_VIEWS: &str = "
UNWIND $rows AS row
MATCH (c:Customer {id: row.customer_id})
MATCH (p:Product {id: row.product_id})
MERGE (c)-[r:VIEW]->(p)
SET r.ts = row.ts";

const UPSERT_CLICKS: &str = "
UNWIND $rows AS row
MATCH (c:Customer {id: row.customer_id})
MATCH (p:Product {id: row.product_id})
MERGE (c)-[r:CLICK]->(p)
SET r.ts = row.ts";

const UPSERT_ADD_TO_CARTS: &str = "
UNWIND $rows AS row
MATCH (c:Customer {id: row.customer_id})
MATCH (p:Product {id: row.product_id})
MERGE (c)-[r:ADD_TO_CART]->(p)
SET r.ts = row.ts";

/// One bulk-upsert statement per source table or event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertStatement {
    Categories,
    Products,
    Customers,
    Orders,
    OrderItems,
    Events(EventKind),
}

impl UpsertStatement {
    /// Every statement, in dependency order: endpoints are written before
    /// the relationships that reference them.
    pub const LOAD_ORDER: [UpsertStatement; 8] = [
        UpsertStatement::Categories,
        UpsertStatement::Products,
        UpsertStatement::Customers,
        UpsertStatement::Orders,
        UpsertStatement::OrderItems,
        UpsertStatement::Events(EventKind::View),
        UpsertStatement::Events(EventKind::Click),
        UpsertStatement::Events(EventKind::AddToCart),
    ];

    /// The parameterized Cypher for this statement.
    pub fn cypher(&self) -> &'static str {
        match self {
            Self::Categories => UPSERT_CATEGORIES,
            Self::Products => UPSERT_PRODUCTS,
            Self::Customers => UPSERT_CUSTOMERS,
            Self::Orders => UPSERT_ORDERS,
            Self::OrderItems => UPSERT_ORDER_ITEMS,
            Self::Events(EventKind::View) => UPSERT_VIEWS,
            Self::Events(EventKind::Click) => UPSERT_CLICKS,
            Self::Events(EventKind::AddToCart) => UPSERT_ADD_TO_CARTS,
        }
    }

    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Categories => "categories",
            Self::Products => "products",
            Self::Customers => "customers",
            Self::Orders => "orders",
            Self::OrderItems => "order_items",
            Self::Events(EventKind::View) => "view_events",
            Self::Events(EventKind::Click) => "click_events",
            Self::Events(EventKind::AddToCart) => "add_to_cart_events",
        }
    }
}

// ── Row Conversion ───────────────────────────────────────────────

/// A source row that can be sent as one element of `$rows`.
pub trait GraphRow {
    fn to_bolt(&self) -> BoltMap;
}

impl<T: GraphRow + ?Sized> GraphRow for &T {
    fn to_bolt(&self) -> BoltMap {
        (**self).to_bolt()
    }
}

impl GraphRow for Category {
    fn to_bolt(&self) -> BoltMap {
        let mut map = BoltMap::with_capacity(2);
        put(&mut map, "id", self.id);
        put(&mut map, "name", opt(self.name.clone()));
        map
    }
}

impl GraphRow for Product {
    fn to_bolt(&self) -> BoltMap {
        let mut map = BoltMap::with_capacity(4);
        put(&mut map, "id", self.id);
        put(&mut map, "name", opt(self.name.clone()));
        put(&mut map, "price", opt(self.price));
        put(&mut map, "category_id", opt(self.category_id));
        map
    }
}

impl GraphRow for Customer {
    fn to_bolt(&self) -> BoltMap {
        let mut map = BoltMap::with_capacity(3);
        put(&mut map, "id", self.id);
        put(&mut map, "name", opt(self.name.clone()));
        put(&mut map, "join_date", opt(self.join_date));
        map
    }
}

impl GraphRow for Order {
    fn to_bolt(&self) -> BoltMap {
        let mut map = BoltMap::with_capacity(3);
        put(&mut map, "id", self.id);
        put(&mut map, "customer_id", opt(self.customer_id));
        put(&mut map, "ts", opt(self.ts));
        map
    }
}

impl GraphRow for OrderItem {
    fn to_bolt(&self) -> BoltMap {
        let mut map = BoltMap::with_capacity(3);
        put(&mut map, "order_id", opt(self.order_id));
        put(&mut map, "product_id", opt(self.product_id));
        put(&mut map, "quantity", opt(self.quantity));
        map
    }
}

impl GraphRow for Event {
    fn to_bolt(&self) -> BoltMap {
        let mut map = BoltMap::with_capacity(3);
        put(&mut map, "customer_id", opt(self.customer_id));
        put(&mut map, "product_id", opt(self.product_id));
        put(&mut map, "ts", opt(self.ts));
        map
    }
}

/// Pack a batch into the `$rows` list parameter.
pub fn rows_param<R: GraphRow>(rows: &[R]) -> BoltType {
    let mut list = BoltList::with_capacity(rows.len());
    for row in rows {
        list.push(BoltType::Map(row.to_bolt()));
    }
    BoltType::List(list)
}

impl GraphClient {
    /// Send one batch through `statement` as a single server-side write.
    pub async fn bulk_upsert<R: GraphRow>(
        &self,
        statement: UpsertStatement,
        rows: &[R],
    ) -> Result<(), GraphError> {
        if rows.is_empty() {
            return Ok(());
        }
        let q = query(statement.cypher()).param("rows", rows_param(rows));
        self.run(q).await
    }
}

// ── Helpers ──────────────────────────────────────────────────────

fn put(map: &mut BoltMap, key: &str, value: impl Into<BoltType>) {
    map.put(BoltString::from(key), value.into());
}

fn opt<T: Into<BoltType>>(value: Option<T>) -> BoltType {
    value.map(Into::into).unwrap_or(BoltType::Null(BoltNull))
}
