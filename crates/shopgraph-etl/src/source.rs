//! PostgreSQL extraction: one full read per source table.

use tokio::task::JoinHandle;
use tokio_postgres::{Client, NoTls, Row};

use shopgraph_core::{Category, Customer, Event, Order, OrderItem, Product, Snapshot};

use crate::config::PostgresConfig;
use crate::error::Result;

/// A source table and how to decode one of its rows.
///
/// `SELECT` is a full, unfiltered read. Its casts normalise column types so
/// integer ids of any width decode as `i64`.
pub trait SourceTable: Sized {
    const TABLE: &'static str;
    const SELECT: &'static str;

    fn from_row(row: &Row) -> std::result::Result<Self, tokio_postgres::Error>;
}

impl SourceTable for Customer {
    const TABLE: &'static str = "customers";
    const SELECT: &'static str =
        "SELECT id::bigint AS id, name::text AS name, join_date::date AS join_date FROM customers";

    fn from_row(row: &Row) -> std::result::Result<Self, tokio_postgres::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            join_date: row.try_get("join_date")?,
        })
    }
}

impl SourceTable for Category {
    const TABLE: &'static str = "categories";
    const SELECT: &'static str = "SELECT id::bigint AS id, name::text AS name FROM categories";

    fn from_row(row: &Row) -> std::result::Result<Self, tokio_postgres::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
        })
    }
}

impl SourceTable for Product {
    const TABLE: &'static str = "products";
    const SELECT: &'static str = "SELECT id::bigint AS id, name::text AS name, \
         price::float8 AS price, category_id::bigint AS category_id FROM products";

    fn from_row(row: &Row) -> std::result::Result<Self, tokio_postgres::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            price: row.try_get("price")?,
            category_id: row.try_get("category_id")?,
        })
    }
}

impl SourceTable for Order {
    const TABLE: &'static str = "orders";
    const SELECT: &'static str = "SELECT id::bigint AS id, customer_id::bigint AS customer_id, \
         ts::timestamp AS ts FROM orders";

    fn from_row(row: &Row) -> std::result::Result<Self, tokio_postgres::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            customer_id: row.try_get("customer_id")?,
            ts: row.try_get("ts")?,
        })
    }
}

impl SourceTable for OrderItem {
    const TABLE: &'static str = "order_items";
    const SELECT: &'static str = "SELECT order_id::bigint AS order_id, \
         product_id::bigint AS product_id, quantity::bigint AS quantity FROM order_items";

    fn from_row(row: &Row) -> std::result::Result<Self, tokio_postgres::Error> {
        Ok(Self {
            order_id: row.try_get("order_id")?,
            product_id: row.try_get("product_id")?,
            quantity: row.try_get("quantity")?,
        })
    }
}

impl SourceTable for Event {
    const TABLE: &'static str = "events";
    const SELECT: &'static str = "SELECT customer_id::bigint AS customer_id, \
         product_id::bigint AS product_id, event_type::text AS event_type, \
         ts::timestamp AS ts FROM events";

    fn from_row(row: &Row) -> std::result::Result<Self, tokio_postgres::Error> {
        Ok(Self {
            customer_id: row.try_get("customer_id")?,
            product_id: row.try_get("product_id")?,
            event_type: row.try_get("event_type")?,
            ts: row.try_get("ts")?,
        })
    }
}

/// A single PostgreSQL connection held for the whole run.
pub struct PgSource {
    client: Client,
    driver: JoinHandle<std::result::Result<(), tokio_postgres::Error>>,
}

impl PgSource {
    /// Open the connection and spawn its driver task.
    pub async fn connect(config: &PostgresConfig) -> Result<Self> {
        let (client, connection) = config.to_pg_config().connect(NoTls).await?;
        let driver = tokio::spawn(connection);
        tracing::info!(host = %config.host, db = %config.db, "Connected to PostgreSQL");
        Ok(Self { client, driver })
    }

    /// Read every row of `T`'s table.
    pub async fn read_table<T: SourceTable>(&self) -> Result<Vec<T>> {
        let rows = self.client.query(T::SELECT, &[]).await?;
        let records = rows
            .iter()
            .map(T::from_row)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        tracing::info!(table = T::TABLE, rows = records.len(), "Read table");
        Ok(records)
    }

    /// Read all source tables into memory.
    pub async fn extract(&self) -> Result<Snapshot> {
        Ok(Snapshot {
            customers: self.read_table().await?,
            categories: self.read_table().await?,
            products: self.read_table().await?,
            orders: self.read_table().await?,
            order_items: self.read_table().await?,
            events: self.read_table().await?,
        })
    }

    /// Close the connection and wait for the driver task to finish.
    pub async fn close(self) {
        drop(self.client);
        match self.driver.await {
            Ok(Ok(())) => tracing::debug!("PostgreSQL connection closed"),
            Ok(Err(e)) => tracing::warn!(error = %e, "PostgreSQL connection ended with error"),
            Err(e) => tracing::warn!(error = %e, "PostgreSQL driver task failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selects() -> Vec<(&'static str, &'static str)> {
        vec![
            (Customer::TABLE, Customer::SELECT),
            (Category::TABLE, Category::SELECT),
            (Product::TABLE, Product::SELECT),
            (Order::TABLE, Order::SELECT),
            (OrderItem::TABLE, OrderItem::SELECT),
            (Event::TABLE, Event::SELECT),
        ]
    }

    #[test]
    fn test_selects_are_full_unparameterized_reads() {
        for (table, sql) in selects() {
            assert!(sql.ends_with(&format!("FROM {table}")), "{sql}");
            assert!(!sql.contains('$'), "{sql}");
            assert!(!sql.contains("WHERE"), "{sql}");
            assert!(!sql.contains("ORDER BY"), "{sql}");
            assert!(!sql.contains("LIMIT"), "{sql}");
        }
    }

    #[test]
    fn test_source_tables() {
        let tables: Vec<_> = selects().into_iter().map(|(t, _)| t).collect();
        assert_eq!(
            tables,
            vec!["customers", "categories", "products", "orders", "order_items", "events"]
        );
    }

    #[test]
    fn test_selects_alias_every_column() {
        assert!(Event::SELECT.contains("event_type::text AS event_type"));
        assert!(Product::SELECT.contains("price::float8 AS price"));
        assert!(Customer::SELECT.contains("join_date::date AS join_date"));
        assert!(Order::SELECT.contains("ts::timestamp AS ts"));
        assert!(OrderItem::SELECT.contains("quantity::bigint AS quantity"));
    }
}
