//! shopgraph-core: Shared types for the shopgraph relational-to-graph migration.
//!
//! This crate provides the building blocks used by the loader and the ETL binary:
//! - Row types for each source table (customers, categories, products, ...)
//! - Event kinds and the relationship type each one becomes in the graph
//! - The chunker that splits a table into bounded write batches

pub mod chunk;
pub mod types;

pub use chunk::chunk;
pub use types::{
    Category, Customer, Event, EventKind, Order, OrderItem, ParseEventKindError, Product, Snapshot,
};
