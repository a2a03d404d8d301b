//! Shopgraph Graph — Neo4j client for the migrated shop graph.
//!
//! All writes into the graph flow through this crate: the schema statements,
//! the batched node upserts, and the relationship upserts. Every write is a
//! `MERGE`, so re-running a migration never duplicates nodes or edges.

pub mod client;
pub mod mutations;
pub mod queries;
pub mod schema;

pub use client::{GraphClient, GraphConfig, GraphError};
pub use mutations::{GraphRow, UpsertStatement};
pub use schema::split_statements;
