//! shopgraph-etl: Copies the shop's relational tables into Neo4j.
//!
//! Waits for PostgreSQL and Neo4j, applies the graph schema, reads every
//! source table once, and writes it back as nodes and relationships in
//! fixed-size batches.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod readiness;
pub mod source;
