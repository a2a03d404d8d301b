//! Error types for the shopgraph-etl crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("Graph error: {0}")]
    Graph(#[from] shopgraph_graph::GraphError),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EtlError>;
