//! Startup gate: block until a backing store answers a trivial query.
//!
//! There is no backoff and no attempt limit. A store that never comes up
//! keeps the job waiting forever.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio_postgres::NoTls;

use shopgraph_graph::{GraphClient, GraphConfig};

use crate::config::PostgresConfig;

/// Call `probe` until it succeeds, sleeping `interval` between attempts.
///
/// Failures are logged and retried. Returns the number of attempts made.
pub async fn wait_until_ready<P, PF, E, S, SF>(
    store: &str,
    interval: Duration,
    mut probe: P,
    mut sleep: S,
) -> u32
where
    P: FnMut() -> PF,
    PF: Future<Output = Result<(), E>>,
    E: Display,
    S: FnMut(Duration) -> SF,
    SF: Future<Output = ()>,
{
    let mut attempts = 0u32;
    loop {
        attempts += 1;
        match probe().await {
            Ok(()) => {
                tracing::info!(store, attempts, "Store is ready");
                return attempts;
            }
            Err(e) => {
                tracing::warn!(store, attempt = attempts, error = %e, "Waiting for store");
                sleep(interval).await;
            }
        }
    }
}

/// Block until PostgreSQL accepts a connection and answers `SELECT 1`.
pub async fn wait_for_postgres(config: &PostgresConfig, interval: Duration) -> u32 {
    wait_until_ready(
        "postgres",
        interval,
        || probe_postgres(config),
        tokio::time::sleep,
    )
    .await
}

/// Block until Neo4j accepts a Bolt connection and answers `RETURN 1`.
pub async fn wait_for_neo4j(config: &GraphConfig, interval: Duration) -> u32 {
    wait_until_ready("neo4j", interval, || probe_neo4j(config), tokio::time::sleep).await
}

async fn probe_postgres(config: &PostgresConfig) -> Result<(), tokio_postgres::Error> {
    let (client, connection) = config.to_pg_config().connect(NoTls).await?;
    let driver = tokio::spawn(connection);
    client.simple_query("SELECT 1").await?;
    drop(client);
    let _ = driver.await;
    Ok(())
}

async fn probe_neo4j(config: &GraphConfig) -> Result<(), shopgraph_graph::GraphError> {
    let client = GraphClient::open(config).await?;
    client.ping().await
}
