//! The migration job: readiness → schema → extract → load.

use std::num::NonZeroUsize;

use shopgraph_core::{chunk, Snapshot};
use shopgraph_graph::{GraphClient, GraphRow, UpsertStatement};

use crate::config::{SchemaSource, Settings, BUNDLED_SCHEMA};
use crate::error::Result;
use crate::readiness::{wait_for_neo4j, wait_for_postgres};
use crate::source::PgSource;

/// Rows and batches written by one load step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepSummary {
    pub name: &'static str,
    pub rows: usize,
    pub batches: usize,
}

/// Outcome of [`load_snapshot`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub steps: Vec<StepSummary>,
    /// Events whose `event_type` matched no known kind. They create no edge.
    pub skipped_events: usize,
}

impl LoadSummary {
    pub fn total_rows(&self) -> usize {
        self.steps.iter().map(|s| s.rows).sum()
    }

    pub fn total_batches(&self) -> usize {
        self.steps.iter().map(|s| s.batches).sum()
    }
}

/// Run the whole job against the configured stores.
///
/// Both connections are released before returning, whether the load
/// succeeds or fails.
pub async fn run(settings: &Settings) -> Result<LoadSummary> {
    if settings.etl.wait_for_stores {
        let interval = settings.etl.retry_interval();
        wait_for_postgres(&settings.postgres, interval).await;
        wait_for_neo4j(&settings.neo4j, interval).await;
    }

    let schema = settings.etl.schema_source()?;
    tracing::info!(source = %schema, "Using Cypher schema");

    let source = PgSource::connect(&settings.postgres).await?;
    let graph = match GraphClient::connect(&settings.neo4j).await {
        Ok(graph) => graph,
        Err(e) => {
            source.close().await;
            return Err(e.into());
        }
    };

    let result = migrate(&source, &graph, &schema, settings.etl.batch_size).await;

    source.close().await;
    drop(graph);

    match &result {
        Ok(summary) => tracing::info!(
            rows = summary.total_rows(),
            batches = summary.total_batches(),
            skipped_events = summary.skipped_events,
            "ETL done"
        ),
        Err(e) => tracing::error!(error = %e, "ETL failed"),
    }
    result
}

async fn migrate(
    source: &PgSource,
    graph: &GraphClient,
    schema: &SchemaSource,
    batch_size: NonZeroUsize,
) -> Result<LoadSummary> {
    match schema {
        SchemaSource::File(path) => {
            graph.apply_schema_file(path).await?;
        }
        SchemaSource::Bundled => {
            let applied = graph.apply_schema(BUNDLED_SCHEMA).await?;
            tracing::info!(statements = applied, "Bundled schema applied");
        }
    }

    tracing::info!("Reading tables from PostgreSQL");
    let snapshot = source.extract().await?;

    let summary = load_snapshot(graph, &snapshot, batch_size).await?;

    let totals = graph.totals().await?;
    for (label, count) in &totals.nodes {
        tracing::info!(label, count, "Graph node total");
    }
    for (rel_type, count) in &totals.relationships {
        tracing::info!(rel_type, count, "Graph relationship total");
    }

    Ok(summary)
}

/// Write a snapshot into the graph, one load step per statement.
///
/// Steps run in [`UpsertStatement::LOAD_ORDER`]. Events are split by kind
/// before batching so each pass creates one relationship type.
pub async fn load_snapshot(
    graph: &GraphClient,
    snapshot: &Snapshot,
    batch_size: NonZeroUsize,
) -> Result<LoadSummary> {
    let mut summary = LoadSummary {
        skipped_events: snapshot.unknown_event_count(),
        ..Default::default()
    };
    if summary.skipped_events > 0 {
        tracing::warn!(
            count = summary.skipped_events,
            "Skipping events with unknown event_type"
        );
    }

    for stmt in UpsertStatement::LOAD_ORDER {
        let step = match stmt {
            UpsertStatement::Categories => {
                load_step(graph, stmt, &snapshot.categories, batch_size).await?
            }
            UpsertStatement::Products => {
                load_step(graph, stmt, &snapshot.products, batch_size).await?
            }
            UpsertStatement::Customers => {
                load_step(graph, stmt, &snapshot.customers, batch_size).await?
            }
            UpsertStatement::Orders => load_step(graph, stmt, &snapshot.orders, batch_size).await?,
            UpsertStatement::OrderItems => {
                load_step(graph, stmt, &snapshot.order_items, batch_size).await?
            }
            UpsertStatement::Events(kind) => {
                let events = kind.filter(&snapshot.events);
                load_step(graph, stmt, &events, batch_size).await?
            }
        };
        summary.steps.push(step);
    }

    Ok(summary)
}

async fn load_step<R: GraphRow>(
    graph: &GraphClient,
    stmt: UpsertStatement,
    rows: &[R],
    batch_size: NonZeroUsize,
) -> Result<StepSummary> {
    tracing::info!(step = stmt.name(), rows = rows.len(), "Loading");

    let mut batches = 0;
    for batch in chunk(rows, batch_size) {
        graph.bulk_upsert(stmt, batch).await?;
        batches += 1;
        tracing::debug!(step = stmt.name(), batch = batches, size = batch.len(), "Batch written");
    }

    Ok(StepSummary {
        name: stmt.name(),
        rows: rows.len(),
        batches,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_totals() {
        let summary = LoadSummary {
            steps: vec![
                StepSummary {
                    name: "categories",
                    rows: 150,
                    batches: 2,
                },
                StepSummary {
                    name: "products",
                    rows: 40,
                    batches: 1,
                },
                StepSummary {
                    name: "view_events",
                    rows: 0,
                    batches: 0,
                },
            ],
            skipped_events: 3,
        };
        assert_eq!(summary.total_rows(), 190);
        assert_eq!(summary.total_batches(), 3);
    }
}
