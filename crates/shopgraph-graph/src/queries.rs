//! Read-back queries over the migrated graph.

use neo4rs::query;

use shopgraph_core::EventKind;

use crate::client::{GraphClient, GraphError};

/// Node labels written by the migration.
pub const NODE_LABELS: [&str; 4] = ["Category", "Product", "Customer", "Order"];

/// Relationship types written by the migration.
pub const REL_TYPES: [&str; 6] = [
    "IN_CATEGORY",
    "PLACED",
    "CONTAINS",
    EventKind::View.rel_type(),
    EventKind::Click.rel_type(),
    EventKind::AddToCart.rel_type(),
];

/// Node and relationship totals, one entry per label or type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphTotals {
    pub nodes: Vec<(&'static str, i64)>,
    pub relationships: Vec<(&'static str, i64)>,
}

impl GraphClient {
    /// Count nodes carrying `label`.
    pub async fn count_nodes(&self, label: &str) -> Result<i64, GraphError> {
        let cypher = format!("MATCH (n:{label}) RETURN count(n) AS cnt");
        self.count(&cypher).await
    }

    /// Count relationships of type `rel_type`.
    pub async fn count_relationships(&self, rel_type: &str) -> Result<i64, GraphError> {
        let cypher = format!("MATCH ()-[r:{rel_type}]->() RETURN count(r) AS cnt");
        self.count(&cypher).await
    }

    /// Totals for every label and relationship type the migration writes.
    pub async fn totals(&self) -> Result<GraphTotals, GraphError> {
        let mut totals = GraphTotals::default();
        for label in NODE_LABELS {
            totals.nodes.push((label, self.count_nodes(label).await?));
        }
        for rel_type in REL_TYPES {
            totals
                .relationships
                .push((rel_type, self.count_relationships(rel_type).await?));
        }
        Ok(totals)
    }

    async fn count(&self, cypher: &str) -> Result<i64, GraphError> {
        match self.query_one(query(cypher)).await? {
            Some(row) => Ok(row.get::<i64>("cnt").unwrap_or(0)),
            None => Ok(0),
        }
    }
}
