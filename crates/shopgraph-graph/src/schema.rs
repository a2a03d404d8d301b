//! Graph schema loading from a `.cypher` file.

use std::path::Path;

use neo4rs::query;

use crate::client::{GraphClient, GraphError};

/// Split a schema script into individual statements.
///
/// Statements are separated by `;`. Each one is trimmed and empty pieces
/// (blank lines, trailing separators) are dropped.
pub fn split_statements(text: &str) -> Vec<&str> {
    text.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

impl GraphClient {
    /// Execute every statement in `text`, in order.
    ///
    /// Stops at the first failing statement. Statements before it stay
    /// applied. Returns the number of statements executed.
    pub async fn apply_schema(&self, text: &str) -> Result<usize, GraphError> {
        let statements = split_statements(text);
        for (i, stmt) in statements.iter().enumerate() {
            tracing::debug!(index = i + 1, statement = %stmt, "Applying schema statement");
            self.run(query(stmt))
                .await
                .map_err(|e| GraphError::SchemaStatement {
                    index: i + 1,
                    source: Box::new(e),
                })?;
        }
        Ok(statements.len())
    }

    /// Read a schema file and apply it with [`GraphClient::apply_schema`].
    pub async fn apply_schema_file(&self, path: &Path) -> Result<usize, GraphError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| GraphError::SchemaFile {
                path: path.to_path_buf(),
                source,
            })?;

        tracing::info!(path = %path.display(), "Applying Neo4j schema");
        let applied = self.apply_schema(&text).await?;
        tracing::info!(statements = applied, "Schema applied");
        Ok(applied)
    }
}
