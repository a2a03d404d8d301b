//! Configuration for the shopgraph migration.
//!
//! Each store is configured from its own environment prefix:
//! - `POSTGRES_HOST`, `POSTGRES_PORT`, `POSTGRES_DB`, `POSTGRES_USER`, `POSTGRES_PASSWORD`
//! - `NEO4J_URI`, `NEO4J_USER`, `NEO4J_PASSWORD`
//!
//! Job settings come from the `[etl]` section of `shopgraph.toml` or
//! `SHOPGRAPH_ETL__` environment variables.

use std::fmt;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use shopgraph_graph::GraphConfig;

use crate::error::Result;

/// Name of the schema file looked up next to the binary.
pub const SCHEMA_FILE_NAME: &str = "queries.cypher";

/// The crate's `queries.cypher`, compiled in as the last-resort schema.
pub const BUNDLED_SCHEMA: &str = include_str!("../queries.cypher");

/// Where the graph schema comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource {
    File(PathBuf),
    Bundled,
}

impl fmt::Display for SchemaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Bundled => write!(f, "<bundled {SCHEMA_FILE_NAME}>"),
        }
    }
}

/// Connection parameters for the PostgreSQL source.
#[derive(Clone, Deserialize)]
pub struct PostgresConfig {
    #[serde(default = "default_pg_host")]
    pub host: String,
    #[serde(default = "default_pg_port")]
    pub port: u16,
    #[serde(default = "default_pg_db")]
    pub db: String,
    #[serde(default = "default_pg_user")]
    pub user: String,
    #[serde(default = "default_pg_password")]
    pub password: String,
}

impl PostgresConfig {
    /// Build the driver configuration for this source.
    pub fn to_pg_config(&self) -> tokio_postgres::Config {
        let mut cfg = tokio_postgres::Config::new();
        cfg.host(&self.host)
            .port(self.port)
            .dbname(&self.db)
            .user(&self.user)
            .password(&self.password);
        cfg
    }
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            host: default_pg_host(),
            port: default_pg_port(),
            db: default_pg_db(),
            user: default_pg_user(),
            password: default_pg_password(),
        }
    }
}

impl fmt::Debug for PostgresConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("db", &self.db)
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

/// Settings for the migration job itself.
#[derive(Debug, Clone, Deserialize)]
pub struct EtlConfig {
    /// Rows per bulk write.
    #[serde(default = "default_batch_size")]
    pub batch_size: NonZeroUsize,

    /// Seconds between readiness probes.
    #[serde(default = "default_retry_interval")]
    pub retry_interval_secs: u64,

    /// Schema file override. Defaults to `queries.cypher` beside the
    /// executable, then to the bundled copy.
    #[serde(default)]
    pub schema_path: Option<PathBuf>,

    /// Block until both stores answer before connecting.
    #[serde(default = "default_true")]
    pub wait_for_stores: bool,
}

impl EtlConfig {
    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.retry_interval_secs)
    }

    /// Resolve the schema to apply.
    ///
    /// An explicit `schema_path` is used as-is, even if missing, so a typo
    /// fails loudly instead of silently applying the bundled schema.
    pub fn schema_source(&self) -> Result<SchemaSource> {
        if let Some(path) = &self.schema_path {
            return Ok(SchemaSource::File(path.clone()));
        }
        let beside_exe = std::env::current_exe()?.with_file_name(SCHEMA_FILE_NAME);
        if beside_exe.is_file() {
            Ok(SchemaSource::File(beside_exe))
        } else {
            Ok(SchemaSource::Bundled)
        }
    }
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            retry_interval_secs: default_retry_interval(),
            schema_path: None,
            wait_for_stores: default_true(),
        }
    }
}

/// Everything one migration run needs.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub postgres: PostgresConfig,
    pub neo4j: GraphConfig,
    pub etl: EtlConfig,
}

impl Settings {
    /// Load settings from the process environment and `<file_prefix>.toml`.
    pub fn load(file_prefix: &str) -> Result<Self> {
        Ok(Self {
            postgres: load_postgres_config(postgres_env())?,
            neo4j: load_graph_config(neo4j_env())?,
            etl: load_etl_config(file_prefix, etl_env())?,
        })
    }
}

fn postgres_env() -> config::Environment {
    config::Environment::with_prefix("POSTGRES").try_parsing(true)
}

fn neo4j_env() -> config::Environment {
    config::Environment::with_prefix("NEO4J").try_parsing(true)
}

fn etl_env() -> config::Environment {
    config::Environment::with_prefix("SHOPGRAPH")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

fn load_postgres_config(env: config::Environment) -> Result<PostgresConfig> {
    let cfg = config::Config::builder().add_source(env).build()?;
    Ok(cfg.try_deserialize()?)
}

fn load_graph_config(env: config::Environment) -> Result<GraphConfig> {
    let cfg = config::Config::builder().add_source(env).build()?;
    Ok(cfg.try_deserialize()?)
}

fn load_etl_config(file_prefix: &str, env: config::Environment) -> Result<EtlConfig> {
    let cfg = config::Config::builder()
        .add_source(config::File::with_name(file_prefix).required(false))
        .add_source(env)
        .build()?;

    match cfg.get::<EtlConfig>("etl") {
        Ok(c) => Ok(c),
        Err(config::ConfigError::NotFound(_)) => Ok(EtlConfig::default()),
        Err(e) => Err(e.into()),
    }
}

fn default_pg_host() -> String {
    "postgres".to_string()
}

fn default_pg_port() -> u16 {
    5432
}

fn default_pg_db() -> String {
    "shop".to_string()
}

fn default_pg_user() -> String {
    "app".to_string()
}

fn default_pg_password() -> String {
    "app".to_string()
}

fn default_batch_size() -> NonZeroUsize {
    NonZeroUsize::new(100).unwrap_or(NonZeroUsize::MIN)
}

fn default_retry_interval() -> u64 {
    2
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Option<config::Map<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_postgres_defaults() {
        let config = load_postgres_config(postgres_env().source(vars(&[]))).unwrap();
        assert_eq!(config.host, "postgres");
        assert_eq!(config.port, 5432);
        assert_eq!(config.db, "shop");
        assert_eq!(config.user, "app");
        assert_eq!(config.password, "app");
    }

    #[test]
    fn test_postgres_env_overrides() {
        let env = postgres_env().source(vars(&[
            ("POSTGRES_HOST", "db.internal"),
            ("POSTGRES_PORT", "6543"),
            ("POSTGRES_DB", "shop_test"),
            ("POSTGRES_PASSWORD", "s3cret"),
            ("POSTGRES_HOST_AUTH_METHOD", "trust"),
        ]));
        let config = load_postgres_config(env).unwrap();
        assert_eq!(config.host, "db.internal");
        assert_eq!(config.port, 6543);
        assert_eq!(config.db, "shop_test");
        assert_eq!(config.user, "app");
        assert_eq!(config.password, "s3cret");
    }

    #[test]
    fn test_neo4j_env_overrides() {
        let env = neo4j_env().source(vars(&[
            ("NEO4J_URI", "bolt://localhost:7687"),
            ("NEO4J_USER", "admin"),
        ]));
        let config = load_graph_config(env).unwrap();
        assert_eq!(config.uri, "bolt://localhost:7687");
        assert_eq!(config.user, "admin");
        assert_eq!(config.password, "password");
    }

    #[test]
    fn test_etl_defaults_without_file() {
        let config = load_etl_config("does-not-exist", etl_env().source(vars(&[]))).unwrap();
        assert_eq!(config.batch_size.get(), 100);
        assert_eq!(config.retry_interval(), Duration::from_secs(2));
        assert!(config.schema_path.is_none());
        assert!(config.wait_for_stores);
    }

    #[test]
    fn test_etl_env_overrides() {
        let env = etl_env().source(vars(&[
            ("SHOPGRAPH_ETL__BATCH_SIZE", "500"),
            ("SHOPGRAPH_ETL__SCHEMA_PATH", "/etc/shopgraph/schema.cypher"),
        ]));
        let config = load_etl_config("does-not-exist", env).unwrap();
        assert_eq!(config.batch_size.get(), 500);
        assert_eq!(
            config.schema_path,
            Some(PathBuf::from("/etc/shopgraph/schema.cypher"))
        );
    }

    #[test]
    fn test_etl_rejects_zero_batch_size() {
        let env = etl_env().source(vars(&[("SHOPGRAPH_ETL__BATCH_SIZE", "0")]));
        assert!(load_etl_config("does-not-exist", env).is_err());
    }

    #[test]
    fn test_default_schema_resolves_to_statements() {
        let source = EtlConfig::default().schema_source().unwrap();
        let text = match &source {
            SchemaSource::File(path) => std::fs::read_to_string(path).unwrap(),
            SchemaSource::Bundled => BUNDLED_SCHEMA.to_string(),
        };
        let statements = shopgraph_graph::split_statements(&text);
        assert!(!statements.is_empty(), "{source}");
        assert!(statements
            .iter()
            .all(|s| s.contains("CREATE CONSTRAINT") && s.contains("IF NOT EXISTS")));
    }

    #[test]
    fn test_bundled_schema_constrains_every_node_label() {
        let statements = shopgraph_graph::split_statements(BUNDLED_SCHEMA);
        assert_eq!(statements.len(), 4);
        for label in ["Customer", "Category", "Product", "Order"] {
            assert!(
                statements.iter().any(|s| s.contains(&format!(":{label})"))),
                "{label}"
            );
        }
    }

    #[test]
    fn test_explicit_schema_path_wins() {
        let config = EtlConfig {
            schema_path: Some(PathBuf::from("/nonexistent/schema.cypher")),
            ..Default::default()
        };
        assert_eq!(
            config.schema_source().unwrap(),
            SchemaSource::File(PathBuf::from("/nonexistent/schema.cypher"))
        );
    }

    #[test]
    fn test_debug_hides_password() {
        let config = PostgresConfig {
            password: "hunter2".to_string(),
            ..Default::default()
        };
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
