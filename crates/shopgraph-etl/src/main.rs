//! CLI entry point for the shopgraph PostgreSQL → Neo4j migration.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use shopgraph_etl::config::Settings;
use shopgraph_etl::pipeline;

#[derive(Parser)]
#[command(name = "shopgraph-etl")]
#[command(about = "Copy the shop's relational data into the Neo4j graph")]
struct Cli {
    /// Config file prefix (default: shopgraph).
    #[arg(short, long, default_value = "shopgraph")]
    config: String,

    /// Rows per bulk write (overrides config).
    #[arg(short, long)]
    batch_size: Option<NonZeroUsize>,

    /// Cypher schema file (default: queries.cypher beside the binary, else the bundled copy).
    #[arg(short, long)]
    schema: Option<PathBuf>,

    /// Connect immediately instead of waiting for both stores.
    #[arg(long)]
    skip_wait: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).json().init();

    let cli = Cli::parse();
    let mut settings = Settings::load(&cli.config)?;
    if let Some(batch_size) = cli.batch_size {
        settings.etl.batch_size = batch_size;
    }
    if let Some(schema) = cli.schema {
        settings.etl.schema_path = Some(schema);
    }
    if cli.skip_wait {
        settings.etl.wait_for_stores = false;
    }

    tracing::info!(
        postgres = ?settings.postgres,
        neo4j = ?settings.neo4j,
        etl = ?settings.etl,
        "Starting migration"
    );

    pipeline::run(&settings).await?;
    Ok(())
}
