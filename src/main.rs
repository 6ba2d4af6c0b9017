use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use schemascope::config::{CliConfig, ExplorerConfig};
use schemascope::graph::GraphKind;
use schemascope::provider::fixture::FixtureProvider;
use schemascope::Explorer;

/// Schemascope - explore a database schema as a graph
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON fixture file with catalog rows and table samples
    #[arg(long)]
    fixture: String,

    /// Optional YAML configuration file (used instead of the limit flags)
    #[arg(long)]
    config: Option<String>,

    /// Build a focus graph for this table after loading the schema
    #[arg(long)]
    table: Option<String>,

    /// Build a record graph from joined rows of this table
    #[arg(long)]
    joins: Option<String>,

    /// Emit graphs as JSON instead of a text summary
    #[arg(long)]
    json: bool,

    /// Rows fetched per table sample
    #[arg(long, default_value_t = 10)]
    sample_row_limit: u32,

    /// Rows fetched per related table during record expansion
    #[arg(long, default_value_t = 100)]
    related_row_limit: u32,

    /// Maximum keyword-search hits returned
    #[arg(long, default_value_t = 100)]
    search_result_limit: u32,

    /// Comma-separated schema owners to exclude
    #[arg(long, default_value = "pg_catalog,information_schema")]
    excluded_owners: String,
}

impl From<&Cli> for CliConfig {
    fn from(cli: &Cli) -> Self {
        CliConfig {
            sample_row_limit: cli.sample_row_limit,
            related_row_limit: cli.related_row_limit,
            search_result_limit: cli.search_result_limit,
            excluded_owners: cli
                .excluded_owners
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }
}

fn print_summary(explorer: &Explorer) {
    println!(
        "Schema: {} tables, {} nodes, {} edges",
        explorer.schema_model().table_count(),
        explorer.schema_graph().node_count(),
        explorer.schema_graph().edge_count(),
    );
    if let Some(focus) = explorer.focus_graph() {
        println!(
            "Focus graph: {} nodes, {} edges",
            focus.node_count(),
            focus.edge_count()
        );
    }
    if let Some(record) = explorer.record_graph() {
        println!(
            "Record graph: {} nodes, {} edges",
            record.node_count(),
            record.edge_count()
        );
    }
}

fn print_json(explorer: &Explorer) -> anyhow::Result<()> {
    for kind in [GraphKind::Schema, GraphKind::TableFocus, GraphKind::Record] {
        if let Some(projection) = explorer.render(kind) {
            println!("{}", serde_json::to_string_pretty(&projection)?);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    // Initialize logger - defaults to INFO level, can be overridden with RUST_LOG env var
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    println!("\nSchemascope v{}\n", env!("CARGO_PKG_VERSION"));

    let config = match &cli.config {
        Some(path) => ExplorerConfig::from_yaml_file(path)
            .with_context(|| format!("loading configuration from {}", path))?,
        None => ExplorerConfig::from_cli((&cli).into()).context("validating CLI configuration")?,
    };

    let provider = FixtureProvider::from_path(&cli.fixture, &config)
        .with_context(|| format!("loading fixture {}", cli.fixture))?;
    let mut explorer = Explorer::connect(Arc::new(provider), config)
        .await
        .context("building the schema graph")?;

    if let Some(table) = &cli.table {
        explorer
            .focus_table(table)
            .with_context(|| format!("building focus graph for {}", table))?;
    }
    if let Some(table) = &cli.joins {
        explorer
            .on_node_context_action(
                GraphKind::Schema,
                table,
                schemascope::ContextAction::ShowJoinedRows,
            )
            .await
            .with_context(|| format!("building record graph for {}", table))?;
    }

    if cli.json {
        print_json(&explorer)?;
    } else {
        print_summary(&explorer);
    }
    Ok(())
}
