use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cli::render;
use search_core::config::{self, AppConfig};
use search_core::pipeline;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Load { file, json } => run_load(cfg, file, json).await,
        Commands::Search { query, json } => run_search(cfg, query, json).await,
    }
}

#[derive(Parser)]
#[command(name = "semsearch")]
#[command(about = "Moderated semantic search over labeled text", long_about = None)]
struct Cli {
    /// Path to config TOML
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Embed, label and upsert every row of a CSV file with a `text` column
    Load {
        /// CSV file to load; defaults to `ingest.source` from the config
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Output JSON report
        #[arg(long)]
        json: bool,
    },
    /// Moderate a query and return the most similar stored texts
    Search {
        /// Query text
        query: String,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
}

async fn run_load(cfg: AppConfig, file: Option<PathBuf>, json: bool) -> Result<()> {
    let path = file.unwrap_or_else(|| PathBuf::from(&cfg.ingest.source));
    let ingestion = pipeline::ingestion(&cfg).await?;
    let mut ids = cfg.ingest.id_policy.build();
    let report = ingestion
        .run_csv(&path, ids.as_mut())
        .await
        .with_context(|| format!("loading {}", path.display()))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&render::ingest_json(&report))?);
    } else {
        print!("{}", render::ingest(&report));
    }
    if report.stored() == 0 && report.failed() > 0 {
        anyhow::bail!(
            "no rows from {} were stored ({} failed)",
            path.display(),
            report.failed()
        );
    }
    Ok(())
}

async fn run_search(cfg: AppConfig, query: String, json: bool) -> Result<()> {
    let search = pipeline::query(&cfg).await?;
    let outcome = search.run(&query).await?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&render::search_json(&query, &outcome))?
        );
    } else {
        print!("{}", render::search(&query, &outcome));
    }
    Ok(())
}
