//! The indexer binary (C13's CLI surface): discover → parse → chunk →
//! diff → embed → upsert, against the configured transcripts root.

use clap::Parser;
use std::path::PathBuf;

use claudes_steward::config::{self, StewardConfig};
use claudes_steward::indexer::{self, IndexConfig};

#[derive(Parser)]
#[command(name = "steward-indexer", version, about = "Index assistant transcripts for semantic search")]
struct Cli {
    /// Number of concurrent embedding requests in flight
    #[arg(long)]
    parallel: Option<usize>,

    /// Restrict indexing to transcripts under this project path
    #[arg(long)]
    project: Option<String>,

    /// Report what would be indexed without embedding or writing anything
    #[arg(long)]
    dry_run: bool,

    /// Number of chunks embedded and upserted per batch
    #[arg(long)]
    batch: Option<usize>,

    /// Write a JSONL record for every chunk that failed to embed or upsert
    #[arg(long)]
    errors_file: Option<PathBuf>,

    /// Root directory of transcripts to scan (overrides config)
    #[arg(long)]
    transcripts_root: Option<PathBuf>,

    /// Path to config file (default: ~/.steward/steward.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let cfg = match config::load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("failed to load config: {e:#}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(cfg.resolved_log_level())),
        )
        .init();

    let rt = tokio::runtime::Runtime::new().expect("failed to create tokio runtime");
    rt.block_on(async { run_index(&cli, &cfg).await });
}

async fn run_index(cli: &Cli, cfg: &StewardConfig) {
    let http = match cfg.embedding.build_http_client() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("failed to build HTTP client: {e:#}");
            std::process::exit(1);
        }
    };

    let transcripts_root = cli
        .transcripts_root
        .clone()
        .unwrap_or_else(|| cfg.resolved_transcripts_root());

    let index_config = IndexConfig {
        transcripts_root,
        project_filter: cli.project.clone(),
        dry_run: cli.dry_run,
        batch_size: cli.batch.unwrap_or(cfg.indexer.batch_size),
        workers: cli.parallel.unwrap_or(cfg.indexer.workers),
        errors_file: cli.errors_file.clone(),
    };

    match indexer::run_index(&http, &cfg.vector_store, &cfg.embedding, &index_config).await {
        Ok(report) => print!("{report}"),
        Err(e) => {
            eprintln!("indexing failed: {e:#}");
            std::process::exit(1);
        }
    }
}
