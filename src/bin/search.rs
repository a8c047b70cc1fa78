//! The search binary (C14's CLI surface): embeds a query, searches the
//! vector store, and joins hits against live pane state.

use clap::Parser;
use std::path::PathBuf;

use claudes_steward::config::{self, StewardConfig};
use claudes_steward::db;
use claudes_steward::finder;

#[derive(Parser)]
#[command(name = "steward-search", version, about = "Search indexed assistant transcripts")]
struct Cli {
    /// Search query
    query: String,

    /// Maximum number of results
    #[arg(long, default_value_t = 10)]
    limit: usize,

    /// Restrict results to a project path
    #[arg(long)]
    project: Option<String>,

    /// Minimum score to admit a result (0.0 is a real filter, not "none")
    #[arg(long)]
    threshold: Option<f32>,

    /// Emit results as a JSON array instead of human-readable lines
    #[arg(long)]
    json: bool,

    /// Custom session-store database path
    #[arg(long)]
    db: Option<PathBuf>,

    /// Path to config file (default: ~/.steward/steward.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    if cli.query.trim().is_empty() {
        eprintln!("error: query must not be empty");
        std::process::exit(1);
    }

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
    rt.block_on(async { run_search(&cli, &cfg).await });
}

async fn run_search(cli: &Cli, cfg: &StewardConfig) {
    let http = match cfg.embedding.build_http_client() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("failed to build HTTP client: {e:#}");
            std::process::exit(1);
        }
    };
    let db_path = cli.db.clone().unwrap_or_else(|| cfg.resolved_db_path());
    let conn = db::open(&db_path).ok();

    let results = finder::find(
        &http,
        &cfg.embedding,
        &cfg.vector_store,
        conn.as_ref(),
        &cli.query,
        cli.limit,
        cli.project.as_deref(),
        cli.threshold,
    )
    .await;

    match results {
        Ok(results) => {
            if cli.json {
                match serde_json::to_string_pretty(&results) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        eprintln!("failed to serialise results: {e}");
                        std::process::exit(1);
                    }
                }
            } else if results.is_empty() {
                println!("no results");
            } else {
                for result in &results {
                    println!("{}", finder::render_human(result));
                }
            }
        }
        Err(e) => {
            eprintln!("search failed: {e}");
            std::process::exit(1);
        }
    }
}
