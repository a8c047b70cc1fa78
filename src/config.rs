use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Top-level configuration loaded from `steward.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StewardConfig {
    /// Default log level when `RUST_LOG` is not set.
    pub log_level: String,

    pub database: DatabaseConfig,
    pub transcripts: TranscriptsConfig,
    pub embedding: EmbeddingConfig,
    pub vector_store: VectorStoreConfig,
    pub indexer: IndexerConfig,
}

impl Default for StewardConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            database: DatabaseConfig::default(),
            transcripts: TranscriptsConfig::default(),
            embedding: EmbeddingConfig::default(),
            vector_store: VectorStoreConfig::default(),
            indexer: IndexerConfig::default(),
        }
    }
}

impl StewardConfig {
    /// Resolve the session-store database path, expanding `~` and honouring
    /// the `STEWARD_DB` environment override.
    pub fn resolved_db_path(&self) -> PathBuf {
        if let Ok(over) = std::env::var("STEWARD_DB") {
            return expand_tilde(&over);
        }
        expand_tilde(&self.database.path)
    }

    /// Resolve the transcripts root directory, expanding `~`.
    pub fn resolved_transcripts_root(&self) -> PathBuf {
        expand_tilde(&self.transcripts.root)
    }

    pub fn resolved_log_level(&self) -> &str {
        &self.log_level
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the embedded session-state database (supports `~` expansion).
    pub path: String,
    pub cache_size_mb: u32,
    pub mmap_size_mb: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "~/.steward/steward.db".to_string(),
            cache_size_mb: 64,
            mmap_size_mb: 256,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TranscriptsConfig {
    /// Root directory to scan for `.jsonl` transcripts (supports `~` expansion).
    pub root: String,
    pub skip_dirs: Vec<String>,
}

impl Default for TranscriptsConfig {
    fn default() -> Self {
        Self {
            root: "~/.claude/projects/".to_string(),
            skip_dirs: vec![
                "node_modules".into(),
                ".git".into(),
                "target".into(),
                "cache".into(),
                "shell-snapshots".into(),
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "embed-768".to_string(),
            timeout_secs: 30,
        }
    }
}

impl EmbeddingConfig {
    /// Builds an HTTP client whose request timeout is `timeout_secs`. Used
    /// for every outbound call this binary makes (embedding and
    /// vector-store alike) since there's only the one timeout knob.
    pub fn build_http_client(&self) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(self.timeout_secs))
            .build()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VectorStoreConfig {
    pub base_url: String,
    pub collection: String,
    pub default_limit: usize,
    pub default_score_threshold: Option<f32>,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:6333".to_string(),
            collection: "steward_chunks".to_string(),
            default_limit: 10,
            default_score_threshold: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    pub batch_size: usize,
    pub workers: usize,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            workers: 4,
        }
    }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Returns the default config file path: `~/.steward/steward.toml`.
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".steward")
        .join("steward.toml")
}

/// Load configuration from a TOML file.
///
/// - If `path` is `Some`, reads that file (errors if missing or invalid).
/// - If `path` is `None`, tries the default path; returns defaults if the file doesn't exist.
pub fn load_config(path: Option<&Path>) -> Result<StewardConfig> {
    let config_path = match path {
        Some(p) => p.to_path_buf(),
        None => default_config_path(),
    };

    if !config_path.exists() {
        if path.is_some() {
            anyhow::bail!("config file not found: {}", config_path.display());
        }
        return Ok(StewardConfig::default());
    }

    let contents = std::fs::read_to_string(&config_path)
        .with_context(|| format!("failed to read config file: {}", config_path.display()))?;

    let config: StewardConfig = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file: {}", config_path.display()))?;

    Ok(config)
}
