use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::{Path, PathBuf};

use crate::config::DatabaseConfig;

const MIGRATION_001: &str = include_str!("schema.sql");

const MIGRATIONS: &[(u32, &str)] = &[(1, MIGRATION_001)];

/// Open or create the session-store database with default PRAGMA settings.
pub fn open(path: &Path) -> Result<Connection> {
    open_with_config(path, &DatabaseConfig::default())
}

/// Open or create the session-store database with configurable PRAGMA settings.
pub fn open_with_config(path: &Path, db_config: &DatabaseConfig) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    let conn = Connection::open(path)
        .with_context(|| format!("failed to open database at {}", path.display()))?;

    // cache_size in KB (negative = KB in SQLite convention)
    let cache_size_kb = db_config.cache_size_mb as i64 * 1000;
    let mmap_size = db_config.mmap_size_mb as i64 * 1_048_576;

    let pragmas = format!(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA foreign_keys = ON;
         PRAGMA cache_size = -{cache_size_kb};
         PRAGMA mmap_size = {mmap_size};"
    );

    conn.execute_batch(&pragmas)
        .context("failed to set database PRAGMAs")?;

    migrate(&conn)?;

    Ok(conn)
}

/// Returns the default database path: `~/.steward/steward.db`.
pub fn default_db_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".steward")
        .join("steward.db")
}

/// Run pending migrations against the database.
fn migrate(conn: &Connection) -> Result<()> {
    let current_version: u32 =
        conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    for &(version, sql) in MIGRATIONS {
        if version > current_version {
            tracing::info!("running migration v{version}");
            let tx = conn.unchecked_transaction()?;
            tx.execute_batch(sql)
                .with_context(|| format!("migration v{version} failed"))?;
            tx.pragma_update(None, "user_version", version)?;
            tx.commit()
                .with_context(|| format!("failed to commit migration v{version}"))?;
            tracing::info!("migration v{version} complete");
        }
    }

    Ok(())
}
