//! Finder / search front-end (C14): embeds a query, searches the vector
//! store, and joins each hit against live pane state so a result can say
//! not just *what* matched but *where it's happening right now*.

use rusqlite::Connection;
use serde::Serialize;

use crate::config::{EmbeddingConfig, VectorStoreConfig};
use crate::embed::client::{self, EmbedError};
use crate::ids::SessionId;
use crate::store;
use crate::transition::State;
use crate::vectorstore::{self, SearchHit, VectorStoreError};

/// Whether the hit's originating session is currently live in a pane.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LiveStatus {
    Running { tmux_location: String, state: String },
    NotRunning,
}

/// A search hit joined with its live status.
#[derive(Debug, Clone, Serialize)]
pub struct FindResult {
    pub chunk_id: String,
    pub session_id: String,
    pub project_path: String,
    pub timestamp: String,
    pub content: String,
    pub context: Option<String>,
    pub score: f32,
    pub live: LiveStatus,
}

#[derive(Debug, thiserror::Error)]
pub enum FindError {
    #[error("failed to embed query: {0}")]
    Embed(#[from] EmbedError),
    #[error("vector store search failed: {0}")]
    VectorStore(#[from] VectorStoreError),
}

/// Runs a full search: embed the query, search C12, join each hit against
/// C5's live pane state. `db` is optional — when absent (or when a lookup
/// errors), every hit is reported `NotRunning` rather than failing the
/// whole search, since a live-status miss is informational, not fatal.
pub async fn find(
    http: &reqwest::Client,
    embedding: &EmbeddingConfig,
    vector_store: &VectorStoreConfig,
    db: Option<&Connection>,
    query: &str,
    limit: usize,
    project_filter: Option<&str>,
    score_threshold: Option<f32>,
) -> Result<Vec<FindResult>, FindError> {
    let vector = client::embed(http, embedding, query).await?;
    let hits =
        vectorstore::search(http, vector_store, &vector, limit, project_filter, score_threshold)
            .await?;

    Ok(hits.into_iter().map(|hit| join_live_status(hit, db)).collect())
}

fn join_live_status(hit: SearchHit, db: Option<&Connection>) -> FindResult {
    let live = db
        .and_then(|conn| live_status_for(conn, &hit.session_id))
        .unwrap_or(LiveStatus::NotRunning);

    FindResult {
        chunk_id: hit.chunk_id.into_string(),
        session_id: hit.session_id.into_string(),
        project_path: hit.project_path,
        timestamp: hit.timestamp,
        content: hit.content,
        context: hit.context,
        score: hit.score,
        live,
    }
}

fn live_status_for(conn: &Connection, session_id: &SessionId) -> Option<LiveStatus> {
    match store::find_by_session_id(conn, session_id) {
        Ok(Some(record)) => Some(LiveStatus::Running {
            tmux_location: record.tmux_location,
            state: state_label(record.state).to_string(),
        }),
        Ok(None) => None,
        Err(e) => {
            tracing::warn!("session-store lookup failed during search join: {e}");
            None
        }
    }
}

fn state_label(state: State) -> &'static str {
    match state {
        State::Working => "working",
        State::NeedsAttention(_) => "needs attention",
    }
}

/// Renders one result as a human-readable line: a status glyph, the live
/// location (or "not running"), the chunk id as a stand-in title, and the
/// project path.
pub fn render_human(result: &FindResult) -> String {
    match &result.live {
        LiveStatus::Running { tmux_location, state } => {
            let glyph = if state == "working" { "●" } else { "○" };
            format!(
                "{glyph} [{tmux_location}] {} ({}) — {}",
                result.chunk_id, state, result.project_path
            )
        }
        LiveStatus::NotRunning => {
            format!("· [not running] {} — {}", result.chunk_id, result.project_path)
        }
    }
}
