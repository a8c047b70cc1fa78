//! Vector-store client (C12): upsert, paginated scroll of identifiers, and
//! nearest-neighbour search against a remote Qdrant-like HTTP service.
//!
//! No retries at this layer — every failure mode below is surfaced as a
//! distinct, typed error and left for the caller (the indexer or the
//! finder) to decide what to do with.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::VectorStoreConfig;
use crate::embed::EmbeddedChunk;
use crate::fnv::fnv1a_64;
use crate::ids::{ChunkId, SessionId};

const SCROLL_PAGE_SIZE: usize = 1000;

#[derive(Debug, Error)]
pub enum VectorStoreError {
    #[error("transport error calling vector store: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("vector store returned {status}: {body_preview}")]
    BackendRefusal { status: u16, body_preview: String },
    #[error("vector store response did not match the expected shape: {0}")]
    Protocol(String),
}

/// A point payload as stored alongside its vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payload {
    pub chunk_id: String,
    pub session_id: String,
    pub project_path: String,
    pub timestamp: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// One nearest-neighbour search result.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub chunk_id: ChunkId,
    pub session_id: SessionId,
    pub project_path: String,
    pub timestamp: String,
    pub content: String,
    pub context: Option<String>,
    pub score: f32,
}

/// Deterministic numeric point id derived from a chunk-id string: the
/// FNV-1a digest truncated to its low 31 bits, matching the source
/// system's point-id encoding (and testable property S4's `[0, 2^31)`
/// bound) despite the collision risk that scheme carries for very large
/// corpora.
pub fn point_id(chunk_id: &str) -> u64 {
    fnv1a_64(chunk_id.as_bytes()) & 0x7fff_ffff
}

fn collection_url(config: &VectorStoreConfig, suffix: &str) -> String {
    format!(
        "{}/collections/{}{}",
        config.base_url.trim_end_matches('/'),
        config.collection,
        suffix
    )
}

async fn read_body(response: reqwest::Response) -> Result<(u16, String), VectorStoreError> {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Ok((status.as_u16(), body))
}

fn ensure_success(status: u16, body: &str) -> Result<(), VectorStoreError> {
    if !(200..300).contains(&status) {
        return Err(VectorStoreError::BackendRefusal {
            status,
            body_preview: body.chars().take(200).collect(),
        });
    }
    Ok(())
}

/// Upserts a batch of embedded chunks as points. Empty input is a no-op
/// that never touches the network.
pub async fn upsert(
    client: &reqwest::Client,
    config: &VectorStoreConfig,
    chunks: &[EmbeddedChunk],
) -> Result<(), VectorStoreError> {
    if chunks.is_empty() {
        return Ok(());
    }

    let points: Vec<Value> = chunks
        .iter()
        .map(|embedded| {
            json!({
                "id": point_id(embedded.chunk.chunk_id.as_str()),
                "vector": {"dense": embedded.vector},
                "payload": Payload {
                    chunk_id: embedded.chunk.chunk_id.as_str().to_string(),
                    session_id: embedded.chunk.session_id.as_str().to_string(),
                    project_path: embedded.chunk.project_path.clone(),
                    timestamp: embedded.chunk.timestamp.clone(),
                    content: embedded.chunk.text.clone(),
                    context: embedded.chunk.context.clone(),
                },
            })
        })
        .collect();

    let url = collection_url(config, "/points?wait=true");
    let response = client
        .put(&url)
        .json(&json!({ "points": points }))
        .send()
        .await?;

    let (status, body) = read_body(response).await?;
    ensure_success(status, &body)?;

    let parsed: Value = serde_json::from_str(&body)
        .map_err(|e| VectorStoreError::Protocol(format!("{e}: {}", preview(&body))))?;

    if upsert_signals_success(&parsed) {
        Ok(())
    } else {
        Err(VectorStoreError::Protocol(format!(
            "unexpected upsert response: {}",
            preview(&body)
        )))
    }
}

fn upsert_signals_success(parsed: &Value) -> bool {
    parsed.get("status").and_then(Value::as_str) == Some("ok")
        || parsed
            .get("result")
            .and_then(|r| r.get("status"))
            .and_then(Value::as_str)
            == Some("completed")
}

/// Scrolls the entire collection, returning every chunk id present
/// (vectors excluded from the response to keep pages small).
pub async fn scroll_all_chunk_ids(
    client: &reqwest::Client,
    config: &VectorStoreConfig,
) -> Result<Vec<ChunkId>, VectorStoreError> {
    let url = collection_url(config, "/points/scroll");
    let mut offset: Option<Value> = None;
    let mut ids = Vec::new();

    loop {
        let mut body = json!({
            "limit": SCROLL_PAGE_SIZE,
            "with_payload": {"include": ["chunk_id"]},
            "with_vector": false,
        });
        if let Some(o) = &offset {
            body["offset"] = o.clone();
        }

        let response = client.post(&url).json(&body).send().await?;
        let (status, raw) = read_body(response).await?;
        ensure_success(status, &raw)?;

        let parsed: ScrollResponse = serde_json::from_str(&raw)
            .map_err(|e| VectorStoreError::Protocol(format!("{e}: {}", preview(&raw))))?;

        for point in parsed.result.points {
            ids.push(ChunkId::new(point.payload.chunk_id));
        }

        match parsed.result.next_page_offset {
            Some(Value::Null) | None => break,
            Some(next) => offset = Some(next),
        }
    }

    Ok(ids)
}

#[derive(Debug, Deserialize)]
struct ScrollResponse {
    result: ScrollResult,
}

#[derive(Debug, Deserialize)]
struct ScrollResult {
    points: Vec<ScrollPoint>,
    next_page_offset: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ScrollPoint {
    payload: ScrollPayload,
}

#[derive(Debug, Deserialize)]
struct ScrollPayload {
    chunk_id: String,
}

/// Searches for the nearest neighbours of `vector`. `project_filter`, when
/// present, is an exact-match filter on the payload's `project_path`.
/// `score_threshold` of `None` means no filter; `Some(x)` — including
/// `Some(0.0)` — is a real filter to apply.
pub async fn search(
    client: &reqwest::Client,
    config: &VectorStoreConfig,
    vector: &[f32],
    limit: usize,
    project_filter: Option<&str>,
    score_threshold: Option<f32>,
) -> Result<Vec<SearchHit>, VectorStoreError> {
    let mut body = json!({
        "vector": {"name": "dense", "vector": vector},
        "limit": limit,
        "with_payload": true,
    });

    if let Some(project) = project_filter {
        body["filter"] = json!({
            "must": [{"key": "project_path", "match": {"value": project}}]
        });
    }
    if let Some(threshold) = score_threshold {
        body["score_threshold"] = json!(threshold);
    }

    let url = collection_url(config, "/points/search");
    let response = client.post(&url).json(&body).send().await?;
    let (status, raw) = read_body(response).await?;
    ensure_success(status, &raw)?;

    let parsed: SearchResponse = serde_json::from_str(&raw)
        .map_err(|e| VectorStoreError::Protocol(format!("{e}: {}", preview(&raw))))?;

    Ok(parsed
        .result
        .into_iter()
        .map(|hit| SearchHit {
            chunk_id: ChunkId::new(hit.payload.chunk_id),
            session_id: SessionId::new(hit.payload.session_id),
            project_path: hit.payload.project_path,
            timestamp: hit.payload.timestamp,
            content: hit.payload.content,
            context: hit.payload.context,
            score: hit.score,
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    result: Vec<SearchResultPoint>,
}

#[derive(Debug, Deserialize)]
struct SearchResultPoint {
    payload: Payload,
    score: f32,
}

fn preview(body: &str) -> String {
    body.chars().take(200).collect()
}
