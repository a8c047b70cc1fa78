//! Embedding pool (C11): bounded-parallel embedding over a finite job
//! list, using a native semaphore for the concurrency bound rather than a
//! polling loop. Per-item failures are isolated — one chunk failing to
//! embed never cancels its peers, and the output ordering is not a
//! contract callers may rely on.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;

use crate::chunker::Chunk;
use crate::config::EmbeddingConfig;
use crate::embed::client::{self, EmbedError};

/// A chunk paired with its embedding, ready for upsert.
#[derive(Debug, Clone)]
pub struct EmbeddedChunk {
    pub chunk: Chunk,
    pub vector: Vec<f32>,
}

/// A chunk that failed to embed, paired with a human-readable diagnostic.
#[derive(Debug, Clone)]
pub struct EmbedFailure {
    pub chunk: Chunk,
    pub error: String,
}

/// Result of running the pool over one batch: successes and failures,
/// each list in completion order (not input order).
#[derive(Debug, Default)]
pub struct PoolResult {
    pub successes: Vec<EmbeddedChunk>,
    pub failures: Vec<EmbedFailure>,
}

/// Embeds every chunk in `chunks`, bounding in-flight HTTP requests to
/// `workers` at a time via a semaphore.
pub async fn embed_all(
    http: &reqwest::Client,
    config: &EmbeddingConfig,
    workers: usize,
    chunks: Vec<Chunk>,
) -> PoolResult {
    let semaphore = Arc::new(Semaphore::new(workers.max(1)));

    let jobs = chunks.into_iter().map(|chunk| {
        let semaphore = Arc::clone(&semaphore);
        let http = http.clone();
        let config = config.clone();
        async move {
            let _permit = semaphore
                .acquire()
                .await
                .expect("semaphore is never closed during a pool run");
            match client::embed(&http, &config, &chunk.text).await {
                Ok(vector) => Ok(EmbeddedChunk { chunk, vector }),
                Err(e) => Err(EmbedFailure {
                    chunk,
                    error: describe(&e),
                }),
            }
        }
    });

    let outcomes = join_all(jobs).await;

    let mut result = PoolResult::default();
    for outcome in outcomes {
        match outcome {
            Ok(embedded) => result.successes.push(embedded),
            Err(failure) => result.failures.push(failure),
        }
    }
    result
}

fn describe(e: &EmbedError) -> String {
    e.to_string()
}
