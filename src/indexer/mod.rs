//! Indexer orchestrator (C13): discover → parse → chunk → diff → embed →
//! upsert, with a per-batch error sink and a final summary report.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::chunker::{self, Chunk};
use crate::config::{EmbeddingConfig, VectorStoreConfig};
use crate::embed::pool;
use crate::ids::ChunkId;
use crate::turns;
use crate::vectorstore;

/// Configuration for one indexer run.
pub struct IndexConfig {
    pub transcripts_root: PathBuf,
    pub project_filter: Option<String>,
    pub dry_run: bool,
    pub batch_size: usize,
    pub workers: usize,
    pub errors_file: Option<PathBuf>,
}

/// Plan produced by the diff step (§4.13 step 4 — also S5).
#[derive(Debug, Clone, Serialize)]
pub struct IndexPlan {
    pub files_seen: usize,
    pub total_chunks: usize,
    pub existing: usize,
    pub new: usize,
}

/// One entry in the optional JSONL error file.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    pub chunk_id: String,
    pub session_id: String,
    pub project_path: String,
    pub error: String,
    pub content_length: usize,
    pub content_preview: String,
}

/// Final summary of an indexer run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IndexReport {
    pub files_seen: usize,
    pub chunks_parsed: usize,
    pub chunks_already_present: usize,
    pub chunks_new: usize,
    pub chunks_embedded: usize,
    pub chunks_written: usize,
    pub chunks_errored: usize,
    pub elapsed_secs: f64,
}

impl std::fmt::Display for IndexReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Indexing complete in {:.1}s", self.elapsed_secs)?;
        writeln!(f, "  Files seen:      {}", self.files_seen)?;
        writeln!(f, "  Chunks parsed:   {}", self.chunks_parsed)?;
        writeln!(f, "  Already present: {}", self.chunks_already_present)?;
        writeln!(f, "  New chunks:      {}", self.chunks_new)?;
        writeln!(f, "  Embedded:        {}", self.chunks_embedded)?;
        writeln!(f, "  Written:         {}", self.chunks_written)?;
        writeln!(f, "  Errors:          {}", self.chunks_errored)?;
        Ok(())
    }
}

const TRANSCRIPT_EXTENSION: &str = "jsonl";
const CONTENT_PREVIEW_LEN: usize = 200;

/// One discovered transcript file: its path plus the metadata the diff
/// step could use for a cheaper future change-detection pass (the
/// current diff is chunk-id based and doesn't consult these yet).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub mtime: Option<SystemTime>,
    pub size: u64,
}

/// Walks the transcripts root recursively, collecting path, mtime, and
/// size for every `.jsonl` file. When `project_filter` is set, a file is
/// kept only if its path contains the project path literally, or with
/// `/` replaced by `-` (accommodates a producer that flattens project
/// paths into directory names).
pub fn discover(root: &Path, project_filter: Option<&str>) -> Result<Vec<DiscoveredFile>> {
    let mut files = Vec::new();
    walk_dir(root, &mut files)?;

    files.retain(|f| matches_project_filter(&f.path, project_filter));
    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

fn walk_dir(dir: &Path, out: &mut Vec<DiscoveredFile>) -> Result<()> {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return Ok(()), // unreadable directory: skip, don't fail the run
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            walk_dir(&path, out)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some(TRANSCRIPT_EXTENSION) {
            let (mtime, size) = match std::fs::metadata(&path) {
                Ok(meta) => (meta.modified().ok(), meta.len()),
                Err(_) => (None, 0), // unreadable metadata: keep the file, just without stats
            };
            out.push(DiscoveredFile { path, mtime, size });
        }
    }
    Ok(())
}

fn matches_project_filter(path: &Path, project_filter: Option<&str>) -> bool {
    let Some(project) = project_filter else {
        return true;
    };
    let flattened = project.replace('/', "-");
    let path_str = path.to_string_lossy();
    path_str.contains(project) || path_str.contains(&flattened)
}

/// Streams every discovered file through the transcript reader, turn
/// pairer, and chunker. A file that fails to open is silently skipped —
/// it does not abort the run.
pub fn parse_all(files: &[DiscoveredFile]) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    for file in files {
        let messages = match crate::transcript::read_messages(&file.path) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!("skipping unreadable transcript {}: {e}", file.path.display());
                continue;
            }
        };
        for turn in turns::pair_turns(&messages) {
            chunks.extend(chunker::chunk_turn(&turn));
        }
    }
    chunks
}

/// Drops from `chunks` any whose id is already present in `existing_ids`.
/// The remainder is the work set (S5).
pub fn diff(existing_ids: &HashSet<ChunkId>, chunks: Vec<Chunk>) -> (Vec<Chunk>, usize) {
    let mut existing_count = 0;
    let mut new_chunks = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        if existing_ids.contains(&chunk.chunk_id) {
            existing_count += 1;
        } else {
            new_chunks.push(chunk);
        }
    }
    (new_chunks, existing_count)
}

/// Partitions a work set into batches of `batch_size`. The first
/// `floor(|W| / batch_size)` batches have size exactly `batch_size`; the
/// last batch (if any) carries the remainder.
pub fn batch(work: Vec<Chunk>, batch_size: usize) -> Vec<Vec<Chunk>> {
    if batch_size == 0 {
        return vec![work];
    }
    work.chunks(batch_size).map(|c| c.to_vec()).collect()
}

/// Runs the full C13 pipeline.
pub async fn run_index(
    http: &reqwest::Client,
    vector_store: &VectorStoreConfig,
    embedding: &EmbeddingConfig,
    config: &IndexConfig,
) -> Result<IndexReport> {
    let start = Instant::now();

    let files = discover(&config.transcripts_root, config.project_filter.as_deref())
        .with_context(|| {
            format!(
                "failed to scan transcripts root {}",
                config.transcripts_root.display()
            )
        })?;
    tracing::info!("discovered {} transcript files", files.len());

    let parsed = parse_all(&files);
    tracing::info!("parsed {} chunks", parsed.len());

    let existing_ids: HashSet<ChunkId> = vectorstore::scroll_all_chunk_ids(http, vector_store)
        .await
        .context("failed to scroll existing chunk ids from the vector store")?
        .into_iter()
        .collect();

    let (work, already_present) = diff(&existing_ids, parsed.clone());

    let mut report = IndexReport {
        files_seen: files.len(),
        chunks_parsed: parsed.len(),
        chunks_already_present: already_present,
        chunks_new: work.len(),
        ..IndexReport::default()
    };

    if config.dry_run {
        report.elapsed_secs = start.elapsed().as_secs_f64();
        return Ok(report);
    }

    let mut error_sink: Vec<ErrorRecord> = Vec::new();

    for work_batch in batch(work, config.batch_size) {
        let pool_result = pool::embed_all(http, embedding, config.workers, work_batch).await;

        for failure in &pool_result.failures {
            error_sink.push(error_record(&failure.chunk, &failure.error));
        }
        report.chunks_embedded += pool_result.successes.len();

        if pool_result.successes.is_empty() {
            report.chunks_errored += pool_result.failures.len();
            continue;
        }

        match vectorstore::upsert(http, vector_store, &pool_result.successes).await {
            Ok(()) => {
                report.chunks_written += pool_result.successes.len();
                report.chunks_errored += pool_result.failures.len();
            }
            Err(e) => {
                // A batch-level transport failure demotes every success in
                // this batch into a failure; processing continues with the
                // next batch.
                let message = e.to_string();
                for embedded in &pool_result.successes {
                    error_sink.push(error_record(&embedded.chunk, &message));
                }
                report.chunks_errored += pool_result.successes.len() + pool_result.failures.len();
                report.chunks_embedded -= pool_result.successes.len();
            }
        }
    }

    if let Some(path) = &config.errors_file {
        write_errors_file(path, &error_sink)
            .with_context(|| format!("failed to write errors file {}", path.display()))?;
    }

    report.elapsed_secs = start.elapsed().as_secs_f64();
    Ok(report)
}

fn error_record(chunk: &Chunk, error: &str) -> ErrorRecord {
    ErrorRecord {
        chunk_id: chunk.chunk_id.as_str().to_string(),
        session_id: chunk.session_id.as_str().to_string(),
        project_path: chunk.project_path.clone(),
        error: error.to_string(),
        content_length: chunk.text.chars().count(),
        content_preview: chunk.text.chars().take(CONTENT_PREVIEW_LEN).collect(),
    }
}

fn write_errors_file(path: &Path, records: &[ErrorRecord]) -> Result<()> {
    use std::io::Write;
    let mut file = std::fs::File::create(path)?;
    for record in records {
        writeln!(file, "{}", serde_json::to_string(record)?)?;
    }
    Ok(())
}
