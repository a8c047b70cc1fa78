//! Transcript reader (C7): streams one `.jsonl` file as a lazy, restartable
//! sequence of decoded `user`/`assistant` messages.

pub mod jsonl;
pub mod messages;

use std::path::Path;

use anyhow::{Context, Result};

pub use jsonl::JsonlReader;
pub use messages::{Role, TranscriptMessage};

/// Reads an entire transcript file from the start and returns every
/// decoded `user`/`assistant` message in source order. Other record types
/// are skipped; a line that fails to decode a message is skipped too (the
/// overall stream is still lazy at the `JsonlReader` level — this just
/// drains it for callers that want the whole file at once, as the indexer
/// does).
pub fn read_messages(path: &Path) -> Result<Vec<TranscriptMessage>> {
    let mut reader =
        JsonlReader::open(path, 0).with_context(|| format!("opening {}", path.display()))?;

    let mut out = Vec::new();
    while let Some((line, _offset)) = reader.next_line()? {
        if let Some(msg) = messages::decode_line(&line) {
            out.push(msg);
        }
    }
    Ok(out)
}
