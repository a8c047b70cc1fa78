//! Chunker (C9): deterministically splits a turn's combined text into
//! one-or-more chunks with stable identifiers. The hard part of the
//! indexer — see the design notes on why the overlap and split-point
//! guard exist.

use crate::ids::ChunkId;
use crate::turns::Turn;

pub const MAX_CHUNK_CHARS: usize = 2500;
pub const OVERLAP_CHARS: usize = 250;
pub const STRIDE: usize = MAX_CHUNK_CHARS - OVERLAP_CHARS;

/// A chunk ready for embedding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub chunk_id: ChunkId,
    pub session_id: crate::ids::SessionId,
    pub project_path: String,
    pub timestamp: String,
    pub text: String,
    pub context: Option<String>,
}

/// Splits one turn's combined text into chunks.
pub fn chunk_turn(turn: &Turn) -> Vec<Chunk> {
    let text = turn.combined_text();
    let pieces = split_text(&text);

    let multi = pieces.len() > 1;
    pieces
        .into_iter()
        .enumerate()
        .map(|(i, piece)| Chunk {
            chunk_id: ChunkId::for_turn(&turn.turn_id, multi.then_some(i)),
            session_id: turn.session_id.clone(),
            project_path: turn.project_path.clone(),
            timestamp: turn.timestamp.clone(),
            text: piece,
            context: None,
        })
        .collect()
}

/// Splits `T` per §4.9's stride/overlap algorithm. Operates on Unicode
/// scalar-value boundaries throughout, never byte offsets, so multi-byte
/// text is never sliced mid-codepoint.
fn split_text(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();

    if len <= MAX_CHUNK_CHARS {
        return vec![text.to_string()];
    }

    let mut pieces = Vec::new();
    let mut p = 0usize;
    loop {
        if len - p <= MAX_CHUNK_CHARS {
            pieces.push(chars[p..len].iter().collect());
            break;
        }

        let target = p + MAX_CHUNK_CHARS;
        let split = find_split_point(&chars, p, target);
        let end = split.min(len);
        pieces.push(chars[p..end].iter().collect());
        p += STRIDE;
    }
    pieces
}

/// Finds the split point for a stride-path chunk starting at `p`, with a
/// soft target end of `target`. Searches `chars[p..target]` (the window
/// relevant to this chunk) for the last paragraph break, falling back to
/// the last word break, falling back to a hard cut at `target`. The
/// `q > target/2` guard — measured relative to the whole-text index, as
/// the spec's pseudocode does — prevents an early break from collapsing
/// the chunk far below its budget.
fn find_split_point(chars: &[char], _p: usize, target: usize) -> usize {
    let window = &chars[..target.min(chars.len())];
    let half = target / 2;

    if let Some(q) = last_double_newline(window) {
        if q > half {
            return q + 2;
        }
    }

    if let Some(q) = last_space(window) {
        if q > half {
            return q + 1;
        }
    }

    target
}

fn last_double_newline(chars: &[char]) -> Option<usize> {
    if chars.len() < 2 {
        return None;
    }
    (0..=chars.len() - 2)
        .rev()
        .find(|&i| chars[i] == '\n' && chars[i + 1] == '\n')
}

fn last_space(chars: &[char]) -> Option<usize> {
    (0..chars.len()).rev().find(|&i| chars[i] == ' ')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{MessageId, SessionId};

    fn turn_with_text(text: &str) -> Turn {
        Turn {
            turn_id: MessageId::new("t"),
            session_id: SessionId::new("s"),
            project_path: "/proj".to_string(),
            timestamp: "now".to_string(),
            user_text: String::new(),
            assistant_text: String::new(),
        }
        .with_combined(text)
    }

    // Test-only helper: builds a Turn whose combined_text() is exactly
    // `text`, bypassing the "User: ...\n\nAssistant: ..." formatting so
    // the chunker's boundary tests can use round numbers.
    impl Turn {
        fn with_combined(self, text: &str) -> Turn {
            Turn {
                user_text: text.to_string(),
                assistant_text: String::new(),
                ..self
            }
        }
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        let turn = turn_with_text("hello");
        let chunks = chunk_turn(&turn);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].chunk_id, ChunkId::new("t"));
    }

    #[test]
    fn text_of_exactly_max_chunk_chars_is_one_chunk() {
        // combined_text adds "User: " (6 chars) and "\n\nAssistant: " (14 chars).
        let body = "a".repeat(MAX_CHUNK_CHARS - 20);
        let turn = turn_with_text(&body);
        assert_eq!(turn.combined_text().chars().count(), MAX_CHUNK_CHARS);
        assert_eq!(chunk_turn(&turn).len(), 1);
    }

    #[test]
    fn text_of_max_chunk_chars_plus_one_is_two_chunks() {
        let body = "a".repeat(MAX_CHUNK_CHARS - 19);
        let turn = turn_with_text(&body);
        assert_eq!(turn.combined_text().chars().count(), MAX_CHUNK_CHARS + 1);
        assert_eq!(chunk_turn(&turn).len(), 2);
    }

    #[test]
    fn text_of_two_strides_plus_one_is_at_least_three_chunks() {
        let target_len = 2 * STRIDE + 1;
        let body = "a".repeat(target_len.saturating_sub(20));
        let turn = turn_with_text(&body);
        assert!(chunk_turn(&turn).len() >= 3);
    }

    // S2 — chunker determinism, directly on split_text rather than
    // through combined_text's fixed prefix/separator.
    #[test]
    fn s2_chunker_determinism_on_raw_text() {
        let text = "A".repeat(5000);
        let pieces = split_text(&text);
        assert_eq!(pieces.len(), 3);
        assert_eq!(pieces[0], "A".repeat(2500));
        assert_eq!(pieces[1], "A".repeat(2500));
        assert_eq!(pieces[2], "A".repeat(500));
    }

    #[test]
    fn chunking_is_referentially_transparent() {
        let text = "word ".repeat(1000);
        let turn = turn_with_text(&text);
        let first = chunk_turn(&turn);
        let second = chunk_turn(&turn);
        assert_eq!(first, second);
    }

    #[test]
    fn every_chunk_is_within_budget_and_nonempty() {
        let text = "word ".repeat(2000);
        let turn = turn_with_text(&text);
        for chunk in chunk_turn(&turn) {
            assert!(!chunk.text.is_empty());
            assert!(chunk.text.chars().count() <= MAX_CHUNK_CHARS);
        }
    }

    #[test]
    fn coverage_every_character_appears_in_some_chunk() {
        let text = "word ".repeat(2000);
        let pieces = split_text(&text);
        let total_chars: String = pieces.concat();
        // Overlap means total_chars.len() >= text.len(); every char of the
        // original text must appear in at least one piece — check via the
        // stride reconstruction instead of a naive concat.
        assert!(total_chars.chars().count() >= text.chars().count());
        // Reconstruct using stride to verify exact coverage with no gaps.
        let chars: Vec<char> = text.chars().collect();
        let mut covered = vec![false; chars.len()];
        let mut p = 0usize;
        for (i, piece) in pieces.iter().enumerate() {
            let piece_len = piece.chars().count();
            let start = if i == 0 { 0 } else { p };
            for j in start..(start + piece_len).min(chars.len()) {
                covered[j] = true;
            }
            p += STRIDE;
        }
        assert!(covered.iter().all(|&c| c));
    }

    #[test]
    fn multi_chunk_turn_uses_colon_index_identifiers() {
        let text = "a".repeat(5000);
        let turn = turn_with_text(&text);
        let chunks = chunk_turn(&turn);
        assert_eq!(chunks[0].chunk_id, ChunkId::new("t:0"));
        assert_eq!(chunks[1].chunk_id, ChunkId::new("t:1"));
        assert_eq!(chunks[2].chunk_id, ChunkId::new("t:2"));
    }

    #[test]
    fn split_point_falls_through_to_word_boundary_when_only_early_paragraph_break() {
        // A "\n\n" that sits before target/2 must not be used; the word
        // boundary rule should take over instead.
        let mut text = String::new();
        text.push_str(&"a".repeat(10));
        text.push_str("\n\n");
        text.push_str(&"b ".repeat(3000));
        let pieces = split_text(&text);
        // First piece must not end right after the early "\n\n" (position 12).
        assert!(pieces[0].chars().count() > 100);
    }
}
