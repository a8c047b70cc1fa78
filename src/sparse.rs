//! Sparse-vector tokenizer (C15): tokenize → hash → term-frequency sparse
//! vector, for an optional hybrid-search mode layered on top of C12's
//! dense search. The vector store is expected to apply its own IDF
//! modifier at indexing time; this module only produces raw term
//! frequencies.

use crate::fnv::fnv1a_64;

const MIN_TOKEN_LEN: usize = 2;

/// A sparse vector: hashed token index → term frequency, sorted by index
/// for reproducible serialization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    pub indices: Vec<u64>,
    pub values: Vec<f32>,
}

/// Lowercases `text` and emits runs of `[a-z0-9]` of length >= 2 as tokens;
/// every other character is a separator. Hashes each token with FNV-1a and
/// accumulates term frequencies, then emits pairs sorted by index.
pub fn tokenize(text: &str) -> SparseVector {
    let lowered = text.to_lowercase();
    let mut counts: std::collections::BTreeMap<u64, f32> = std::collections::BTreeMap::new();

    let mut run = String::new();
    for c in lowered.chars() {
        if c.is_ascii_alphanumeric() {
            run.push(c);
        } else {
            count_run(&run, &mut counts);
            run.clear();
        }
    }
    count_run(&run, &mut counts);

    let (indices, values) = counts.into_iter().unzip();
    SparseVector { indices, values }
}

fn count_run(run: &str, counts: &mut std::collections::BTreeMap<u64, f32>) {
    if run.chars().count() >= MIN_TOKEN_LEN {
        let idx = fnv1a_64(run.as_bytes());
        *counts.entry(idx).or_insert(0.0) += 1.0;
    }
}
