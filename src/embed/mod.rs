pub mod client;
pub mod pool;

pub use client::EmbedError;
pub use pool::{EmbedFailure, EmbeddedChunk, PoolResult};
