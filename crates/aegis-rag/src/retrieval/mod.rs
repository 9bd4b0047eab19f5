//! Vector index and retrieval

pub mod index;

pub use index::{IndexEntry, ScoredChunk, VectorIndex, INDEX_FILE};
