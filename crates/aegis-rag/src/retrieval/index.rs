//! Flat cosine vector index with atomic on-disk persistence

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;
use crate::types::Chunk;

/// File name of the serialized index inside the vector store directory
pub const INDEX_FILE: &str = "index.bin";

const INDEX_MAGIC: &[u8; 8] = b"AEGISIDX";
const INDEX_VERSION: u32 = 1;

/// Chunks embedded per provider call
const EMBED_BATCH_SIZE: usize = 32;

/// One (embedding, chunk) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
}

/// A search hit
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    /// The retrieved chunk
    pub chunk: Chunk,
    /// Cosine similarity to the query (higher is closer)
    pub similarity: f32,
}

#[derive(Serialize, Deserialize)]
struct PersistedIndex {
    version: u32,
    dimensions: usize,
    entries: Vec<IndexEntry>,
}

/// Append-only nearest-neighbour index over chunk embeddings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VectorIndex {
    /// Embedding dimension, fixed by the first entry (0 while empty)
    dimensions: usize,
    entries: Vec<IndexEntry>,
}

/// Embed chunk texts in batches, preserving order
async fn embed_chunks(chunks: &[Chunk], embedder: &dyn EmbeddingProvider) -> Result<Vec<Vec<f32>>> {
    let mut embeddings = Vec::with_capacity(chunks.len());

    for batch in chunks.chunks(EMBED_BATCH_SIZE) {
        let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
        let vectors = embedder.embed_batch(&texts).await?;
        if vectors.len() != batch.len() {
            return Err(Error::embedding(format!(
                "{} returned {} embeddings for {} chunks",
                embedder.name(),
                vectors.len(),
                batch.len()
            )));
        }
        embeddings.extend(vectors);
    }

    Ok(embeddings)
}

impl VectorIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Embed every chunk and construct a fresh index
    pub async fn build(chunks: Vec<Chunk>, embedder: &dyn EmbeddingProvider) -> Result<Self> {
        Self::new().add(chunks, embedder).await
    }

    /// Embed `chunks` and return a new index holding the existing entries
    /// followed by the new ones. `self` is left untouched.
    pub async fn add(&self, chunks: Vec<Chunk>, embedder: &dyn EmbeddingProvider) -> Result<Self> {
        let embeddings = embed_chunks(&chunks, embedder).await?;

        let mut next = self.clone();
        next.entries.reserve(chunks.len());
        for (chunk, embedding) in chunks.into_iter().zip(embeddings) {
            next.insert(chunk, embedding)?;
        }

        Ok(next)
    }

    /// Append one pre-embedded chunk
    pub fn insert(&mut self, chunk: Chunk, embedding: Vec<f32>) -> Result<()> {
        if embedding.is_empty() {
            return Err(Error::embedding("empty embedding"));
        }
        if self.dimensions == 0 {
            self.dimensions = embedding.len();
        } else if embedding.len() != self.dimensions {
            return Err(Error::embedding(format!(
                "embedding has {} dimensions, index expects {}",
                embedding.len(),
                self.dimensions
            )));
        }

        self.entries.push(IndexEntry { chunk, embedding });
        Ok(())
    }

    /// The `k` entries most similar to `query`, nearest first.
    /// Ties keep insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredChunk>> {
        if self.entries.is_empty() {
            return Err(Error::EmptyIndex);
        }
        if query.len() != self.dimensions {
            return Err(Error::embedding(format!(
                "query has {} dimensions, index expects {}",
                query.len(),
                self.dimensions
            )));
        }

        let query_norm = norm(query);
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, cosine(query, query_norm, &entry.embedding)))
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(i, similarity)| ScoredChunk {
                chunk: self.entries[i].chunk.clone(),
                similarity,
            })
            .collect())
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Number of distinct source documents
    pub fn document_count(&self) -> usize {
        self.entries
            .iter()
            .map(|e| e.chunk.document_id)
            .collect::<HashSet<_>>()
            .len()
    }

    /// Chunks indexed from the named source file
    pub fn chunks_for(&self, filename: &str) -> usize {
        self.entries
            .iter()
            .filter(|e| e.chunk.source.filename == filename)
            .count()
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Path of the index file inside a vector store directory
    pub fn index_file(dir: &Path) -> PathBuf {
        dir.join(INDEX_FILE)
    }

    /// Persist into `dir`, replacing any previous index atomically
    pub fn save(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;

        let persisted = PersistedIndex {
            version: INDEX_VERSION,
            dimensions: self.dimensions,
            entries: self.entries.clone(),
        };
        let body = bincode::serde::encode_to_vec(&persisted, bincode::config::standard())
            .map_err(|e| Error::internal(format!("Failed to encode index: {}", e)))?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(INDEX_MAGIC)?;
        tmp.write_all(&body)?;
        tmp.as_file().sync_all()?;
        tmp.persist(Self::index_file(dir)).map_err(|e| Error::Io(e.error))?;

        tracing::debug!(
            "Saved vector index ({} entries, {} bytes) to {}",
            self.entries.len(),
            body.len() + INDEX_MAGIC.len(),
            dir.display()
        );
        Ok(())
    }

    /// Load a persisted index from `dir`; `None` when nothing was saved
    pub fn load(dir: &Path) -> Result<Option<Self>> {
        let bytes = match std::fs::read(Self::index_file(dir)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Self::decode(&bytes).map(Some)
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        let body = bytes
            .strip_prefix(INDEX_MAGIC.as_slice())
            .ok_or_else(|| Error::corrupt_index("missing index header"))?;

        let (persisted, _): (PersistedIndex, usize) =
            bincode::serde::decode_from_slice(body, bincode::config::standard())
                .map_err(|e| Error::corrupt_index(format!("decode failed: {}", e)))?;

        if persisted.version != INDEX_VERSION {
            return Err(Error::corrupt_index(format!(
                "unsupported index version {}",
                persisted.version
            )));
        }

        let expected = persisted.dimensions;
        if persisted.entries.is_empty() != (expected == 0) {
            return Err(Error::corrupt_index("dimension header does not match entries"));
        }
        if let Some(bad) = persisted.entries.iter().find(|e| e.embedding.len() != expected) {
            return Err(Error::corrupt_index(format!(
                "entry {} has {} dimensions, expected {}",
                bad.chunk.id,
                bad.embedding.len(),
                expected
            )));
        }

        Ok(Self {
            dimensions: expected,
            entries: persisted.entries,
        })
    }
}

fn norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

fn cosine(query: &[f32], query_norm: f32, other: &[f32]) -> f32 {
    let denom = query_norm * norm(other);
    if denom == 0.0 {
        return 0.0;
    }
    let dot: f32 = query.iter().zip(other).map(|(a, b)| a * b).sum();
    dot / denom
}
