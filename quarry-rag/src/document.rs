//! Data types for sources, chunks, and retrieval results.

use serde::{Deserialize, Serialize};

/// A document to ingest, identified by a display title and a fetchable URL.
///
/// Sources are supplied once when a [`DocumentStore`](crate::DocumentStore)
/// is built and are never mutated afterwards. Every chunk derived from a
/// source inherits its `title` and `url` verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Source {
    /// Human-readable title shown alongside citations.
    pub title: String,
    /// Location the raw content is downloaded from.
    pub url: String,
}

impl Source {
    /// Convenience constructor for building source lists in code.
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self { title: title.into(), url: url.into() }
    }
}

/// Identity of a chunk: its position in the store's chunk arena.
///
/// The same integer addresses the chunk's embedding and its vector-index
/// item. That correspondence holds because chunks, embeddings, and the
/// index are all built from the same ordered arena; the id must never be
/// used against a filtered or reordered view of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChunkId(pub usize);

impl ChunkId {
    /// The arena position this id addresses.
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for ChunkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A bounded unit of source text carrying provenance.
///
/// Chunks are immutable after creation and owned exclusively by the
/// store's arena.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    /// Title of the source this chunk came from.
    pub title: String,
    /// The chunk's text content, the unit of embedding and retrieval.
    pub text: String,
    /// URL of the source this chunk came from.
    pub url: String,
}

/// A retrieved chunk projection returned to callers.
///
/// Carries no internal id; it serializes to the `{title, text, url}`
/// shape grounded-chat services accept as a document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetrievalResult {
    /// Title of the originating source.
    pub title: String,
    /// The retrieved chunk text.
    pub text: String,
    /// URL of the originating source.
    pub url: String,
}

impl From<&Chunk> for RetrievalResult {
    fn from(chunk: &Chunk) -> Self {
        Self { title: chunk.title.clone(), text: chunk.text.clone(), url: chunk.url.clone() }
    }
}
