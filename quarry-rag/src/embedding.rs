//! Embedding provider trait for generating vector embeddings from text.

use async_trait::async_trait;

use crate::error::Result;

/// A fixed-dimension vector representing chunk or query semantics.
pub type Embedding = Vec<f32>;

/// The retrieval role of the texts being embedded.
///
/// Embedding services produce asymmetric vectors: corpus chunks embed as
/// documents, user queries as queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    /// A chunk being indexed.
    Document,
    /// A search query being matched against indexed chunks.
    Query,
}

/// A provider that generates vector embeddings from text input.
///
/// Order contract: the returned list has the same length as `texts`, and
/// `result[i]` is the embedding of `texts[i]`. The provider is stateless
/// per call and does not batch internally; the
/// [`DocumentStore`](crate::DocumentStore) slices its corpus into batches
/// of the configured size and concatenates results in submission order.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed `texts` in the given role, one vector per input, same order.
    async fn embed(&self, texts: &[String], input_type: InputType) -> Result<Vec<Embedding>>;
}
