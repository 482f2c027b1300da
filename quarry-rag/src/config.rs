//! Configuration for the retrieval engine.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// HNSW construction and search parameters.
///
/// These trade index build time and memory for recall; they are exposed
/// as configuration rather than hardcoded so callers can tune them per
/// corpus size.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexParams {
    /// Graph connectivity: maximum number of neighbors kept per node.
    pub m: usize,
    /// Search breadth while inserting during the build phase.
    pub ef_construction: usize,
    /// Search breadth at query time. Queries widen this to at least `k`.
    pub ef_search: usize,
}

impl Default for IndexParams {
    fn default() -> Self {
        Self { m: 64, ef_construction: 512, ef_search: 64 }
    }
}

/// Configuration parameters for a [`DocumentStore`](crate::DocumentStore).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalConfig {
    /// Character length of fixed-size chunks cut from plain-text sources.
    pub chunk_size: usize,
    /// Maximum number of texts sent to the embedding service per call.
    pub embed_batch_size: usize,
    /// Number of embedding batches in flight at once during construction.
    /// Results are reassembled in submission order regardless.
    pub embed_concurrency: usize,
    /// Number of candidates pulled from the vector index per query.
    pub retrieve_top_k: usize,
    /// Number of results kept after reranking.
    pub rerank_top_k: usize,
    /// Vector index construction and search parameters.
    pub index: IndexParams,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            embed_batch_size: 90,
            embed_concurrency: 1,
            retrieve_top_k: 10,
            rerank_top_k: 3,
            index: IndexParams::default(),
        }
    }
}

impl RetrievalConfig {
    /// Create a new builder for constructing a [`RetrievalConfig`].
    pub fn builder() -> RetrievalConfigBuilder {
        RetrievalConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`RetrievalConfig`].
#[derive(Debug, Clone, Default)]
pub struct RetrievalConfigBuilder {
    config: RetrievalConfig,
}

impl RetrievalConfigBuilder {
    /// Set the character length of fixed-size chunks.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the maximum number of texts per embedding call.
    pub fn embed_batch_size(mut self, size: usize) -> Self {
        self.config.embed_batch_size = size;
        self
    }

    /// Set how many embedding batches run concurrently during construction.
    pub fn embed_concurrency(mut self, concurrency: usize) -> Self {
        self.config.embed_concurrency = concurrency;
        self
    }

    /// Set the number of candidates pulled from the vector index.
    pub fn retrieve_top_k(mut self, k: usize) -> Self {
        self.config.retrieve_top_k = k;
        self
    }

    /// Set the number of results kept after reranking.
    pub fn rerank_top_k(mut self, k: usize) -> Self {
        self.config.rerank_top_k = k;
        self
    }

    /// Set the vector index parameters.
    pub fn index(mut self, params: IndexParams) -> Self {
        self.config.index = params;
        self
    }

    /// Build the [`RetrievalConfig`], validating that parameters are
    /// consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if:
    /// - any size or count is zero
    /// - `rerank_top_k > retrieve_top_k`
    pub fn build(self) -> Result<RetrievalConfig> {
        let c = &self.config;
        for (name, value) in [
            ("chunk_size", c.chunk_size),
            ("embed_batch_size", c.embed_batch_size),
            ("embed_concurrency", c.embed_concurrency),
            ("retrieve_top_k", c.retrieve_top_k),
            ("rerank_top_k", c.rerank_top_k),
            ("index.m", c.index.m),
            ("index.ef_construction", c.index.ef_construction),
            ("index.ef_search", c.index.ef_search),
        ] {
            if value == 0 {
                return Err(RagError::Config(format!("{name} must be greater than zero")));
            }
        }
        if c.rerank_top_k > c.retrieve_top_k {
            return Err(RagError::Config(format!(
                "rerank_top_k ({}) must not exceed retrieve_top_k ({})",
                c.rerank_top_k, c.retrieve_top_k
            )));
        }
        Ok(self.config)
    }
}
