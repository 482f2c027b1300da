//! Approximate nearest-neighbor index over chunk embeddings.
//!
//! Wraps an [`hnsw_rs`] graph configured for inner-product similarity.
//! The index is built exactly once over the full embedding list and is
//! read-only afterwards; rebuilding from scratch is the only supported
//! update path.

use hnsw_rs::prelude::*;
use tracing::debug;

use crate::config::IndexParams;
use crate::document::ChunkId;
use crate::embedding::Embedding;
use crate::error::{RagError, Result};

// hnsw_rs NB_LAYER_MAX; the library caps layer count here anyway.
const NB_LAYERS: usize = 16;

/// An inner-product HNSW index mapping item id to embedding.
///
/// Item id `i` is the position of vector `i` in the build input, which by
/// the store's arena invariant is also a [`ChunkId`]. Search is
/// approximate: recall is traded for sub-linear query time.
pub struct VectorIndex {
    hnsw: Hnsw<'static, f32, DistDot>,
    len: usize,
    dimension: usize,
    ef_search: usize,
}

impl std::fmt::Debug for VectorIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorIndex")
            .field("len", &self.len)
            .field("dimension", &self.dimension)
            .field("ef_search", &self.ef_search)
            .finish_non_exhaustive()
    }
}

impl VectorIndex {
    /// Build an index over `embeddings`. Item ids are input positions.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::IndexConfiguration`] if `embeddings` is empty
    /// or the vectors do not all share one dimension.
    pub fn build(embeddings: &[Embedding], params: &IndexParams) -> Result<Self> {
        if embeddings.is_empty() {
            return Err(RagError::IndexConfiguration {
                message: "cannot build an index over zero vectors".to_string(),
            });
        }

        let dimension = embeddings[0].len();
        if let Some(bad) = embeddings.iter().position(|e| e.len() != dimension) {
            return Err(RagError::IndexConfiguration {
                message: format!(
                    "embedding {bad} has dimension {}, expected {dimension}",
                    embeddings[bad].len()
                ),
            });
        }

        debug!(
            vectors = embeddings.len(),
            dimension,
            m = params.m,
            ef_construction = params.ef_construction,
            "building vector index"
        );

        let mut hnsw = Hnsw::<'static, f32, DistDot>::new(
            params.m,
            embeddings.len(),
            NB_LAYERS,
            params.ef_construction,
            DistDot {},
        );

        let data: Vec<(&Vec<f32>, usize)> =
            embeddings.iter().enumerate().map(|(id, vector)| (vector, id)).collect();
        hnsw.parallel_insert(&data);
        hnsw.set_searching_mode(true);

        Ok(Self { hnsw, len: embeddings.len(), dimension, ef_search: params.ef_search })
    }

    /// Number of indexed items.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false: building over zero vectors is rejected.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Dimension every indexed vector (and every query vector) must have.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Return up to `k` nearest item ids by inner product, best match
    /// first (ascending dot-product distance).
    ///
    /// `k` greater than the number of indexed items is clamped to it.
    pub fn query(&self, vector: &[f32], k: usize) -> Vec<(ChunkId, f32)> {
        let k = k.min(self.len);
        if k == 0 {
            return Vec::new();
        }
        let ef = self.ef_search.max(k);
        self.hnsw
            .search(vector, k, ef)
            .into_iter()
            .map(|n| (ChunkId(n.d_id), n.distance))
            .collect()
    }
}
