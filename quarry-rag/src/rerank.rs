//! Reranker adapter trait for second-stage relevance scoring.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One reranked candidate.
///
/// `index` references a position in the candidate list handed to
/// [`Reranker::rerank`], not a chunk id; the caller maps it back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedItem {
    /// Position of this candidate in the input document list.
    pub index: usize,
    /// Relevance of the candidate to the query, higher is better.
    pub relevance_score: f32,
}

/// A reranker that re-scores a small candidate set against a query.
///
/// Typically higher-precision than the ANN similarity metric alone.
#[async_trait]
pub trait Reranker: Send + Sync {
    /// Score `documents` against `query` and return at most `top_n` items
    /// in descending relevance order.
    ///
    /// Callers must keep `top_n <= documents.len()`.
    async fn rerank(
        &self,
        query: &str,
        documents: &[String],
        top_n: usize,
    ) -> Result<Vec<RankedItem>>;
}
