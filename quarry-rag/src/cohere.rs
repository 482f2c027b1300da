//! Cohere-backed adapter implementations using the `quarry-cohere` crate.
//!
//! This module is only available when the `cohere` feature is enabled.

use async_trait::async_trait;
use tracing::debug;

use quarry_cohere::{Cohere, EmbedInputType, DEFAULT_EMBED_MODEL, DEFAULT_RERANK_MODEL};

use crate::embedding::{Embedding, EmbeddingProvider, InputType};
use crate::error::{RagError, Result};
use crate::rerank::{RankedItem, Reranker};

/// An [`EmbeddingProvider`] backed by the Cohere embed API.
///
/// Uses `embed-english-v3.0` by default (1024-dimensional vectors) and
/// maps [`InputType`] onto the service's asymmetric
/// `search_document` / `search_query` roles.
pub struct CohereEmbedder {
    client: Cohere,
    model: String,
}

impl CohereEmbedder {
    /// Create a provider around an existing [`Cohere`] client.
    pub fn new(client: Cohere) -> Self {
        Self { client, model: DEFAULT_EMBED_MODEL.to_string() }
    }

    /// Set the embedding model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl EmbeddingProvider for CohereEmbedder {
    async fn embed(&self, texts: &[String], input_type: InputType) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        debug!(batch_size = texts.len(), model = %self.model, "embedding via Cohere");

        let role = match input_type {
            InputType::Document => EmbedInputType::SearchDocument,
            InputType::Query => EmbedInputType::SearchQuery,
        };
        self.client
            .embed(texts, &self.model, role)
            .await
            .map_err(|e| RagError::EmbeddingService { message: e.to_string() })
    }
}

/// A [`Reranker`] backed by the Cohere rerank API.
pub struct CohereReranker {
    client: Cohere,
    model: String,
}

impl CohereReranker {
    /// Create a reranker around an existing [`Cohere`] client.
    pub fn new(client: Cohere) -> Self {
        Self { client, model: DEFAULT_RERANK_MODEL.to_string() }
    }

    /// Set the rerank model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl Reranker for CohereReranker {
    async fn rerank(
        &self,
        query: &str,
        documents: &[String],
        top_n: usize,
    ) -> Result<Vec<RankedItem>> {
        debug!(candidates = documents.len(), top_n, model = %self.model, "reranking via Cohere");

        let results = self
            .client
            .rerank(query, documents, top_n, &self.model)
            .await
            .map_err(|e| RagError::RerankService { message: e.to_string() })?;

        Ok(results
            .into_iter()
            .map(|r| RankedItem { index: r.index, relevance_score: r.relevance_score })
            .collect())
    }
}
