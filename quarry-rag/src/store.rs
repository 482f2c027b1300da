//! The document store: corpus ownership and the retrieve-then-rerank
//! search protocol.
//!
//! A [`DocumentStore`] is built once over a fixed source list (fetch and
//! chunk every source, embed every chunk, index every embedding) and
//! answers retrieval queries read-only afterwards. Construction via
//! [`DocumentStore::builder()`]:
//!
//! ```rust,ignore
//! let store = DocumentStore::builder()
//!     .config(RetrievalConfig::default())
//!     .fetcher(Arc::new(HttpFetcher::new()))
//!     .embedder(Arc::new(embedder))
//!     .reranker(Arc::new(reranker))
//!     .build(&sources)
//!     .await?;
//!
//! let results = store.retrieve("how do I install it?").await?;
//! ```

use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info};

use crate::chunking::{Chunker, FixedSizeChunker, HtmlSectionChunker};
use crate::config::RetrievalConfig;
use crate::document::{Chunk, ChunkId, RetrievalResult, Source};
use crate::embedding::{Embedding, EmbeddingProvider, InputType};
use crate::error::{RagError, Result};
use crate::fetch::SourceFetcher;
use crate::index::VectorIndex;
use crate::rerank::Reranker;

/// The corpus owner and retrieval engine.
///
/// Holds the chunk arena, and the vector index built over it, as
/// shared-immutable state: concurrent [`retrieve`](DocumentStore::retrieve)
/// calls need no locking because nothing is written after construction.
pub struct DocumentStore {
    config: RetrievalConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    reranker: Arc<dyn Reranker>,
    chunks: Vec<Chunk>,
    /// `None` exactly when the corpus produced zero chunks.
    index: Option<VectorIndex>,
}

impl DocumentStore {
    /// Create a new [`DocumentStoreBuilder`].
    pub fn builder() -> DocumentStoreBuilder {
        DocumentStoreBuilder::default()
    }

    /// Number of chunks in the corpus.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Read access to a chunk by id.
    pub fn chunk(&self, id: ChunkId) -> Option<&Chunk> {
        self.chunks.get(id.index())
    }

    /// The configuration the store was built with.
    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Retrieve the chunks most relevant to `query`.
    ///
    /// The two-stage protocol: embed the query, pull `retrieve_top_k`
    /// candidates from the vector index, rerank them, and return at most
    /// `rerank_top_k` results ordered strictly by descending reranked
    /// relevance.
    ///
    /// An empty corpus returns an empty list without touching the
    /// embedding, index, or rerank adapters.
    ///
    /// # Errors
    ///
    /// Adapter failures ([`RagError::EmbeddingService`],
    /// [`RagError::RerankService`]) propagate unmodified; there is no
    /// fallback to unranked results.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<RetrievalResult>> {
        let Some(index) = &self.index else {
            return Ok(Vec::new());
        };

        debug!(query, "embedding query");
        let query_texts = [query.to_string()];
        let query_embeddings = self.embedder.embed(&query_texts, InputType::Query).await?;
        let query_embedding =
            query_embeddings.first().ok_or_else(|| RagError::EmbeddingService {
                message: "embedding service returned no vector for the query".to_string(),
            })?;
        if query_embedding.len() != index.dimension() {
            return Err(RagError::IndexConfiguration {
                message: format!(
                    "query embedding has dimension {}, index expects {}",
                    query_embedding.len(),
                    index.dimension()
                ),
            });
        }

        let k = self.config.retrieve_top_k.min(self.chunks.len());
        let candidates: Vec<ChunkId> =
            index.query(query_embedding, k).into_iter().map(|(id, _)| id).collect();
        debug_assert!(
            {
                let mut seen = candidates.clone();
                seen.sort();
                seen.dedup();
                seen.len() == candidates.len()
            },
            "vector index returned duplicate chunk ids"
        );
        debug!(query, candidates = candidates.len(), "vector index query complete");

        let documents: Vec<String> =
            candidates.iter().map(|id| self.chunks[id.index()].text.clone()).collect();
        let top_n = self.config.rerank_top_k.min(documents.len());
        let ranked = self.reranker.rerank(query, &documents, top_n).await?;

        let mut results = Vec::with_capacity(ranked.len());
        for item in ranked {
            let id = candidates.get(item.index).ok_or_else(|| RagError::RerankService {
                message: format!(
                    "rerank result index {} out of range for {} candidates",
                    item.index,
                    candidates.len()
                ),
            })?;
            results.push(RetrievalResult::from(&self.chunks[id.index()]));
        }

        info!(query, result_count = results.len(), "retrieval complete");
        Ok(results)
    }
}

/// Builder for constructing a fully-indexed [`DocumentStore`].
///
/// All adapters are injected (no global client handles), so the test
/// suite can substitute doubles for every external collaborator. The
/// terminal [`build`](DocumentStoreBuilder::build) runs the three
/// construction phases to completion; a partially-constructed store is
/// unrepresentable.
#[derive(Default)]
pub struct DocumentStoreBuilder {
    config: Option<RetrievalConfig>,
    fetcher: Option<Arc<dyn SourceFetcher>>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    reranker: Option<Arc<dyn Reranker>>,
}

impl DocumentStoreBuilder {
    /// Set the retrieval configuration.
    pub fn config(mut self, config: RetrievalConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the source fetcher.
    pub fn fetcher(mut self, fetcher: Arc<dyn SourceFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Set the embedding provider.
    pub fn embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the reranker.
    pub fn reranker(mut self, reranker: Arc<dyn Reranker>) -> Self {
        self.reranker = Some(reranker);
        self
    }

    /// Fetch, chunk, embed, and index `sources`, returning the finished
    /// store.
    ///
    /// Phases run strictly in order and each must complete before the
    /// next starts. Chunks accumulate in source order, then chunk order
    /// within each source; embeddings and index ids follow that arena
    /// order exactly.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if a required field is missing, and
    /// propagates any fetch, embedding, or index error, leaving no
    /// retrievable partial store behind.
    pub async fn build(self, sources: &[Source]) -> Result<DocumentStore> {
        let config = self.config.ok_or_else(|| RagError::Config("config is required".into()))?;
        let fetcher = self.fetcher.ok_or_else(|| RagError::Config("fetcher is required".into()))?;
        let embedder =
            self.embedder.ok_or_else(|| RagError::Config("embedder is required".into()))?;
        let reranker =
            self.reranker.ok_or_else(|| RagError::Config("reranker is required".into()))?;

        // Phase 1: fetch and chunk.
        let html_chunker = HtmlSectionChunker::new();
        let text_chunker = FixedSizeChunker::new(config.chunk_size);

        let mut chunks: Vec<Chunk> = Vec::new();
        for source in sources {
            let body = fetcher.fetch(source).await?;
            let chunker: &dyn Chunker = if source.url.ends_with(".html") {
                &html_chunker
            } else {
                &text_chunker
            };
            let mut produced = chunker.chunk(source, &body);
            info!(title = %source.title, chunk_count = produced.len(), "loaded source");
            chunks.append(&mut produced);
        }

        if chunks.is_empty() {
            info!("corpus produced zero chunks, skipping embedding and indexing");
            return Ok(DocumentStore { config, embedder, reranker, chunks, index: None });
        }

        // Phase 2: embed, batched, order-preserving.
        let embeddings = embed_corpus(&embedder, &chunks, &config).await?;

        // Phase 3: index.
        let index = VectorIndex::build(&embeddings, &config.index)?;
        info!(chunks = chunks.len(), "document store ready");

        Ok(DocumentStore { config, embedder, reranker, chunks, index: Some(index) })
    }
}

/// Embed the full chunk list in arena order.
///
/// The corpus is sliced into `embed_batch_size` batches; up to
/// `embed_concurrency` batches are in flight at once through an
/// order-preserving buffered stream, so the concatenated output is always
/// in submission order, which is the property the index's positional
/// item ids depend on.
async fn embed_corpus(
    embedder: &Arc<dyn EmbeddingProvider>,
    chunks: &[Chunk],
    config: &RetrievalConfig,
) -> Result<Vec<Embedding>> {
    let batches: Vec<Vec<String>> = chunks
        .chunks(config.embed_batch_size)
        .map(|batch| batch.iter().map(|c| c.text.clone()).collect())
        .collect();
    let total = batches.len();

    let per_batch: Vec<Vec<Embedding>> = stream::iter(batches.into_iter().enumerate())
        .map(|(number, batch)| {
            let embedder = Arc::clone(embedder);
            async move {
                debug!(batch = number + 1, total, size = batch.len(), "embedding batch");
                embedder.embed(&batch, InputType::Document).await
            }
        })
        .buffered(config.embed_concurrency)
        .try_collect()
        .await?;

    let embeddings: Vec<Embedding> = per_batch.into_iter().flatten().collect();
    if embeddings.len() != chunks.len() {
        return Err(RagError::EmbeddingService {
            message: format!(
                "expected {} embeddings, got {}",
                chunks.len(),
                embeddings.len()
            ),
        });
    }
    Ok(embeddings)
}
