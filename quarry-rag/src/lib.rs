//! # quarry-rag
//!
//! The Quarry document retrieval engine: ingest a fixed set of sources,
//! split them into chunks, embed and index the chunks for approximate
//! nearest-neighbor search, and answer queries with a two-stage
//! retrieve-then-rerank protocol.
//!
//! ## Architecture
//!
//! - [`Chunker`] strategies split raw source bodies into [`Chunk`]s
//!   carrying provenance
//! - [`SourceFetcher`] downloads source content ([`HttpFetcher`] for
//!   plain HTTP GET)
//! - [`EmbeddingProvider`] and [`Reranker`] are the external-service
//!   adapter boundaries, injected at construction
//! - [`VectorIndex`] is an inner-product HNSW index over the embeddings
//! - [`DocumentStore`] composes all of the above: built once over the
//!   corpus, read-only afterwards
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use quarry_rag::{DocumentStore, HttpFetcher, RetrievalConfig, Source};
//!
//! let store = DocumentStore::builder()
//!     .config(RetrievalConfig::default())
//!     .fetcher(Arc::new(HttpFetcher::new()))
//!     .embedder(Arc::new(embedder))
//!     .reranker(Arc::new(reranker))
//!     .build(&[Source::new("README", "https://example.com/readme.md")])
//!     .await?;
//!
//! let results = store.retrieve("how do I install it?").await?;
//! ```
//!
//! With the `cohere` feature, [`CohereEmbedder`] and [`CohereReranker`]
//! provide ready-made adapters over the `quarry-cohere` client.

pub mod chunking;
#[cfg(feature = "cohere")]
pub mod cohere;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod fetch;
pub mod index;
pub mod rerank;
pub mod store;

pub use chunking::{Chunker, FixedSizeChunker, HtmlSectionChunker};
#[cfg(feature = "cohere")]
pub use cohere::{CohereEmbedder, CohereReranker};
pub use config::{IndexParams, RetrievalConfig, RetrievalConfigBuilder};
pub use document::{Chunk, ChunkId, RetrievalResult, Source};
pub use embedding::{Embedding, EmbeddingProvider, InputType};
pub use error::{RagError, Result};
pub use fetch::{HttpFetcher, SourceFetcher};
pub use index::VectorIndex;
pub use rerank::{RankedItem, Reranker};
pub use store::{DocumentStore, DocumentStoreBuilder};
