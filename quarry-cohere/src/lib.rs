//! # quarry-cohere
//!
//! A Cohere API client covering the surface the Quarry retrieval pipeline
//! needs:
//!
//! - [`Cohere::embed`]: asymmetric text embeddings
//!   (`search_document` / `search_query`)
//! - [`Cohere::rerank`]: second-stage relevance scoring
//! - [`Cohere::generate_queries`]: chat in query-generation mode
//! - [`Cohere::chat_stream`]: streaming grounded responses as tagged
//!   [`StreamEvent`]s with citations
//!
//! The client is plain `reqwest` + `serde`; no connection state beyond
//! the HTTP connection pool. Set `CO_API_KEY` and use
//! [`Cohere::from_env`], or pass a key to [`Cohere::new`].

pub mod chat;
pub mod client;
pub mod error;

pub use chat::{ChatDocument, ChatEventStream, Citation, StreamEvent};
pub use client::{
    Cohere, EmbedInputType, RerankResult, DEFAULT_EMBED_MODEL, DEFAULT_RERANK_MODEL,
};
pub use error::{CohereError, Result};
