//! Error types for the `quarry-rag` crate.

use thiserror::Error;

/// Errors that can occur while building or querying a document store.
///
/// All variants cross the [`DocumentStore`](crate::DocumentStore) boundary
/// unmodified: the engine performs no retries and no partial-result
/// degradation. Caller-facing policy (abort the turn, answer without
/// grounding, ...) belongs to the orchestration layer.
#[derive(Debug, Error)]
pub enum RagError {
    /// Downloading a source returned a non-success HTTP status.
    #[error("failed to fetch '{url}': HTTP status {status}")]
    FetchFailure {
        /// The source URL that failed.
        url: String,
        /// The HTTP status code returned.
        status: u16,
    },

    /// A transport-level failure while downloading a source.
    #[error("failed to fetch '{url}'")]
    Fetch {
        /// The source URL that failed.
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The embedding service returned an error or a malformed response.
    #[error("embedding service error: {message}")]
    EmbeddingService {
        /// A description of the failure.
        message: String,
    },

    /// The rerank service returned an error or a malformed response.
    #[error("rerank service error: {message}")]
    RerankService {
        /// A description of the failure.
        message: String,
    },

    /// The vector index was asked to do something its configuration or
    /// contents cannot support (empty build, mismatched dimensions, ...).
    #[error("index configuration error: {message}")]
    IndexConfiguration {
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// A convenience result type for retrieval operations.
pub type Result<T> = std::result::Result<T, RagError>;
