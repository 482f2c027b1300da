//! Error types for the `quarry-cohere` crate.

use thiserror::Error;

/// Errors that can occur while talking to the Cohere API.
#[derive(Debug, Error)]
pub enum CohereError {
    /// The client was constructed without an API key.
    #[error("API key must not be empty")]
    MissingApiKey,

    /// A transport-level failure performing a request.
    #[error("request to '{endpoint}' failed")]
    Http {
        /// The API endpoint the request was sent to.
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The API returned a non-success status.
    #[error("Cohere API returned {status}: {message}")]
    Api {
        /// The HTTP status code returned.
        status: u16,
        /// The error message extracted from the response body.
        message: String,
    },

    /// A response body could not be decoded.
    #[error("failed to decode Cohere response: {message}")]
    Decode {
        /// A description of the failure.
        message: String,
    },
}

/// A convenience result type for Cohere operations.
pub type Result<T> = std::result::Result<T, CohereError>;
