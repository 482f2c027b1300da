//! Source content download.

use async_trait::async_trait;
use tracing::{debug, error};

use crate::document::Source;
use crate::error::{RagError, Result};

/// Downloads the raw body of a source.
///
/// Injected into the [`DocumentStore`](crate::DocumentStore) builder so
/// tests can substitute a double without a network.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Fetch the source's content as text.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::FetchFailure`] on a non-success HTTP status and
    /// [`RagError::Fetch`] on transport failures. A fetch error must never
    /// be swallowed into an empty chunk list: a silently impoverished index
    /// is worse than a loud failure.
    async fn fetch(&self, source: &Source) -> Result<String>;
}

/// Plain HTTP(S) GET fetcher. No authentication, no retries, no caching.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher with a default `reqwest` client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fetcher around an existing client (custom timeouts, proxy, ...).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SourceFetcher for HttpFetcher {
    async fn fetch(&self, source: &Source) -> Result<String> {
        debug!(url = %source.url, "fetching source");

        let response = self
            .client
            .get(&source.url)
            .send()
            .await
            .map_err(|e| RagError::Fetch { url: source.url.clone(), source: e })?;

        let status = response.status();
        if !status.is_success() {
            error!(url = %source.url, %status, "source fetch returned non-success status");
            return Err(RagError::FetchFailure {
                url: source.url.clone(),
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| RagError::Fetch { url: source.url.clone(), source: e })
    }
}
