//! The Cohere API client.
//!
//! A thin `reqwest` wrapper over the endpoints the retrieval pipeline
//! needs: `/v1/embed`, `/v1/rerank`, and `/v1/chat` in both
//! query-generation and streaming grounded-response modes.

use async_stream::try_stream;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::chat::{parse_event, ChatDocument, ChatEventStream};
use crate::error::{CohereError, Result};

/// The default Cohere API base URL.
const DEFAULT_BASE_URL: &str = "https://api.cohere.com";

/// The default embedding model.
pub const DEFAULT_EMBED_MODEL: &str = "embed-english-v3.0";

/// The default rerank model.
pub const DEFAULT_RERANK_MODEL: &str = "rerank-english-v2.0";

/// The embedding role of a batch of texts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbedInputType {
    /// Corpus text being indexed.
    SearchDocument,
    /// A query being matched against indexed text.
    SearchQuery,
}

/// One reranked document reference returned by `/v1/rerank`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RerankResult {
    /// Position of the document in the request's document list.
    pub index: usize,
    /// Relevance of the document to the query, higher is better.
    pub relevance_score: f32,
}

/// A Cohere API client.
///
/// Holds a single `reqwest::Client`; cheap to clone. The base URL is
/// overridable so the test suite can point the client at a local mock
/// server.
///
/// # Example
///
/// ```rust,ignore
/// use quarry_cohere::{Cohere, EmbedInputType, DEFAULT_EMBED_MODEL};
///
/// let client = Cohere::from_env()?;
/// let vectors = client
///     .embed(&texts, DEFAULT_EMBED_MODEL, EmbedInputType::SearchDocument)
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct Cohere {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl Cohere {
    /// Create a new client with the given API key.
    ///
    /// # Errors
    ///
    /// Returns [`CohereError::MissingApiKey`] if the key is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(CohereError::MissingApiKey);
        }
        Ok(Self { http: reqwest::Client::new(), api_key, base_url: DEFAULT_BASE_URL.to_string() })
    }

    /// Create a new client using the `CO_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("CO_API_KEY").map_err(|_| CohereError::MissingApiKey)?;
        Self::new(api_key)
    }

    /// Override the API base URL (primarily for tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/v1/{path}", self.base_url.trim_end_matches('/'))
    }

    async fn post_json<Req: Serialize, Resp: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &Req,
    ) -> Result<Resp> {
        let response = self
            .http
            .post(self.endpoint(path))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(endpoint = path, error = %e, "request failed");
                CohereError::Http { endpoint: path.to_string(), source: e }
            })?;
        let response = check_status(response, path).await?;
        response.json().await.map_err(|e| {
            error!(endpoint = path, error = %e, "failed to parse response");
            CohereError::Decode { message: format!("{e}") }
        })
    }

    /// Embed `texts` with `model` in the given role.
    ///
    /// Returns one vector per input text, in input order. The caller is
    /// responsible for keeping batches within the service's per-call item
    /// limit.
    pub async fn embed(
        &self,
        texts: &[String],
        model: &str,
        input_type: EmbedInputType,
    ) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        debug!(batch_size = texts.len(), model, ?input_type, "embedding texts");

        let request = EmbedRequest { texts, model, input_type };
        let response: EmbedResponse = self.post_json("embed", &request).await?;

        if response.embeddings.len() != texts.len() {
            return Err(CohereError::Decode {
                message: format!(
                    "embed returned {} vectors for {} texts",
                    response.embeddings.len(),
                    texts.len()
                ),
            });
        }
        Ok(response.embeddings)
    }

    /// Rerank `documents` against `query`, keeping the `top_n` best.
    ///
    /// Results come back in descending relevance order; `index` fields
    /// reference positions in `documents`.
    pub async fn rerank(
        &self,
        query: &str,
        documents: &[String],
        top_n: usize,
        model: &str,
    ) -> Result<Vec<RerankResult>> {
        debug!(candidates = documents.len(), top_n, model, "reranking documents");

        let request = RerankRequest { query, documents, top_n, model };
        let response: RerankResponse = self.post_json("rerank", &request).await?;
        Ok(response.results)
    }

    /// Ask the chat service which search queries, if any, a user message
    /// implies.
    ///
    /// Returns an empty list when the message needs no grounding.
    pub async fn generate_queries(&self, message: &str) -> Result<Vec<String>> {
        let request = QueryGenerationRequest { message, search_queries_only: true };
        let response: QueryGenerationResponse = self.post_json("chat", &request).await?;

        let queries: Vec<String> =
            response.search_queries.into_iter().map(|q| q.text).collect();
        debug!(count = queries.len(), "generated search queries");
        Ok(queries)
    }

    /// Start a streaming chat turn, grounded on `documents` when any are
    /// supplied.
    ///
    /// The returned stream yields [`StreamEvent`](crate::StreamEvent)s
    /// parsed from the service's newline-delimited JSON body; it is
    /// finite and consumed exactly once.
    pub async fn chat_stream(
        &self,
        message: &str,
        documents: &[ChatDocument],
        conversation_id: &str,
    ) -> Result<ChatEventStream> {
        debug!(documents = documents.len(), conversation_id, "starting chat stream");

        let request = ChatStreamRequest {
            message,
            documents: if documents.is_empty() { None } else { Some(documents) },
            conversation_id,
            stream: true,
        };
        let response = self
            .http
            .post(self.endpoint("chat"))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(endpoint = "chat", error = %e, "request failed");
                CohereError::Http { endpoint: "chat".to_string(), source: e }
            })?;
        let response = check_status(response, "chat").await?;

        let mut body = response.bytes_stream();
        let stream = try_stream! {
            let mut buffer: Vec<u8> = Vec::new();
            while let Some(part) = body.next().await {
                let part = part
                    .map_err(|e| CohereError::Http { endpoint: "chat".to_string(), source: e })?;
                buffer.extend_from_slice(&part);
                while let Some(newline) = buffer.iter().position(|b| *b == b'\n') {
                    let line: Vec<u8> = buffer.drain(..=newline).collect();
                    if let Some(event) = parse_event(&line)? {
                        yield event;
                    }
                }
            }
            // Trailing line without a newline terminator.
            if let Some(event) = parse_event(&buffer)? {
                yield event;
            }
        };
        Ok(Box::pin(stream))
    }
}

/// Map a non-success response to [`CohereError::Api`], extracting the
/// service's error message when the body carries one.
async fn check_status(response: reqwest::Response, endpoint: &str) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message =
        serde_json::from_str::<ApiErrorBody>(&body).map(|e| e.message).unwrap_or(body);
    error!(endpoint, %status, "API error");
    Err(CohereError::Api { status: status.as_u16(), message })
}

// ── Wire types ─────────────────────────────────────────────────────

#[derive(Serialize)]
struct EmbedRequest<'a> {
    texts: &'a [String],
    model: &'a str,
    input_type: EmbedInputType,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Serialize)]
struct RerankRequest<'a> {
    query: &'a str,
    documents: &'a [String],
    top_n: usize,
    model: &'a str,
}

#[derive(Deserialize)]
struct RerankResponse {
    results: Vec<RerankResult>,
}

#[derive(Serialize)]
struct QueryGenerationRequest<'a> {
    message: &'a str,
    search_queries_only: bool,
}

#[derive(Deserialize)]
struct QueryGenerationResponse {
    #[serde(default)]
    search_queries: Vec<SearchQuery>,
}

#[derive(Deserialize)]
struct SearchQuery {
    text: String,
}

#[derive(Serialize)]
struct ChatStreamRequest<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    documents: Option<&'a [ChatDocument]>,
    conversation_id: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}
