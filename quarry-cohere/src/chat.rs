//! Chat wire types and the streaming event model.
//!
//! A grounded chat call yields a finite sequence of tagged events parsed
//! from the service's newline-delimited JSON stream. The sequence is
//! consumed exactly once per conversation turn and is not restartable.

use std::pin::Pin;

use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::error::{CohereError, Result};

/// A grounding document forwarded with a chat request.
///
/// Matches the `{title, text, url}` projection the retrieval engine
/// returns for a chunk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatDocument {
    /// Title of the originating source.
    pub title: String,
    /// The supporting text the response may cite.
    pub text: String,
    /// URL of the originating source.
    pub url: String,
}

/// A span of the generated response attributed to grounding documents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Citation {
    /// Start offset of the cited span in the full response text.
    pub start: usize,
    /// End offset of the cited span in the full response text.
    pub end: usize,
    /// The cited span itself.
    pub text: String,
    /// Ids of the grounding documents supporting the span.
    #[serde(default)]
    pub document_ids: Vec<String>,
}

/// One event of a streaming chat response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// An incremental piece of generated text.
    TextDelta(String),
    /// Citations attributing generated spans to grounding documents.
    Citations(Vec<Citation>),
    /// The stream finished.
    Done {
        /// Why generation stopped, when the service reports it.
        finish_reason: Option<String>,
    },
}

/// A boxed stream of chat events, consumed exactly once.
pub type ChatEventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

/// The wire shape of one stream line, before mapping to [`StreamEvent`].
#[derive(Debug, Deserialize)]
struct RawStreamEvent {
    event_type: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    citations: Option<Vec<Citation>>,
    #[serde(default)]
    finish_reason: Option<String>,
}

/// Parse one newline-delimited stream line.
///
/// Blank lines and event types this client does not model (stream-start,
/// search-results, ...) yield `None`. Malformed JSON is an error: a
/// half-decoded stream must not be silently truncated.
pub(crate) fn parse_event(line: &[u8]) -> Result<Option<StreamEvent>> {
    let line = std::str::from_utf8(line)
        .map_err(|e| CohereError::Decode { message: format!("stream line is not UTF-8: {e}") })?
        .trim();
    if line.is_empty() {
        return Ok(None);
    }

    let raw: RawStreamEvent = serde_json::from_str(line)
        .map_err(|e| CohereError::Decode { message: format!("bad stream event: {e}") })?;

    let event = match raw.event_type.as_str() {
        "text-generation" => Some(StreamEvent::TextDelta(raw.text.unwrap_or_default())),
        "citation-generation" => Some(StreamEvent::Citations(raw.citations.unwrap_or_default())),
        "stream-end" => Some(StreamEvent::Done { finish_reason: raw.finish_reason }),
        _ => None,
    };
    Ok(event)
}
