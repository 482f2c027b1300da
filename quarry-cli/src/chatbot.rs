//! The conversation orchestrator.
//!
//! Turns one user message into zero or more search queries, grounds the
//! response on retrieved chunks when there are any, and streams the
//! answer back as tagged events.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use quarry_cohere::{ChatDocument, ChatEventStream, Cohere, CohereError};
use quarry_rag::{DocumentStore, RagError};

/// Errors surfaced by a conversation turn.
///
/// A failed turn leaves the conversation id untouched; the next turn
/// proceeds independently.
#[derive(Debug, Error)]
pub enum ChatbotError {
    /// The retrieval engine failed.
    #[error(transparent)]
    Retrieval(#[from] RagError),
    /// The chat service failed.
    #[error(transparent)]
    Cohere(#[from] CohereError),
}

/// A retrieval-grounded chatbot over one conversation.
///
/// The only state machine here is the query-or-not branch: either query
/// generation returns search queries and the turn goes through
/// [`DocumentStore::retrieve`], or it returns none and the response is
/// produced without grounding.
pub struct Chatbot {
    store: Arc<DocumentStore>,
    client: Cohere,
    conversation_id: String,
}

impl Chatbot {
    /// Create a chatbot with a fresh conversation id.
    pub fn new(store: Arc<DocumentStore>, client: Cohere) -> Self {
        Self { store, client, conversation_id: Uuid::new_v4().to_string() }
    }

    /// The opaque conversation handle passed to the chat service.
    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    /// Run one conversation turn, returning the response event stream.
    ///
    /// Results from multiple generated queries are concatenated in query
    /// order; a chunk matched by two queries appears twice.
    pub async fn respond(&self, message: &str) -> Result<ChatEventStream, ChatbotError> {
        let queries = self.client.generate_queries(message).await?;

        if queries.is_empty() {
            info!("no search queries generated, responding without grounding");
            let stream = self.client.chat_stream(message, &[], &self.conversation_id).await?;
            return Ok(stream);
        }

        info!(queries = queries.len(), "retrieving grounding context");
        let mut documents: Vec<ChatDocument> = Vec::new();
        for query in &queries {
            let results = self.store.retrieve(query).await?;
            documents.extend(
                results
                    .into_iter()
                    .map(|r| ChatDocument { title: r.title, text: r.text, url: r.url }),
            );
        }
        info!(documents = documents.len(), "grounding context assembled");

        let stream = self.client.chat_stream(message, &documents, &self.conversation_id).await?;
        Ok(stream)
    }
}
