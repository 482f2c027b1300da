//! # quarry-cli
//!
//! Conversation orchestration and the terminal chat loop for Quarry.
//!
//! [`Chatbot`] turns each user message into zero or more search queries,
//! grounds the response on chunks retrieved from a
//! [`DocumentStore`](quarry_rag::DocumentStore), and streams the answer
//! back with citations. [`console::run_console`] wraps it in a line-input
//! loop.

pub mod chatbot;
pub mod console;

pub use chatbot::{Chatbot, ChatbotError};
