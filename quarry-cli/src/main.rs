//! Quarry: chat over a fixed document corpus with citations.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use quarry_cli::{console, Chatbot};
use quarry_cohere::Cohere;
use quarry_rag::{
    CohereEmbedder, CohereReranker, DocumentStore, HttpFetcher, RetrievalConfig, Source,
};

#[derive(Parser)]
#[command(name = "quarry", about = "Chat over a fixed document corpus with citations")]
struct Args {
    /// Path to a JSON file containing `[{"title": "...", "url": "..."}]`.
    #[arg(long)]
    sources: PathBuf,

    /// Character length of chunks cut from plain-text sources.
    #[arg(long, default_value_t = 1000)]
    chunk_size: usize,

    /// Number of ANN candidates pulled per query.
    #[arg(long, default_value_t = 10)]
    retrieve_top_k: usize,

    /// Number of results kept after reranking.
    #[arg(long, default_value_t = 3)]
    rerank_top_k: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let args = Args::parse();

    let sources: Vec<Source> = {
        let raw = std::fs::read_to_string(&args.sources)
            .with_context(|| format!("failed to read {}", args.sources.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse source list {}", args.sources.display()))?
    };

    let client = Cohere::from_env().context("CO_API_KEY must be set")?;

    let config = RetrievalConfig::builder()
        .chunk_size(args.chunk_size)
        .retrieve_top_k(args.retrieve_top_k)
        .rerank_top_k(args.rerank_top_k)
        .build()?;

    println!("Loading, embedding, and indexing {} sources...", sources.len());
    let store = DocumentStore::builder()
        .config(config)
        .fetcher(Arc::new(HttpFetcher::new()))
        .embedder(Arc::new(CohereEmbedder::new(client.clone())))
        .reranker(Arc::new(CohereReranker::new(client.clone())))
        .build(&sources)
        .await?;
    println!("Indexed {} chunks. Type 'quit' to end the chat.\n", store.chunk_count());

    let chatbot = Chatbot::new(Arc::new(store), client);
    console::run_console(&chatbot).await
}
