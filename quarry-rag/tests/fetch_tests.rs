//! HTTP-boundary tests for the default source fetcher.

use std::sync::Arc;

use async_trait::async_trait;
use httpmock::prelude::*;

use quarry_rag::{
    DocumentStore, Embedding, EmbeddingProvider, HttpFetcher, InputType, RagError, RankedItem,
    Reranker, RetrievalConfig, Source, SourceFetcher,
};

#[tokio::test]
async fn fetch_returns_the_body_on_success() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/readme.md");
            then.status(200).body("hello corpus");
        })
        .await;

    let fetcher = HttpFetcher::new();
    let body = fetcher.fetch(&Source::new("README", server.url("/readme.md"))).await.unwrap();

    assert_eq!(body, "hello corpus");
    mock.assert_async().await;
}

#[tokio::test]
async fn non_success_status_becomes_fetch_failure() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/gone.md");
            then.status(404);
        })
        .await;

    let fetcher = HttpFetcher::new();
    let err = fetcher.fetch(&Source::new("Gone", server.url("/gone.md"))).await.unwrap_err();

    match err {
        RagError::FetchFailure { url, status } => {
            assert_eq!(status, 404);
            assert!(url.ends_with("/gone.md"));
        }
        other => panic!("expected FetchFailure, got {other:?}"),
    }
}

/// Adapters that must never run when construction fails during fetch.
struct UnreachableEmbedder;

#[async_trait]
impl EmbeddingProvider for UnreachableEmbedder {
    async fn embed(
        &self,
        _texts: &[String],
        _input_type: InputType,
    ) -> quarry_rag::Result<Vec<Embedding>> {
        panic!("embedder called although fetching already failed");
    }
}

struct UnreachableReranker;

#[async_trait]
impl Reranker for UnreachableReranker {
    async fn rerank(
        &self,
        _query: &str,
        _documents: &[String],
        _top_n: usize,
    ) -> quarry_rag::Result<Vec<RankedItem>> {
        panic!("reranker called although fetching already failed");
    }
}

#[tokio::test]
async fn fetch_failure_propagates_out_of_store_construction() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/missing.txt");
            then.status(404);
        })
        .await;

    let result = DocumentStore::builder()
        .config(RetrievalConfig::default())
        .fetcher(Arc::new(HttpFetcher::new()))
        .embedder(Arc::new(UnreachableEmbedder))
        .reranker(Arc::new(UnreachableReranker))
        .build(&[Source::new("Missing", server.url("/missing.txt"))])
        .await;

    match result {
        Err(RagError::FetchFailure { status, .. }) => assert_eq!(status, 404),
        other => panic!("expected FetchFailure, got {:?}", other.map(|_| "store")),
    }
}
