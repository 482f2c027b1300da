//! Integration tests for document store construction and the
//! retrieve-then-rerank protocol, using in-process adapter doubles.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use quarry_rag::{
    ChunkId, DocumentStore, Embedding, EmbeddingProvider, InputType, RagError, RankedItem,
    Reranker, RetrievalConfig, Source, SourceFetcher,
};

/// Serves canned bodies keyed by URL; unknown URLs report HTTP 404.
struct StaticFetcher {
    pages: HashMap<String, String>,
}

impl StaticFetcher {
    fn new(pages: &[(&str, &str)]) -> Self {
        Self {
            pages: pages.iter().map(|(url, body)| (url.to_string(), body.to_string())).collect(),
        }
    }
}

#[async_trait]
impl SourceFetcher for StaticFetcher {
    async fn fetch(&self, source: &Source) -> quarry_rag::Result<String> {
        self.pages.get(&source.url).cloned().ok_or_else(|| RagError::FetchFailure {
            url: source.url.clone(),
            status: 404,
        })
    }
}

/// Deterministic hash-based normalized embeddings; records every batch.
struct HashEmbedder {
    dimensions: usize,
    calls: AtomicUsize,
    batches: Mutex<Vec<Vec<String>>>,
}

impl HashEmbedder {
    fn new(dimensions: usize) -> Self {
        Self { dimensions, calls: AtomicUsize::new(0), batches: Mutex::new(Vec::new()) }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn batch_sizes(&self) -> Vec<usize> {
        self.batches.lock().unwrap().iter().map(|b| b.len()).collect()
    }

    fn texts_in_received_order(&self) -> Vec<String> {
        self.batches.lock().unwrap().iter().flatten().cloned().collect()
    }

    fn embed_one(&self, text: &str) -> Embedding {
        let hash = text.bytes().fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
        let mut emb = vec![0.0f32; self.dimensions];
        for (i, v) in emb.iter_mut().enumerate() {
            *v = ((hash.wrapping_add(i as u64)) as f32).sin();
        }
        let norm: f32 = emb.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            emb.iter_mut().for_each(|x| *x /= norm);
        }
        emb
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(
        &self,
        texts: &[String],
        _input_type: InputType,
    ) -> quarry_rag::Result<Vec<Embedding>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.batches.lock().unwrap().push(texts.to_vec());
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

/// Keeps ANN order: the first `top_n` candidates with descending scores.
struct PassthroughReranker {
    calls: AtomicUsize,
}

impl PassthroughReranker {
    fn new() -> Self {
        Self { calls: AtomicUsize::new(0) }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Reranker for PassthroughReranker {
    async fn rerank(
        &self,
        _query: &str,
        documents: &[String],
        top_n: usize,
    ) -> quarry_rag::Result<Vec<RankedItem>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok((0..top_n.min(documents.len()))
            .map(|index| RankedItem { index, relevance_score: 1.0 - index as f32 * 0.01 })
            .collect())
    }
}

/// Replays a scripted candidate ordering and records what it was given.
struct ScriptedReranker {
    order: Vec<usize>,
    received: Mutex<Vec<String>>,
}

impl ScriptedReranker {
    fn new(order: Vec<usize>) -> Self {
        Self { order, received: Mutex::new(Vec::new()) }
    }

    fn received(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl Reranker for ScriptedReranker {
    async fn rerank(
        &self,
        _query: &str,
        documents: &[String],
        top_n: usize,
    ) -> quarry_rag::Result<Vec<RankedItem>> {
        *self.received.lock().unwrap() = documents.to_vec();
        Ok(self
            .order
            .iter()
            .take(top_n)
            .enumerate()
            .map(|(rank, &index)| RankedItem { index, relevance_score: 1.0 - rank as f32 * 0.1 })
            .collect())
    }
}

fn config() -> RetrievalConfig {
    RetrievalConfig::default()
}

async fn build_store(
    sources: &[Source],
    fetcher: StaticFetcher,
    config: RetrievalConfig,
    embedder: Arc<HashEmbedder>,
    reranker: Arc<dyn Reranker>,
) -> DocumentStore {
    DocumentStore::builder()
        .config(config)
        .fetcher(Arc::new(fetcher))
        .embedder(embedder)
        .reranker(reranker)
        .build(sources)
        .await
        .unwrap()
}

#[tokio::test]
async fn chunks_accumulate_in_source_then_chunk_order() {
    let sources =
        [Source::new("One", "https://docs.test/one.md"), Source::new("Two", "https://docs.test/two.md")];
    let fetcher = StaticFetcher::new(&[
        ("https://docs.test/one.md", "aaaaabbbbb"),
        ("https://docs.test/two.md", "cccccddddd"),
    ]);
    let config = RetrievalConfig::builder().chunk_size(5).build().unwrap();

    let store = build_store(
        &sources,
        fetcher,
        config,
        Arc::new(HashEmbedder::new(16)),
        Arc::new(PassthroughReranker::new()),
    )
    .await;

    assert_eq!(store.chunk_count(), 4);
    let texts: Vec<&str> =
        (0..4).map(|i| store.chunk(ChunkId(i)).unwrap().text.as_str()).collect();
    assert_eq!(texts, vec!["aaaaa", "bbbbb", "ccccc", "ddddd"]);
    assert_eq!(store.chunk(ChunkId(0)).unwrap().title, "One");
    assert_eq!(store.chunk(ChunkId(3)).unwrap().title, "Two");
}

#[tokio::test]
async fn ninety_five_chunks_embed_as_two_batches_in_arena_order() {
    // 95 distinct 100-character segments; chunk_size 100 cuts one chunk
    // per segment.
    let body: String = (0..95).map(|i| format!("{i:03}{}", ".".repeat(97))).collect();
    let sources = [Source::new("Long", "https://docs.test/long.txt")];
    let fetcher = StaticFetcher::new(&[("https://docs.test/long.txt", body.as_str())]);
    let config = RetrievalConfig::builder()
        .chunk_size(100)
        .embed_batch_size(90)
        .embed_concurrency(4)
        .build()
        .unwrap();

    let embedder = Arc::new(HashEmbedder::new(16));
    let store = build_store(
        &sources,
        fetcher,
        config,
        Arc::clone(&embedder),
        Arc::new(PassthroughReranker::new()),
    )
    .await;

    assert_eq!(store.chunk_count(), 95);
    assert_eq!(embedder.batch_sizes(), vec![90, 5]);

    let arena_texts: Vec<String> =
        (0..95).map(|i| store.chunk(ChunkId(i)).unwrap().text.clone()).collect();
    assert_eq!(embedder.texts_in_received_order(), arena_texts);
}

#[tokio::test]
async fn batched_and_single_call_embedding_see_the_same_corpus_order() {
    let body: String = (0..12).map(|i| format!("{i:02}{}", "-".repeat(8))).collect();
    let sources = [Source::new("Doc", "https://docs.test/doc.txt")];

    let run = |batch_size: usize| {
        let body = body.clone();
        let sources = sources.clone();
        async move {
            let fetcher = StaticFetcher::new(&[("https://docs.test/doc.txt", body.as_str())]);
            let config = RetrievalConfig::builder()
                .chunk_size(10)
                .embed_batch_size(batch_size)
                .build()
                .unwrap();
            let embedder = Arc::new(HashEmbedder::new(16));
            build_store(
                &sources,
                fetcher,
                config,
                Arc::clone(&embedder),
                Arc::new(PassthroughReranker::new()),
            )
            .await;
            embedder.texts_in_received_order()
        }
    };

    let in_one_call = run(100).await;
    let in_many_calls = run(3).await;
    assert_eq!(in_one_call, in_many_calls);
    assert_eq!(in_one_call.len(), 12);
}

#[tokio::test]
async fn retrieve_ranks_a_chunks_own_text_first() {
    let body: String = (0..12).map(|i| format!("topic {i:02} notes")).collect::<Vec<_>>().join("");
    // "topic NN notes" is 14 characters, so chunk_size 14 realigns exactly.
    let sources = [Source::new("Notes", "https://docs.test/notes.txt")];
    let fetcher = StaticFetcher::new(&[("https://docs.test/notes.txt", body.as_str())]);
    let config = RetrievalConfig::builder().chunk_size(14).build().unwrap();

    let store = build_store(
        &sources,
        fetcher,
        config,
        Arc::new(HashEmbedder::new(32)),
        Arc::new(PassthroughReranker::new()),
    )
    .await;
    assert_eq!(store.chunk_count(), 12);

    for probe in [0usize, 5, 11] {
        let query = store.chunk(ChunkId(probe)).unwrap().text.clone();
        let results = store.retrieve(&query).await.unwrap();
        assert_eq!(results.first().map(|r| r.text.as_str()), Some(query.as_str()));
    }
}

#[tokio::test]
async fn retrieve_returns_at_most_rerank_top_k_results() {
    let sources = [Source::new("Tiny", "https://docs.test/tiny.txt")];
    let fetcher = StaticFetcher::new(&[("https://docs.test/tiny.txt", "aaaaabbbbb")]);
    let config =
        RetrievalConfig::builder().chunk_size(5).retrieve_top_k(10).rerank_top_k(3).build().unwrap();

    let store = build_store(
        &sources,
        fetcher,
        config,
        Arc::new(HashEmbedder::new(16)),
        Arc::new(PassthroughReranker::new()),
    )
    .await;

    // Corpus smaller than rerank_top_k: every chunk comes back, no more.
    let results = store.retrieve("anything").await.unwrap();
    assert_eq!(results.len(), 2);
}

#[tokio::test]
async fn empty_corpus_retrieves_nothing_and_calls_no_adapters() {
    let sources = [Source::new("Empty", "https://docs.test/empty.txt")];
    let fetcher = StaticFetcher::new(&[("https://docs.test/empty.txt", "")]);

    let embedder = Arc::new(HashEmbedder::new(16));
    let reranker = Arc::new(PassthroughReranker::new());
    let store = build_store(
        &sources,
        fetcher,
        config(),
        Arc::clone(&embedder),
        Arc::clone(&reranker) as Arc<dyn Reranker>,
    )
    .await;

    assert_eq!(store.chunk_count(), 0);
    let results = store.retrieve("anything").await.unwrap();
    assert!(results.is_empty());
    assert_eq!(embedder.calls(), 0);
    assert_eq!(reranker.calls(), 0);
}

#[tokio::test]
async fn rerank_order_is_authoritative_over_ann_order() {
    let sources = [Source::new("Three", "https://docs.test/three.txt")];
    let fetcher = StaticFetcher::new(&[("https://docs.test/three.txt", "aaaaabbbbbccccc")]);
    let config =
        RetrievalConfig::builder().chunk_size(5).retrieve_top_k(3).rerank_top_k(2).build().unwrap();

    let reranker = Arc::new(ScriptedReranker::new(vec![2, 0]));
    let store = build_store(
        &sources,
        fetcher,
        config,
        Arc::new(HashEmbedder::new(16)),
        Arc::clone(&reranker) as Arc<dyn Reranker>,
    )
    .await;

    let results = store.retrieve("query").await.unwrap();
    let candidates = reranker.received();
    assert_eq!(candidates.len(), 3);

    // The scripted response ordered candidate 2 before candidate 0; the
    // store must map that back through the candidate list verbatim.
    let returned: Vec<&str> = results.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(returned, vec![candidates[2].as_str(), candidates[0].as_str()]);
}

#[tokio::test]
async fn fetch_failure_aborts_construction() {
    let sources = [Source::new("Missing", "https://docs.test/missing.txt")];
    let fetcher = StaticFetcher::new(&[]);

    let result = DocumentStore::builder()
        .config(config())
        .fetcher(Arc::new(fetcher))
        .embedder(Arc::new(HashEmbedder::new(16)))
        .reranker(Arc::new(PassthroughReranker::new()))
        .build(&sources)
        .await;

    match result {
        Err(RagError::FetchFailure { url, status }) => {
            assert_eq!(url, "https://docs.test/missing.txt");
            assert_eq!(status, 404);
        }
        other => panic!("expected FetchFailure, got {:?}", other.map(|_| "store")),
    }
}

#[tokio::test]
async fn html_sources_chunk_by_section_and_text_sources_by_size() {
    let html = "<html><body>\
        <h1>Install</h1><p>Run the installer.</p>\
        <h1>Configure</h1><p>Edit the config file.</p>\
        </body></html>";
    let sources = [
        Source::new("Guide", "https://docs.test/guide.html"),
        Source::new("Plain", "https://docs.test/plain.txt"),
    ];
    let fetcher = StaticFetcher::new(&[
        ("https://docs.test/guide.html", html),
        ("https://docs.test/plain.txt", "xxxxxyyyyy"),
    ]);
    let config = RetrievalConfig::builder().chunk_size(5).build().unwrap();

    let store = build_store(
        &sources,
        fetcher,
        config,
        Arc::new(HashEmbedder::new(16)),
        Arc::new(PassthroughReranker::new()),
    )
    .await;

    // 2 HTML sections plus 2 fixed-size slices.
    assert_eq!(store.chunk_count(), 4);
    assert!(store.chunk(ChunkId(0)).unwrap().text.starts_with("Install"));
    assert!(store.chunk(ChunkId(1)).unwrap().text.starts_with("Configure"));
    assert_eq!(store.chunk(ChunkId(2)).unwrap().text, "xxxxx");
    assert_eq!(store.chunk(ChunkId(3)).unwrap().text, "yyyyy");
}

#[tokio::test]
async fn builder_requires_every_component() {
    let result = DocumentStore::builder()
        .config(config())
        .fetcher(Arc::new(StaticFetcher::new(&[])))
        .reranker(Arc::new(PassthroughReranker::new()))
        .build(&[])
        .await;

    match result {
        Err(RagError::Config(message)) => assert!(message.contains("embedder")),
        other => panic!("expected Config error, got {:?}", other.map(|_| "store")),
    }
}
