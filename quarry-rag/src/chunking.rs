//! Document chunking strategies.
//!
//! This module provides the [`Chunker`] trait and two implementations:
//!
//! - [`FixedSizeChunker`]: splits plain text into contiguous slices by
//!   character count
//! - [`HtmlSectionChunker`]: splits HTML at heading boundaries, keeping
//!   each section as one chunk

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::document::{Chunk, Source};

/// A strategy for splitting a source's raw body into chunks.
///
/// Implementations are pure text splitters: downloading the body is the
/// fetcher's job (see [`SourceFetcher`](crate::SourceFetcher)). Every
/// produced chunk inherits the source's `title` and `url` verbatim.
pub trait Chunker: Send + Sync {
    /// Split `body` into chunks carrying `source`'s provenance.
    ///
    /// Returns an empty `Vec` if the body contains no usable text.
    fn chunk(&self, source: &Source, body: &str) -> Vec<Chunk>;
}

/// Splits text into contiguous fixed-size slices by character count.
///
/// No overlap, no attempt to respect word or sentence boundaries; the
/// final slice may be shorter than the configured length. Slicing counts
/// `char`s, so multi-byte code points are never cut in half.
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    chunk_size: usize,
}

impl FixedSizeChunker {
    /// Create a chunker producing slices of at most `chunk_size` characters.
    pub fn new(chunk_size: usize) -> Self {
        Self { chunk_size }
    }
}

impl Chunker for FixedSizeChunker {
    fn chunk(&self, source: &Source, body: &str) -> Vec<Chunk> {
        if body.is_empty() || self.chunk_size == 0 {
            return Vec::new();
        }

        let mut chunks = Vec::new();
        let mut current = String::with_capacity(self.chunk_size);
        let mut count = 0;

        for ch in body.chars() {
            current.push(ch);
            count += 1;
            if count == self.chunk_size {
                chunks.push(make_chunk(source, std::mem::take(&mut current)));
                count = 0;
            }
        }
        if !current.is_empty() {
            chunks.push(make_chunk(source, current));
        }

        chunks
    }
}

/// Block-level elements walked in document order. Container tags (`ul`,
/// `table`, ...) contribute their full text at once, so elements nested
/// inside one are skipped to avoid duplicating text.
static SECTION_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("h1, h2, h3, h4, h5, h6, p, ul, ol, pre, table, blockquote, dl")
        .expect("unreachable error: failed to parse static section selector")
});

const HEADING_TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];
const CONTAINER_TAGS: [&str; 6] = ["ul", "ol", "pre", "table", "blockquote", "dl"];

/// Splits HTML at heading boundaries using a title heuristic.
///
/// Block elements are walked in document order. Every heading (`h1` to `h6`)
/// starts a new chunk; body elements accumulate into the current chunk
/// until the next heading or end of document. A document with no headings
/// yields exactly one chunk containing all of its text.
///
/// Sections have no maximum size: a long run of body text under a single
/// heading becomes a single large chunk.
#[derive(Debug, Clone, Default)]
pub struct HtmlSectionChunker;

impl HtmlSectionChunker {
    /// Create a new HTML section chunker.
    pub fn new() -> Self {
        Self
    }
}

/// Collapse an element's text into single-space-separated form.
fn element_text(element: ElementRef<'_>) -> String {
    let raw = element.text().collect::<Vec<_>>().join(" ");
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl Chunker for HtmlSectionChunker {
    fn chunk(&self, source: &Source, body: &str) -> Vec<Chunk> {
        let document = Html::parse_document(body);

        let mut sections: Vec<String> = Vec::new();
        let mut current = String::new();

        for element in document.select(&SECTION_SELECTOR) {
            let nested_in_container = element
                .ancestors()
                .filter_map(ElementRef::wrap)
                .any(|a| CONTAINER_TAGS.contains(&a.value().name()));
            if nested_in_container {
                continue;
            }

            let text = element_text(element);
            if text.is_empty() {
                continue;
            }

            if HEADING_TAGS.contains(&element.value().name()) {
                if !current.is_empty() {
                    sections.push(std::mem::take(&mut current));
                }
                current = text;
            } else {
                if !current.is_empty() {
                    current.push('\n');
                }
                current.push_str(&text);
            }
        }
        if !current.is_empty() {
            sections.push(current);
        }

        sections.into_iter().map(|text| make_chunk(source, text)).collect()
    }
}

fn make_chunk(source: &Source, text: String) -> Chunk {
    Chunk { title: source.title.clone(), text, url: source.url.clone() }
}
