pub mod fixtures;

use std::sync::atomic::{AtomicUsize, Ordering};
use xsel::{DocumentCache, Source};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// A source that counts how often its body is read, i.e. how often it is parsed.
pub struct CountingSource {
    body: Vec<u8>,
    cache: Option<DocumentCache>,
    reads: AtomicUsize,
}

impl CountingSource {
    pub fn cached(body: &str) -> Self {
        Self {
            body: body.as_bytes().to_vec(),
            cache: Some(DocumentCache::new()),
            reads: AtomicUsize::new(0),
        }
    }

    pub fn uncached(body: &str) -> Self {
        Self {
            cache: None,
            ..Self::cached(body)
        }
    }

    pub fn parse_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl Source for CountingSource {
    fn body(&self) -> &[u8] {
        self.reads.fetch_add(1, Ordering::SeqCst);
        &self.body
    }

    fn url(&self) -> Option<&str> {
        Some("http://example.com/counting")
    }

    fn document_cache(&self) -> Option<&DocumentCache> {
        self.cache.as_ref()
    }
}
