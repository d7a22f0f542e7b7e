//! Inputs that selectors can be built from, and the per-source document cache.

use crate::config::ParseOptions;
use crate::document::DocumentHandle;
use crate::error::SelectorError;
use crate::mode::ParseMode;
use log::debug;
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Something that carries a raw markup body, such as a fetched response.
pub trait Source {
    /// The raw, undecoded body.
    fn body(&self) -> &[u8];

    /// Where the body came from, if known.
    fn url(&self) -> Option<&str> {
        None
    }

    /// A cache of parsed documents for this source. Sources without one are re-parsed
    /// for every selector built from them.
    fn document_cache(&self) -> Option<&DocumentCache> {
        None
    }
}

/// At most one parsed document per [`ParseMode`].
///
/// The first build for a mode wins; its options are the ones that stick. Concurrent
/// callers block until that build finishes and then share its result.
#[derive(Debug, Default)]
pub struct DocumentCache {
    html: OnceCell<Arc<DocumentHandle>>,
    xml: OnceCell<Arc<DocumentHandle>>,
}

impl DocumentCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, mode: ParseMode) -> &OnceCell<Arc<DocumentHandle>> {
        match mode {
            ParseMode::Html => &self.html,
            ParseMode::Xml => &self.xml,
        }
    }

    /// The cached handle for `mode`, if one was built.
    pub fn get(&self, mode: ParseMode) -> Option<Arc<DocumentHandle>> {
        self.slot(mode).get().cloned()
    }

    /// Returns the cached handle for `mode`, running `build` if there is none yet.
    /// A failed build leaves the slot empty.
    pub fn get_or_build<F>(&self, mode: ParseMode, build: F) -> Result<Arc<DocumentHandle>, SelectorError>
    where
        F: FnOnce() -> Result<DocumentHandle, SelectorError>,
    {
        let slot = self.slot(mode);
        if let Some(handle) = slot.get() {
            debug!("Document cache hit ({})", mode);
            return Ok(Arc::clone(handle));
        }
        slot.get_or_try_init(|| {
            debug!("Document cache miss ({}), parsing", mode);
            build().map(Arc::new)
        })
        .cloned()
    }
}

/// Resolves the handle for `source`: from its cache when it has one, freshly built otherwise.
pub(crate) fn handle_for<S: Source + ?Sized>(
    source: &S,
    options: &ParseOptions,
) -> Result<Arc<DocumentHandle>, SelectorError> {
    let build = || DocumentHandle::build(source.body(), options);
    match source.document_cache() {
        Some(cache) => cache.get_or_build(options.mode, build),
        None => build().map(Arc::new),
    }
}

/// An in-memory response: a body, an optional URL and a document cache.
#[derive(Debug, Default)]
pub struct Response {
    url: Option<String>,
    body: Vec<u8>,
    cache: DocumentCache,
}

impl Response {
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self {
            url: None,
            body: body.into(),
            cache: DocumentCache::new(),
        }
    }

    /// A response whose body is `text` encoded as UTF-8.
    pub fn from_text(text: &str) -> Self {
        Self::new(text.as_bytes())
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

impl Source for Response {
    fn body(&self) -> &[u8] {
        &self.body
    }

    fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    fn document_cache(&self) -> Option<&DocumentCache> {
        Some(&self.cache)
    }
}
