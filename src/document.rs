//! The shared, parsed form of one input: tree, parse mode and namespace bindings.

use crate::config::ParseOptions;
use crate::error::SelectorError;
use crate::mode::ParseMode;
use log::debug;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard};
use std::time::Instant;
use xsel_dom::{Document, NodeId};
use xsel_xpath1::{EvaluationContext, XPathError, XPathValue, evaluate, parse_expression};

/// A parsed document together with its mode and namespace table.
///
/// Handles are shared by `Arc` between every selector derived from the same input. The
/// tree is immutable; the namespace table sits behind a lock so that registration and
/// evaluation may happen from different threads.
#[derive(Debug)]
pub struct DocumentHandle {
    document: Document,
    mode: ParseMode,
    namespaces: RwLock<HashMap<String, String>>,
}

impl DocumentHandle {
    /// Builds a handle from raw bytes. Invalid UTF-8 sequences are dropped.
    pub fn build(body: &[u8], options: &ParseOptions) -> Result<Self, SelectorError> {
        Self::parse(&decode_lossy(body), options)
    }

    /// Builds a handle from text in the mode given by `options`.
    pub fn parse(text: &str, options: &ParseOptions) -> Result<Self, SelectorError> {
        let started = Instant::now();
        let document = match options.mode {
            ParseMode::Html => Document::parse_html(text),
            ParseMode::Xml => Document::parse_xml(text, &options.xml_options()).map_err(|e| {
                SelectorError::Parse {
                    mode: ParseMode::Xml,
                    message: e.to_string(),
                }
            })?,
        };
        let handle = Self::assemble(document, options.mode, started);
        for (prefix, uri) in &options.namespaces {
            handle.register_namespace(prefix, uri);
        }
        Ok(handle)
    }

    /// An HTML handle. HTML parsing cannot fail.
    pub fn html(text: &str) -> Self {
        Self::assemble(Document::parse_html(text), ParseMode::Html, Instant::now())
    }

    fn assemble(document: Document, mode: ParseMode, started: Instant) -> Self {
        debug!(
            "Built {} document: {} nodes in {:?}",
            mode,
            document.len(),
            started.elapsed()
        );
        Self {
            document,
            mode,
            namespaces: RwLock::new(HashMap::new()),
        }
    }

    pub fn mode(&self) -> ParseMode {
        self.mode
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn node_count(&self) -> usize {
        self.document.len()
    }

    /// Binds `prefix` to `uri` for later queries. The last registration of a prefix wins.
    pub fn register_namespace(&self, prefix: &str, uri: &str) {
        debug!("Registering namespace {}={}", prefix, uri);
        self.namespaces
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(prefix.to_string(), uri.to_string());
    }

    /// The URI bound to `prefix`, if any.
    pub fn namespace(&self, prefix: &str) -> Option<String> {
        self.read_namespaces().get(prefix).cloned()
    }

    fn read_namespaces(&self) -> RwLockReadGuard<'_, HashMap<String, String>> {
        self.namespaces.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Compiles and evaluates `expr` with `node` as the context node. Node-set results
    /// are returned as node ids in document order.
    pub fn evaluate(&self, node: NodeId, expr: &str) -> Result<XPathValue<NodeId>, SelectorError> {
        let context_node = self
            .document
            .get(node)
            .ok_or(SelectorError::UnknownNode(node))?;
        let invalid = |e: XPathError| SelectorError::invalid_query(expr, e);
        let compiled = parse_expression(expr).map_err(invalid)?;
        let namespaces = self.read_namespaces();
        let e_ctx = EvaluationContext::at(context_node, self.document.root(), &namespaces);
        let value = evaluate(&compiled, &e_ctx).map_err(invalid)?;
        Ok(value.map_nodes(|n| n.id()))
    }
}

/// UTF-8 decoding that drops invalid sequences instead of replacing them.
pub(crate) fn decode_lossy(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => Cow::Owned(bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()),
    }
}
