//! The selector: one position in a parsed document (or one scalar result) that can be
//! queried further, extracted as text, or filtered with a regular expression.

use crate::config::ParseOptions;
use crate::document::DocumentHandle;
use crate::error::SelectorError;
use crate::list::SelectorList;
use crate::mode::ParseMode;
use crate::pattern::{Pattern, extract_regex};
use crate::source::{Source, handle_for};
use log::trace;
use std::fmt;
use std::sync::Arc;
use xsel_dom::{NodeId, NodeKind, NodeRef};
use xsel_xpath1::XPathValue;

/// A non-node query result.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    String(String),
    Number(f64),
    Boolean(bool),
}

impl Scalar {
    /// `string`, `number` or `boolean`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::String(_) => "string",
            Scalar::Number(_) => "number",
            Scalar::Boolean(_) => "boolean",
        }
    }
}

impl fmt::Display for Scalar {
    /// Strings verbatim, numbers always with a fractional part (`3.0`), booleans as
    /// `true`/`false`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::String(s) => f.write_str(s),
            Scalar::Number(n) => write!(f, "{:?}", n),
            Scalar::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// What a selector points at.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorNode {
    Root,
    Element(NodeId),
    Attribute(NodeId),
    Text(NodeId),
    Comment(NodeId),
    ProcessingInstruction(NodeId),
    Scalar(Scalar),
}

impl SelectorNode {
    fn for_node(node: NodeRef<'_>) -> Self {
        let id = node.id();
        match node.kind() {
            NodeKind::Root => SelectorNode::Root,
            NodeKind::Element(_) => SelectorNode::Element(id),
            NodeKind::Attribute { .. } => SelectorNode::Attribute(id),
            NodeKind::Text(_) => SelectorNode::Text(id),
            NodeKind::Comment(_) => SelectorNode::Comment(id),
            NodeKind::ProcessingInstruction { .. } => SelectorNode::ProcessingInstruction(id),
        }
    }

    /// The tree node this refers to; `None` for scalars.
    pub fn id(&self) -> Option<NodeId> {
        match self {
            SelectorNode::Root => Some(0),
            SelectorNode::Element(id)
            | SelectorNode::Attribute(id)
            | SelectorNode::Text(id)
            | SelectorNode::Comment(id)
            | SelectorNode::ProcessingInstruction(id) => Some(*id),
            SelectorNode::Scalar(_) => None,
        }
    }
}

/// A query handle bound to one node of a shared document.
///
/// ```
/// use xsel::Selector;
///
/// let root = Selector::html("<ul><li>one</li><li>two</li></ul>");
/// let items = root.query("//li/text()").unwrap();
/// assert_eq!(items.extract(), vec!["one", "two"]);
/// ```
#[derive(Clone)]
pub struct Selector {
    handle: Arc<DocumentHandle>,
    node: SelectorNode,
    expr: Option<String>,
    url: Option<String>,
}

impl Selector {
    fn root(handle: Arc<DocumentHandle>, url: Option<String>) -> Self {
        Self {
            handle,
            node: SelectorNode::Root,
            expr: None,
            url,
        }
    }

    /// A child of `self` at `node`, sharing the document.
    fn child(&self, node: SelectorNode, expr: &str) -> Self {
        Self {
            handle: Arc::clone(&self.handle),
            node,
            expr: Some(expr.to_string()),
            url: self.url.clone(),
        }
    }

    /// A root selector over an HTML document parsed from `text`.
    pub fn html(text: &str) -> Self {
        Self::root(Arc::new(DocumentHandle::html(text)), None)
    }

    /// A root selector over an XML document parsed from `text`.
    pub fn xml(text: &str) -> Result<Self, SelectorError> {
        Self::from_text(text, ParseMode::Xml)
    }

    /// A root selector over `text` parsed in `mode`. Never cached.
    pub fn from_text(text: &str, mode: ParseMode) -> Result<Self, SelectorError> {
        Self::with_options(text, &ParseOptions::new().with_mode(mode))
    }

    /// Like [`Selector::from_text`] for undecoded bytes; invalid UTF-8 is dropped.
    pub fn from_bytes(body: &[u8], mode: ParseMode) -> Result<Self, SelectorError> {
        let options = ParseOptions::new().with_mode(mode);
        Ok(Self::root(Arc::new(DocumentHandle::build(body, &options)?), None))
    }

    pub fn with_options(text: &str, options: &ParseOptions) -> Result<Self, SelectorError> {
        Ok(Self::root(Arc::new(DocumentHandle::parse(text, options)?), None))
    }

    /// A root selector over `source`'s body. Sources with a document cache are parsed at
    /// most once per mode.
    pub fn from_source<S: Source + ?Sized>(source: &S, mode: ParseMode) -> Result<Self, SelectorError> {
        Self::from_source_with_options(source, &ParseOptions::new().with_mode(mode))
    }

    pub fn from_source_with_options<S: Source + ?Sized>(
        source: &S,
        options: &ParseOptions,
    ) -> Result<Self, SelectorError> {
        let handle = handle_for(source, options)?;
        Ok(Self::root(handle, source.url().map(str::to_string)))
    }

    pub fn mode(&self) -> ParseMode {
        self.handle.mode()
    }

    /// The expression that produced this selector; `None` for roots.
    pub fn expr(&self) -> Option<&str> {
        self.expr.as_deref()
    }

    pub fn node(&self) -> &SelectorNode {
        &self.node
    }

    /// URL of the source this selector was built from, if it had one.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn handle(&self) -> &Arc<DocumentHandle> {
        &self.handle
    }

    fn node_ref(&self) -> Option<NodeRef<'_>> {
        self.node.id().and_then(|id| self.handle.document().get(id))
    }

    /// Evaluates `expr` with this selector's node as the context node.
    ///
    /// Node-set results become one selector per node in document order; scalar results
    /// become a single scalar selector. Querying a scalar selector yields an empty list.
    pub fn query(&self, expr: &str) -> Result<SelectorList, SelectorError> {
        let Some(id) = self.node.id() else {
            return Ok(SelectorList::new());
        };
        trace!("Evaluating '{}' at {:?}", expr, self.node);

        let value = self.handle.evaluate(id, expr)?;
        let list: SelectorList = match value {
            XPathValue::NodeSet(ids) => {
                let document = self.handle.document();
                ids.into_iter()
                    .filter_map(|id| document.get(id))
                    .map(|node| self.child(SelectorNode::for_node(node), expr))
                    .collect()
            }
            XPathValue::String(s) => self.scalar_list(Scalar::String(s), expr),
            XPathValue::Number(n) => self.scalar_list(Scalar::Number(n), expr),
            XPathValue::Boolean(b) => self.scalar_list(Scalar::Boolean(b), expr),
        };
        Ok(list)
    }

    fn scalar_list(&self, scalar: Scalar, expr: &str) -> SelectorList {
        std::iter::once(self.child(SelectorNode::Scalar(scalar), expr)).collect()
    }

    /// Shorthand for [`Selector::query`].
    pub fn x(&self, expr: &str) -> Result<SelectorList, SelectorError> {
        self.query(expr)
    }

    /// The content of this selector as text.
    ///
    /// Roots serialize their document element, attributes give their value, scalars
    /// their string form, and every other node its markup.
    pub fn extract(&self) -> String {
        if let SelectorNode::Scalar(scalar) = &self.node {
            return scalar.to_string();
        }
        let Some(node) = self.node_ref() else {
            return String::new();
        };
        match (&self.node, node.kind()) {
            (SelectorNode::Root, _) => self
                .handle
                .document()
                .document_element()
                .map(|element| element.to_markup())
                .unwrap_or_default(),
            (_, NodeKind::Attribute { value, .. }) => value.clone(),
            _ => node.to_markup(),
        }
    }

    /// The raw content of a text node, without markup escaping. Empty for anything else.
    pub fn extract_unquoted(&self) -> String {
        let Ok(texts) = self.query("self::text()") else {
            return String::new();
        };
        texts
            .selectors()
            .next()
            .and_then(|text| text.node_ref())
            .and_then(|node| match node.kind() {
                NodeKind::Text(text) => Some(text.clone()),
                _ => None,
            })
            .unwrap_or_default()
    }

    /// Applies `pattern` to [`extract`](Selector::extract)'s output.
    pub fn re(&self, pattern: impl Pattern) -> Result<Vec<String>, SelectorError> {
        let regex = pattern.to_regex()?;
        Ok(extract_regex(&regex, &self.extract()))
    }

    /// Binds `prefix` to `uri` for queries on every selector sharing this document.
    pub fn register_namespace(&self, prefix: &str, uri: &str) {
        self.handle.register_namespace(prefix, uri);
    }

    /// False exactly when [`extract`](Selector::extract) is empty.
    pub fn is_truthy(&self) -> bool {
        !self.extract().is_empty()
    }

    /// Tag name or node-kind name used in the diagnostic form.
    fn label(&self) -> String {
        if let SelectorNode::Scalar(scalar) = &self.node {
            return scalar.type_name().to_string();
        }
        match self.node_ref().map(|n| n.kind()) {
            Some(NodeKind::Element(name)) | Some(NodeKind::Attribute { name, .. }) => {
                name.qualified()
            }
            Some(NodeKind::ProcessingInstruction { target, .. }) => target.clone(),
            Some(NodeKind::Text(_)) => "text".to_string(),
            Some(NodeKind::Comment(_)) => "comment".to_string(),
            Some(NodeKind::Root) | None => "document".to_string(),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{} ({}) xpath={}>",
            self.mode().selector_name(),
            self.label(),
            self.expr.as_deref().unwrap_or("None")
        )
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_display() {
        assert_eq!(Scalar::Number(3.0).to_string(), "3.0");
        assert_eq!(Scalar::Number(0.5).to_string(), "0.5");
        assert_eq!(Scalar::Boolean(false).to_string(), "false");
        assert_eq!(Scalar::String("x y".into()).to_string(), "x y");
    }

    #[test]
    fn test_extract_by_node_kind() {
        let root = Selector::xml(r#"<a href="u&amp;v"><b>hello</b><!--c--><?p d?></a>"#).unwrap();
        assert_eq!(root.extract(), r#"<a href="u&amp;v"><b>hello</b><!--c--><?p d?></a>"#);
        assert_eq!(root.query("//@href").unwrap()[0].extract(), "u&v");
        assert_eq!(root.query("//b").unwrap()[0].extract(), "<b>hello</b>");
        assert_eq!(root.query("//comment()").unwrap()[0].extract(), "<!--c-->");
        assert_eq!(root.query("//processing-instruction()").unwrap()[0].extract(), "<?p d?>");
        assert_eq!(root.query("count(//b)").unwrap()[0].extract(), "1.0");
    }

    #[test]
    fn test_extract_unquoted_only_for_text() {
        let root = Selector::xml("<a>1 &lt; 2</a>").unwrap();
        let text = root.query("//a/text()").unwrap()[0].clone();
        assert_eq!(text.extract(), "1 &lt; 2");
        assert_eq!(text.extract_unquoted(), "1 < 2");
        assert_eq!(root.query("//a").unwrap()[0].extract_unquoted(), "");
        assert_eq!(root.extract_unquoted(), "");
    }

    fn first(list: SelectorList) -> Selector {
        list.selectors().next().cloned().unwrap()
    }

    #[test]
    fn test_scalar_selectors_degrade() {
        let root = Selector::html("<p>x</p>");
        let scalar = first(root.query("string(//p)").unwrap());
        assert_eq!(scalar.node(), &SelectorNode::Scalar(Scalar::String("x".into())));
        assert!(scalar.query("//p").unwrap().is_empty());
        assert_eq!(scalar.extract_unquoted(), "");
    }

    #[test]
    fn test_display_forms() {
        let root = Selector::html("<p class='c'>x</p>");
        assert_eq!(root.to_string(), "<HtmlSelector (document) xpath=None>");
        assert_eq!(
            first(root.query("//p").unwrap()).to_string(),
            "<HtmlSelector (p) xpath=//p>"
        );
        assert_eq!(
            format!("{:?}", first(root.query("//p/@class").unwrap())),
            "<HtmlSelector (class) xpath=//p/@class>"
        );
        assert_eq!(
            first(root.query("//p/text()").unwrap()).to_string(),
            "<HtmlSelector (text) xpath=//p/text()>"
        );
        assert_eq!(
            first(root.query("1 = 1").unwrap()).to_string(),
            "<HtmlSelector (boolean) xpath=1 = 1>"
        );
        let xml = Selector::xml("<r/>").unwrap();
        assert_eq!(xml.to_string(), "<XmlSelector (document) xpath=None>");
    }

    #[test]
    fn test_truthiness_follows_extract() {
        let root = Selector::html("<p></p>");
        assert!(root.is_truthy());
        assert!(!root.query("string(//p)").unwrap()[0].is_truthy());
        assert!(root.query("count(//p)").unwrap()[0].is_truthy());
        assert!(!root.query("//p/text()").unwrap().iter().any(|item| item.is_truthy()));
    }
}
