//! The arena document and its [`DataSourceNode`] implementation.
//!
//! Nodes live in one `Vec` and refer to each other by index. Builders append nodes
//! depth-first (an element, then its attributes, then its children), so comparing ids
//! is comparing document order.

use crate::serialize::{self, Flavor};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use xsel_xpath1::{DataSourceNode, NodeType, QName};

pub type NodeId = usize;

/// An element or attribute name as it appeared in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name {
    pub prefix: Option<String>,
    pub local: String,
    pub namespace: Option<String>,
}

impl Name {
    /// A name with no prefix and no namespace.
    pub fn local(local: impl Into<String>) -> Self {
        Self {
            prefix: None,
            local: local.into(),
            namespace: None,
        }
    }

    /// The name as written, `prefix:local` or `local`.
    pub fn qualified(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, self.local),
            None => self.local.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Root,
    Element(Name),
    Attribute { name: Name, value: String },
    Text(String),
    Comment(String),
    ProcessingInstruction { target: String, data: String },
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attributes: Vec<NodeId>,
}

/// An immutable markup tree. Node `0` is always the root.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
    flavor: Flavor,
    recovered_errors: usize,
}

impl Document {
    pub(crate) fn new(flavor: Flavor) -> Self {
        Self {
            nodes: vec![NodeData {
                kind: NodeKind::Root,
                parent: None,
                children: vec![],
                attributes: vec![],
            }],
            flavor,
            recovered_errors: 0,
        }
    }

    /// Appends a node under `parent`. Attributes go to the attribute list, anything else
    /// becomes the last child.
    pub(crate) fn append(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = self.nodes.len();
        let is_attribute = matches!(kind, NodeKind::Attribute { .. });
        self.nodes.push(NodeData {
            kind,
            parent: Some(parent),
            children: vec![],
            attributes: vec![],
        });
        if is_attribute {
            self.nodes[parent].attributes.push(id);
        } else {
            self.nodes[parent].children.push(id);
        }
        id
    }

    pub(crate) fn set_recovered_errors(&mut self, count: usize) {
        self.recovered_errors = count;
    }

    pub fn root(&self) -> NodeRef<'_> {
        NodeRef { doc: self, id: 0 }
    }

    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_>> {
        (id < self.nodes.len()).then_some(NodeRef { doc: self, id })
    }

    /// The first element child of the root, if any.
    pub fn document_element(&self) -> Option<NodeRef<'_>> {
        self.root()
            .child_nodes()
            .find(|n| matches!(n.kind(), NodeKind::Element(_)))
    }

    /// Number of nodes, attributes and the root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a document has at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The serialization flavor matching the parser that built this document.
    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    /// How many markup errors the HTML parser repaired. Always zero for XML.
    pub fn recovered_errors(&self) -> usize {
        self.recovered_errors
    }
}

/// A cheap, copyable handle to one node of a [`Document`].
///
/// Handles from different documents must not be compared; equality and ordering only
/// look at the node id.
#[derive(Clone, Copy)]
pub struct NodeRef<'d> {
    doc: &'d Document,
    id: NodeId,
}

impl<'d> NodeRef<'d> {
    fn data(&self) -> &'d NodeData {
        &self.doc.nodes[self.id]
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn document(&self) -> &'d Document {
        self.doc
    }

    pub fn kind(&self) -> &'d NodeKind {
        &self.data().kind
    }

    pub fn parent_node(&self) -> Option<NodeRef<'d>> {
        let doc = self.doc;
        self.data().parent.map(|id| NodeRef { doc, id })
    }

    pub fn child_nodes(&self) -> impl Iterator<Item = NodeRef<'d>> + 'd {
        let doc = self.doc;
        self.data().children.iter().map(move |&id| NodeRef { doc, id })
    }

    pub fn attribute_nodes(&self) -> impl Iterator<Item = NodeRef<'d>> + 'd {
        let doc = self.doc;
        self.data()
            .attributes
            .iter()
            .map(move |&id| NodeRef { doc, id })
    }

    /// The value of the attribute with the given unprefixed name.
    pub fn attribute(&self, local: &str) -> Option<&'d str> {
        self.attribute_nodes().find_map(|attr| match attr.kind() {
            NodeKind::Attribute { name, value } if name.local == local => Some(value.as_str()),
            _ => None,
        })
    }

    /// Concatenated text of all descendant text nodes, in document order.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![*self];
        while let Some(node) = stack.pop() {
            if let NodeKind::Text(text) = node.kind() {
                out.push_str(text);
            }
            stack.extend(node.data().children.iter().rev().map(|&id| NodeRef {
                doc: node.doc,
                id,
            }));
        }
        out
    }

    /// Markup for this node in the document's flavor.
    pub fn to_markup(&self) -> String {
        serialize::serialize(*self, self.doc.flavor)
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            NodeKind::Root => write!(f, "NodeRef(#{} root)", self.id),
            NodeKind::Element(name) => write!(f, "NodeRef(#{} <{}>)", self.id, name.qualified()),
            NodeKind::Attribute { name, .. } => {
                write!(f, "NodeRef(#{} @{})", self.id, name.qualified())
            }
            NodeKind::Text(_) => write!(f, "NodeRef(#{} text)", self.id),
            NodeKind::Comment(_) => write!(f, "NodeRef(#{} comment)", self.id),
            NodeKind::ProcessingInstruction { target, .. } => {
                write!(f, "NodeRef(#{} <?{}?>)", self.id, target)
            }
        }
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for NodeRef<'_> {}

impl PartialOrd for NodeRef<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for NodeRef<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Hash for NodeRef<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<'d> DataSourceNode<'d> for NodeRef<'d> {
    fn node_type(&self) -> NodeType {
        match self.kind() {
            NodeKind::Root => NodeType::Root,
            NodeKind::Element(_) => NodeType::Element,
            NodeKind::Attribute { .. } => NodeType::Attribute,
            NodeKind::Text(_) => NodeType::Text,
            NodeKind::Comment(_) => NodeType::Comment,
            NodeKind::ProcessingInstruction { .. } => NodeType::ProcessingInstruction,
        }
    }

    fn name(&self) -> Option<QName<'d>> {
        let qname = |name: &'d Name| QName {
            prefix: name.prefix.as_deref(),
            local_part: name.local.as_str(),
        };
        match self.kind() {
            NodeKind::Element(name) | NodeKind::Attribute { name, .. } => Some(qname(name)),
            NodeKind::ProcessingInstruction { target, .. } => Some(QName {
                prefix: None,
                local_part: target.as_str(),
            }),
            _ => None,
        }
    }

    fn namespace_uri(&self) -> Option<&'d str> {
        match self.kind() {
            NodeKind::Element(name) | NodeKind::Attribute { name, .. } => {
                name.namespace.as_deref()
            }
            _ => None,
        }
    }

    fn string_value(&self) -> String {
        match self.kind() {
            NodeKind::Root | NodeKind::Element(_) => self.text_content(),
            NodeKind::Attribute { value, .. } => value.clone(),
            NodeKind::Text(text) | NodeKind::Comment(text) => text.clone(),
            NodeKind::ProcessingInstruction { data, .. } => data.clone(),
        }
    }

    fn attributes(&self) -> Box<dyn Iterator<Item = Self> + 'd> {
        Box::new(self.attribute_nodes())
    }

    fn children(&self) -> Box<dyn Iterator<Item = Self> + 'd> {
        Box::new(self.child_nodes())
    }

    fn parent(&self) -> Option<Self> {
        self.parent_node()
    }
}
