//! Strict XML input, parsed with `roxmltree` and copied into the arena.

use crate::document::{Document, Name, NodeId, NodeKind};
use crate::error::DomError;
use crate::serialize::Flavor;
use roxmltree::{Node, ParsingOptions};

/// Knobs forwarded to `roxmltree`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XmlOptions {
    pub allow_dtd: bool,
    pub nodes_limit: u32,
}

impl Default for XmlOptions {
    fn default() -> Self {
        Self {
            allow_dtd: false,
            nodes_limit: u32::MAX,
        }
    }
}

impl Document {
    /// Parses well-formed XML. Any well-formedness error is fatal.
    pub fn parse_xml(text: &str, options: &XmlOptions) -> Result<Document, DomError> {
        let mut parsing = ParsingOptions::default();
        parsing.allow_dtd = options.allow_dtd;
        parsing.nodes_limit = options.nodes_limit;

        let source = roxmltree::Document::parse_with_options(text, parsing)?;
        let mut doc = Document::new(Flavor::Xml);
        let mut pending: Vec<_> = source.root().children().rev().map(|child| (0, child)).collect();
        while let Some((parent, node)) = pending.pop() {
            if let Some(id) = copy_node(&mut doc, parent, node) {
                pending.extend(node.children().rev().map(|child| (id, child)));
            }
        }
        Ok(doc)
    }
}

fn element_name(node: Node<'_, '_>) -> Name {
    let tag = node.tag_name();
    Name {
        prefix: tag
            .namespace()
            .and_then(|uri| node.lookup_prefix(uri))
            .map(str::to_string),
        local: tag.name().to_string(),
        namespace: tag.namespace().map(str::to_string),
    }
}

/// Appends `node` and, for elements, its attributes. Children are left to the caller.
fn copy_node(doc: &mut Document, parent: NodeId, node: Node<'_, '_>) -> Option<NodeId> {
    let kind = match node.node_type() {
        roxmltree::NodeType::Element => NodeKind::Element(element_name(node)),
        roxmltree::NodeType::Text => NodeKind::Text(node.text().unwrap_or_default().to_string()),
        roxmltree::NodeType::Comment => {
            NodeKind::Comment(node.text().unwrap_or_default().to_string())
        }
        roxmltree::NodeType::PI => match node.pi() {
            Some(pi) => NodeKind::ProcessingInstruction {
                target: pi.target.to_string(),
                data: pi.value.unwrap_or_default().to_string(),
            },
            None => return None,
        },
        roxmltree::NodeType::Root => return None,
    };

    let id = doc.append(parent, kind);
    if !node.is_element() {
        return Some(id);
    }
    for attr in node.attributes() {
        let name = Name {
            prefix: attr
                .namespace()
                .and_then(|uri| node.lookup_prefix(uri))
                .map(str::to_string),
            local: attr.name().to_string(),
            namespace: attr.namespace().map(str::to_string),
        };
        doc.append(
            id,
            NodeKind::Attribute {
                name,
                value: attr.value().to_string(),
            },
        );
    }
    Some(id)
}
