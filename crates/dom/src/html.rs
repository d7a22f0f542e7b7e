//! Forgiving HTML input. `html5ever` (through `scraper`) repairs the markup the way a
//! browser would, and the repaired tree is copied into the arena.
//!
//! Element and attribute names carry no namespace, so unprefixed name tests match them.

use crate::document::{Document, Name, NodeId, NodeKind};
use crate::serialize::Flavor;
use log::warn;
use scraper::Html;
use scraper::node::Node;

impl Document {
    /// Parses HTML. Never fails; malformed input is repaired.
    pub fn parse_html(text: &str) -> Document {
        let html = Html::parse_document(text);
        let mut doc = Document::new(Flavor::Html);
        copy_tree(&mut doc, html.tree.root());

        if !html.errors.is_empty() {
            warn!(
                "HTML input needed {} repair(s); first: {}",
                html.errors.len(),
                html.errors[0]
            );
            doc.set_recovered_errors(html.errors.len());
        }
        doc
    }
}

/// Copies everything below `source` into `doc`, depth-first with an explicit stack so
/// nesting depth is bounded by memory rather than by the call stack.
fn copy_tree(doc: &mut Document, source: ego_tree::NodeRef<'_, Node>) {
    let mut pending: Vec<_> = source.children().rev().map(|child| (0, child)).collect();
    while let Some((parent, node)) = pending.pop() {
        if let Some(id) = copy_node(doc, parent, node) {
            pending.extend(node.children().rev().map(|child| (id, child)));
        }
    }
}

/// Appends `node` and its attributes. Nodes without an arena counterpart are skipped
/// along with their subtree.
fn copy_node(doc: &mut Document, parent: NodeId, node: ego_tree::NodeRef<'_, Node>) -> Option<NodeId> {
    let kind = match node.value() {
        Node::Element(element) => NodeKind::Element(Name::local(element.name())),
        Node::Text(text) => NodeKind::Text(text.text.to_string()),
        Node::Comment(comment) => NodeKind::Comment(comment.comment.to_string()),
        Node::ProcessingInstruction(pi) => NodeKind::ProcessingInstruction {
            target: pi.target.to_string(),
            data: pi.data.to_string(),
        },
        Node::Document | Node::Fragment | Node::Doctype(_) => return None,
    };

    let id = doc.append(parent, kind);
    if let Node::Element(element) = node.value() {
        for (name, value) in element.attrs() {
            doc.append(
                id,
                NodeKind::Attribute {
                    name: Name::local(name),
                    value: value.to_string(),
                },
            );
        }
    }
    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use xsel_xpath1::DataSourceNode;

    #[test]
    fn test_html_is_repaired_into_a_full_document() {
        let doc = Document::parse_html("<p>one<p>two");
        let html = doc.document_element().unwrap();
        assert_eq!(html.kind(), &NodeKind::Element(Name::local("html")));

        let body = html.child_nodes().nth(1).unwrap();
        let paragraphs: Vec<String> = body.child_nodes().map(|p| p.string_value()).collect();
        assert_eq!(paragraphs, vec!["one", "two"]);
    }

    #[test]
    fn test_html_attributes_keep_source_order() {
        let doc = Document::parse_html(r#"<a href="/x" class="c" id="i">x</a>"#);
        let body = doc.document_element().unwrap().child_nodes().nth(1).unwrap();
        let link = body.child_nodes().next().unwrap();
        let names: Vec<_> = link
            .attribute_nodes()
            .map(|a| a.name().unwrap().local_part)
            .collect();
        assert_eq!(names, vec!["href", "class", "id"]);
        assert_eq!(link.attribute("href"), Some("/x"));
    }

    #[test]
    fn test_html_names_have_no_namespace() {
        let doc = Document::parse_html("<div><span>x</span></div>");
        let html = doc.document_element().unwrap();
        assert_eq!(html.namespace_uri(), None);
    }

    #[test]
    fn test_deep_nesting_is_copied_without_recursion() {
        let depth = 20_000;
        let text = format!("{}x{}", "<div>".repeat(depth), "</div>".repeat(depth));
        let doc = Document::parse_html(&text);
        assert_eq!(doc.root().child_nodes().count(), 1);
        assert!(doc.len() > depth);
        assert_eq!(doc.root().text_content(), "x");
    }

    #[test]
    fn test_broken_html_counts_repairs() {
        let doc = Document::parse_html("<div><b>bold</div></i>");
        assert!(doc.recovered_errors() > 0);
        assert_eq!(doc.root().text_content(), "bold");
    }
}
