//! Markup serialization of a subtree.

use crate::document::{NodeKind, NodeRef};

/// Which markup rules to serialize with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    /// Empty elements self-close: `<br/>`.
    Xml,
    /// Void elements have no end tag; `script` and `style` content is written raw.
    Html,
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "br", "col", "embed", "frame", "hr", "img", "input", "keygen",
    "link", "meta", "param", "source", "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "xmp", "iframe", "noembed", "noframes"];

/// Work left for the serializer: a node still to write, or an end tag to close.
enum Pending<'d> {
    Node { node: NodeRef<'d>, raw_text: bool },
    EndTag(String),
}

/// Serializes `node` and its subtree. The root serializes as its children in order; an
/// attribute serializes as `name="value"`.
///
/// The walk keeps its own stack, so arbitrarily deep trees serialize without recursion.
pub fn serialize(node: NodeRef<'_>, flavor: Flavor) -> String {
    let mut out = String::new();
    let mut pending = vec![Pending::Node {
        node,
        raw_text: false,
    }];
    while let Some(next) = pending.pop() {
        match next {
            Pending::EndTag(tag) => {
                out.push_str("</");
                out.push_str(&tag);
                out.push('>');
            }
            Pending::Node { node, raw_text } => {
                write_node(node, flavor, raw_text, &mut pending, &mut out)
            }
        }
    }
    out
}

/// Schedules the children of `node` so they pop in document order.
fn push_children<'d>(node: NodeRef<'d>, raw_text: bool, pending: &mut Vec<Pending<'d>>) {
    let children: Vec<_> = node.child_nodes().collect();
    pending.extend(
        children
            .into_iter()
            .rev()
            .map(|node| Pending::Node { node, raw_text }),
    );
}

/// Writes the part of `node` that precedes its children and schedules the rest.
fn write_node<'d>(
    node: NodeRef<'d>,
    flavor: Flavor,
    raw_text: bool,
    pending: &mut Vec<Pending<'d>>,
    out: &mut String,
) {
    match node.kind() {
        NodeKind::Root => push_children(node, false, pending),
        NodeKind::Element(name) => {
            let tag = name.qualified();
            out.push('<');
            out.push_str(&tag);
            for attr in node.attribute_nodes() {
                if let NodeKind::Attribute { name, value } = attr.kind() {
                    out.push(' ');
                    write_attribute(&name.qualified(), value, out);
                }
            }

            let is_html = flavor == Flavor::Html;
            if is_html && VOID_ELEMENTS.contains(&tag.as_str()) {
                out.push('>');
                return;
            }
            if !is_html && node.child_nodes().next().is_none() {
                out.push_str("/>");
                return;
            }

            out.push('>');
            let raw = is_html && RAW_TEXT_ELEMENTS.contains(&tag.as_str());
            pending.push(Pending::EndTag(tag));
            push_children(node, raw, pending);
        }
        NodeKind::Attribute { name, value } => write_attribute(&name.qualified(), value, out),
        NodeKind::Text(text) => {
            if raw_text {
                out.push_str(text);
            } else {
                escape_into(text, false, out);
            }
        }
        NodeKind::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeKind::ProcessingInstruction { target, data } => {
            out.push_str("<?");
            out.push_str(target);
            if !data.is_empty() {
                out.push(' ');
                out.push_str(data);
            }
            out.push_str(match flavor {
                Flavor::Xml => "?>",
                Flavor::Html => ">",
            });
        }
    }
}

fn write_attribute(name: &str, value: &str, out: &mut String) {
    out.push_str(name);
    out.push_str("=\"");
    escape_into(value, true, out);
    out.push('"');
}

fn escape_into(text: &str, in_attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if in_attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Document, XmlOptions};

    fn xml(text: &str) -> Document {
        Document::parse_xml(text, &XmlOptions::default()).unwrap()
    }

    #[test]
    fn test_xml_serialization() {
        let doc = xml(r#"<a x="1 &quot;q&quot;"><b>hi &amp; bye</b><c/><!--n--><?p d?></a>"#);
        assert_eq!(
            doc.document_element().unwrap().to_markup(),
            r#"<a x="1 &quot;q&quot;"><b>hi &amp; bye</b><c/><!--n--><?p d?></a>"#
        );
    }

    #[test]
    fn test_text_and_attribute_nodes() {
        let doc = xml(r#"<a href="x&amp;y">1 &lt; 2</a>"#);
        let a = doc.document_element().unwrap();
        assert_eq!(a.child_nodes().next().unwrap().to_markup(), "1 &lt; 2");
        assert_eq!(
            a.attribute_nodes().next().unwrap().to_markup(),
            r#"href="x&amp;y""#
        );
    }

    #[test]
    fn test_html_void_and_raw_text_elements() {
        let doc = Document::parse_html("<p>a<br>b</p><script>if (a < b) {}</script>");
        let html = doc.document_element().unwrap();
        let markup = html.to_markup();
        assert!(markup.contains("<p>a<br>b</p>"), "{}", markup);
        assert!(markup.contains("<script>if (a < b) {}</script>"), "{}", markup);
        assert!(markup.starts_with("<html><head>"), "{}", markup);
    }

    #[test]
    fn test_deep_trees_serialize_iteratively() {
        let depth = 20_000;
        let text = format!("{}x{}", "<div>".repeat(depth), "</div>".repeat(depth));
        let markup = Document::parse_html(&text).root().to_markup();
        assert!(markup.starts_with("<html><head></head><body><div><div>"), "{}", &markup[..60]);
        assert!(markup.ends_with(&format!("x{}</body></html>", "</div>".repeat(depth))));
        assert_eq!(markup.matches("<div>").count(), depth);
    }

    #[test]
    fn test_html_empty_elements_keep_end_tags() {
        let doc = Document::parse_html("<div></div>");
        assert!(doc.root().to_markup().contains("<div></div>"));
    }
}
