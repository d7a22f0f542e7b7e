//! The node trait the evaluator walks, and the vocabulary it is described in.
use std::hash::Hash;

/// A name as written in the markup: `prefix:local` or just `local`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QName<'a> {
    pub prefix: Option<&'a str>,
    pub local_part: &'a str,
}

/// Node kinds of the XPath 1.0 data model. Namespace nodes are not represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Root,
    Element,
    Attribute,
    Text,
    Comment,
    ProcessingInstruction,
}

/// A cheap, copyable handle to one node of a read-only tree living for `'a`.
///
/// `Ord` must be document order, with an element before its attributes and its
/// attributes before its children. Sorting and deduplicating node-sets relies on it.
pub trait DataSourceNode<'a>:
    std::fmt::Debug + Clone + Copy + PartialEq + Eq + Hash + PartialOrd + Ord
{
    fn node_type(&self) -> NodeType;

    /// Element and attribute names; the target for a processing instruction; `None`
    /// for every other kind.
    fn name(&self) -> Option<QName<'a>>;

    /// Resolved namespace of an element or attribute.
    fn namespace_uri(&self) -> Option<&'a str>;

    /// `string()` of this node: descendant text concatenated for the root and elements,
    /// the value for attributes, the content for text, comments and processing instructions.
    fn string_value(&self) -> String;

    /// Attribute nodes in source order. Empty unless this is an element.
    fn attributes(&self) -> Box<dyn Iterator<Item = Self> + 'a>;

    /// Child nodes in document order, attributes excluded.
    fn children(&self) -> Box<dyn Iterator<Item = Self> + 'a>;

    /// `None` only for the root. An attribute's parent is its owner element.
    fn parent(&self) -> Option<Self>;
}

/// A small hand-built tree shared by the evaluator's unit tests.
#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cmp::Ordering;
    use std::hash::Hasher;

    #[derive(Debug, Clone)]
    struct MockNodeData {
        node_type: NodeType,
        prefix: Option<&'static str>,
        name: Option<&'static str>,
        namespace: Option<&'static str>,
        value: &'static str,
        parent: Option<usize>,
        children: Vec<usize>,
        attributes: Vec<usize>,
    }

    /// A flat, in-memory tree whose node ids are allocated in document order.
    #[derive(Debug, Default)]
    pub struct MockTree {
        nodes: Vec<MockNodeData>,
    }

    impl MockTree {
        fn push(
            &mut self,
            parent: Option<usize>,
            node_type: NodeType,
            name: Option<&'static str>,
            value: &'static str,
        ) -> usize {
            let (prefix, name) = match name.and_then(|n| n.split_once(':')) {
                Some((p, local)) => (Some(p), Some(local)),
                None => (None, name),
            };
            let id = self.nodes.len();
            self.nodes.push(MockNodeData {
                node_type,
                prefix,
                name,
                namespace: None,
                value,
                parent,
                children: vec![],
                attributes: vec![],
            });
            if let Some(p) = parent {
                if node_type == NodeType::Attribute {
                    self.nodes[p].attributes.push(id);
                } else {
                    self.nodes[p].children.push(id);
                }
            }
            id
        }

        fn set_namespace(&mut self, id: usize, uri: &'static str) {
            self.nodes[id].namespace = Some(uri);
        }

        pub fn node(&self, id: usize) -> MockNode<'_> {
            MockNode { id, tree: self }
        }
    }

    /// A node handle that borrows its tree so it can navigate (parent, children).
    #[derive(Debug, Clone, Copy)]
    pub struct MockNode<'a> {
        pub id: usize,
        pub tree: &'a MockTree,
    }

    impl<'a> MockNode<'a> {
        fn data(&self) -> &'a MockNodeData {
            &self.tree.nodes[self.id]
        }
    }

    impl PartialEq for MockNode<'_> {
        fn eq(&self, other: &Self) -> bool {
            self.id == other.id
        }
    }
    impl Eq for MockNode<'_> {}

    impl PartialOrd for MockNode<'_> {
        fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
            Some(self.cmp(other))
        }
    }
    impl Ord for MockNode<'_> {
        fn cmp(&self, other: &Self) -> Ordering {
            self.id.cmp(&other.id)
        }
    }

    impl Hash for MockNode<'_> {
        fn hash<H: Hasher>(&self, state: &mut H) {
            self.id.hash(state);
        }
    }

    impl<'a> DataSourceNode<'a> for MockNode<'a> {
        fn node_type(&self) -> NodeType {
            self.data().node_type
        }

        fn name(&self) -> Option<QName<'a>> {
            let data = self.data();
            data.name.map(|local_part| QName {
                prefix: data.prefix,
                local_part,
            })
        }

        fn namespace_uri(&self) -> Option<&'a str> {
            self.data().namespace
        }

        fn string_value(&self) -> String {
            match self.node_type() {
                NodeType::Root | NodeType::Element => {
                    let mut out = String::new();
                    let mut stack: Vec<MockNode<'a>> = self.children().collect();
                    stack.reverse();
                    while let Some(node) = stack.pop() {
                        if node.node_type() == NodeType::Text {
                            out.push_str(node.data().value);
                        }
                        let mut kids: Vec<_> = node.children().collect();
                        kids.reverse();
                        stack.extend(kids);
                    }
                    out
                }
                _ => self.data().value.to_string(),
            }
        }

        fn attributes(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
            let tree = self.tree;
            Box::new(
                self.data()
                    .attributes
                    .iter()
                    .map(move |&id| MockNode { id, tree }),
            )
        }

        fn children(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
            let tree = self.tree;
            Box::new(
                self.data()
                    .children
                    .iter()
                    .map(move |&id| MockNode { id, tree }),
            )
        }

        fn parent(&self) -> Option<Self> {
            let tree = self.tree;
            self.data().parent.map(|id| MockNode { id, tree })
        }
    }

    /// Creates a small mock tree for testing. Ids follow document order:
    /// ```text
    /// (root)                                   0
    ///   <para id="p1" xml:lang="en">Hello</para>  1, @id 2, @xml:lang 3, text 4
    ///   <!-- comment node -->                  5
    ///   <div></div>                            6
    ///   <?pi-target pi-value?>                 7
    ///   <para>World</para>                     8, text 9
    ///   <x:item xmlns:x="urn:x" x:kind="k"/>   10 (urn:x), @x:kind 11 (urn:x)
    /// ```
    pub fn create_test_tree() -> MockTree {
        let mut tree = MockTree::default();
        let root = tree.push(None, NodeType::Root, None, "");
        let para = tree.push(Some(root), NodeType::Element, Some("para"), "");
        tree.push(Some(para), NodeType::Attribute, Some("id"), "p1");
        let lang = tree.push(Some(para), NodeType::Attribute, Some("xml:lang"), "en");
        tree.set_namespace(lang, "http://www.w3.org/XML/1998/namespace");
        tree.push(Some(para), NodeType::Text, None, "Hello");
        tree.push(Some(root), NodeType::Comment, None, " comment node ");
        tree.push(Some(root), NodeType::Element, Some("div"), "");
        tree.push(
            Some(root),
            NodeType::ProcessingInstruction,
            Some("pi-target"),
            "pi-value",
        );
        let para2 = tree.push(Some(root), NodeType::Element, Some("para"), "");
        tree.push(Some(para2), NodeType::Text, None, "World");
        let item = tree.push(Some(root), NodeType::Element, Some("x:item"), "");
        tree.set_namespace(item, "urn:x");
        let kind = tree.push(Some(item), NodeType::Attribute, Some("x:kind"), "k");
        tree.set_namespace(kind, "urn:x");
        tree
    }
}
