//! Node collection along an axis from a single context node.
//!
//! Forward axes come back in document order. Reverse axes come back nearest-first,
//! which is the order positional predicates count in.

use crate::ast::Axis;
use crate::datasource::{DataSourceNode, NodeType};

/// The nodes on `axis` from `node`, in axis order. A single context node never yields
/// duplicates, so no deduplication happens here.
pub fn collect<'a, N: DataSourceNode<'a>>(axis: Axis, node: N) -> Vec<N> {
    let mut out = Vec::new();
    match axis {
        Axis::SelfAxis => out.push(node),
        Axis::Child => out.extend(node.children()),
        Axis::Attribute => out.extend(node.attributes()),
        // Namespace nodes are not modelled.
        Axis::Namespace => {}
        Axis::Descendant => push_subtree(node, &mut out),
        Axis::DescendantOrSelf => {
            out.push(node);
            push_subtree(node, &mut out);
        }
        Axis::Parent => out.extend(node.parent()),
        Axis::Ancestor => out.extend(ancestors(node)),
        Axis::AncestorOrSelf => {
            out.push(node);
            out.extend(ancestors(node));
        }
        Axis::FollowingSibling => out = siblings_after(node),
        Axis::PrecedingSibling => out.extend(siblings_before(node).into_iter().rev()),
        Axis::Following => push_following(node, &mut out),
        Axis::Preceding => push_preceding(node, &mut out),
    }
    out
}

fn ancestors<'a, N: DataSourceNode<'a>>(node: N) -> impl Iterator<Item = N> {
    std::iter::successors(node.parent(), |n| n.parent())
}

/// Pre-order walk of everything below `node`. Attributes are not descendants.
fn push_subtree<'a, N: DataSourceNode<'a>>(node: N, out: &mut Vec<N>) {
    let mut stack: Vec<N> = node.children().collect();
    stack.reverse();
    while let Some(current) = stack.pop() {
        out.push(current);
        let mark = stack.len();
        stack.extend(current.children());
        stack[mark..].reverse();
    }
}

fn is_attribute<'a, N: DataSourceNode<'a>>(node: N) -> bool {
    node.node_type() == NodeType::Attribute
}

fn siblings_before<'a, N: DataSourceNode<'a>>(node: N) -> Vec<N> {
    match node.parent() {
        Some(parent) if !is_attribute(node) => {
            parent.children().take_while(|s| *s != node).collect()
        }
        _ => Vec::new(),
    }
}

fn siblings_after<'a, N: DataSourceNode<'a>>(node: N) -> Vec<N> {
    match node.parent() {
        Some(parent) if !is_attribute(node) => parent
            .children()
            .skip_while(|s| *s != node)
            .skip(1)
            .collect(),
        _ => Vec::new(),
    }
}

/// Everything after `node` in document order except its own subtree: the later
/// siblings of `node` and of each ancestor, each with its subtree.
fn push_following<'a, N: DataSourceNode<'a>>(node: N, out: &mut Vec<N>) {
    // An attribute precedes the content of the element that owns it.
    if is_attribute(node) {
        if let Some(owner) = node.parent() {
            push_subtree(owner, out);
        }
    }
    let mut current = Some(node);
    while let Some(c) = current {
        for sibling in siblings_after(c) {
            out.push(sibling);
            push_subtree(sibling, out);
        }
        current = c.parent();
    }
}

/// Mirror of [`push_following`], nearest-first. Ancestors are never on this axis.
fn push_preceding<'a, N: DataSourceNode<'a>>(node: N, out: &mut Vec<N>) {
    let mut current = Some(node);
    while let Some(c) = current {
        for sibling in siblings_before(c).into_iter().rev() {
            let start = out.len();
            out.push(sibling);
            push_subtree(sibling, out);
            out[start..].reverse();
        }
        current = c.parent();
    }
}
