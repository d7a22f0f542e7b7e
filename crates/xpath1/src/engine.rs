//! Tree-walking evaluation of a parsed [`Expression`] over any [`DataSourceNode`].
//!
//! Each step runs per context node: axis collection, node test, then predicates with
//! positions in axis order. Results from several context nodes are merged in document order.

use super::ast::{Axis, BinaryOperator, Expression, LocationPath, NodeTest, PathStart, Step};
use super::{axes, functions, operators};
use crate::datasource::{DataSourceNode, NodeType};
use crate::error::XPathError;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

/// The namespace bound to the `xml` prefix in every document.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// The four XPath 1.0 value types. Node-sets are in document order.
#[derive(Debug, Clone)]
pub enum XPathValue<N> {
    NodeSet(Vec<N>),
    String(String),
    Number(f64),
    Boolean(bool),
}

impl<'a, N: DataSourceNode<'a>> XPathValue<N> {
    /// `boolean()`: a node-set is true when non-empty, a number when neither zero nor NaN.
    pub fn to_bool(&self) -> bool {
        match self {
            XPathValue::Boolean(b) => *b,
            XPathValue::Number(n) => !(n.is_nan() || *n == 0.0),
            XPathValue::String(text) => !text.is_empty(),
            XPathValue::NodeSet(nodes) => !nodes.is_empty(),
        }
    }

    /// `number()`, going through the string value for strings and node-sets.
    pub fn to_number(&self) -> f64 {
        match self {
            XPathValue::Number(n) => *n,
            XPathValue::Boolean(true) => 1.0,
            XPathValue::Boolean(false) => 0.0,
            XPathValue::String(text) => string_to_number(text),
            XPathValue::NodeSet(nodes) => string_to_number(&first_string_value(nodes)),
        }
    }
}

/// The string value of the first node in document order, or "" for an empty set.
fn first_string_value<'a, N: DataSourceNode<'a>>(nodes: &[N]) -> String {
    nodes
        .first()
        .map(|n| n.string_value())
        .unwrap_or_default()
}

/// Reads a number the way `number()` does: optional whitespace around an optional minus
/// sign and decimal digits with at most one point. Exponents, `+` and `Infinity` are NaN.
pub fn string_to_number(text: &str) -> f64 {
    let trimmed = text.trim_matches(|c: char| matches!(c, ' ' | '\t' | '\r' | '\n'));
    let unsigned = trimmed.strip_prefix('-').unwrap_or(trimmed);
    let well_formed = unsigned.chars().any(|c| c.is_ascii_digit())
        && unsigned.chars().all(|c| c.is_ascii_digit() || c == '.')
        && unsigned.matches('.').count() <= 1;
    if well_formed {
        trimmed.parse().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

impl<N> XPathValue<N> {
    /// Maps the nodes of a node-set, leaving scalar values untouched.
    pub fn map_nodes<M>(self, f: impl FnMut(N) -> M) -> XPathValue<M> {
        match self {
            XPathValue::NodeSet(nodes) => XPathValue::NodeSet(nodes.into_iter().map(f).collect()),
            XPathValue::String(s) => XPathValue::String(s),
            XPathValue::Number(n) => XPathValue::Number(n),
            XPathValue::Boolean(b) => XPathValue::Boolean(b),
        }
    }
}

/// Formats a number the way the XPath `string()` function does.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        // -0 prints as 0
        "0".to_string()
    } else {
        format!("{}", n)
    }
}

/// `string()` of the value.
impl<'a, N: DataSourceNode<'a>> fmt::Display for XPathValue<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XPathValue::String(text) => f.write_str(text),
            XPathValue::Number(n) => f.write_str(&format_number(*n)),
            XPathValue::Boolean(b) => write!(f, "{}", b),
            XPathValue::NodeSet(nodes) => f.write_str(&first_string_value(nodes)),
        }
    }
}

/// A container for all state needed during expression evaluation.
/// `'a` is the lifetime of the underlying data source.
/// `'d` is the lifetime of the borrowed namespace table.
pub struct EvaluationContext<'a, 'd, N: DataSourceNode<'a>> {
    pub context_node: N,
    pub root_node: N,
    pub context_position: usize, // 1-based index
    pub context_size: usize,
    /// Prefix to namespace URI bindings usable in name tests.
    pub namespaces: &'d HashMap<String, String>,
    _marker: PhantomData<&'a ()>,
}

impl<'a, 'd, N: DataSourceNode<'a>> EvaluationContext<'a, 'd, N> {
    pub fn new(
        context_node: N,
        root_node: N,
        context_position: usize,
        context_size: usize,
        namespaces: &'d HashMap<String, String>,
    ) -> Self {
        Self {
            context_node,
            root_node,
            context_position,
            context_size,
            namespaces,
            _marker: PhantomData,
        }
    }

    /// A context for evaluating a top-level expression at `node`.
    pub fn at(node: N, root_node: N, namespaces: &'d HashMap<String, String>) -> Self {
        Self::new(node, root_node, 1, 1, namespaces)
    }

    fn with_focus(&self, node: N, position: usize, size: usize) -> Self {
        Self::new(node, self.root_node, position, size, self.namespaces)
    }

    fn resolve_prefix(&self, prefix: &str) -> Result<&'d str, XPathError> {
        match self.namespaces.get(prefix) {
            Some(uri) => Ok(uri.as_str()),
            None if prefix == "xml" => Ok(XML_NAMESPACE),
            None => Err(XPathError::UnknownPrefix(prefix.to_string())),
        }
    }
}

/// Evaluates a compiled expression and returns a concrete `XPathValue`.
pub fn evaluate<'a, N>(
    expr: &Expression,
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<XPathValue<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    match expr {
        Expression::Literal(s) => Ok(XPathValue::String(s.clone())),
        Expression::Number(n) => Ok(XPathValue::Number(*n)),
        Expression::Path(path) => Ok(XPathValue::NodeSet(evaluate_location_path(path, e_ctx)?)),
        Expression::Variable(name) => Err(XPathError::UnknownVariable(name.clone())),
        Expression::Call { name, args } => {
            let values = args
                .iter()
                .map(|arg| evaluate(arg, e_ctx))
                .collect::<Result<Vec<_>, _>>()?;
            functions::evaluate_function(name, values, e_ctx)
        }
        Expression::Filter {
            primary,
            predicates,
        } => {
            let mut nodes = node_set(evaluate(primary, e_ctx)?, "Predicates")?;
            nodes.sort();
            nodes.dedup();
            Ok(XPathValue::NodeSet(apply_predicates(
                &nodes, predicates, e_ctx,
            )?))
        }
        // `or` and `and` do not evaluate their right side when the left decides.
        Expression::Binary {
            op: BinaryOperator::Or,
            lhs,
            rhs,
        } => Ok(XPathValue::Boolean(
            evaluate(lhs, e_ctx)?.to_bool() || evaluate(rhs, e_ctx)?.to_bool(),
        )),
        Expression::Binary {
            op: BinaryOperator::And,
            lhs,
            rhs,
        } => Ok(XPathValue::Boolean(
            evaluate(lhs, e_ctx)?.to_bool() && evaluate(rhs, e_ctx)?.to_bool(),
        )),
        Expression::Binary { op, lhs, rhs } => {
            operators::evaluate(*op, evaluate(lhs, e_ctx)?, evaluate(rhs, e_ctx)?)
        }
        Expression::Negate(operand) => Ok(XPathValue::Number(-evaluate(operand, e_ctx)?.to_number())),
    }
}

fn node_set<N: fmt::Debug>(value: XPathValue<N>, what: &str) -> Result<Vec<N>, XPathError> {
    match value {
        XPathValue::NodeSet(nodes) => Ok(nodes),
        other => Err(XPathError::TypeError(format!(
            "{} need a node-set, got {:?}",
            what, other
        ))),
    }
}

fn evaluate_location_path<'a, N>(
    path: &LocationPath,
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<Vec<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    let mut current_nodes = match &path.start {
        PathStart::Context => vec![e_ctx.context_node],
        PathStart::Root => vec![e_ctx.root_node],
        PathStart::Expression(start) => node_set(evaluate(start, e_ctx)?, "Path steps")?,
    };
    for step in &path.steps {
        current_nodes = evaluate_step(step, &current_nodes, e_ctx)?;
    }
    Ok(current_nodes)
}

/// Evaluates one step for every context node and merges the results in document order.
///
/// Predicates see positions relative to each context node's own axis, so `//ul/li[1]`
/// selects the first item of every list rather than the first item in the document.
fn evaluate_step<'a, N>(
    step: &Step,
    context_nodes: &[N],
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<Vec<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    let test = ResolvedTest::resolve(&step.test, step.axis, e_ctx)?;

    let mut merged = Vec::new();
    for &node in context_nodes {
        let axis_nodes = axes::collect(step.axis, node);
        let tested_nodes: Vec<N> = axis_nodes
            .into_iter()
            .filter(|n| test.matches(n))
            .collect();
        merged.extend(apply_predicates(&tested_nodes, &step.predicates, e_ctx)?);
    }

    if context_nodes.len() > 1 || step.axis.is_reverse() {
        merged.sort();
        merged.dedup();
    }
    Ok(merged)
}

/// A node test with its namespace prefix already resolved.
enum ResolvedTest<'t> {
    Name {
        namespace: Option<&'t str>,
        local: &'t str,
        principal: NodeType,
    },
    Namespace {
        namespace: &'t str,
        principal: NodeType,
    },
    Principal(NodeType),
    Kind(NodeType),
    Target(&'t str),
    AnyNode,
}

impl<'t> ResolvedTest<'t> {
    fn resolve<'a, N: DataSourceNode<'a>>(
        test: &'t NodeTest,
        axis: Axis,
        e_ctx: &EvaluationContext<'a, 't, N>,
    ) -> Result<Self, XPathError> {
        let principal = if axis == Axis::Attribute {
            NodeType::Attribute
        } else {
            NodeType::Element
        };
        Ok(match test {
            NodeTest::Any => ResolvedTest::Principal(principal),
            NodeTest::AnyInNamespace(prefix) => ResolvedTest::Namespace {
                namespace: e_ctx.resolve_prefix(prefix)?,
                principal,
            },
            NodeTest::Name { prefix, local } => ResolvedTest::Name {
                namespace: match prefix {
                    Some(prefix) => Some(e_ctx.resolve_prefix(prefix)?),
                    None => None,
                },
                local: local.as_str(),
                principal,
            },
            NodeTest::Text => ResolvedTest::Kind(NodeType::Text),
            NodeTest::Comment => ResolvedTest::Kind(NodeType::Comment),
            NodeTest::ProcessingInstruction(None) => {
                ResolvedTest::Kind(NodeType::ProcessingInstruction)
            }
            NodeTest::ProcessingInstruction(Some(target)) => ResolvedTest::Target(target.as_str()),
            NodeTest::Node => ResolvedTest::AnyNode,
        })
    }

    fn matches<'a, N: DataSourceNode<'a>>(&self, node: &N) -> bool {
        match self {
            ResolvedTest::Principal(principal) => node.node_type() == *principal,
            ResolvedTest::Namespace {
                namespace,
                principal,
            } => node.node_type() == *principal && node.namespace_uri() == Some(*namespace),
            ResolvedTest::Name {
                namespace,
                local,
                principal,
            } => {
                node.node_type() == *principal
                    && node.namespace_uri() == *namespace
                    && node.name().is_some_and(|q| q.local_part == *local)
            }
            ResolvedTest::Kind(kind) => node.node_type() == *kind,
            ResolvedTest::Target(target) => {
                node.node_type() == NodeType::ProcessingInstruction
                    && node.name().is_some_and(|q| q.local_part == *target)
            }
            ResolvedTest::AnyNode => true,
        }
    }
}

/// Filters nodes, given in axis order, through each predicate in turn. Every predicate
/// renumbers the survivors of the previous one.
fn apply_predicates<'a, N>(
    nodes: &[N],
    predicates: &[Expression],
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<Vec<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    let mut survivors = nodes.to_vec();
    for predicate in predicates {
        let size = survivors.len();
        let mut kept = Vec::with_capacity(size);
        for (position, node) in (1..).zip(survivors) {
            let focus = e_ctx.with_focus(node, position, size);
            if predicate_holds(evaluate(predicate, &focus)?, position) {
                kept.push(node);
            }
        }
        survivors = kept;
    }
    Ok(survivors)
}

/// A number selects by position; any other value is converted to a boolean.
fn predicate_holds<'a, N: DataSourceNode<'a>>(value: XPathValue<N>, position: usize) -> bool {
    match value {
        XPathValue::Number(n) => n == position as f64,
        other => other.to_bool(),
    }
}
