//! Syntax tree for XPath 1.0 expressions, as produced by
//! [`parse_expression`](crate::parse_expression).

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(String),
    Number(f64),
    Variable(String),
    Path(LocationPath),
    Call {
        name: String,
        args: Vec<Expression>,
    },
    /// A primary expression narrowed by predicates, e.g. `(//a)[1]`.
    Filter {
        primary: Box<Expression>,
        predicates: Vec<Expression>,
    },
    Binary {
        op: BinaryOperator,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
    /// Unary minus.
    Negate(Box<Expression>),
}

impl Expression {
    pub fn binary(op: BinaryOperator, lhs: Expression, rhs: Expression) -> Self {
        Expression::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Or,
    And,
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
    Union,
}

/// Where a location path begins.
#[derive(Debug, Clone, PartialEq)]
pub enum PathStart {
    /// A relative path such as `a/b`.
    Context,
    /// An absolute path such as `/a` or `//a`.
    Root,
    /// A path continuing from another expression: `$v/a`, `(//a)[1]/b`, `id('x')/b`.
    Expression(Box<Expression>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationPath {
    pub start: PathStart,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub axis: Axis,
    pub test: NodeTest,
    pub predicates: Vec<Expression>,
}

impl Step {
    pub fn new(axis: Axis, test: NodeTest) -> Self {
        Self {
            axis,
            test,
            predicates: Vec::new(),
        }
    }

    /// The step `//` expands to: `descendant-or-self::node()`.
    pub fn descendant_or_self() -> Self {
        Self::new(Axis::DescendantOrSelf, NodeTest::Node)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Child,
    Descendant,
    DescendantOrSelf,
    Attribute,
    Namespace,
    Parent,
    Ancestor,
    AncestorOrSelf,
    SelfAxis,
    FollowingSibling,
    PrecedingSibling,
    Following,
    Preceding,
}

impl Axis {
    /// Looks an axis up by the name used before `::`.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "child" => Axis::Child,
            "descendant" => Axis::Descendant,
            "descendant-or-self" => Axis::DescendantOrSelf,
            "attribute" => Axis::Attribute,
            "namespace" => Axis::Namespace,
            "parent" => Axis::Parent,
            "ancestor" => Axis::Ancestor,
            "ancestor-or-self" => Axis::AncestorOrSelf,
            "self" => Axis::SelfAxis,
            "following-sibling" => Axis::FollowingSibling,
            "preceding-sibling" => Axis::PrecedingSibling,
            "following" => Axis::Following,
            "preceding" => Axis::Preceding,
            _ => return None,
        })
    }

    /// Reverse axes number their nodes for predicates in reverse document order.
    pub fn is_reverse(self) -> bool {
        matches!(
            self,
            Axis::Ancestor | Axis::AncestorOrSelf | Axis::Preceding | Axis::PrecedingSibling
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeTest {
    /// `local` or `prefix:local`.
    Name {
        prefix: Option<String>,
        local: String,
    },
    /// `*`
    Any,
    /// `prefix:*`
    AnyInNamespace(String),
    /// `text()`
    Text,
    /// `comment()`
    Comment,
    /// `node()`
    Node,
    /// `processing-instruction()`, optionally with a target literal.
    ProcessingInstruction(Option<String>),
}

impl NodeTest {
    /// A name test from a possibly prefixed name.
    pub fn name(qualified: &str) -> Self {
        match qualified.split_once(':') {
            Some((prefix, local)) => NodeTest::Name {
                prefix: Some(prefix.to_string()),
                local: local.to_string(),
            },
            None => NodeTest::Name {
                prefix: None,
                local: qualified.to_string(),
            },
        }
    }
}
