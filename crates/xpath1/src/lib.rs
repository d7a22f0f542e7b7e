//! XPath 1.0 for any tree that implements [`DataSourceNode`].
//!
//! Expressions are parsed once with [`parse_expression`] and evaluated with [`evaluate`]
//! against an [`EvaluationContext`] that carries the context node and namespace bindings.

pub mod ast;
pub mod axes;
pub mod datasource;
pub mod engine;
pub mod error;
pub mod functions;
pub mod operators;
pub mod parser;

pub use ast::{Axis, BinaryOperator, Expression, LocationPath, NodeTest, PathStart, Step};
pub use datasource::{DataSourceNode, NodeType, QName};
pub use engine::{
    EvaluationContext, XML_NAMESPACE, XPathValue, evaluate, format_number, string_to_number,
};
pub use error::XPathError;
pub use parser::parse_expression;
