// src/error.rs
use crate::mode::ParseMode;
use thiserror::Error;
use xsel_dom::NodeId;
use xsel_xpath1::XPathError;

/// Errors surfaced by selector construction and queries.
#[derive(Error, Debug)]
pub enum SelectorError {
    /// The markup could not be parsed in the requested mode. Only strict XML fails.
    #[error("Failed to parse document as {mode}: {message}")]
    Parse { mode: ParseMode, message: String },

    /// The expression is malformed or could not be evaluated.
    #[error("Invalid XPath '{expr}': {source}")]
    InvalidQuery {
        expr: String,
        #[source]
        source: XPathError,
    },

    /// A context node id that does not belong to the document.
    #[error("Node {0} is not part of this document")]
    UnknownNode(NodeId),

    /// A pattern passed to `re` as text is not a valid regular expression.
    #[error("Invalid regular expression: {0}")]
    InvalidPattern(#[from] regex::Error),
}

impl SelectorError {
    pub(crate) fn invalid_query(expr: &str, source: XPathError) -> Self {
        SelectorError::InvalidQuery {
            expr: expr.to_string(),
            source,
        }
    }

    /// The offending expression, for query errors.
    pub fn expr(&self) -> Option<&str> {
        match self {
            SelectorError::InvalidQuery { expr, .. } => Some(expr),
            _ => None,
        }
    }
}
