use thiserror::Error;

/// Failures while parsing or evaluating an expression.
#[derive(Error, Debug, Clone)]
pub enum XPathError {
    /// The expression text and a description of where parsing stopped.
    #[error("invalid expression '{0}': {1}")]
    XPathParse(String, String),

    #[error("{function}(): {message}")]
    FunctionError { function: String, message: String },

    /// An operand had the wrong kind of value, e.g. a path continuing from a string.
    #[error("type mismatch: {0}")]
    TypeError(String),

    /// Variables are never bound, so any reference fails.
    #[error("no binding for variable ${0}")]
    UnknownVariable(String),

    #[error("namespace prefix '{0}' is not bound")]
    UnknownPrefix(String),
}
