use thiserror::Error;

/// Errors raised while building a [`Document`](crate::Document).
#[derive(Error, Debug)]
pub enum DomError {
    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),
}
