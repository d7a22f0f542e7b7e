//! An owned, immutable markup tree for XPath selection.
//!
//! Both strict XML (via `roxmltree`) and forgiving HTML (via `scraper`/`html5ever`) are
//! lowered into the same arena [`Document`], whose node ids follow document order.

pub mod document;
pub mod error;
pub mod html;
pub mod serialize;
pub mod xml;

pub use document::{Document, Name, NodeId, NodeKind, NodeRef};
pub use error::DomError;
pub use serialize::Flavor;
pub use xml::XmlOptions;
