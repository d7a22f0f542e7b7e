//! XPath selectors over HTML and XML documents.
//!
//! A [`Selector`] is bound to one node of a parsed document. Querying it with an XPath
//! expression yields a [`SelectorList`] of further selectors, which can be queried again,
//! extracted as text, or filtered with a regular expression.
//!
//! ```
//! use xsel::{ParseMode, Response, Selector};
//!
//! let response = Response::from_text("<html><title>Issue 42</title></html>")
//!     .with_url("http://example.com/");
//! let root = Selector::from_source(&response, ParseMode::Html).unwrap();
//!
//! let titles = root.query("//title/text()").unwrap();
//! assert_eq!(titles.extract(), vec!["Issue 42"]);
//! assert_eq!(titles.re(r"\d+").unwrap(), vec!["42"]);
//! ```

pub mod config;
pub mod document;
pub mod entities;
pub mod error;
pub mod list;
pub mod mode;
pub mod pattern;
pub mod selector;
pub mod source;

pub use config::ParseOptions;
pub use document::DocumentHandle;
pub use error::SelectorError;
pub use list::{ListItem, SelectorList};
pub use mode::ParseMode;
pub use pattern::Pattern;
pub use selector::{Scalar, Selector, SelectorNode};
pub use source::{DocumentCache, Response, Source};
