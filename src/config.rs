//! Options applied when a document is built.

use crate::mode::ParseMode;
use xsel_dom::XmlOptions;

/// Build-time options. Construct with [`ParseOptions::new`] or `default()` and refine with
/// the `with_*` methods.
///
/// ```
/// use xsel::{ParseMode, ParseOptions};
///
/// let options = ParseOptions::new()
///     .with_mode(ParseMode::Xml)
///     .with_namespace("atom", "http://www.w3.org/2005/Atom");
/// assert_eq!(options.mode, ParseMode::Xml);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    pub mode: ParseMode,
    /// XML only. Documents with a DTD are rejected unless this is set.
    pub allow_dtd: bool,
    /// XML only. Upper bound on the number of nodes the parser will create.
    pub nodes_limit: u32,
    /// Prefix bindings registered on every handle built with these options.
    pub namespaces: Vec<(String, String)>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        let xml = XmlOptions::default();
        Self {
            mode: ParseMode::default(),
            allow_dtd: xml.allow_dtd,
            nodes_limit: xml.nodes_limit,
            namespaces: Vec::new(),
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: ParseMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_allow_dtd(mut self, allow_dtd: bool) -> Self {
        self.allow_dtd = allow_dtd;
        self
    }

    pub fn with_nodes_limit(mut self, nodes_limit: u32) -> Self {
        self.nodes_limit = nodes_limit;
        self
    }

    pub fn with_namespace(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.namespaces.push((prefix.into(), uri.into()));
        self
    }

    pub(crate) fn xml_options(&self) -> XmlOptions {
        XmlOptions {
            allow_dtd: self.allow_dtd,
            nodes_limit: self.nodes_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_the_xml_parser() {
        let options = ParseOptions::default();
        assert_eq!(options.mode, ParseMode::Html);
        assert_eq!(options.xml_options(), XmlOptions::default());
        assert!(options.namespaces.is_empty());
    }

    #[test]
    fn test_builder_methods() {
        let options = ParseOptions::new()
            .with_mode(ParseMode::Xml)
            .with_allow_dtd(true)
            .with_nodes_limit(10)
            .with_namespace("a", "urn:a");
        assert_eq!(options.mode, ParseMode::Xml);
        assert!(options.xml_options().allow_dtd);
        assert_eq!(options.xml_options().nodes_limit, 10);
        assert_eq!(options.namespaces, vec![("a".to_string(), "urn:a".to_string())]);
    }
}
