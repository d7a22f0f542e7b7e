use std::fmt;

/// How raw markup is turned into a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParseMode {
    /// Forgiving, browser-style parsing. Never fails.
    #[default]
    Html,
    /// Strict, well-formed XML with namespaces.
    Xml,
}

impl ParseMode {
    /// The selector variant name used in diagnostics.
    pub fn selector_name(&self) -> &'static str {
        match self {
            ParseMode::Html => "HtmlSelector",
            ParseMode::Xml => "XmlSelector",
        }
    }
}

impl fmt::Display for ParseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ParseMode::Html => "HTML",
            ParseMode::Xml => "XML",
        })
    }
}
