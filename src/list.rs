//! An ordered list of selectors (and raw scalar values) with bulk operations.

use crate::error::SelectorError;
use crate::pattern::{Pattern, extract_regex};
use crate::selector::{Scalar, Selector};
use std::ops::{Index, Range};

/// One element of a [`SelectorList`].
#[derive(Debug, Clone)]
pub enum ListItem {
    Selector(Selector),
    /// A value carried over from an earlier extraction rather than a document node.
    Raw(Scalar),
}

impl ListItem {
    pub fn as_selector(&self) -> Option<&Selector> {
        match self {
            ListItem::Selector(selector) => Some(selector),
            ListItem::Raw(_) => None,
        }
    }

    /// Runs `expr` against a selector; raw values produce nothing.
    pub fn query(&self, expr: &str) -> Result<SelectorList, SelectorError> {
        match self {
            ListItem::Selector(selector) => selector.query(expr),
            ListItem::Raw(_) => Ok(SelectorList::new()),
        }
    }

    pub fn extract(&self) -> String {
        match self {
            ListItem::Selector(selector) => selector.extract(),
            ListItem::Raw(scalar) => scalar.to_string(),
        }
    }

    pub fn extract_unquoted(&self) -> String {
        match self {
            ListItem::Selector(selector) => selector.extract_unquoted(),
            ListItem::Raw(scalar) => scalar.to_string(),
        }
    }

    pub fn re(&self, pattern: impl Pattern) -> Result<Vec<String>, SelectorError> {
        let regex = pattern.to_regex()?;
        Ok(extract_regex(&regex, &self.extract()))
    }

    pub fn is_truthy(&self) -> bool {
        !self.extract().is_empty()
    }
}

impl From<Selector> for ListItem {
    fn from(selector: Selector) -> Self {
        ListItem::Selector(selector)
    }
}

impl From<Scalar> for ListItem {
    fn from(scalar: Scalar) -> Self {
        ListItem::Raw(scalar)
    }
}

/// The result of a query: selectors in document order, possibly mixed with raw values
/// added by the caller.
#[derive(Debug, Clone, Default)]
pub struct SelectorList {
    items: Vec<ListItem>,
}

impl SelectorList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ListItem> {
        self.items.get(index)
    }

    pub fn first(&self) -> Option<&ListItem> {
        self.items.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ListItem> {
        self.items.iter()
    }

    /// The selector elements only, skipping raw values.
    pub fn selectors(&self) -> impl Iterator<Item = &Selector> {
        self.items.iter().filter_map(ListItem::as_selector)
    }

    pub fn push(&mut self, selector: Selector) {
        self.items.push(ListItem::Selector(selector));
    }

    pub fn push_raw(&mut self, value: Scalar) {
        self.items.push(ListItem::Raw(value));
    }

    /// A new list with the elements in `range`, clamped to the list bounds.
    pub fn slice(&self, range: Range<usize>) -> SelectorList {
        let end = range.end.min(self.items.len());
        let start = range.start.min(end);
        self.items[start..end].iter().cloned().collect()
    }

    /// Queries every element and concatenates the results, element by element.
    pub fn query(&self, expr: &str) -> Result<SelectorList, SelectorError> {
        let mut out = SelectorList::new();
        for item in &self.items {
            out.extend(item.query(expr)?);
        }
        Ok(out)
    }

    /// Shorthand for [`SelectorList::query`].
    pub fn x(&self, expr: &str) -> Result<SelectorList, SelectorError> {
        self.query(expr)
    }

    /// Applies `pattern` to every element and flattens the results. The pattern is
    /// compiled once.
    pub fn re(&self, pattern: impl Pattern) -> Result<Vec<String>, SelectorError> {
        let regex = pattern.to_regex()?;
        Ok(self
            .items
            .iter()
            .flat_map(|item| extract_regex(&regex, &item.extract()))
            .collect())
    }

    pub fn extract(&self) -> Vec<String> {
        self.items.iter().map(ListItem::extract).collect()
    }

    pub fn extract_unquoted(&self) -> Vec<String> {
        self.items.iter().map(ListItem::extract_unquoted).collect()
    }
}

impl Index<usize> for SelectorList {
    type Output = ListItem;

    fn index(&self, index: usize) -> &ListItem {
        &self.items[index]
    }
}

impl<T: Into<ListItem>> FromIterator<T> for SelectorList {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<T: Into<ListItem>> Extend<T> for SelectorList {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.items.extend(iter.into_iter().map(Into::into));
    }
}

impl IntoIterator for SelectorList {
    type Item = ListItem;
    type IntoIter = std::vec::IntoIter<ListItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'l> IntoIterator for &'l SelectorList {
    type Item = &'l ListItem;
    type IntoIter = std::slice::Iter<'l, ListItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> SelectorList {
        Selector::html("<p>a1</p><p>b2</p><p>c3</p>")
            .query("//p")
            .unwrap()
    }

    #[test]
    fn test_slice_clamps() {
        let list = items();
        assert_eq!(list.slice(1..3).extract(), vec!["<p>b2</p>", "<p>c3</p>"]);
        assert_eq!(list.slice(2..10).len(), 1);
        assert!(list.slice(5..9).is_empty());
    }

    #[test]
    fn test_raw_items() {
        let mut list = items();
        list.push_raw(Scalar::String("d4".into()));
        list.push_raw(Scalar::Number(5.0));

        assert_eq!(list.len(), 5);
        assert_eq!(list.selectors().count(), 3);
        assert_eq!(list.extract()[3..], ["d4", "5.0"]);
        assert_eq!(list.query("text()").unwrap().len(), 3);
        assert_eq!(list.re(r"\d").unwrap(), vec!["1", "2", "3", "4", "5", "0"]);
    }

    #[test]
    fn test_collect_from_selectors_and_scalars() {
        let root = Selector::html("<p>x</p>");
        let list: SelectorList = vec![ListItem::from(root.clone()), Scalar::Boolean(true).into()]
            .into_iter()
            .collect();
        assert_eq!(list.len(), 2);
        assert!(list[0].as_selector().is_some());
        assert_eq!(list[1].extract(), "true");
        assert!(list[1].query("//p").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_pattern_is_reported_once() {
        assert!(matches!(items().re("("), Err(SelectorError::InvalidPattern(_))));
        assert!(matches!(SelectorList::new().re("("), Err(SelectorError::InvalidPattern(_))));
    }
}
