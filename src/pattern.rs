//! Regular-expression post-filtering of extracted text.

use crate::entities::remove_entities;
use crate::error::SelectorError;
use regex::Regex;
use std::borrow::Cow;

/// Group name that, when present, selects a single value from the first match.
pub const EXTRACT_GROUP: &str = "extract";

/// Entities left encoded in regex results so the output stays unambiguous markup text.
const KEPT_ENTITIES: &[&str] = &["lt", "amp"];

/// Anything `re()` accepts: pattern text (compiled on use) or a compiled [`Regex`].
pub trait Pattern {
    fn to_regex(&self) -> Result<Cow<'_, Regex>, SelectorError>;
}

impl Pattern for str {
    fn to_regex(&self) -> Result<Cow<'_, Regex>, SelectorError> {
        Ok(Cow::Owned(Regex::new(self)?))
    }
}

impl Pattern for String {
    fn to_regex(&self) -> Result<Cow<'_, Regex>, SelectorError> {
        self.as_str().to_regex()
    }
}

impl Pattern for Regex {
    fn to_regex(&self) -> Result<Cow<'_, Regex>, SelectorError> {
        Ok(Cow::Borrowed(self))
    }
}

impl<P: Pattern + ?Sized> Pattern for &P {
    fn to_regex(&self) -> Result<Cow<'_, Regex>, SelectorError> {
        (**self).to_regex()
    }
}

/// Applies `regex` to `text`:
///
/// - with a group named `extract`, that group of the first match only;
/// - with no groups, every full match;
/// - with one group, that group of every match;
/// - with several groups, every group of every match in order, `""` for groups that
///   did not participate.
///
/// Each result has HTML entities decoded, except `&lt;` and `&amp;`.
pub fn extract_regex(regex: &Regex, text: &str) -> Vec<String> {
    let raw: Vec<&str> = if regex.capture_names().any(|n| n == Some(EXTRACT_GROUP)) {
        regex
            .captures(text)
            .and_then(|caps| caps.name(EXTRACT_GROUP))
            .map(|m| vec![m.as_str()])
            .unwrap_or_default()
    } else {
        match regex.captures_len() - 1 {
            0 => regex.find_iter(text).map(|m| m.as_str()).collect(),
            groups => regex
                .captures_iter(text)
                .flat_map(|caps| {
                    (1..=groups)
                        .map(|i| caps.get(i).map_or("", |m| m.as_str()))
                        .collect::<Vec<_>>()
                })
                .collect(),
        }
    };
    raw.into_iter()
        .map(|s| remove_entities(s, KEPT_ENTITIES))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn re(pattern: &str, text: &str) -> Vec<String> {
        extract_regex(&Regex::new(pattern).unwrap(), text)
    }

    #[test]
    fn test_full_matches_without_groups() {
        assert_eq!(re(r"\d+", "a1 b22 c333"), vec!["1", "22", "333"]);
    }

    #[test]
    fn test_single_group_per_match() {
        assert_eq!(re(r"id=(\d+)", "id=1&id=2"), vec!["1", "2"]);
    }

    #[test]
    fn test_multiple_groups_are_flattened() {
        assert_eq!(
            re(r"(\w)=(\d)?", "a=1 b= c=3"),
            vec!["a", "1", "b", "", "c", "3"]
        );
    }

    #[test]
    fn test_extract_group_takes_first_match_only() {
        assert_eq!(
            re(r"price: (?P<extract>\d+)(\w*)", "price: 10usd price: 20eur"),
            vec!["10"]
        );
        assert!(re(r"(?P<extract>\d+)", "no digits").is_empty());
    }

    #[test]
    fn test_entities_in_results() {
        assert_eq!(
            re(r".+", "Fish &amp; Chips &eacute; &lt;3 &gt;"),
            vec!["Fish &amp; Chips é &lt;3 >"]
        );
    }

    #[test]
    fn test_pattern_sources() {
        let compiled = Regex::new("a").unwrap();
        assert!(compiled.to_regex().is_ok());
        assert!((&compiled).to_regex().is_ok());
        assert!("b+".to_regex().is_ok());
        assert!(String::from("c").to_regex().is_ok());
        assert!(matches!(
            "(".to_regex(),
            Err(SelectorError::InvalidPattern(_))
        ));
    }
}
