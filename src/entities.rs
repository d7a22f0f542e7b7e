//! HTML character entity decoding for regex results.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#?)(x?)(\w+);").expect("entity pattern is valid"));

/// Decodes numeric (`&#233;`, `&#xE9;`) and named (`&eacute;`) entities.
///
/// Entities named in `keep` are left untouched. Unknown names and numeric references
/// that are not valid characters are removed.
pub fn remove_entities(text: &str, keep: &[&str]) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    ENTITY
        .replace_all(text, |caps: &Captures<'_>| {
            let reference = &caps[0];
            if &caps[1] == "#" {
                let radix = if caps[2].is_empty() { 10 } else { 16 };
                let valid = u32::from_str_radix(&caps[3], radix)
                    .ok()
                    .and_then(char::from_u32)
                    .is_some();
                if !valid {
                    return String::new();
                }
            } else {
                // A named entity never has the `x` group; it is part of the name.
                let name = &reference[1..reference.len() - 1];
                if keep.contains(&name) {
                    return reference.to_string();
                }
            }
            let decoded = html_escape::decode_html_entities(reference);
            if decoded == reference {
                String::new()
            } else {
                decoded.into_owned()
            }
        })
        .into_owned()
}
