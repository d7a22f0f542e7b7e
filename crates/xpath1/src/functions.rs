//! Built-in implementations of the XPath 1.0 core function library.

use super::engine::{EvaluationContext, XPathValue, string_to_number};
use crate::datasource::{DataSourceNode, NodeType};
use crate::error::XPathError;
use std::collections::HashSet;

/// Accepted argument counts for each core function. `None` as the upper bound means variadic.
fn arity(name: &str) -> Option<(usize, Option<usize>)> {
    let bounds = match name {
        "last" | "position" | "true" | "false" => (0, Some(0)),
        "string" | "local-name" | "name" | "namespace-uri" | "string-length"
        | "normalize-space" | "number" => (0, Some(1)),
        "count" | "id" | "not" | "boolean" | "lang" | "sum" | "floor" | "ceiling" | "round" => {
            (1, Some(1))
        }
        "starts-with" | "contains" | "substring-before" | "substring-after" => (2, Some(2)),
        "substring" => (2, Some(3)),
        "translate" => (3, Some(3)),
        "concat" => (2, None),
        _ => return None,
    };
    Some(bounds)
}

fn function_error(name: &str, message: impl Into<String>) -> XPathError {
    XPathError::FunctionError {
        function: format!("{}()", name),
        message: message.into(),
    }
}

/// Dispatches a function call to the correct implementation after checking its arity.
pub fn evaluate_function<'a, N: DataSourceNode<'a>>(
    name: &str,
    args: Vec<XPathValue<N>>,
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<XPathValue<N>, XPathError> {
    let Some((min, max)) = arity(name) else {
        return Err(function_error(name, "Unknown XPath function"));
    };
    if args.len() < min || max.is_some_and(|max| args.len() > max) {
        let expected = match max {
            Some(max) if max == min => format!("Expected {} argument(s)", min),
            Some(max) => format!("Expected {} to {} arguments", min, max),
            None => format!("Expected at least {} arguments", min),
        };
        return Err(function_error(name, format!("{}, got {}", expected, args.len())));
    }

    let mut args = args.into_iter();
    // The first argument, or the context node when it is optional and omitted.
    let string_or_context = |args: &mut std::vec::IntoIter<XPathValue<N>>| {
        args.next()
            .map(|v| v.to_string())
            .unwrap_or_else(|| e_ctx.context_node.string_value())
    };

    let value = match name {
        // Node-set
        "last" => XPathValue::Number(e_ctx.context_size as f64),
        "position" => XPathValue::Number(e_ctx.context_position as f64),
        "count" => XPathValue::Number(node_set_arg(name, args.next())?.len() as f64),
        "id" => func_id(args.next(), e_ctx),
        "local-name" | "name" | "namespace-uri" => {
            let node = match args.next() {
                None => Some(e_ctx.context_node),
                Some(v) => node_set_arg(name, Some(v))?.first().copied(),
            };
            XPathValue::String(node.map(|n| node_name(name, n)).unwrap_or_default())
        }

        // String
        "string" => XPathValue::String(string_or_context(&mut args)),
        "concat" => XPathValue::String(args.map(|v| v.to_string()).collect()),
        "starts-with" | "contains" | "substring-before" | "substring-after" => {
            let haystack = string_or_context(&mut args);
            let needle = string_or_context(&mut args);
            string_search(name, &haystack, &needle)
        }
        "substring" => {
            let s = string_or_context(&mut args);
            let start = args.next().map(|v| v.to_number()).unwrap_or(f64::NAN);
            let length = args.next().map(|v| v.to_number());
            XPathValue::String(substring(&s, start, length))
        }
        "string-length" => XPathValue::Number(string_or_context(&mut args).chars().count() as f64),
        "normalize-space" => XPathValue::String(
            string_or_context(&mut args)
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" "),
        ),
        "translate" => {
            let source = string_or_context(&mut args);
            let from: Vec<char> = string_or_context(&mut args).chars().collect();
            let to: Vec<char> = string_or_context(&mut args).chars().collect();
            XPathValue::String(translate(&source, &from, &to))
        }

        // Boolean
        "boolean" => XPathValue::Boolean(args.next().is_some_and(|v| v.to_bool())),
        "not" => XPathValue::Boolean(!args.next().is_some_and(|v| v.to_bool())),
        "true" => XPathValue::Boolean(true),
        "false" => XPathValue::Boolean(false),
        "lang" => XPathValue::Boolean(func_lang(&string_or_context(&mut args), e_ctx)),

        // Number
        "number" => XPathValue::Number(match args.next() {
            Some(v) => v.to_number(),
            None => XPathValue::NodeSet(vec![e_ctx.context_node]).to_number(),
        }),
        "sum" => XPathValue::Number(
            node_set_arg(name, args.next())?
                .iter()
                .map(|n| string_to_number(&n.string_value()))
                .sum(),
        ),
        "floor" => XPathValue::Number(number_arg(args.next()).floor()),
        "ceiling" => XPathValue::Number(number_arg(args.next()).ceil()),
        "round" => XPathValue::Number(round(number_arg(args.next()))),
        _ => return Err(function_error(name, "Unknown XPath function")),
    };
    Ok(value)
}

fn node_set_arg<'a, N: DataSourceNode<'a>>(
    name: &str,
    arg: Option<XPathValue<N>>,
) -> Result<Vec<N>, XPathError> {
    match arg {
        Some(XPathValue::NodeSet(nodes)) => Ok(nodes),
        Some(v) => Err(XPathError::TypeError(format!(
            "{}() argument must be a node-set, got {:?}",
            name, v
        ))),
        None => Ok(Vec::new()),
    }
}

fn number_arg<'a, N: DataSourceNode<'a>>(arg: Option<XPathValue<N>>) -> f64 {
    arg.map(|v| v.to_number()).unwrap_or(f64::NAN)
}

fn node_name<'a, N: DataSourceNode<'a>>(function: &str, node: N) -> String {
    match function {
        "namespace-uri" => node.namespace_uri().unwrap_or_default().to_string(),
        "local-name" => node
            .name()
            .map(|q| q.local_part.to_string())
            .unwrap_or_default(),
        _ => node
            .name()
            .map(|q| match q.prefix {
                Some(prefix) => format!("{}:{}", prefix, q.local_part),
                None => q.local_part.to_string(),
            })
            .unwrap_or_default(),
    }
}

fn func_id<'a, N: DataSourceNode<'a>>(
    arg: Option<XPathValue<N>>,
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> XPathValue<N> {
    let id_string = match arg {
        Some(XPathValue::NodeSet(nodes)) => nodes
            .iter()
            .map(|n| n.string_value())
            .collect::<Vec<_>>()
            .join(" "),
        Some(v) => v.to_string(),
        None => String::new(),
    };
    let wanted: HashSet<&str> = id_string.split_whitespace().collect();
    if wanted.is_empty() {
        return XPathValue::NodeSet(vec![]);
    }

    let mut results = Vec::new();
    let mut stack: Vec<N> = e_ctx.root_node.children().collect();
    while let Some(node) = stack.pop() {
        if node.node_type() == NodeType::Element {
            let has_id = node.attributes().any(|attr| {
                attr.name()
                    .is_some_and(|q| q.local_part == "id" && matches!(q.prefix, None | Some("xml")))
                    && wanted.contains(attr.string_value().as_str())
            });
            if has_id {
                results.push(node);
            }
        }
        stack.extend(node.children());
    }
    results.sort();
    XPathValue::NodeSet(results)
}

fn string_search<N>(function: &str, haystack: &str, needle: &str) -> XPathValue<N> {
    match function {
        "starts-with" => XPathValue::Boolean(haystack.starts_with(needle)),
        "contains" => XPathValue::Boolean(haystack.contains(needle)),
        "substring-before" => XPathValue::String(
            haystack
                .find(needle)
                .map(|i| haystack[..i].to_string())
                .unwrap_or_default(),
        ),
        _ => XPathValue::String(
            haystack
                .find(needle)
                .map(|i| haystack[i + needle.len()..].to_string())
                .unwrap_or_default(),
        ),
    }
}

/// XPath `substring()`: 1-based character positions with rounded bounds. NaN bounds select nothing.
fn substring(s: &str, start: f64, length: Option<f64>) -> String {
    let first = round(start);
    let last = length.map_or(f64::INFINITY, |l| first + round(l));
    s.chars()
        .enumerate()
        .filter(|(i, _)| {
            let pos = (i + 1) as f64;
            pos >= first && pos < last
        })
        .map(|(_, c)| c)
        .collect()
}

fn translate(source: &str, from: &[char], to: &[char]) -> String {
    source
        .chars()
        .filter_map(|c| match from.iter().position(|&fc| fc == c) {
            Some(pos) => to.get(pos).copied(),
            None => Some(c),
        })
        .collect()
}

/// Rounds halves towards positive infinity, as `round()` requires.
fn round(n: f64) -> f64 {
    if n.is_nan() || n.is_infinite() || n == 0.0 {
        n
    } else {
        (n + 0.5).floor()
    }
}

/// True if the nearest `xml:lang` in scope matches `lang` or is a sub-language of it.
fn func_lang<'a, N: DataSourceNode<'a>>(lang: &str, e_ctx: &EvaluationContext<'a, '_, N>) -> bool {
    let wanted = lang.to_lowercase();
    let mut current = Some(e_ctx.context_node);
    while let Some(node) = current {
        let declared = node.attributes().find(|attr| {
            attr.name()
                .is_some_and(|q| q.prefix == Some("xml") && q.local_part == "lang")
        });
        if let Some(attr) = declared {
            let found = attr.string_value().to_lowercase();
            return found == wanted || found.starts_with(&format!("{}-", wanted));
        }
        current = node.parent();
    }
    false
}
