//! Recursive flattening of nested JSON objects into [`FlatRecord`]s.
//!
//! Nested objects contribute their leaves under `parent{sep}child` keys.
//! Arrays are never expanded: they become one `", "`-joined string.

use serde_json::{Map, Value};

use crate::models::{FlatRecord, Node, Scalar};

/// Separator used when none is configured.
pub const DEFAULT_SEPARATOR: &str = "_";

/// Joiner for array elements.
pub const SEQUENCE_JOINER: &str = ", ";

/// Result of flattening one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Flattened {
    pub record: FlatRecord,
    /// Keys written more than once. The last write won.
    pub collisions: Vec<String>,
}

/// Flatten a JSON object into a single-level record.
pub fn flatten(object: &Map<String, Value>, separator: &str) -> Flattened {
    let mut out = Flattened::default();
    flatten_into(object, None, separator, &mut out);
    out
}

fn flatten_into(
    object: &Map<String, Value>,
    prefix: Option<&str>,
    separator: &str,
    out: &mut Flattened,
) {
    for (key, value) in object {
        let new_key = match prefix {
            Some(p) => format!("{}{}{}", p, separator, key),
            None => key.clone(),
        };

        match Node::from(value) {
            Node::Mapping(child) => flatten_into(child, Some(&new_key), separator, out),
            Node::Sequence(items) => store(out, new_key, Scalar::Text(join_sequence(items))),
            Node::Scalar(scalar) => store(out, new_key, scalar),
        }
    }
}

fn store(out: &mut Flattened, key: String, value: Scalar) {
    if out.record.insert(key.clone(), value).is_some() && !out.collisions.contains(&key) {
        out.collisions.push(key);
    }
}

/// Join array elements into one string.
///
/// Strings are used verbatim; anything else (including nested objects and
/// arrays) is rendered as compact JSON.
pub fn join_sequence(items: &[Value]) -> String {
    items
        .iter()
        .map(|item| match item {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(SEQUENCE_JOINER)
}
