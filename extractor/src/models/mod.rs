//! Domain models for the extraction pipeline.
//!
//! - [`Node`] - Shape of a raw JSON value (mapping, sequence or scalar)
//! - [`Scalar`] - A leaf value that can live in a flat record
//! - [`FlatRecord`] - Single-level, insertion-ordered view of one document

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Number, Value};

// =============================================================================
// Scalar
// =============================================================================

/// A leaf value in a [`FlatRecord`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
}

impl Scalar {
    /// String cast used before HTML cleaning. `None` for null.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Scalar::Null => None,
            Scalar::Bool(b) => Some(b.to_string()),
            Scalar::Number(n) => Some(n.to_string()),
            Scalar::Text(s) => Some(s.clone()),
        }
    }

    /// Text written into a CSV cell. Null renders as an empty cell.
    pub fn to_cell(&self) -> String {
        self.as_text().unwrap_or_default()
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Text(s)
    }
}

// =============================================================================
// Node
// =============================================================================

/// Shape of a raw JSON value, as seen by the flattener.
#[derive(Debug, Clone, PartialEq)]
pub enum Node<'a> {
    Mapping(&'a Map<String, Value>),
    Sequence(&'a [Value]),
    Scalar(Scalar),
}

impl<'a> From<&'a Value> for Node<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::Object(map) => Node::Mapping(map),
            Value::Array(items) => Node::Sequence(items),
            Value::Null => Node::Scalar(Scalar::Null),
            Value::Bool(b) => Node::Scalar(Scalar::Bool(*b)),
            Value::Number(n) => Node::Scalar(Scalar::Number(n.clone())),
            Value::String(s) => Node::Scalar(Scalar::Text(s.clone())),
        }
    }
}

/// Human-readable kind of a JSON value, for error messages.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Object(_) => "an object",
        Value::Array(_) => "an array",
        Value::String(_) => "a string",
        Value::Number(_) => "a number",
        Value::Bool(_) => "a boolean",
        Value::Null => "null",
    }
}

// =============================================================================
// Flat Record
// =============================================================================

/// A single-level record keyed by joined key paths.
///
/// Iteration order is insertion order, which is the document order of the
/// leaves it was built from.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FlatRecord {
    fields: IndexMap<String, Scalar>,
}

impl FlatRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, returning the previous value if the key existed.
    ///
    /// An existing key keeps its position; only the value is replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: Scalar) -> Option<Scalar> {
        self.fields.insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<&Scalar> {
        self.fields.get(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Scalar)> {
        self.fields.iter_mut().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>> FromIterator<(K, Scalar)> for FlatRecord {
    fn from_iter<I: IntoIterator<Item = (K, Scalar)>>(iter: I) -> Self {
        let mut record = FlatRecord::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}
