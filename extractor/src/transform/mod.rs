//! Transformation module.
//!
//! - Flatten: nested JSON objects to single-level records
//! - HTML: markup to plain text
//! - Clean: marker-selected field cleaning
//! - Pipeline: directory traversal and CSV output

pub mod clean;
pub mod flatten;
pub mod html;
pub mod pipeline;

use serde_json::{Map, Value};

use crate::error::{RecordError, RecordResult};
use crate::models::value_kind;

pub use clean::{clean_value, FieldCleaner};
pub use flatten::{flatten, Flattened};
pub use html::html_to_text;
pub use pipeline::*;

/// Flatten + clean, the per-document core of every run.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordFlattener {
    separator: String,
    cleaner: FieldCleaner,
}

impl RecordFlattener {
    pub fn new(separator: impl Into<String>, cleaner: FieldCleaner) -> Self {
        Self {
            separator: separator.into(),
            cleaner,
        }
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Flatten an object and clean its marker fields.
    pub fn process(&self, object: &Map<String, Value>) -> Flattened {
        let mut flattened = flatten(object, &self.separator);
        self.cleaner.clean_record(&mut flattened.record);
        flattened
    }

    /// Same as [`process`](Self::process) for a document of unknown shape.
    pub fn process_value(&self, document: &Value) -> RecordResult<Flattened> {
        match document {
            Value::Object(object) => Ok(self.process(object)),
            other => Err(RecordError::NotAnObject(value_kind(other))),
        }
    }
}

impl Default for RecordFlattener {
    fn default() -> Self {
        Self::new(flatten::DEFAULT_SEPARATOR, FieldCleaner::default())
    }
}
