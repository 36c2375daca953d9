//! Field-level HTML cleaning.
//!
//! Any flattened key whose lowercase form contains one of the configured
//! markers has its value replaced by the plain text of its HTML.

use crate::models::{FlatRecord, Scalar};

use super::html::html_to_text;

/// Markers used when none are configured.
pub const DEFAULT_MARKERS: [&str; 2] = ["description", "purpose"];

/// Selects fields by marker substring and strips their markup.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCleaner {
    markers: Vec<String>,
}

impl FieldCleaner {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            markers: markers
                .into_iter()
                .map(|m| m.as_ref().to_lowercase())
                .filter(|m| !m.is_empty())
                .collect(),
        }
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    /// Whether `key` contains any marker, ignoring case.
    pub fn matches(&self, key: &str) -> bool {
        let key = key.to_lowercase();
        self.markers.iter().any(|m| key.contains(m.as_str()))
    }

    /// Clean every matching field in place. Returns the number of fields touched.
    pub fn clean_record(&self, record: &mut FlatRecord) -> usize {
        let mut cleaned = 0;
        for (key, value) in record.iter_mut() {
            if self.matches(key) {
                *value = clean_value(value);
                cleaned += 1;
            }
        }
        cleaned
    }
}

impl Default for FieldCleaner {
    fn default() -> Self {
        Self::new(DEFAULT_MARKERS)
    }
}

/// Clean a single value: null stays null, everything else becomes plain text.
pub fn clean_value(value: &Scalar) -> Scalar {
    match value.as_text() {
        Some(text) => Scalar::Text(html_to_text(&text)),
        None => Scalar::Null,
    }
}
