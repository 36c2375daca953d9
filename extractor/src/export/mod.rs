//! CSV export of flat records.
//!
//! [`RecordTable`] is the batch accumulator for combined output: records are
//! pushed in order and the header grows as the first-seen union of keys.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use indexmap::IndexSet;

use crate::error::ExportResult;
use crate::models::FlatRecord;

/// Ordered rows plus the union of their columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordTable {
    columns: IndexSet<String>,
    rows: Vec<FlatRecord>,
}

impl RecordTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, extending the header with any new keys.
    #[must_use]
    pub fn push(mut self, record: FlatRecord) -> Self {
        for key in record.keys() {
            if !self.columns.contains(key) {
                self.columns.insert(key.to_string());
            }
        }
        self.rows.push(record);
        self
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    pub fn rows(&self) -> &[FlatRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write header and rows. Missing cells are empty.
    ///
    /// A table without columns produces no output at all.
    pub fn write_csv<W: Write>(&self, writer: W) -> ExportResult<()> {
        let mut wtr = csv::Writer::from_writer(writer);

        if !self.columns.is_empty() {
            wtr.write_record(&self.columns)?;
            for row in &self.rows {
                wtr.write_record(
                    self.columns
                        .iter()
                        .map(|column| row.get(column).map(|v| v.to_cell()).unwrap_or_default()),
                )?;
            }
        }

        wtr.flush()?;
        Ok(())
    }

    /// Write to a file, creating parent directories as needed.
    pub fn write_to_path(&self, path: impl AsRef<Path>) -> ExportResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        self.write_csv(File::create(path)?)
    }
}

impl FromIterator<FlatRecord> for RecordTable {
    fn from_iter<I: IntoIterator<Item = FlatRecord>>(iter: I) -> Self {
        iter.into_iter().fold(RecordTable::new(), RecordTable::push)
    }
}

/// Write a single record as a one-row CSV.
pub fn write_record_csv(record: FlatRecord, path: impl AsRef<Path>) -> ExportResult<()> {
    RecordTable::new().push(record).write_to_path(path)
}
