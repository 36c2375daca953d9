//! Run configuration.
//!
//! [`ExtractOptions`] covers every knob of the orchestrator. Options can be
//! built from a preset, loaded from a JSON file, and then overridden by CLI
//! flags.
//!
//! ```json
//! {
//!   "skip_prefix": "E",
//!   "max_files": 10,
//!   "write_mode": "combined",
//!   "error_policy": "strict",
//!   "separator": "_",
//!   "markers": ["description", "purpose"],
//!   "output": "sample.csv"
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::transform::clean::{FieldCleaner, DEFAULT_MARKERS};
use crate::transform::flatten::DEFAULT_SEPARATOR;
use crate::transform::RecordFlattener;

/// File names starting with this are excluded by default.
pub const DEFAULT_SKIP_PREFIX: &str = "E";

/// Number of files a sampled batch processes by default.
pub const DEFAULT_SAMPLE_SIZE: usize = 10;

/// Combined output file when none is given (relative to the working directory).
pub const DEFAULT_COMBINED_OUTPUT: &str = "jobnet_sample_extracted_data.csv";

/// Per-file output directory when none is given (relative to the input root).
pub const DEFAULT_OUTPUT_DIR: &str = "processed_data";

/// How extracted records are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// One CSV holding every record.
    Combined,
    /// One CSV per input file.
    #[default]
    PerFile,
}

/// How unreadable input is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Empty, undecodable or unparsable files are reported as failures.
    Strict,
    /// Empty and unparsable files are skipped; bad bytes are decoded best-effort.
    #[default]
    Lenient,
}

/// Options for one extraction run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
    /// Exclude files whose name starts with this. `None` or empty disables it.
    pub skip_prefix: Option<String>,

    /// Stop after this many successfully extracted files.
    pub max_files: Option<usize>,

    pub write_mode: WriteMode,

    pub error_policy: ErrorPolicy,

    /// Joins nested key paths.
    pub separator: String,

    /// Key substrings selecting fields for HTML cleaning.
    pub markers: Vec<String>,

    /// Output file (combined) or directory (per-file).
    pub output: Option<PathBuf>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            skip_prefix: Some(DEFAULT_SKIP_PREFIX.to_string()),
            max_files: None,
            write_mode: WriteMode::default(),
            error_policy: ErrorPolicy::default(),
            separator: DEFAULT_SEPARATOR.to_string(),
            markers: DEFAULT_MARKERS.iter().map(|m| m.to_string()).collect(),
            output: None,
        }
    }
}

impl ExtractOptions {
    /// A small sample of files merged into one CSV.
    pub fn sampled_batch() -> Self {
        Self {
            max_files: Some(DEFAULT_SAMPLE_SIZE),
            write_mode: WriteMode::Combined,
            error_policy: ErrorPolicy::Strict,
            ..Self::default()
        }
    }

    /// One CSV per file, failing loudly on bad input.
    pub fn per_file() -> Self {
        Self {
            error_policy: ErrorPolicy::Strict,
            ..Self::default()
        }
    }

    /// One CSV per file, tolerant of empty, broken or oddly encoded input.
    pub fn hardened() -> Self {
        Self {
            error_policy: ErrorPolicy::Lenient,
            ..Self::default()
        }
    }

    /// Load options from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let options: Self = serde_json::from_str(&content)?;
        options.validate()?;
        Ok(options)
    }

    /// Reject options the orchestrator cannot work with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.separator.is_empty() {
            return Err(ConfigError::Invalid("separator must not be empty".into()));
        }
        if self.markers.is_empty() {
            return Err(ConfigError::Invalid("at least one marker is required".into()));
        }
        if let Some(blank) = self.markers.iter().find(|m| m.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!("blank marker: {:?}", blank)));
        }
        if self.max_files == Some(0) {
            return Err(ConfigError::Invalid("max_files must be at least 1".into()));
        }
        Ok(())
    }

    /// Whether a file with this name is excluded.
    pub fn skips(&self, file_name: &str) -> bool {
        match self.skip_prefix.as_deref() {
            Some(prefix) if !prefix.is_empty() => file_name.starts_with(prefix),
            _ => false,
        }
    }

    /// Where output goes for inputs under `root`.
    pub fn output_path(&self, root: &Path) -> PathBuf {
        match (&self.output, self.write_mode) {
            (Some(path), _) => path.clone(),
            (None, WriteMode::Combined) => PathBuf::from(DEFAULT_COMBINED_OUTPUT),
            (None, WriteMode::PerFile) => root.join(DEFAULT_OUTPUT_DIR),
        }
    }

    pub fn flattener(&self) -> RecordFlattener {
        RecordFlattener::new(&self.separator, FieldCleaner::new(&self.markers))
    }
}
