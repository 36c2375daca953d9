//! Error types for the jobflat extraction pipeline.
//!
//! Errors are split by stage:
//!
//! - [`DecodeError`] - reading a file and turning its bytes into text
//! - [`RecordError`] - parsing text into a raw JSON record
//! - [`ExportError`] - writing CSV output
//! - [`FileError`] - any per-file failure (wraps the three above)
//! - [`ConfigError`] - loading or validating [`crate::config::ExtractOptions`]
//! - [`PipelineError`] - run-level failures that stop a run before it starts
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::path::PathBuf;

use thiserror::Error;

// =============================================================================
// Decoding Errors
// =============================================================================

/// Errors while reading a file and decoding it to text.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Zero-byte file.
    #[error("File is empty")]
    EmptyFile,

    /// Content is not valid in the expected encoding.
    #[error("Encoding error: {0}")]
    Encoding(String),
}

// =============================================================================
// Record Errors
// =============================================================================

/// Errors while turning decoded text into a raw record.
#[derive(Debug, Error)]
pub enum RecordError {
    /// Content is not well-formed JSON.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The document parsed, but its top level is not an object.
    #[error("Top-level JSON value is {0}, expected an object")]
    NotAnObject(&'static str),
}

// =============================================================================
// Export Errors
// =============================================================================

/// Errors while writing CSV output.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Filesystem error.
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

// =============================================================================
// Per-file Errors
// =============================================================================

/// Any failure while processing a single input file.
///
/// A `FileError` never stops a run: the orchestrator logs it, records it
/// in the [`crate::transform::pipeline::RunReport`] and moves on.
#[derive(Debug, Error)]
pub enum FileError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors loading or validating options.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid option: {0}")]
    Invalid(String),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Run-level errors.
///
/// This is the error type returned by [`crate::transform::pipeline::run`].
/// Per-file problems never surface here.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Root path is missing or not a directory.
    #[error("Input root is not a directory: {}", .0.display())]
    InvalidRoot(PathBuf),

    /// Filesystem error outside of per-file processing.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The combined output could not be written.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Options are unusable.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for decoding.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Result type for record parsing.
pub type RecordResult<T> = Result<T, RecordError>;

/// Result type for CSV export.
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type for single-file processing.
pub type FileResult<T> = Result<T, FileError>;

/// Result type for configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for a whole run.
pub type PipelineResult<T> = Result<T, PipelineError>;
