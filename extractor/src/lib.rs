//! # jobflat - JSON job postings to CSV
//!
//! jobflat walks a directory of JSON documents, flattens each one into a
//! single-level record, strips HTML from description-like fields and writes
//! the result as CSV: one combined table for a sample, or one file per input.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  JSON file  │────▶│   Parser    │────▶│  Flatten +  │────▶│     CSV     │
//! │  (any enc)  │     │ (auto-enc)  │     │ HTML clean  │     │ (per file / │
//! └─────────────┘     └─────────────┘     └─────────────┘     │  combined)  │
//!                                                             └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use jobflat::{run, ExtractOptions};
//! use std::path::Path;
//!
//! let report = run(Path::new("jobs/"), &ExtractOptions::hardened()).unwrap();
//! println!("{}", report.summary());
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Flat records and value shapes
//! - [`config`] - Run options and presets
//! - [`parser`] - Decoding and JSON parsing
//! - [`transform`] - Flattening, HTML cleaning and the run pipeline
//! - [`export`] - CSV output
//! - [`logs`] - Console logging
//! - [`progress`] - Progress bar for directory runs

// Core modules
pub mod error;
pub mod models;

// Configuration
pub mod config;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Output
pub mod export;

// Logging and progress
pub mod logs;
pub mod progress;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError,
    DecodeError,
    ExportError,
    FileError,
    PipelineError,
    RecordError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{FlatRecord, Node, Scalar};

// =============================================================================
// Re-exports - Configuration
// =============================================================================

pub use config::{ErrorPolicy, ExtractOptions, WriteMode};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{
    decode,
    decode_content,
    decode_lenient,
    decode_strict,
    detect_encoding,
    parse_file,
    parse_record,
    read_record,
    Decoded,
};

// =============================================================================
// Re-exports - Transformation
// =============================================================================

pub use transform::{
    clean_value,
    flatten,
    html_to_text,
    FieldCleaner,
    Flattened,
    RecordFlattener,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    run,
    FileOutcome,
    RunReport,
    SkipReason,
};

// =============================================================================
// Re-exports - Export
// =============================================================================

pub use export::{write_record_csv, RecordTable};
