//! Directory-level extraction: walk a tree, flatten every JSON file, write CSV.
//!
//! One orchestrator covers every variant. [`ExtractOptions`] decides how many
//! files are taken, whether records are combined into one table or written one
//! CSV per file, and whether bad input fails or is skipped.
//!
//! # Example
//!
//! ```rust,ignore
//! use jobflat::{run, ExtractOptions};
//! use std::path::Path;
//!
//! let report = run(Path::new("jobs/"), &ExtractOptions::sampled_batch())?;
//! println!("{} records written to {}", report.extracted(), report.output.display());
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::config::{ErrorPolicy, ExtractOptions, WriteMode};
use crate::error::{DecodeError, FileError, FileResult, PipelineError, PipelineResult, RecordError};
use crate::export::{write_record_csv, RecordTable};
use crate::logs::{log_error_indent, log_info, log_success, log_warning, log_warning_indent};
use crate::parser::{decode, parse_record, read_bytes};
use crate::progress::Progress;

use super::{Flattened, RecordFlattener};

/// Directories never descended into.
const IGNORED_DIRS: [&str; 1] = [".git"];

/// Why a file was passed over without producing output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    EmptyFile,
    WhitespaceOnly,
    InvalidJson(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::EmptyFile => write!(f, "empty file"),
            SkipReason::WhitespaceOnly => write!(f, "file with only whitespace"),
            SkipReason::InvalidJson(msg) => write!(f, "invalid JSON ({})", msg),
        }
    }
}

/// What happened to one input file.
#[derive(Debug)]
pub enum FileOutcome {
    /// Written to its own CSV at this path.
    Exported(PathBuf),
    /// Added to the combined table.
    Accumulated,
    Skipped(SkipReason),
    Failed(FileError),
}

impl FileOutcome {
    pub fn is_extracted(&self) -> bool {
        matches!(self, FileOutcome::Exported(_) | FileOutcome::Accumulated)
    }
}

/// Result of a complete run
#[derive(Debug)]
pub struct RunReport {
    /// Combined CSV file or per-file output directory
    pub output: PathBuf,
    pub write_mode: WriteMode,
    /// Every file considered, in processing order
    pub files: Vec<(PathBuf, FileOutcome)>,
}

impl RunReport {
    pub fn extracted(&self) -> usize {
        self.files.iter().filter(|(_, o)| o.is_extracted()).count()
    }

    pub fn skipped(&self) -> usize {
        self.files
            .iter()
            .filter(|(_, o)| matches!(o, FileOutcome::Skipped(_)))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.files
            .iter()
            .filter(|(_, o)| matches!(o, FileOutcome::Failed(_)))
            .count()
    }

    pub fn outcome(&self, path: &Path) -> Option<&FileOutcome> {
        self.files.iter().find(|(p, _)| p == path).map(|(_, o)| o)
    }

    /// Get summary statistics
    pub fn summary(&self) -> String {
        format!(
            "Extracted: {} files, {} skipped, {} failed",
            self.extracted(),
            self.skipped(),
            self.failed()
        )
    }
}

/// What a single file yielded before it is written anywhere.
#[derive(Debug)]
enum Extracted {
    Record(Flattened),
    Skip(SkipReason),
}

/// State threaded through the run, one file at a time.
#[derive(Debug, Default)]
struct Batch {
    table: RecordTable,
    files: Vec<(PathBuf, FileOutcome)>,
    extracted: usize,
}

impl Batch {
    fn record(mut self, path: PathBuf, outcome: FileOutcome) -> Self {
        if outcome.is_extracted() {
            self.extracted += 1;
        }
        self.files.push((path, outcome));
        self
    }
}

/// Run an extraction over every file under `root`.
///
/// Per-file problems are logged and recorded in the report; only problems
/// with the run itself (bad options, bad root, unwritable output) are errors.
pub fn run(root: &Path, options: &ExtractOptions) -> PipelineResult<RunReport> {
    options.validate()?;
    if !root.is_dir() {
        return Err(PipelineError::InvalidRoot(root.to_path_buf()));
    }

    let output = options.output_path(root);
    if options.write_mode == WriteMode::PerFile {
        fs::create_dir_all(&output)?;
    }

    log_info(format!("📂 Scanning {}", root.display()));
    let files = discover_files(root, options, &output)?;
    log_info(format!("Found {} candidate files", files.len()));

    let flattener = options.flattener();
    let mut batch = Batch::default();
    let progress = Progress::for_console(files.len() as u64);

    for path in files {
        if options.max_files.is_some_and(|max| batch.extracted >= max) {
            break;
        }
        if let Some(name) = path.file_name() {
            progress.set_message(&name.to_string_lossy());
        }
        batch = progress.suspend(|| step(batch, path, &flattener, options, &output));
        progress.inc(1);
    }
    progress.finish_clear();

    if options.write_mode == WriteMode::Combined {
        batch.table.write_to_path(&output)?;
    }

    let report = RunReport {
        output,
        write_mode: options.write_mode,
        files: batch.files,
    };

    log_success(report.summary());
    match report.write_mode {
        WriteMode::Combined => {
            log_success(format!("Extraction complete! Saved to {}", report.output.display()))
        }
        WriteMode::PerFile => log_success(format!(
            "Extraction complete! Individual CSV files are stored in: {}",
            report.output.display()
        )),
    }

    Ok(report)
}

/// Process one file and fold its outcome into the batch.
fn step(
    mut batch: Batch,
    path: PathBuf,
    flattener: &RecordFlattener,
    options: &ExtractOptions,
    output: &Path,
) -> Batch {
    let outcome = match extract_file(&path, flattener, options.error_policy) {
        Ok(Extracted::Record(flattened)) => {
            if !flattened.collisions.is_empty() {
                log_warning_indent(
                    format!(
                        "{}: colliding keys, last value kept: {}",
                        path.display(),
                        flattened.collisions.join(", ")
                    ),
                    1,
                );
            }
            match options.write_mode {
                WriteMode::Combined => {
                    batch.table = batch.table.push(flattened.record);
                    FileOutcome::Accumulated
                }
                WriteMode::PerFile => {
                    let target = output.join(csv_file_name(&path));
                    match write_record_csv(flattened.record, &target) {
                        Ok(()) => FileOutcome::Exported(target),
                        Err(e) => FileOutcome::Failed(e.into()),
                    }
                }
            }
        }
        Ok(Extracted::Skip(reason)) => {
            log_warning_indent(format!("Skipping {}: {}", path.display(), reason), 1);
            FileOutcome::Skipped(reason)
        }
        Err(e) => FileOutcome::Failed(e),
    };

    if let FileOutcome::Failed(ref e) = outcome {
        log_error_indent(format!("Error processing {}: {}", path.display(), e), 1);
    }

    batch.record(path, outcome)
}

/// Read, decode, parse, flatten and clean one file.
fn extract_file(
    path: &Path,
    flattener: &RecordFlattener,
    policy: ErrorPolicy,
) -> FileResult<Extracted> {
    let lenient = policy == ErrorPolicy::Lenient;

    let bytes = read_bytes(path)?;
    if bytes.is_empty() {
        if lenient {
            return Ok(Extracted::Skip(SkipReason::EmptyFile));
        }
        return Err(DecodeError::EmptyFile.into());
    }

    let decoded = decode(&bytes, policy)?;
    if decoded.lossy {
        log_warning_indent(
            format!(
                "{}: not valid UTF-8, decoded as {}",
                path.display(),
                decoded.encoding
            ),
            1,
        );
    }
    if lenient && decoded.text.trim().is_empty() {
        return Ok(Extracted::Skip(SkipReason::WhitespaceOnly));
    }

    let object = match parse_record(&decoded.text) {
        Ok(object) => object,
        Err(RecordError::Json(e)) if lenient => {
            return Ok(Extracted::Skip(SkipReason::InvalidJson(e.to_string())))
        }
        Err(e) => return Err(e.into()),
    };

    Ok(Extracted::Record(flattener.process(&object)))
}

/// Output file name for an input: same stem, `.csv` extension.
pub fn csv_file_name(input: &Path) -> PathBuf {
    let name = input.file_name().map(PathBuf::from).unwrap_or_default();
    name.with_extension("csv")
}

/// List candidate files under `root` in a stable order.
///
/// Skips ignored directories, the run's own output, and files whose name
/// starts with the configured prefix. Unreadable directory entries are
/// logged and passed over.
pub fn discover_files(
    root: &Path,
    options: &ExtractOptions,
    output: &Path,
) -> PipelineResult<Vec<PathBuf>> {
    let root = fs::canonicalize(root)?;
    let output = fs::canonicalize(output).ok();

    let walker = WalkDir::new(&root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_ignored(entry, output.as_deref()));

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log_warning(format!("Cannot read directory entry: {}", e));
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if options.skips(&entry.file_name().to_string_lossy()) {
            continue;
        }
        files.push(entry.into_path());
    }

    Ok(files)
}

fn is_ignored(entry: &DirEntry, output: Option<&Path>) -> bool {
    if output.is_some_and(|out| entry.path() == out) {
        return true;
    }
    entry.file_type().is_dir()
        && entry.depth() > 0
        && IGNORED_DIRS.iter().any(|dir| entry.file_name() == *dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};

    fn write(dir: &Path, name: &str, content: impl AsRef<[u8]>) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    fn file_names(report: &RunReport) -> Vec<String> {
        report
            .files
            .iter()
            .map(|(p, _)| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    fn outcome_for<'a>(report: &'a RunReport, root: &Path, name: &str) -> &'a FileOutcome {
        let path = fs::canonicalize(root).unwrap().join(name);
        report
            .outcome(&path)
            .unwrap_or_else(|| panic!("{} not in report", name))
    }

    fn per_file_options(out: &TempDir, policy: ErrorPolicy) -> ExtractOptions {
        ExtractOptions {
            output: Some(out.path().to_path_buf()),
            error_policy: policy,
            ..ExtractOptions::default()
        }
    }

    const JOB: &str = r#"{"job": {"title": "Engineer", "tags": ["x","y"]}, "jobDescription": "<p>Build stuff</p>"}"#;

    #[test]
    fn test_per_file_export() {
        let input = tempdir().unwrap();
        let out = tempdir().unwrap();
        write(input.path(), "123.json", JOB);

        let report = run(input.path(), &per_file_options(&out, ErrorPolicy::Lenient)).unwrap();

        assert_eq!(report.extracted(), 1);
        let csv = fs::read_to_string(out.path().join("123.csv")).unwrap();
        assert_eq!(csv, "job_title,job_tags,jobDescription\nEngineer,\"x, y\",Build stuff\n");
        assert!(matches!(outcome_for(&report, input.path(), "123.json"), FileOutcome::Exported(p) if p.ends_with("123.csv")));
    }

    #[test]
    fn test_prefix_excluded_files_never_read() {
        let input = tempdir().unwrap();
        let out = tempdir().unwrap();
        write(input.path(), "E999.json", JOB);
        write(input.path(), "1.json", JOB);

        let report = run(input.path(), &per_file_options(&out, ErrorPolicy::Strict)).unwrap();

        assert_eq!(file_names(&report), vec!["1.json"]);
        assert!(!out.path().join("E999.csv").exists());
    }

    #[test]
    fn test_lenient_skips_bad_files() {
        let input = tempdir().unwrap();
        let out = tempdir().unwrap();
        write(input.path(), "a_empty.json", "");
        write(input.path(), "b_blank.json", "  \n\t ");
        write(input.path(), "c_broken.json", "{\"title\": ");
        write(input.path(), "d_array.json", "[1, 2]");
        write(input.path(), "e_good.json", JOB);

        let report = run(input.path(), &per_file_options(&out, ErrorPolicy::Lenient)).unwrap();

        assert!(matches!(outcome_for(&report, input.path(), "a_empty.json"), FileOutcome::Skipped(SkipReason::EmptyFile)));
        assert!(matches!(outcome_for(&report, input.path(), "b_blank.json"), FileOutcome::Skipped(SkipReason::WhitespaceOnly)));
        assert!(matches!(outcome_for(&report, input.path(), "c_broken.json"), FileOutcome::Skipped(SkipReason::InvalidJson(_))));
        assert!(matches!(
            outcome_for(&report, input.path(), "d_array.json"),
            FileOutcome::Failed(FileError::Record(RecordError::NotAnObject(_)))
        ));
        assert!(outcome_for(&report, input.path(), "e_good.json").is_extracted());

        assert_eq!((report.extracted(), report.skipped(), report.failed()), (1, 3, 1));
        assert!(!out.path().join("a_empty.csv").exists());
        assert!(!out.path().join("b_blank.csv").exists());
        assert!(out.path().join("e_good.csv").exists());
    }

    #[test]
    fn test_strict_reports_failures() {
        let input = tempdir().unwrap();
        let out = tempdir().unwrap();
        write(input.path(), "a_empty.json", "");
        write(input.path(), "b_latin1.json", b"{\"name\": \"Soci\xe9t\xe9\"}");
        write(input.path(), "c_blank.json", "   ");
        write(input.path(), "d_good.json", JOB);

        let report = run(input.path(), &per_file_options(&out, ErrorPolicy::Strict)).unwrap();

        assert!(matches!(
            outcome_for(&report, input.path(), "a_empty.json"),
            FileOutcome::Failed(FileError::Decode(DecodeError::EmptyFile))
        ));
        assert!(matches!(
            outcome_for(&report, input.path(), "b_latin1.json"),
            FileOutcome::Failed(FileError::Decode(DecodeError::Encoding(_)))
        ));
        assert!(matches!(
            outcome_for(&report, input.path(), "c_blank.json"),
            FileOutcome::Failed(FileError::Record(RecordError::Json(_)))
        ));
        // The run carries on past failures
        assert!(outcome_for(&report, input.path(), "d_good.json").is_extracted());
        assert_eq!(report.failed(), 3);
    }

    #[test]
    fn test_lenient_decodes_bad_bytes() {
        let input = tempdir().unwrap();
        let out = tempdir().unwrap();
        write(input.path(), "latin1.json", b"{\"name\": \"Soci\xe9t\xe9\"}");

        let report = run(input.path(), &per_file_options(&out, ErrorPolicy::Lenient)).unwrap();

        assert_eq!(report.extracted(), 1);
        let csv = fs::read_to_string(out.path().join("latin1.csv")).unwrap();
        assert!(csv.starts_with("name\nSoci"));
    }

    #[test]
    fn test_combined_sample_respects_limit() {
        let input = tempdir().unwrap();
        let out = tempdir().unwrap();
        write(input.path(), "1.json", r#"{"id": 1, "title": "A"}"#);
        write(input.path(), "2.json", "not json");
        write(input.path(), "3.json", r#"{"id": 3, "city": "Vejle"}"#);
        write(input.path(), "4.json", r#"{"id": 4}"#);

        let target = out.path().join("sample.csv");
        let options = ExtractOptions {
            max_files: Some(2),
            output: Some(target.clone()),
            ..ExtractOptions::sampled_batch()
        };

        let report = run(input.path(), &options).unwrap();

        // The failed file does not count towards the limit; 4.json is never reached
        assert_eq!(file_names(&report), vec!["1.json", "2.json", "3.json"]);
        assert_eq!(report.extracted(), 2);
        assert_eq!(report.output, target);
        assert_eq!(
            fs::read_to_string(&target).unwrap(),
            "id,title,city\n1,A,\n3,,Vejle\n"
        );
    }

    #[test]
    fn test_nested_directories_and_ignored_dirs() {
        let input = tempdir().unwrap();
        let out = tempdir().unwrap();
        write(input.path(), "b/2.json", r#"{"id": 2}"#);
        write(input.path(), "a/1.json", r#"{"id": 1}"#);
        write(input.path(), ".git/config.json", r#"{"id": 0}"#);

        let target = out.path().join("all.csv");
        let options = ExtractOptions {
            write_mode: WriteMode::Combined,
            output: Some(target.clone()),
            ..ExtractOptions::default()
        };

        let report = run(input.path(), &options).unwrap();

        assert_eq!(file_names(&report), vec!["1.json", "2.json"]);
        assert_eq!(fs::read_to_string(&target).unwrap(), "id\n1\n2\n");
    }

    #[test]
    fn test_default_output_dir_not_reprocessed() {
        let input = tempdir().unwrap();
        write(input.path(), "1.json", JOB);

        let first = run(input.path(), &ExtractOptions::hardened()).unwrap();
        let second = run(input.path(), &ExtractOptions::hardened()).unwrap();

        assert_eq!(first.output, input.path().join("processed_data"));
        assert_eq!(file_names(&second), vec!["1.json"]);
        assert_eq!(second.failed(), 0);
    }

    #[test]
    fn test_reprocessing_is_byte_identical() {
        let input = tempdir().unwrap();
        let out = tempdir().unwrap();
        write(input.path(), "job.json", JOB);
        let options = per_file_options(&out, ErrorPolicy::Lenient);

        run(input.path(), &options).unwrap();
        let first = fs::read(out.path().join("job.csv")).unwrap();
        run(input.path(), &options).unwrap();
        let second = fs::read(out.path().join("job.csv")).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_root() {
        let input = tempdir().unwrap();
        let missing = input.path().join("missing");

        let err = run(&missing, &ExtractOptions::default()).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidRoot(_)));
    }

    #[test]
    fn test_invalid_options() {
        let input = tempdir().unwrap();
        let options = ExtractOptions {
            separator: String::new(),
            ..ExtractOptions::default()
        };

        assert!(matches!(run(input.path(), &options), Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_csv_file_name() {
        assert_eq!(csv_file_name(Path::new("/a/b/123.json")), PathBuf::from("123.csv"));
        assert_eq!(csv_file_name(Path::new("notes")), PathBuf::from("notes.csv"));
        assert_eq!(csv_file_name(Path::new("x.tar.json")), PathBuf::from("x.tar.csv"));
    }
}
