//! jobflat CLI - Flatten JSON job postings into CSV
//!
//! # Main Commands
//!
//! ```bash
//! jobflat sample ./jobs                # First 10 files into one CSV
//! jobflat export ./jobs                # One CSV per file in ./jobs/processed_data
//! jobflat export ./jobs --strict       # Report bad files as errors instead of skipping
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! jobflat flatten job.json             # Print one flattened record as JSON
//! jobflat clean "<p>Some <b>HTML</b></p>"
//! ```

use clap::{Args, Parser, Subcommand};
use jobflat::logs::set_quiet;
use jobflat::{
    html_to_text, read_record, run, ErrorPolicy, ExtractOptions, FileOutcome, RunReport, WriteMode,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "jobflat")]
#[command(about = "Flatten JSON job postings into CSV", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// JSON options file (CLI flags take precedence)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Skip files whose name starts with this (empty string disables)
    #[arg(long, global = true)]
    skip_prefix: Option<String>,

    /// Separator for nested key paths
    #[arg(long, global = true)]
    separator: Option<String>,

    /// Key substring selecting fields for HTML cleaning (repeatable)
    #[arg(short, long = "marker", global = true)]
    markers: Vec<String>,

    /// Only print warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a sample of files into one combined CSV
    Sample {
        /// Directory to scan
        root: PathBuf,

        /// Output CSV file (default: jobnet_sample_extracted_data.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of files to extract (default: 10)
        #[arg(long)]
        max_files: Option<usize>,

        /// Treat empty, undecodable and invalid files as errors
        #[arg(long)]
        strict: bool,
    },

    /// Extract every file into its own CSV
    Export {
        /// Directory to scan
        root: PathBuf,

        /// Output directory (default: <ROOT>/processed_data)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Stop after this many extracted files
        #[arg(long)]
        max_files: Option<usize>,

        /// Treat empty, undecodable and invalid files as errors
        #[arg(long)]
        strict: bool,
    },

    /// Flatten and clean one JSON file, printing the record as JSON
    Flatten {
        /// Input JSON file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Strip HTML from a text fragment
    Clean {
        /// HTML text
        text: String,
    },
}

fn main() {
    let cli = Cli::parse();
    set_quiet(cli.global.quiet);

    let result = match cli.command {
        Commands::Sample {
            root,
            output,
            max_files,
            strict,
        } => cmd_run(
            &root,
            &cli.global,
            WriteMode::Combined,
            output,
            max_files,
            strict,
        ),

        Commands::Export {
            root,
            output,
            max_files,
            strict,
        } => cmd_run(
            &root,
            &cli.global,
            WriteMode::PerFile,
            output,
            max_files,
            strict,
        ),

        Commands::Flatten { input, output } => cmd_flatten(&input, &cli.global, output.as_deref()),

        Commands::Clean { text } => cmd_clean(&text),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

/// Build options: preset for the mode, then config file, then flags.
fn build_options(
    global: &GlobalArgs,
    mode: WriteMode,
) -> Result<ExtractOptions, Box<dyn std::error::Error>> {
    let mut options = match &global.config {
        Some(path) => ExtractOptions::from_json_file(path)?,
        None => match mode {
            WriteMode::Combined => ExtractOptions::sampled_batch(),
            WriteMode::PerFile => ExtractOptions::hardened(),
        },
    };
    options.write_mode = mode;

    if let Some(ref prefix) = global.skip_prefix {
        options.skip_prefix = Some(prefix.clone());
    }
    if let Some(ref separator) = global.separator {
        options.separator = separator.clone();
    }
    if !global.markers.is_empty() {
        options.markers = global.markers.clone();
    }

    options.validate()?;
    Ok(options)
}

fn cmd_run(
    root: &Path,
    global: &GlobalArgs,
    mode: WriteMode,
    output: Option<PathBuf>,
    max_files: Option<usize>,
    strict: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut options = build_options(global, mode)?;
    if output.is_some() {
        options.output = output;
    }
    if max_files.is_some() {
        options.max_files = max_files;
    }
    if strict {
        options.error_policy = ErrorPolicy::Strict;
    } else if global.config.is_none() {
        options.error_policy = ErrorPolicy::Lenient;
    }
    options.validate()?;

    eprintln!("📄 Processing: {}", root.display());
    eprintln!("   Mode: {}", describe_mode(&options));

    let report = run(root, &options)?;
    print_failures(&report);

    Ok(())
}

fn describe_mode(options: &ExtractOptions) -> String {
    let mode = match options.write_mode {
        WriteMode::Combined => "combined",
        WriteMode::PerFile => "per-file",
    };
    let policy = match options.error_policy {
        ErrorPolicy::Strict => "strict",
        ErrorPolicy::Lenient => "lenient",
    };
    match options.max_files {
        Some(max) => format!("{}, {}, up to {} files", mode, policy, max),
        None => format!("{}, {}", mode, policy),
    }
}

fn print_failures(report: &RunReport) {
    if report.failed() == 0 {
        return;
    }
    eprintln!("\n⚠️  {} file(s) failed:", report.failed());
    let failures = report.files.iter().filter_map(|(path, outcome)| match outcome {
        FileOutcome::Failed(e) => Some((path, e)),
        _ => None,
    });
    for (path, e) in failures.take(10) {
        eprintln!("   - {}: {}", path.display(), e);
    }
}

fn cmd_flatten(
    input: &Path,
    global: &GlobalArgs,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Flattening: {}", input.display());

    let options = build_options(global, WriteMode::PerFile)?;
    let object = read_record(input, options.error_policy)?;
    let flattener = options.flattener();
    let flattened = flattener.process(&object);

    eprintln!(
        "   Fields: {} (separator {:?})",
        flattened.record.len(),
        flattener.separator()
    );
    if !flattened.collisions.is_empty() {
        eprintln!("   ⚠️  Colliding keys: {}", flattened.collisions.join(", "));
    }

    let json = serde_json::to_string_pretty(&flattened.record)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_clean(text: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", html_to_text(text));
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
