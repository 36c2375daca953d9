//! Console logging for extraction runs.
//!
//! Every message goes through one process-wide [`ConsoleLog`]. Info and
//! success lines go to stdout and can be silenced with [`set_quiet`];
//! warnings and errors always reach stderr.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// Log level for console display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A single log entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Nesting level (for per-file detail under a run)
    pub indent: u8,
}

impl LogEntry {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Info, message: message.into(), indent: 0 }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Success, message: message.into(), indent: 0 }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Warning, message: message.into(), indent: 0 }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Error, message: message.into(), indent: 0 }
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }

    fn is_diagnostic(&self) -> bool {
        matches!(self.level, LogLevel::Warning | LogLevel::Error)
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.level {
            LogLevel::Info => "   ",
            LogLevel::Success => "   ✓",
            LogLevel::Warning => "   ⚠️",
            LogLevel::Error => "   ❌",
        };
        let indent = "   ".repeat(self.indent as usize);
        write!(f, "{}{} {}", indent, prefix, self.message)
    }
}

/// Global console log
pub static CONSOLE: ConsoleLog = ConsoleLog::new();

/// Writes log entries to the terminal
pub struct ConsoleLog {
    quiet: AtomicBool,
}

impl ConsoleLog {
    pub const fn new() -> Self {
        Self { quiet: AtomicBool::new(false) }
    }

    pub fn log(&self, entry: LogEntry) {
        if entry.is_diagnostic() {
            eprintln!("{}", entry);
        } else if !self.is_quiet() {
            println!("{}", entry);
        }
    }

    pub fn set_quiet(&self, quiet: bool) {
        self.quiet.store(quiet, Ordering::Relaxed);
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet.load(Ordering::Relaxed)
    }
}

impl Default for ConsoleLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Silence info and success lines
pub fn set_quiet(quiet: bool) {
    CONSOLE.set_quiet(quiet);
}

/// Convenient logging functions
pub fn log_info(msg: impl Into<String>) {
    CONSOLE.log(LogEntry::info(msg));
}

pub fn log_success(msg: impl Into<String>) {
    CONSOLE.log(LogEntry::success(msg));
}

pub fn log_warning(msg: impl Into<String>) {
    CONSOLE.log(LogEntry::warning(msg));
}

pub fn log_warning_indent(msg: impl Into<String>, indent: u8) {
    CONSOLE.log(LogEntry::warning(msg).with_indent(indent));
}

pub fn log_error_indent(msg: impl Into<String>, indent: u8) {
    CONSOLE.log(LogEntry::error(msg).with_indent(indent));
}
