//! Terminal progress bar for the per-file loop.

use indicatif::{ProgressBar, ProgressStyle};

use crate::logs::CONSOLE;

const TEMPLATE: &str = "{wide_bar:.cyan/blue} {pos}/{len} {msg}";

/// A progress bar that may be switched off entirely.
pub struct Progress {
    bar: Option<ProgressBar>,
}

impl Progress {
    /// Bar over `total` files, hidden when the console is quiet.
    #[must_use]
    pub fn for_console(total: u64) -> Self {
        Self::new(total, !CONSOLE.is_quiet())
    }

    #[must_use]
    pub fn new(total: u64, visible: bool) -> Self {
        if !visible {
            return Self { bar: None };
        }

        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::with_template(TEMPLATE).unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Self { bar: Some(bar) }
    }

    pub fn is_visible(&self) -> bool {
        self.bar.is_some()
    }

    pub fn position(&self) -> u64 {
        self.bar.as_ref().map_or(0, ProgressBar::position)
    }

    pub fn set_message(&self, message: &str) {
        if let Some(bar) = &self.bar {
            bar.set_message(message.to_string());
        }
    }

    pub fn inc(&self, delta: u64) {
        if let Some(bar) = &self.bar {
            bar.inc(delta);
        }
    }

    /// Run `f` with the bar cleared so log lines don't tear it.
    pub fn suspend<R>(&self, f: impl FnOnce() -> R) -> R {
        match &self.bar {
            Some(bar) => bar.suspend(f),
            None => f(),
        }
    }

    pub fn finish_clear(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}
