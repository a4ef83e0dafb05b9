//! Progress reporting functionality
//!
//! A spinner runs on the main thread while a child process works on a
//! worker thread. Quiet mode and disabled progress draw nothing.

use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::Mutex;
use std::time::Duration;

/// Progress reporter for long-running child processes
pub struct ProgressReporter {
    quiet: bool,
    verbose: bool,
    enabled: bool,
    spinner: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new(quiet: bool, verbose: bool, enabled: bool) -> Self {
        Self {
            quiet,
            verbose,
            enabled: enabled && !quiet,
            spinner: Mutex::new(None),
        }
    }

    /// A reporter that never draws, for library and test use
    pub fn hidden() -> Self {
        Self::new(true, false, false)
    }

    /// Start a spinner for an operation
    pub fn start(&self, operation: &str) {
        if self.verbose {
            log::debug!("starting: {}", operation);
        }
        if !self.enabled {
            return;
        }

        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed}] {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(operation.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));

        if let Some(previous) = self.spinner.lock().replace(spinner) {
            previous.finish_and_clear();
        }
    }

    /// Finish the current operation
    pub fn finish(&self, message: &str) {
        if let Some(spinner) = self.spinner.lock().take() {
            spinner.finish_and_clear();
        }
        if self.verbose {
            log::debug!("finished: {}", message);
        }
    }

    /// Print a message (respects quiet mode)
    pub fn print(&self, message: &str) {
        if !self.quiet {
            self.suspend(|| eprintln!("{}", message));
        }
    }

    /// Print a warning message (always printed, even in quiet mode)
    pub fn print_warning(&self, message: &str) {
        self.suspend(|| eprintln!("Warning: {}", message));
    }

    fn suspend<F: FnOnce()>(&self, f: F) {
        match self.spinner.lock().as_ref() {
            Some(spinner) => spinner.suspend(f),
            None => f(),
        }
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_reporter_is_quiet() {
        let reporter = ProgressReporter::hidden();
        assert!(reporter.is_quiet());
        reporter.start("Compiling leak.c");
        assert!(reporter.spinner.lock().is_none());
        reporter.finish("done");
    }

    #[test]
    fn test_start_and_finish_replace_spinner() {
        let reporter = ProgressReporter::new(false, false, true);
        reporter.start("Compiling");
        reporter.start("Analyzing");
        assert!(reporter.spinner.lock().is_some());
        reporter.finish("done");
        assert!(reporter.spinner.lock().is_none());
    }
}
