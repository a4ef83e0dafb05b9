//! Output formatting and writing functionality

mod formatters;
mod progress;
mod writers;

pub use self::formatters::{format_availability_text, format_compile_text, SETUP_COMMAND};
pub use self::progress::ProgressReporter;
pub use self::writers::{create_writer, FileWriter, OutputWriter, StdoutWriter};

use crate::error::Result;
use crate::models::config::OutputFormat;
use crate::models::run::RunOutcome;

/// Trait for different output formatters
pub trait Formatter {
    /// Format a run outcome into a string
    fn format(&self, outcome: &RunOutcome) -> Result<String>;
}

/// Text formatter for human-readable output
pub struct TextFormatter {
    pub use_colors: bool,
    pub verbose: bool,
    pub quiet: bool,
    pub show_raw_output: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(use_colors: bool, verbose: bool, quiet: bool, show_raw_output: bool) -> Self {
        Self {
            use_colors,
            verbose,
            quiet,
            show_raw_output,
        }
    }
}

impl Formatter for TextFormatter {
    fn format(&self, outcome: &RunOutcome) -> Result<String> {
        if self.quiet {
            return Ok(formatters::format_outcome_quiet(outcome));
        }
        Ok(formatters::format_outcome_text(
            outcome,
            self.use_colors,
            self.verbose,
            self.show_raw_output,
        ))
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format(&self, outcome: &RunOutcome) -> Result<String> {
        formatters::format_outcome_json(outcome)
    }
}

/// CSV formatter, one row per leak category
pub struct CsvFormatter;

impl Formatter for CsvFormatter {
    fn format(&self, outcome: &RunOutcome) -> Result<String> {
        formatters::format_outcome_csv(outcome)
    }
}

/// Create a formatter based on the output format
pub fn create_formatter(
    format: &OutputFormat,
    use_colors: bool,
    verbose: bool,
    quiet: bool,
    show_raw_output: bool,
) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new(use_colors, verbose, quiet, show_raw_output)),
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Csv => Box::new(CsvFormatter),
    }
}
