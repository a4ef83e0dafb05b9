//! Configuration-related data structures

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration settings for leakscope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Compiler program name or path
    pub compiler: String,

    /// Memory analyzer program name or path
    pub analyzer: String,

    /// Command that runs Linux tools from a non-Linux host
    pub indirection_command: String,

    /// Invocation strategies, tried in order
    pub strategies: Vec<StrategyKind>,

    /// Flags passed to the compiler before `-o <binary> <source>`
    pub compiler_flags: Vec<String>,

    /// Flags passed to the analyzer before the target binary
    pub analyzer_flags: Vec<String>,

    /// Bound on each `--version` probe
    pub probe_timeout_secs: u64,

    /// Bound on one compiler invocation
    pub compile_timeout_secs: u64,

    /// Bound on one analyzer invocation
    pub analysis_timeout_secs: u64,

    /// Bound on running the program directly
    pub basic_run_timeout_secs: u64,

    /// Run the program directly when no analyzer is available
    pub basic_run_fallback: bool,

    /// Whether "still reachable" memory flips the verdict
    pub still_reachable_is_leak: bool,

    /// Output format (text, json, csv)
    pub output_format: OutputFormat,

    /// Output file path (if not specified, output to stdout)
    pub output_file: Option<PathBuf>,

    /// Append the full analyzer text to text output
    pub show_raw_output: bool,

    /// Whether to use colors in text output
    pub use_colors: bool,

    /// Whether to show a spinner while child processes run
    pub show_progress: bool,

    /// Whether to suppress non-essential output
    pub quiet: bool,

    /// Whether to show detailed progress and debug information
    pub verbose: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            compiler: "gcc".to_string(),
            analyzer: "valgrind".to_string(),
            indirection_command: "wsl".to_string(),
            strategies: StrategyKind::platform_default(),
            compiler_flags: vec!["-g".to_string()],
            analyzer_flags: vec![
                "--leak-check=full".to_string(),
                "--track-origins=yes".to_string(),
                "--show-leak-kinds=all".to_string(),
            ],
            probe_timeout_secs: 5,
            compile_timeout_secs: 30,
            analysis_timeout_secs: 30,
            basic_run_timeout_secs: 10,
            basic_run_fallback: true,
            still_reachable_is_leak: false,
            output_format: OutputFormat::Text,
            output_file: None,
            show_raw_output: true,
            use_colors: true,
            show_progress: true,
            quiet: false,
            verbose: false,
        }
    }
}

/// How a tool is invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Through the indirection command, e.g. `wsl gcc ...`
    Indirection,
    /// The tool is executed directly from PATH
    Direct,
}

impl StrategyKind {
    /// The indirection layer only exists on Windows hosts
    pub fn platform_default() -> Vec<StrategyKind> {
        if cfg!(windows) {
            vec![StrategyKind::Indirection, StrategyKind::Direct]
        } else {
            vec![StrategyKind::Direct]
        }
    }
}

impl std::str::FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "indirection" | "wsl" => Ok(StrategyKind::Indirection),
            "direct" | "native" => Ok(StrategyKind::Direct),
            _ => Err(format!("Invalid strategy: {}", s)),
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrategyKind::Indirection => write!(f, "indirection"),
            StrategyKind::Direct => write!(f, "direct"),
        }
    }
}

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for programmatic consumption
    Json,
    /// CSV output for spreadsheet analysis
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Invalid output format: {}", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

/// Partial settings for configuration merging
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialSettings {
    pub compiler: Option<String>,
    pub analyzer: Option<String>,
    pub indirection_command: Option<String>,
    pub strategies: Option<Vec<StrategyKind>>,
    pub compiler_flags: Option<Vec<String>>,
    pub analyzer_flags: Option<Vec<String>>,
    pub probe_timeout_secs: Option<u64>,
    pub compile_timeout_secs: Option<u64>,
    pub analysis_timeout_secs: Option<u64>,
    pub basic_run_timeout_secs: Option<u64>,
    pub basic_run_fallback: Option<bool>,
    pub still_reachable_is_leak: Option<bool>,
    pub output_format: Option<OutputFormat>,
    pub output_file: Option<PathBuf>,
    pub show_raw_output: Option<bool>,
    pub use_colors: Option<bool>,
    pub show_progress: Option<bool>,
    pub quiet: Option<bool>,
    pub verbose: Option<bool>,
}

impl PartialSettings {
    /// Merge another PartialSettings into this one
    /// Fields from `other` take precedence over existing fields
    pub fn merge_from(&mut self, other: PartialSettings) {
        if other.compiler.is_some() {
            self.compiler = other.compiler;
        }
        if other.analyzer.is_some() {
            self.analyzer = other.analyzer;
        }
        if other.indirection_command.is_some() {
            self.indirection_command = other.indirection_command;
        }
        if other.strategies.is_some() {
            self.strategies = other.strategies;
        }
        if other.compiler_flags.is_some() {
            self.compiler_flags = other.compiler_flags;
        }
        if other.analyzer_flags.is_some() {
            self.analyzer_flags = other.analyzer_flags;
        }
        if other.probe_timeout_secs.is_some() {
            self.probe_timeout_secs = other.probe_timeout_secs;
        }
        if other.compile_timeout_secs.is_some() {
            self.compile_timeout_secs = other.compile_timeout_secs;
        }
        if other.analysis_timeout_secs.is_some() {
            self.analysis_timeout_secs = other.analysis_timeout_secs;
        }
        if other.basic_run_timeout_secs.is_some() {
            self.basic_run_timeout_secs = other.basic_run_timeout_secs;
        }
        if other.basic_run_fallback.is_some() {
            self.basic_run_fallback = other.basic_run_fallback;
        }
        if other.still_reachable_is_leak.is_some() {
            self.still_reachable_is_leak = other.still_reachable_is_leak;
        }
        if other.output_format.is_some() {
            self.output_format = other.output_format;
        }
        if other.output_file.is_some() {
            self.output_file = other.output_file;
        }
        if other.show_raw_output.is_some() {
            self.show_raw_output = other.show_raw_output;
        }
        if other.use_colors.is_some() {
            self.use_colors = other.use_colors;
        }
        if other.show_progress.is_some() {
            self.show_progress = other.show_progress;
        }
        if other.quiet.is_some() {
            self.quiet = other.quiet;
        }
        if other.verbose.is_some() {
            self.verbose = other.verbose;
        }
    }

    /// Convert partial settings to full settings
    /// Uses defaults for any fields that are None
    pub fn to_settings(&self) -> Settings {
        let mut settings = Settings::default();

        if let Some(compiler) = &self.compiler {
            settings.compiler = compiler.clone();
        }
        if let Some(analyzer) = &self.analyzer {
            settings.analyzer = analyzer.clone();
        }
        if let Some(command) = &self.indirection_command {
            settings.indirection_command = command.clone();
        }
        if let Some(strategies) = &self.strategies {
            settings.strategies = strategies.clone();
        }
        if let Some(flags) = &self.compiler_flags {
            settings.compiler_flags = flags.clone();
        }
        if let Some(flags) = &self.analyzer_flags {
            settings.analyzer_flags = flags.clone();
        }
        if let Some(secs) = self.probe_timeout_secs {
            settings.probe_timeout_secs = secs;
        }
        if let Some(secs) = self.compile_timeout_secs {
            settings.compile_timeout_secs = secs;
        }
        if let Some(secs) = self.analysis_timeout_secs {
            settings.analysis_timeout_secs = secs;
        }
        if let Some(secs) = self.basic_run_timeout_secs {
            settings.basic_run_timeout_secs = secs;
        }
        if let Some(fallback) = self.basic_run_fallback {
            settings.basic_run_fallback = fallback;
        }
        if let Some(strict) = self.still_reachable_is_leak {
            settings.still_reachable_is_leak = strict;
        }
        if let Some(output_format) = self.output_format {
            settings.output_format = output_format;
        }
        if let Some(output_file) = &self.output_file {
            settings.output_file = Some(output_file.clone());
        }
        if let Some(show_raw_output) = self.show_raw_output {
            settings.show_raw_output = show_raw_output;
        }
        if let Some(use_colors) = self.use_colors {
            settings.use_colors = use_colors;
        }
        if let Some(show_progress) = self.show_progress {
            settings.show_progress = show_progress;
        }
        if let Some(quiet) = self.quiet {
            settings.quiet = quiet;
        }
        if let Some(verbose) = self.verbose {
            settings.verbose = verbose;
        }

        settings
    }
}
