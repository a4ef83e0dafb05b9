//! Command-line argument parsing

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Leakscope - memory leak checks for C programs
#[derive(Parser, Debug)]
#[command(name = "leakscope")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compile a C program with debug symbols and check it for memory leaks with Valgrind")]
#[command(long_about = "Leakscope compiles a C source file with gcc and runs the result under Valgrind's memcheck, \
then summarises the leak report: heap usage and the definitely, indirectly, possibly lost and still reachable totals. \
On Windows the tools are reached through WSL when they are not installed natively.")]
#[command(after_help = "EXAMPLES:

    # Compile and analyze a source file
    leakscope leak.c

    # Analyze an existing executable
    leakscope ./leak

    # Only compile, choosing the output path
    leakscope leak.c --compile-only --binary build/leak

    # Check which tools are available
    leakscope --check-tools

    # Machine-readable report
    leakscope leak.c --output json --output-file report.json

    # Treat still reachable memory as a leak
    leakscope leak.c --strict-reachable

    # Create a default configuration file
    leakscope --init
")]
pub struct Args {
    /// C source file to compile and analyze, or an executable to analyze
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Compile only, do not run the analyzer
    #[arg(long, help = "Compile the source file with debug symbols and stop (requires a .c file)")]
    pub compile_only: bool,

    /// Probe for the compiler and analyzer and report the result
    #[arg(long, help = "Check whether gcc and valgrind can be found, natively or through WSL")]
    pub check_tools: bool,

    /// Path of the compiled executable
    #[arg(short, long, value_name = "PATH", help = "Where to write the compiled executable (defaults to the source path without .c)")]
    pub binary: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE", help = "Path to configuration file (defaults to .leakscope.toml in current directory if not specified)")]
    pub config: Option<PathBuf>,

    /// Output format (text, json, csv)
    #[arg(short, long, value_enum, help = "Output format for results: 'text' for human-readable output, 'json' for machine processing, 'csv' for spreadsheet analysis")]
    pub output: Option<OutputFormat>,

    /// Output file path (stdout if not specified)
    #[arg(long, value_name = "FILE", help = "File to write output to (uses stdout if not specified)")]
    pub output_file: Option<PathBuf>,

    /// Suppress non-essential output
    #[arg(short, long, help = "Suppress non-essential output (one summary line, no spinner)")]
    pub quiet: bool,

    /// Show detailed progress and debug information
    #[arg(short, long, help = "Show detailed information, including every category explanation and debug logs")]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, help = "Disable colored output (useful for terminals that don't support ANSI colors or for piping output)")]
    pub no_colors: bool,

    /// Disable the progress spinner
    #[arg(long, help = "Disable the progress spinner (useful for CI environments or when redirecting output)")]
    pub no_progress: bool,

    /// Leave the full valgrind output out of the text report
    #[arg(long, help = "Do not append the raw valgrind output to the text report")]
    pub no_raw_output: bool,

    /// Do not run the program directly when valgrind is missing
    #[arg(long, help = "Fail instead of running the program without leak detection when valgrind is missing")]
    pub no_fallback: bool,

    /// Count still reachable memory as a leak
    #[arg(long, help = "Treat 'still reachable' memory as a leak when deciding the verdict")]
    pub strict_reachable: bool,

    /// Analyzer timeout in seconds
    #[arg(long, value_name = "SECS", help = "Kill valgrind if it runs longer than this (default: 30)")]
    pub timeout: Option<u64>,

    /// Compiler timeout in seconds
    #[arg(long, value_name = "SECS", help = "Kill gcc if it runs longer than this (default: 30)")]
    pub compile_timeout: Option<u64>,

    /// Initialize a default configuration file
    #[arg(long, help = "Create a default configuration file (.leakscope.toml) in the current directory")]
    pub init: bool,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for programmatic consumption
    Json,
    /// CSV output for spreadsheet analysis
    Csv,
}

impl Args {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Args::parse()
    }
}
