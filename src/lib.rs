//! Leakscope - memory leak checks for C programs
//!
//! This library locates gcc and valgrind (natively or through WSL), compiles
//! a C source file with debug symbols, runs the result under memcheck, and
//! turns the analyzer's text into a structured [`LeakReport`].

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod output;
pub mod parsers;
pub mod utils;

// Re-export commonly used types
pub use error::{ErrorSeverity, LeakscopeError, OptionExt, Result, ResultExt};
pub use models::{
    config::Settings,
    report::{LeakCategory, LeakReport, Verdict},
    run::{RawDiagnosticText, RunOutcome},
    tools::ToolAvailability,
};
pub use parsers::valgrind::{parse, parse_with_policy};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
