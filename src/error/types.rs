//! Error types and definitions for leakscope
//!
//! Every failure that can happen between locating the tools and writing the
//! rendered report is a variant of [`LeakscopeError`]. None of them crash the
//! process: `main` turns them into a readable message and an exit code.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Error severity levels for different error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Warning level errors - operation can continue
    Warning,
    /// Error level - current operation fails but overall process can continue
    Error,
    /// Critical level - process should terminate
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Warning => write!(f, "WARNING"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Main error type for leakscope operations
#[derive(Debug, Error)]
pub enum LeakscopeError {
    /// Standard IO errors
    #[error("IO error: {source}")]
    Io {
        #[source]
        source: std::io::Error,
    },

    /// The compiler or the analyzer could not be resolved through any strategy
    #[error("{tool} not found")]
    ToolNotFound { tool: String },

    /// The selected input file does not exist
    #[error("File not found: {path}")]
    SourceNotFound { path: PathBuf },

    /// The compile action was given something other than a `.c` file
    #[error("Selected file is not a C source file (.c): {path}")]
    NotCSource { path: PathBuf },

    /// The compiler exited non-zero; `stderr` is kept exactly as emitted
    #[error("Compilation of {source_file} failed")]
    Compile { source_file: PathBuf, stderr: String },

    /// The analyzer could not execute the target binary
    #[error("Analysis of {binary} failed: {message}")]
    Analysis { binary: PathBuf, message: String },

    /// The analyzer did not finish within the configured bound and was killed
    #[error("Analysis of {binary} timed out after {timeout_secs} seconds")]
    AnalysisTimeout { binary: PathBuf, timeout_secs: u64 },

    /// A child process could not be spawned or waited on
    #[error("Failed to execute {program}: {message}")]
    Execution { program: String, message: String },

    /// A second run was triggered while one is still active
    #[error("A run is already in progress")]
    RunInProgress,

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Configuration file not found
    #[error("Configuration file not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration file read errors
    #[error("Error reading configuration file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file parse errors
    #[error("Error parsing configuration file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Output file write errors
    #[error("Error writing to output file {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stdout write errors
    #[error("Error writing to stdout: {source}")]
    StdoutWrite {
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error
    #[error("JSON serialization error: {source}")]
    JsonSerialize {
        #[source]
        source: serde_json::Error,
    },

    /// CSV handling errors
    #[error("CSV error: {source}")]
    Csv {
        #[source]
        source: csv::Error,
    },

    /// CSV serialization error
    #[error("CSV serialization error: {source}")]
    CsvSerialize {
        #[source]
        source: std::string::FromUtf8Error,
    },
}

impl LeakscopeError {
    /// Get the severity level of this error
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // Absence of a tool is a reportable state, not a failure
            LeakscopeError::ToolNotFound { .. } => ErrorSeverity::Warning,
            LeakscopeError::RunInProgress => ErrorSeverity::Warning,

            LeakscopeError::Config { .. } => ErrorSeverity::Critical,
            LeakscopeError::ConfigNotFound { .. } => ErrorSeverity::Critical,
            LeakscopeError::ConfigRead { .. } => ErrorSeverity::Critical,
            LeakscopeError::ConfigParse { .. } => ErrorSeverity::Critical,
            LeakscopeError::OutputWrite { .. } => ErrorSeverity::Critical,
            LeakscopeError::StdoutWrite { .. } => ErrorSeverity::Critical,

            _ => ErrorSeverity::Error,
        }
    }

    /// Check if this is a critical error that should terminate the process
    pub fn is_critical(&self) -> bool {
        self.severity() == ErrorSeverity::Critical
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            LeakscopeError::ToolNotFound { tool } => {
                format!("{} could not be found locally or through the compatibility layer.", tool)
            }
            LeakscopeError::SourceNotFound { path } => {
                format!("File not found: '{}'. Please select an existing file.", path.display())
            }
            LeakscopeError::Compile { stderr, .. } => {
                format!("Compilation failed:\n{}", stderr)
            }
            LeakscopeError::AnalysisTimeout { timeout_secs, .. } => {
                format!(
                    "Valgrind execution timed out ({} seconds). The program may be hanging or taking too long.",
                    timeout_secs
                )
            }
            LeakscopeError::Io { source } => {
                format!("File system error: {}. Check disk space and permissions.", source)
            }
            LeakscopeError::ConfigNotFound { path } => {
                format!("Configuration file not found at '{}'. Create a config file with --init or use command line options.", path.display())
            }
            _ => self.to_string(),
        }
    }

    /// A hint on how to recover, if one applies to this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            LeakscopeError::ToolNotFound { .. } => Some(
                "Install the missing tools, e.g. `sudo apt update && sudo apt install -y gcc valgrind`".to_string(),
            ),
            LeakscopeError::NotCSource { .. } => {
                Some("Pass a .c file to compile, or drop --compile-only to analyze an executable".to_string())
            }
            LeakscopeError::AnalysisTimeout { .. } => {
                Some("Raise analysis_timeout_secs or check whether the program waits for input".to_string())
            }
            LeakscopeError::RunInProgress => Some("Wait for the current run to finish".to_string()),
            _ => None,
        }
    }

    /// Create an IO error with context
    pub fn io_error(source: std::io::Error) -> Self {
        LeakscopeError::Io { source }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        LeakscopeError::Config {
            message: message.into(),
        }
    }

    /// Create a tool-not-found error
    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        LeakscopeError::ToolNotFound { tool: tool.into() }
    }

    /// Create an analysis error for the given binary
    pub fn analysis_error(binary: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        LeakscopeError::Analysis {
            binary: binary.into(),
            message: message.into(),
        }
    }

    /// Create an execution error
    pub fn execution_error(program: impl Into<String>, message: impl Into<String>) -> Self {
        LeakscopeError::Execution {
            program: program.into(),
            message: message.into(),
        }
    }
}

// Implement From for common error types
impl From<std::io::Error> for LeakscopeError {
    fn from(err: std::io::Error) -> Self {
        LeakscopeError::io_error(err)
    }
}

impl From<csv::Error> for LeakscopeError {
    fn from(err: csv::Error) -> Self {
        LeakscopeError::Csv { source: err }
    }
}

impl From<serde_json::Error> for LeakscopeError {
    fn from(err: serde_json::Error) -> Self {
        LeakscopeError::JsonSerialize { source: err }
    }
}

/// Result type alias for leakscope operations
pub type Result<T> = std::result::Result<T, LeakscopeError>;
