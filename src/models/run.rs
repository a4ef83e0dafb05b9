//! Per-run structures
//!
//! Everything here is created fresh for one user action and dropped afterwards.

use super::config::StrategyKind;
use super::report::LeakReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// A source file and where its compiled binary should go
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRequest {
    pub source_file: PathBuf,
    pub compiled_output: PathBuf,
}

impl RunRequest {
    pub fn new(source_file: impl Into<PathBuf>, compiled_output: impl Into<PathBuf>) -> Self {
        Self {
            source_file: source_file.into(),
            compiled_output: compiled_output.into(),
        }
    }
}

/// The analyzer's combined output, immutable once captured
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawDiagnosticText(String);

impl RawDiagnosticText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<&str> for RawDiagnosticText {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// Streams and exit status of a finished child process
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
    /// None when the child was terminated by a signal
    pub exit_code: Option<i32>,
}

impl CapturedOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// The target's stdout, then the analyzer's stderr report
    ///
    /// The report goes last so nothing the target prints can follow the
    /// analyzer's summary lines.
    pub fn combined(&self) -> String {
        match (self.stdout.is_empty(), self.stderr.is_empty()) {
            (true, _) => self.stderr.clone(),
            (false, true) => self.stdout.clone(),
            (false, false) => {
                let mut text = self.stdout.clone();
                if !text.ends_with('\n') {
                    text.push('\n');
                }
                text.push_str(&self.stderr);
                text
            }
        }
    }
}

/// Result of running the program directly, without the analyzer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicRunResult {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl From<CapturedOutput> for BasicRunResult {
    fn from(output: CapturedOutput) -> Self {
        Self {
            exit_code: output.exit_code,
            stdout: output.stdout,
            stderr: output.stderr,
        }
    }
}

/// Result of a compile-only action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileOutcome {
    pub source_file: PathBuf,
    pub binary: PathBuf,
    pub strategy: StrategyKind,
}

/// Everything the renderer needs about one analyze action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    /// Set when the binary was compiled as part of this run
    pub source_file: Option<PathBuf>,
    pub binary: PathBuf,
    pub compiled_with: Option<StrategyKind>,
    pub analyzed_with: Option<StrategyKind>,
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
    /// None when only the basic run fallback was possible
    pub report: Option<LeakReport>,
    pub raw_output: Option<RawDiagnosticText>,
    pub basic_run: Option<BasicRunResult>,
}

impl RunOutcome {
    pub fn new(binary: impl Into<PathBuf>, started_at: DateTime<Utc>) -> Self {
        Self {
            source_file: None,
            binary: binary.into(),
            compiled_with: None,
            analyzed_with: None,
            started_at,
            duration: Duration::ZERO,
            report: None,
            raw_output: None,
            basic_run: None,
        }
    }
}
