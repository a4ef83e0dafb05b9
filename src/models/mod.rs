//! Data models and structures for leakscope

pub mod config;
pub mod report;
pub mod run;
pub mod tools;

pub use config::{OutputFormat, PartialSettings, Settings, StrategyKind};
pub use report::{
    ErrorSummary, HeapUsageSummary, LeakCategory, LeakCategoryCount, LeakReport, ParseWarning,
    SuppressedCount, Verdict, VerdictPolicy,
};
pub use run::{BasicRunResult, CapturedOutput, CompileOutcome, RawDiagnosticText, RunOutcome, RunRequest};
pub use tools::{Tool, ToolAvailability, ToolStatus};
