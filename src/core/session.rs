//! Application state and the handlers behind each user action
//!
//! All state lives in [`AppState`], shared behind a mutex so a worker thread
//! can run the child process while the caller keeps the spinner going. Only
//! one run may be active at a time.

use super::locator::ToolLocator;
use super::runner::ProcessRunner;
use crate::error::{LeakscopeError, Result};
use crate::models::config::{Settings, StrategyKind};
use crate::models::report::{LeakReport, VerdictPolicy};
use crate::models::run::{CompileOutcome, RunOutcome, RunRequest};
use crate::models::tools::{Tool, ToolAvailability};
use crate::output::ProgressReporter;
use crate::parsers::valgrind;
use crate::utils::paths::{default_binary_path, is_c_source};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

/// Everything a handler may read or update
#[derive(Debug)]
pub struct AppState {
    pub settings: Settings,
    /// Result of the last tool check, reused until the next one
    pub availability: Option<ToolAvailability>,
    /// The file the next action applies to; becomes the binary after compiling
    pub current_file: Option<PathBuf>,
    pub last_report: Option<LeakReport>,
    run_in_progress: bool,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            availability: None,
            current_file: None,
            last_report: None,
            run_in_progress: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.run_in_progress
    }
}

pub type SharedState = Arc<Mutex<AppState>>;

/// Clears the run-in-progress flag when dropped
pub struct RunGuard {
    state: SharedState,
}

impl RunGuard {
    /// Mark a run as started, refusing if one is already active
    pub fn acquire(state: &SharedState) -> Result<Self> {
        let mut guard = state.lock();
        if guard.run_in_progress {
            return Err(LeakscopeError::RunInProgress);
        }
        guard.run_in_progress = true;
        Ok(Self { state: Arc::clone(state) })
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.state.lock().run_in_progress = false;
    }
}

/// Front-end session driving the locator, runner and parser
pub struct Session {
    state: SharedState,
    reporter: Arc<ProgressReporter>,
}

impl Session {
    pub fn new(settings: Settings, reporter: Arc<ProgressReporter>) -> Self {
        Self {
            state: Arc::new(Mutex::new(AppState::new(settings))),
            reporter,
        }
    }

    pub fn state(&self) -> SharedState {
        Arc::clone(&self.state)
    }

    fn settings(&self) -> Settings {
        self.state.lock().settings.clone()
    }

    /// Run `job` on a worker thread while the spinner shows `message`
    fn on_worker<T, F>(&self, message: &str, job: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        self.reporter.start(message);
        let handle = thread::spawn(job);
        let result = handle
            .join()
            .map_err(|_| LeakscopeError::execution_error("worker thread", "panicked while running a child process"));
        self.reporter.finish(message);
        result
    }

    fn check_tools_unguarded(&self) -> Result<ToolAvailability> {
        let locator = ToolLocator::new(&self.settings());
        let availability = self.on_worker("Checking for compiler and analyzer", move || locator.check_availability())?;
        self.state.lock().availability = Some(availability.clone());
        Ok(availability)
    }

    /// Probe the tools afresh and remember the result
    pub fn check_tools(&self) -> Result<ToolAvailability> {
        let _guard = RunGuard::acquire(&self.state)?;
        self.check_tools_unguarded()
    }

    fn availability(&self) -> Result<ToolAvailability> {
        let cached = self.state.lock().availability.clone();
        match cached {
            Some(availability) => Ok(availability),
            None => self.check_tools_unguarded(),
        }
    }

    fn compile_unguarded(&self, source: &Path, binary: Option<PathBuf>) -> Result<CompileOutcome> {
        if !source.exists() {
            return Err(LeakscopeError::SourceNotFound { path: source.to_path_buf() });
        }
        if !is_c_source(source) {
            return Err(LeakscopeError::NotCSource { path: source.to_path_buf() });
        }

        let availability = self.availability()?;
        let settings = self.settings();
        if !availability.compiler_found {
            return Err(LeakscopeError::tool_not_found(&settings.compiler));
        }

        let windows_direct = cfg!(windows) && availability.preferred(Tool::Compiler) == Some(StrategyKind::Direct);
        let binary = binary.unwrap_or_else(|| default_binary_path(source, windows_direct));
        let request = RunRequest::new(source, binary);
        self.state.lock().current_file = Some(request.source_file.clone());

        let runner = ProcessRunner::new(&settings);
        let message = format!("Compiling {}", source.display());
        let outcome = self.on_worker(&message, move || runner.compile(&request, &availability))??;

        self.state.lock().current_file = Some(outcome.binary.clone());
        Ok(outcome)
    }

    /// Compile a C source file with debug symbols
    pub fn compile(&self, source: &Path, binary: Option<PathBuf>) -> Result<CompileOutcome> {
        let _guard = RunGuard::acquire(&self.state)?;
        self.compile_unguarded(source, binary)
    }

    fn analyze_unguarded(&self, binary: &Path, mut outcome: RunOutcome) -> Result<RunOutcome> {
        let started = Instant::now();
        let availability = self.availability()?;
        let settings = self.settings();
        let runner = ProcessRunner::new(&settings);
        self.state.lock().current_file = Some(binary.to_path_buf());

        if !availability.analyzer_found {
            if !settings.basic_run_fallback {
                return Err(LeakscopeError::tool_not_found(&settings.analyzer));
            }
            self.reporter
                .print_warning("Valgrind not available, running the program without leak detection");
            let target = binary.to_path_buf();
            let message = format!("Running {}", binary.display());
            let result = self.on_worker(&message, move || runner.basic_run(&target))??;
            outcome.basic_run = Some(result);
            outcome.duration += started.elapsed();
            return Ok(outcome);
        }

        let target = binary.to_path_buf();
        let message = format!("Analyzing {}", binary.display());
        let analysis = self.on_worker(&message, move || runner.analyze(&target, &availability))?;

        let report = match analysis {
            Ok((text, strategy)) => {
                let policy = VerdictPolicy {
                    still_reachable_is_leak: settings.still_reachable_is_leak,
                };
                let report = valgrind::parse_with_policy(&text, policy);
                for warning in &report.warnings {
                    log::warn!("{}", warning);
                }
                outcome.analyzed_with = Some(strategy);
                outcome.raw_output = Some(text);
                report
            }
            Err(err @ (LeakscopeError::Analysis { .. } | LeakscopeError::AnalysisTimeout { .. })) => {
                log::error!("{}", err);
                LeakReport::analysis_failed(err.user_message())
            }
            Err(err) => return Err(err),
        };

        self.state.lock().last_report = Some(report.clone());
        outcome.report = Some(report);
        outcome.duration += started.elapsed();
        Ok(outcome)
    }

    /// Run the analyzer against an existing executable
    pub fn analyze(&self, binary: &Path) -> Result<RunOutcome> {
        let _guard = RunGuard::acquire(&self.state)?;
        let outcome = RunOutcome::new(binary, chrono::Utc::now());
        self.analyze_unguarded(binary, outcome)
    }

    /// Compile `source`, then analyze the resulting binary
    pub fn compile_and_analyze(&self, source: &Path, binary: Option<PathBuf>) -> Result<RunOutcome> {
        let _guard = RunGuard::acquire(&self.state)?;
        let started_at = chrono::Utc::now();
        let started = Instant::now();

        let compiled = self.compile_unguarded(source, binary)?;
        let mut outcome = RunOutcome::new(&compiled.binary, started_at);
        outcome.source_file = Some(compiled.source_file);
        outcome.compiled_with = Some(compiled.strategy);
        outcome.duration = started.elapsed();

        self.analyze_unguarded(&compiled.binary, outcome)
    }
}
