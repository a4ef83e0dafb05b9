//! Process runner: compile, analyze, or just run the target program

use super::exec::{self, ExecError};
use super::locator::InvocationStrategy;
use crate::error::{LeakscopeError, Result, ResultExt};
use crate::models::config::{Settings, StrategyKind};
use crate::models::run::{BasicRunResult, CapturedOutput, CompileOutcome, RawDiagnosticText, RunRequest};
use crate::models::tools::{Tool, ToolAvailability};
use crate::utils::paths::{executable_arg, is_c_source};
use std::path::Path;
use std::time::Duration;

/// Markers that only appear once memcheck actually ran the target
const REPORT_MARKERS: [&str; 3] = ["heap summary", "total heap usage", "leak summary"];

/// Lines of analyzer output quoted in a failure message
const FAILURE_EXCERPT_LINES: usize = 5;

/// Runs the external compiler and analyzer
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    compiler: String,
    analyzer: String,
    indirection_command: String,
    compiler_flags: Vec<String>,
    analyzer_flags: Vec<String>,
    compile_timeout: Duration,
    analysis_timeout: Duration,
    basic_run_timeout: Duration,
}

impl ProcessRunner {
    pub fn new(settings: &Settings) -> Self {
        Self {
            compiler: settings.compiler.clone(),
            analyzer: settings.analyzer.clone(),
            indirection_command: settings.indirection_command.clone(),
            compiler_flags: settings.compiler_flags.clone(),
            analyzer_flags: settings.analyzer_flags.clone(),
            compile_timeout: Duration::from_secs(settings.compile_timeout_secs),
            analysis_timeout: Duration::from_secs(settings.analysis_timeout_secs),
            basic_run_timeout: Duration::from_secs(settings.basic_run_timeout_secs),
        }
    }

    fn strategy(&self, kind: StrategyKind) -> InvocationStrategy {
        InvocationStrategy::new(kind, self.indirection_command.clone())
    }

    /// Compile `request.source_file` with debug symbols into `request.compiled_output`
    ///
    /// Every strategy that resolved the compiler is tried in order. When all
    /// of them fail, the error of the last attempt is returned; a compiler
    /// failure carries its stderr unchanged.
    pub fn compile(&self, request: &RunRequest, availability: &ToolAvailability) -> Result<CompileOutcome> {
        let source = &request.source_file;
        std::fs::metadata(source).with_file_context(source)?;
        if !is_c_source(source) {
            return Err(LeakscopeError::NotCSource { path: source.clone() });
        }

        let strategies = availability.strategies_for(Tool::Compiler);
        if strategies.is_empty() {
            return Err(LeakscopeError::tool_not_found(&self.compiler));
        }

        let mut last_error = None;
        for kind in strategies {
            let strategy = self.strategy(*kind);
            let mut command = strategy.command(&self.compiler);
            command
                .args(&self.compiler_flags)
                .arg("-o")
                .arg(strategy.path_arg(&request.compiled_output))
                .arg(strategy.path_arg(source));

            match exec::run_with_timeout(command, self.compile_timeout) {
                Ok(output) if output.success() => {
                    log::info!("compiled {} via {}", source.display(), kind);
                    return Ok(CompileOutcome {
                        source_file: source.clone(),
                        binary: request.compiled_output.clone(),
                        strategy: *kind,
                    });
                }
                Ok(output) => {
                    log::warn!("compilation via {} failed with exit code {:?}", kind, output.exit_code);
                    last_error = Some(LeakscopeError::Compile {
                        source_file: source.clone(),
                        stderr: output.stderr,
                    });
                }
                Err(err) => {
                    log::warn!("compilation via {} could not run: {}", kind, err);
                    last_error = Some(LeakscopeError::execution_error(
                        strategy.display_program(&self.compiler),
                        err.to_string(),
                    ));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| LeakscopeError::tool_not_found(&self.compiler)))
    }

    /// Run the analyzer with leak checking against `binary`
    ///
    /// Leaks in the target are a successful analysis. An error means the
    /// analyzer could not execute the binary at all.
    pub fn analyze(
        &self,
        binary: &Path,
        availability: &ToolAvailability,
    ) -> Result<(RawDiagnosticText, StrategyKind)> {
        if !binary.exists() {
            return Err(LeakscopeError::analysis_error(binary, "executable not found"));
        }

        let kind = availability
            .preferred(Tool::Analyzer)
            .ok_or_else(|| LeakscopeError::tool_not_found(&self.analyzer))?;
        let strategy = self.strategy(kind);

        let mut command = strategy.command(&self.analyzer);
        command
            .args(&self.analyzer_flags)
            .arg(strategy.path_arg(&executable_arg(binary)));

        let output = exec::run_with_timeout(command, self.analysis_timeout).map_err(|err| match err {
            ExecError::Timeout { after, .. } => LeakscopeError::AnalysisTimeout {
                binary: binary.to_path_buf(),
                timeout_secs: after.as_secs(),
            },
            other => LeakscopeError::analysis_error(binary, other.to_string()),
        })?;

        classify_analyzer_output(binary, output).map(|text| (text, kind))
    }

    /// Run the program directly, without leak detection
    pub fn basic_run(&self, binary: &Path) -> Result<BasicRunResult> {
        std::fs::metadata(binary).with_file_context(binary)?;

        let program = executable_arg(binary);
        let command = std::process::Command::new(&program);
        let output = exec::run_with_timeout(command, self.basic_run_timeout).map_err(|err| match err {
            ExecError::Timeout { after, .. } => LeakscopeError::execution_error(
                program.display().to_string(),
                format!(
                    "timed out after {} seconds; the program may be hanging or waiting for input",
                    after.as_secs()
                ),
            ),
            other => LeakscopeError::execution_error(program.display().to_string(), other.to_string()),
        })?;

        Ok(BasicRunResult::from(output))
    }
}

/// Decide whether captured analyzer output is a report or a failure to run
pub fn classify_analyzer_output(binary: &Path, output: CapturedOutput) -> Result<RawDiagnosticText> {
    let text = RawDiagnosticText::new(output.combined());

    if text.is_blank() {
        return Err(LeakscopeError::analysis_error(
            binary,
            match output.exit_code {
                Some(code) => format!("analyzer produced no output (exit code {})", code),
                None => "analyzer produced no output and was terminated by a signal".to_string(),
            },
        ));
    }

    let lowered = text.as_str().to_lowercase();
    if REPORT_MARKERS.iter().any(|marker| lowered.contains(marker)) {
        return Ok(text);
    }

    if !output.success() || lowered.contains("command not found") {
        let excerpt = text
            .as_str()
            .lines()
            .filter(|line| !line.trim().is_empty())
            .take(FAILURE_EXCERPT_LINES)
            .collect::<Vec<_>>()
            .join("\n");
        return Err(LeakscopeError::analysis_error(binary, excerpt));
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn captured(stderr: &str, exit_code: Option<i32>) -> CapturedOutput {
        CapturedOutput {
            stdout: String::new(),
            stderr: stderr.to_string(),
            exit_code,
        }
    }

    #[test]
    fn test_empty_output_is_an_analysis_error() {
        let err = classify_analyzer_output(Path::new("./leak"), captured("", Some(1))).unwrap_err();
        match err {
            LeakscopeError::Analysis { message, .. } => assert!(message.contains("exit code 1")),
            other => panic!("Expected Analysis error, got {:?}", other),
        }
    }

    #[test]
    fn test_report_with_nonzero_exit_is_accepted() {
        // The target's own exit code is passed through by the analyzer
        let text = classify_analyzer_output(
            Path::new("./leak"),
            captured("==1== HEAP SUMMARY:\n==1==   total heap usage: 1 allocs, 0 frees, 8 bytes allocated\n", Some(42)),
        )
        .unwrap();
        assert!(text.as_str().contains("total heap usage"));
    }

    #[test]
    fn test_command_not_found() {
        let err = classify_analyzer_output(
            Path::new("./leak"),
            captured("/bin/bash: line 1: valgrind: command not found\n", Some(127)),
        )
        .unwrap_err();
        match err {
            LeakscopeError::Analysis { binary, message } => {
                assert_eq!(binary, PathBuf::from("./leak"));
                assert!(message.contains("command not found"));
            }
            other => panic!("Expected Analysis error, got {:?}", other),
        }
    }

    #[test]
    fn test_cannot_execute_binary() {
        let err = classify_analyzer_output(
            Path::new("./notes.txt"),
            captured("valgrind: ./notes.txt: cannot execute binary file\n", Some(126)),
        )
        .unwrap_err();
        assert!(matches!(err, LeakscopeError::Analysis { .. }));
    }

    #[test]
    fn test_missing_compiler_strategy() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("leak.c");
        std::fs::write(&source, "int main(void) { return 0; }\n").unwrap();

        let runner = ProcessRunner::new(&Settings::default());
        let request = RunRequest::new(&source, dir.path().join("leak"));
        let err = runner.compile(&request, &ToolAvailability::default()).unwrap_err();

        assert!(matches!(err, LeakscopeError::ToolNotFound { .. }));
    }

    #[test]
    fn test_compile_rejects_non_c_input() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("leak.txt");
        std::fs::write(&source, "not c").unwrap();

        let runner = ProcessRunner::new(&Settings::default());
        let request = RunRequest::new(&source, dir.path().join("leak"));
        let err = runner.compile(&request, &ToolAvailability::default()).unwrap_err();

        assert!(matches!(err, LeakscopeError::NotCSource { .. }));
    }

    #[test]
    fn test_analyze_missing_binary() {
        let runner = ProcessRunner::new(&Settings::default());
        let err = runner
            .analyze(Path::new("/nonexistent/leakscope/bin"), &ToolAvailability::default())
            .unwrap_err();
        assert!(matches!(err, LeakscopeError::Analysis { .. }));
    }
}
