//! End-to-end runs against fake gcc / valgrind scripts

#![cfg(unix)]

use leakscope::core::{ProcessRunner, Session, ToolLocator};
use leakscope::models::config::{Settings, StrategyKind};
use leakscope::models::report::{LeakCategory, Verdict};
use leakscope::models::run::RunRequest;
use leakscope::output::ProgressReporter;
use leakscope::LeakscopeError;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;

const FAKE_GCC: &str = r#"#!/bin/sh
if [ "$1" = "--version" ]; then echo "gcc (fake) 13.2.0"; exit 0; fi
out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "-o" ]; then shift; out="$1"; fi
  shift
done
printf '#!/bin/sh\necho hello from target\nexit 0\n' > "$out"
chmod +x "$out"
"#;

const BROKEN_GCC: &str = r#"#!/bin/sh
if [ "$1" = "--version" ]; then echo "gcc (fake) 13.2.0"; exit 0; fi
echo "leak.c:3:5: error: expected ';' before 'return'" >&2
echo "    3 |     return 0" >&2
exit 1
"#;

const LEAKY_VALGRIND: &str = r#"#!/bin/sh
if [ "$1" = "--version" ]; then echo "valgrind-3.22.0"; exit 0; fi
cat >&2 <<'REPORT'
==77== HEAP SUMMARY:
==77==     in use at exit: 48 bytes in 1 blocks
==77==   total heap usage: 2 allocs, 1 frees, 1,072 bytes allocated
==77==
==77== LEAK SUMMARY:
==77==    definitely lost: 48 bytes in 1 blocks
==77==    indirectly lost: 0 bytes in 0 blocks
==77==      possibly lost: 0 bytes in 0 blocks
==77==    still reachable: 0 bytes in 0 blocks
==77==         suppressed: 0 bytes in 0 blocks
==77==
==77== ERROR SUMMARY: 1 errors from 1 contexts (suppressed: 0 from 0)
REPORT
exit 0
"#;

const SILENT_VALGRIND: &str = r#"#!/bin/sh
if [ "$1" = "--version" ]; then echo "valgrind-3.22.0"; exit 0; fi
exit 1
"#;

const HANGING_VALGRIND: &str = r#"#!/bin/sh
if [ "$1" = "--version" ]; then echo "valgrind-3.22.0"; exit 0; fi
exec sleep 5
"#;

const DETACHING_VALGRIND: &str = r#"#!/bin/sh
if [ "$1" = "--version" ]; then echo "valgrind-3.22.0"; exit 0; fi
sleep 30 &
exit 0
"#;

const DETACHING_LEAKY_VALGRIND: &str = r#"#!/bin/sh
if [ "$1" = "--version" ]; then echo "valgrind-3.22.0"; exit 0; fi
sleep 30 &
echo "==78==    definitely lost: 16 bytes in 1 blocks" >&2
exit 0
"#;

const SELF_CHECKING_VALGRIND: &str = r#"#!/bin/sh
if [ "$1" = "--version" ]; then echo "valgrind-3.22.0"; exit 0; fi
echo "self-check: definitely lost: 0 bytes in 0 blocks"
cat >&2 <<'REPORT'
==79== LEAK SUMMARY:
==79==    definitely lost: 48 bytes in 1 blocks
==79==    indirectly lost: 0 bytes in 0 blocks
REPORT
exit 0
"#;

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn script(&self, name: &str, body: &str) -> String {
        let path = self.path(name);
        fs::write(&path, body).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path.display().to_string()
    }

    fn source(&self) -> PathBuf {
        let path = self.path("leak.c");
        fs::write(&path, "#include <stdlib.h>\nint main(void) { malloc(48); return 0; }\n").unwrap();
        path
    }

    fn settings(&self, gcc: &str, valgrind: &str) -> Settings {
        Settings {
            compiler: self.script("gcc", gcc),
            analyzer: self.script("valgrind", valgrind),
            strategies: vec![StrategyKind::Direct],
            analysis_timeout_secs: 2,
            ..Settings::default()
        }
    }
}

fn session(settings: Settings) -> Session {
    Session::new(settings, Arc::new(ProgressReporter::hidden()))
}

#[test]
fn test_locator_finds_fake_tools() {
    let sandbox = Sandbox::new();
    let settings = sandbox.settings(FAKE_GCC, LEAKY_VALGRIND);

    let availability = ToolLocator::new(&settings).check_availability();

    assert!(availability.compiler_found);
    assert!(availability.analyzer_found);
    assert!(!availability.via_indirection_layer);
    assert_eq!(availability.compiler_strategies, vec![StrategyKind::Direct]);
    assert!(availability.statuses.iter().all(|s| s.found));
}

#[test]
fn test_compile_and_analyze_reports_leaks() {
    let sandbox = Sandbox::new();
    let source = sandbox.source();
    let session = session(sandbox.settings(FAKE_GCC, LEAKY_VALGRIND));

    let outcome = session.compile_and_analyze(&source, None).unwrap();

    assert_eq!(outcome.binary, sandbox.path("leak"));
    assert!(outcome.binary.exists());
    assert_eq!(outcome.compiled_with, Some(StrategyKind::Direct));
    assert_eq!(outcome.analyzed_with, Some(StrategyKind::Direct));

    let report = outcome.report.unwrap();
    assert_eq!(report.verdict, Verdict::LeaksDetected);
    assert_eq!(report.category(LeakCategory::DefinitelyLost).bytes, 48);
    assert_eq!(report.usage.total_bytes_allocated, 1072);
    assert!(outcome.raw_output.unwrap().as_str().contains("LEAK SUMMARY"));

    let state = session.state();
    let state = state.lock();
    assert_eq!(state.current_file.as_deref(), Some(sandbox.path("leak").as_path()));
    assert!(!state.is_running());
}

#[test]
fn test_compile_error_keeps_stderr() {
    let sandbox = Sandbox::new();
    let source = sandbox.source();
    let session = session(sandbox.settings(BROKEN_GCC, LEAKY_VALGRIND));

    match session.compile(&source, Some(sandbox.path("out"))) {
        Err(LeakscopeError::Compile { stderr, .. }) => {
            assert_eq!(
                stderr,
                "leak.c:3:5: error: expected ';' before 'return'\n    3 |     return 0\n"
            );
        }
        other => panic!("Expected Compile error, got {:?}", other),
    }
}

#[test]
fn test_silent_analyzer_is_an_analysis_error() {
    let sandbox = Sandbox::new();
    let settings = sandbox.settings(FAKE_GCC, SILENT_VALGRIND);
    let locator = ToolLocator::new(&settings);
    let availability = locator.check_availability();
    let runner = ProcessRunner::new(&settings);

    let source = sandbox.source();
    let compiled = runner
        .compile(&RunRequest::new(&source, sandbox.path("leak")), &availability)
        .unwrap();

    let err = runner.analyze(&compiled.binary, &availability).unwrap_err();
    assert!(matches!(err, LeakscopeError::Analysis { .. }));
}

#[test]
fn test_hanging_analyzer_times_out() {
    let sandbox = Sandbox::new();
    let mut settings = sandbox.settings(FAKE_GCC, HANGING_VALGRIND);
    settings.analysis_timeout_secs = 1;
    let session = session(settings);

    let outcome = session.compile_and_analyze(&sandbox.source(), None).unwrap();
    let report = outcome.report.unwrap();

    assert_eq!(report.verdict, Verdict::AnalysisFailed);
    assert!(report.failure.unwrap().contains("timed out"));
}

#[test]
fn test_detached_descendant_does_not_outlast_the_timeout() {
    let sandbox = Sandbox::new();
    let mut settings = sandbox.settings(FAKE_GCC, DETACHING_VALGRIND);
    settings.analysis_timeout_secs = 1;
    let session = session(settings);

    let start = Instant::now();
    let outcome = session.compile_and_analyze(&sandbox.source(), None).unwrap();

    assert!(start.elapsed() < Duration::from_secs(10));
    assert_eq!(outcome.report.map(|r| r.verdict), Some(Verdict::AnalysisFailed));
}

#[test]
fn test_report_is_kept_when_a_descendant_holds_the_pipes() {
    let sandbox = Sandbox::new();
    let mut settings = sandbox.settings(FAKE_GCC, DETACHING_LEAKY_VALGRIND);
    settings.analysis_timeout_secs = 1;
    let session = session(settings);

    let start = Instant::now();
    let outcome = session.compile_and_analyze(&sandbox.source(), None).unwrap();
    let report = outcome.report.unwrap();

    assert!(start.elapsed() < Duration::from_secs(10));
    assert_eq!(report.verdict, Verdict::LeaksDetected);
    assert_eq!(report.category(LeakCategory::DefinitelyLost).bytes, 16);
}

#[test]
fn test_program_output_cannot_mask_the_leak_summary() {
    let sandbox = Sandbox::new();
    let session = session(sandbox.settings(FAKE_GCC, SELF_CHECKING_VALGRIND));

    let outcome = session.compile_and_analyze(&sandbox.source(), None).unwrap();
    let report = outcome.report.unwrap();

    assert_eq!(report.verdict, Verdict::LeaksDetected);
    let definitely = report.category(LeakCategory::DefinitelyLost);
    assert_eq!((definitely.bytes, definitely.blocks), (48, 1));
}

#[test]
fn test_basic_run_without_analyzer() {
    let sandbox = Sandbox::new();
    let settings = Settings {
        compiler: sandbox.script("gcc", FAKE_GCC),
        analyzer: "leakscope-missing-valgrind".to_string(),
        strategies: vec![StrategyKind::Direct],
        ..Settings::default()
    };
    let session = session(settings);

    let outcome = session.compile_and_analyze(&sandbox.source(), None).unwrap();

    assert!(outcome.report.is_none());
    let run = outcome.basic_run.unwrap();
    assert_eq!(run.exit_code, Some(0));
    assert_eq!(run.stdout, "hello from target\n");
}

#[test]
fn test_analyze_rejects_missing_binary_path() {
    let sandbox = Sandbox::new();
    let session = session(sandbox.settings(FAKE_GCC, LEAKY_VALGRIND));

    let outcome = session.analyze(Path::new("/nonexistent/leakscope/prog")).unwrap();
    assert_eq!(outcome.report.map(|r| r.verdict), Some(Verdict::AnalysisFailed));
}
