use leakscope::models::report::{LeakCategory, ParseWarning, Verdict, VerdictPolicy};
use leakscope::core::runner::classify_analyzer_output;
use leakscope::models::run::{CapturedOutput, RawDiagnosticText};
use std::path::Path;
use leakscope::{parse, parse_with_policy};

const CLEAN_RUN: &str = "\
==1200== Memcheck, a memory error detector
==1200== Command: ./clean
==1200==
==1200== HEAP SUMMARY:
==1200==     in use at exit: 0 bytes in 0 blocks
==1200==   total heap usage: 3 allocs, 3 frees, 4,120 bytes allocated
==1200==
==1200== All heap blocks were freed -- no leaks are possible
==1200==
==1200== For lists of detected and suppressed errors, rerun with: -s
==1200== ERROR SUMMARY: 0 errors from 0 contexts (suppressed: 0 from 0)
";

const LEAKY_RUN: &str = "\
==1300== HEAP SUMMARY:
==1300==     in use at exit: 72 bytes in 4 blocks
==1300==   total heap usage: 5 allocs, 1 frees, 1,096 bytes allocated
==1300==
==1300== 48 bytes in 1 blocks are definitely lost in loss record 2 of 2
==1300==    at 0x4848899: malloc (vg_replace_malloc.c:381)
==1300==    by 0x109161: main (leak.c:5)
==1300==
==1300== LEAK SUMMARY:
==1300==    definitely lost: 48 bytes in 1 blocks
==1300==    indirectly lost: 0 bytes in 0 blocks
==1300==      possibly lost: 24 bytes in 3 blocks
==1300==    still reachable: 0 bytes in 0 blocks
==1300==         suppressed: 0 bytes in 0 blocks
==1300==
==1300== ERROR SUMMARY: 2 errors from 2 contexts (suppressed: 0 from 0)
";

#[test]
fn test_clean_run() {
    let report = parse(&RawDiagnosticText::from(CLEAN_RUN));

    assert_eq!(report.usage.total_allocs, 3);
    assert_eq!(report.usage.total_frees, 3);
    assert_eq!(report.usage.total_bytes_allocated, 4120);
    assert!(report.categories.iter().all(|c| c.is_zero()));
    assert!(report.all_heap_freed);
    assert_eq!(report.verdict, Verdict::Clean);
    assert!(report.warnings.is_empty());
    assert_eq!(report.error_summary.map(|s| s.errors), Some(0));
}

#[test]
fn test_leaky_run() {
    let report = parse(&RawDiagnosticText::from(LEAKY_RUN));

    let definitely = report.category(LeakCategory::DefinitelyLost);
    assert_eq!((definitely.bytes, definitely.blocks), (48, 1));
    let possibly = report.category(LeakCategory::PossiblyLost);
    assert_eq!((possibly.bytes, possibly.blocks), (24, 3));
    assert!(report.category(LeakCategory::IndirectlyLost).is_zero());
    assert!(report.category(LeakCategory::StillReachable).is_zero());

    assert_eq!(report.verdict, Verdict::LeaksDetected);
    assert!(!report.all_heap_freed);
    assert_eq!(report.total_leaked_bytes(VerdictPolicy::default()), 72);
}

#[test]
fn test_malformed_count_is_a_warning() {
    let report = parse(&RawDiagnosticText::from("==1== definitely lost: abc bytes in 1 blocks\n"));

    let definitely = report.category(LeakCategory::DefinitelyLost);
    assert_eq!((definitely.bytes, definitely.blocks), (0, 1));
    assert_eq!(
        report.warnings,
        vec![ParseWarning {
            field: "definitely lost bytes".to_string(),
            value: "abc".to_string(),
            line: 1,
        }]
    );
    // One block is still reported, so the run is not clean
    assert_eq!(report.verdict, Verdict::LeaksDetected);
}

#[test]
fn test_still_reachable_policy() {
    let text = RawDiagnosticText::from("==1==    still reachable: 16 bytes in 1 blocks\n");

    assert_eq!(parse(&text).verdict, Verdict::Clean);
    let strict = VerdictPolicy {
        still_reachable_is_leak: true,
    };
    assert_eq!(parse_with_policy(&text, strict).verdict, Verdict::LeaksDetected);
}

#[test]
fn test_parsing_is_deterministic() {
    let text = RawDiagnosticText::from(LEAKY_RUN);
    assert_eq!(parse(&text), parse(&text));
}

#[test]
fn test_program_stdout_does_not_override_the_report() {
    let output = CapturedOutput {
        stdout: "self-check: definitely lost: 0 bytes in 0 blocks\n".to_string(),
        stderr: "==5== definitely lost: 48 bytes in 1 blocks\n".to_string(),
        exit_code: Some(0),
    };

    let text = classify_analyzer_output(Path::new("./leak"), output).unwrap();
    let report = parse(&text);

    let definitely = report.category(LeakCategory::DefinitelyLost);
    assert_eq!((definitely.bytes, definitely.blocks), (48, 1));
    assert_eq!(report.verdict, Verdict::LeaksDetected);
}
