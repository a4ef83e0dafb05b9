//! Output formatting functionality
//!
//! This module provides formatters for different output formats.

use crate::error::{LeakscopeError, Result};
use crate::models::report::{LeakCategory, LeakReport, Verdict};
use crate::models::run::{BasicRunResult, CompileOutcome, RunOutcome};
use crate::models::tools::ToolAvailability;
use ansi_term::Colour::{Blue, Green, Red, Yellow};
use ansi_term::Style;

/// Command shown when tools are missing
pub const SETUP_COMMAND: &str = "sudo apt update && sudo apt install -y gcc valgrind";

fn paint(use_colors: bool, style: Style, text: impl AsRef<str>) -> String {
    if use_colors {
        style.paint(text.as_ref()).to_string()
    } else {
        text.as_ref().to_string()
    }
}

fn status_mark(found: bool, use_colors: bool) -> String {
    match (found, use_colors) {
        (true, true) => Green.paint("✓").to_string(),
        (false, true) => Red.paint("✗").to_string(),
        (true, false) => "✓".to_string(),
        (false, false) => "✗".to_string(),
    }
}

/// Format the result of a tool check, one line per probe
pub fn format_availability_text(availability: &ToolAvailability, use_colors: bool) -> String {
    let mut output = String::new();
    output.push_str(&format!("{}\n", paint(use_colors, Blue.bold(), "Tool check")));

    for status in &availability.statuses {
        let what = match status.tool {
            Some(tool) => tool.to_string(),
            None => "compatibility layer".to_string(),
        };
        output.push_str(&format!(
            "  {} {} ({}, {})\n",
            status_mark(status.found, use_colors),
            status.program,
            what,
            status.strategy
        ));
    }

    if availability.via_indirection_layer {
        output.push_str("Tools will run through the compatibility layer.\n");
    }

    if !availability.compiler_found || !availability.analyzer_found {
        output.push_str(&format!(
            "\n{}\n",
            paint(use_colors, Yellow.bold(), "Some required tools are missing.")
        ));
        if availability.needs_setup() {
            output.push_str("  The compatibility layer is installed but lacks gcc or valgrind.\n");
        }
        if !availability.indirection_available && cfg!(windows) {
            output.push_str("  Install WSL first: `wsl --install`, then restart.\n");
        }
        output.push_str(&format!("  Install the tools with: {}\n", SETUP_COMMAND));
    } else {
        output.push_str(&format!("{}\n", paint(use_colors, Green.bold(), "All tools available.")));
    }

    output
}

/// Format a successful compile
pub fn format_compile_text(outcome: &CompileOutcome, use_colors: bool) -> String {
    format!(
        "{} {} -> {} (via {})\n",
        paint(use_colors, Green.bold(), "Compiled"),
        outcome.source_file.display(),
        outcome.binary.display(),
        outcome.strategy
    )
}

fn format_report_text(report: &LeakReport, use_colors: bool, verbose: bool, output: &mut String) {
    if report.verdict == Verdict::AnalysisFailed {
        output.push_str(&format!("{}\n", paint(use_colors, Red.bold(), "Analysis failed")));
        if let Some(reason) = &report.failure {
            output.push_str(&format!("  {}\n", reason));
        }
        return;
    }

    let usage = &report.usage;
    output.push_str(&format!(
        "Heap usage: {} allocs, {} frees, {} bytes allocated\n",
        usage.total_allocs, usage.total_frees, usage.total_bytes_allocated
    ));
    if report.all_heap_freed {
        output.push_str("All heap blocks were freed.\n");
    }

    output.push_str("\nLeak summary:\n");
    for category in LeakCategory::ALL {
        let count = report.category(category);
        let style = match (category, count.is_zero()) {
            (_, true) => Style::new(),
            (LeakCategory::StillReachable, false) => Yellow.normal(),
            (_, false) => Red.normal(),
        };
        output.push_str(&format!(
            "  {}\n",
            paint(
                use_colors,
                style,
                format!("{}: {} bytes in {} blocks", category, count.bytes, count.blocks)
            )
        ));
        if verbose || !count.is_zero() {
            output.push_str(&format!(
                "    {}\n",
                paint(use_colors, Style::new().dimmed(), category.explanation())
            ));
        }
    }

    output.push_str(&format!("  Total leaked: {} bytes\n", report.leaked_bytes()));
    if let Some(suppressed) = &report.suppressed {
        output.push_str(&format!(
            "  Suppressed: {} bytes in {} blocks\n",
            suppressed.bytes, suppressed.blocks
        ));
    }
    if let Some(summary) = &report.error_summary {
        output.push_str(&format!(
            "Error summary: {} errors from {} contexts\n",
            summary.errors, summary.contexts
        ));
    }

    if !report.warnings.is_empty() {
        output.push_str(&format!("\n{}\n", paint(use_colors, Yellow.bold(), "Parse warnings:")));
        for warning in &report.warnings {
            output.push_str(&format!("  {}\n", warning));
        }
    }

    let verdict = match report.verdict {
        Verdict::Clean => paint(use_colors, Green.bold(), "No memory leaks detected."),
        _ => paint(use_colors, Red.bold(), "Memory leaks detected."),
    };
    output.push_str(&format!("\n{}\n", verdict));
}

fn format_basic_run_text(result: &BasicRunResult, use_colors: bool, output: &mut String) {
    output.push_str(&format!(
        "{}\n",
        paint(
            use_colors,
            Yellow.bold(),
            "Valgrind not available: the program was run without leak detection."
        )
    ));
    match result.exit_code {
        Some(code) => output.push_str(&format!("Exit code: {}\n", code)),
        None => output.push_str("Terminated by a signal\n"),
    }
    if !result.stdout.is_empty() {
        output.push_str(&format!("\nProgram output:\n{}", result.stdout));
        if !result.stdout.ends_with('\n') {
            output.push('\n');
        }
    }
    if !result.stderr.is_empty() {
        output.push_str(&format!("\nProgram errors:\n{}", result.stderr));
        if !result.stderr.ends_with('\n') {
            output.push('\n');
        }
    }
}

/// Format a run outcome as text
pub fn format_outcome_text(outcome: &RunOutcome, use_colors: bool, verbose: bool, show_raw: bool) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{}\n",
        paint(use_colors, Blue.bold(), format!("Memory analysis of {}", outcome.binary.display()))
    ));
    if let Some(source) = &outcome.source_file {
        output.push_str(&format!("Source: {}\n", source.display()));
    }
    if verbose {
        if let Some(strategy) = outcome.compiled_with {
            output.push_str(&format!("Compiled via: {}\n", strategy));
        }
        if let Some(strategy) = outcome.analyzed_with {
            output.push_str(&format!("Analyzed via: {}\n", strategy));
        }
        output.push_str(&format!("Started: {}\n", outcome.started_at.to_rfc3339()));
        output.push_str(&format!("Duration: {:.2}s\n", outcome.duration.as_secs_f64()));
    }
    output.push('\n');

    if let Some(report) = &outcome.report {
        format_report_text(report, use_colors, verbose, &mut output);
    }
    if let Some(result) = &outcome.basic_run {
        format_basic_run_text(result, use_colors, &mut output);
    }

    if show_raw {
        if let Some(raw) = &outcome.raw_output {
            output.push_str(&format!("\n{}\n", paint(use_colors, Style::new().bold(), "Valgrind output:")));
            output.push_str(raw.as_str());
            if !raw.as_str().ends_with('\n') {
                output.push('\n');
            }
        }
    }

    output
}

/// One-line summary for quiet mode
pub fn format_outcome_quiet(outcome: &RunOutcome) -> String {
    match (&outcome.report, &outcome.basic_run) {
        (Some(report), _) if report.verdict == Verdict::AnalysisFailed => {
            format!("analysis failed: {}\n", report.failure.as_deref().unwrap_or("unknown error"))
        }
        (Some(report), _) => format!(
            "{}: definitely {} B, indirectly {} B, possibly {} B, still reachable {} B, total {} B\n",
            report.verdict,
            report.category(LeakCategory::DefinitelyLost).bytes,
            report.category(LeakCategory::IndirectlyLost).bytes,
            report.category(LeakCategory::PossiblyLost).bytes,
            report.category(LeakCategory::StillReachable).bytes,
            report.leaked_bytes(),
        ),
        (None, Some(result)) => format!("not analyzed: exit code {:?}\n", result.exit_code),
        (None, None) => "not analyzed\n".to_string(),
    }
}

/// Format a run outcome as JSON
pub fn format_outcome_json(outcome: &RunOutcome) -> Result<String> {
    serde_json::to_string_pretty(outcome).map_err(|e| LeakscopeError::JsonSerialize { source: e })
}

/// Format a run outcome as CSV, one row per leak category plus a heap usage row
pub fn format_outcome_csv(outcome: &RunOutcome) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);

    writer.write_record(["Binary", "Verdict", "Category", "Bytes", "Blocks"])?;

    let binary = outcome.binary.display().to_string();
    if let Some(report) = &outcome.report {
        let verdict = report.verdict.to_string();
        for category in LeakCategory::ALL {
            let count = report.category(category);
            writer.write_record([
                binary.as_str(),
                verdict.as_str(),
                category.label(),
                &count.bytes.to_string(),
                &count.blocks.to_string(),
            ])?;
        }
        if let Some(suppressed) = &report.suppressed {
            writer.write_record([
                binary.as_str(),
                verdict.as_str(),
                "suppressed",
                &suppressed.bytes.to_string(),
                &suppressed.blocks.to_string(),
            ])?;
        }
        writer.write_record([
            binary.as_str(),
            verdict.as_str(),
            "heap usage",
            &report.usage.total_bytes_allocated.to_string(),
            &report.usage.total_allocs.to_string(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| LeakscopeError::Csv { source: e.into_error().into() })?;
    String::from_utf8(bytes).map_err(|e| LeakscopeError::CsvSerialize { source: e })
}
