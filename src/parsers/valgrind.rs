//! Valgrind output parsing
//!
//! Turns the analyzer's combined output into a [`LeakReport`]. Parsing is a
//! pure function of the text: no environment, no logging, no I/O. Malformed
//! numbers fall back to zero and are recorded as [`ParseWarning`]s.
//!
//! Once any line carries memcheck's `==PID==` prefix, unprefixed lines are
//! the target's own output and are never read as summary lines.

use crate::models::report::{
    ErrorSummary, HeapUsageSummary, LeakCategory, LeakReport, ParseWarning, SuppressedCount,
    VerdictPolicy,
};
use crate::models::run::RawDiagnosticText;
use regex::Regex;
use std::sync::LazyLock;

static PID_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*==\d+==").expect("pid prefix pattern is valid"));

static HEAP_USAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)total\s+heap\s+usage:\s*(\S+)\s+allocs?,\s*(\S+)\s+frees?,\s*(\S+)\s+bytes\s+allocated")
        .expect("heap usage pattern is valid")
});

static CATEGORY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(definitely\s+lost|indirectly\s+lost|possibly\s+lost|still\s+reachable|suppressed)\s*:\s*(\S+)\s+bytes\s+in\s+(\S+)\s+blocks?")
        .expect("leak category pattern is valid")
});

static ERROR_SUMMARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)error\s+summary:\s*(\S+)\s+errors?\s+from\s+(\S+)\s+contexts?")
        .expect("error summary pattern is valid")
});

const ALL_FREED_MARKER: &str = "all heap blocks were freed";

/// Label found in front of a byte/block count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CountLabel {
    Category(LeakCategory),
    Suppressed,
}

impl CountLabel {
    fn from_match(label: &str) -> Option<Self> {
        let normalized = label.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        if normalized == "suppressed" {
            return Some(CountLabel::Suppressed);
        }
        LeakCategory::ALL
            .iter()
            .find(|c| c.label() == normalized)
            .map(|c| CountLabel::Category(*c))
    }

    fn name(&self) -> &'static str {
        match self {
            CountLabel::Category(category) => category.label(),
            CountLabel::Suppressed => "suppressed",
        }
    }
}

/// Parser for valgrind memcheck output
pub struct ValgrindParser;

impl ValgrindParser {
    /// Parse with the default verdict policy
    pub fn parse(text: &RawDiagnosticText) -> LeakReport {
        Self::parse_with_policy(text, VerdictPolicy::default())
    }

    /// Parse, letting `policy` decide which categories affect the verdict
    pub fn parse_with_policy(text: &RawDiagnosticText, policy: VerdictPolicy) -> LeakReport {
        let mut report = LeakReport::empty();
        report.policy = policy;
        let prefixed = text.as_str().lines().any(|line| PID_PREFIX.is_match(line));

        for (index, line) in text.as_str().lines().enumerate() {
            let line_no = index + 1;

            if prefixed && !PID_PREFIX.is_match(line) {
                continue;
            }

            if let Some(caps) = HEAP_USAGE.captures(line) {
                let mut warnings = Vec::new();
                report.usage = HeapUsageSummary {
                    total_allocs: read_count(&caps[1], "total allocs", line_no, &mut warnings),
                    total_frees: read_count(&caps[2], "total frees", line_no, &mut warnings),
                    total_bytes_allocated: read_count(&caps[3], "total bytes allocated", line_no, &mut warnings),
                };
                report.warnings.extend(warnings);
                continue;
            }

            if let Some(caps) = CATEGORY.captures(line) {
                if let Some(label) = CountLabel::from_match(&caps[1]) {
                    let bytes_field = format!("{} bytes", label.name());
                    let blocks_field = format!("{} blocks", label.name());
                    let bytes = read_count(&caps[2], &bytes_field, line_no, &mut report.warnings);
                    let blocks = read_count(&caps[3], &blocks_field, line_no, &mut report.warnings);

                    match label {
                        CountLabel::Category(category) => {
                            if let Some(slot) = report.categories.iter_mut().find(|c| c.category == category) {
                                slot.bytes = bytes;
                                slot.blocks = blocks;
                            }
                        }
                        CountLabel::Suppressed => {
                            report.suppressed = Some(SuppressedCount { bytes, blocks });
                        }
                    }
                }
                continue;
            }

            if let Some(caps) = ERROR_SUMMARY.captures(line) {
                report.error_summary = Some(ErrorSummary {
                    errors: read_count(&caps[1], "error count", line_no, &mut report.warnings),
                    contexts: read_count(&caps[2], "error contexts", line_no, &mut report.warnings),
                });
                continue;
            }

            if line.to_lowercase().contains(ALL_FREED_MARKER) {
                report.all_heap_freed = true;
            }
        }

        report.verdict = LeakReport::derive_verdict(&report.categories, policy);
        report
    }
}

/// Parse `text` with the default verdict policy
pub fn parse(text: &RawDiagnosticText) -> LeakReport {
    ValgrindParser::parse(text)
}

/// Parse `text` with an explicit verdict policy
pub fn parse_with_policy(text: &RawDiagnosticText, policy: VerdictPolicy) -> LeakReport {
    ValgrindParser::parse_with_policy(text, policy)
}

/// Read a count with thousands separators; malformed input yields 0 and a warning
fn read_count(raw: &str, field: &str, line: usize, warnings: &mut Vec<ParseWarning>) -> u64 {
    let digits: String = raw.chars().filter(|c| *c != ',').collect();
    match digits.parse::<u64>() {
        Ok(value) => value,
        Err(_) => {
            warnings.push(ParseWarning {
                field: field.to_string(),
                value: raw.to_string(),
                line,
            });
            0
        }
    }
}
