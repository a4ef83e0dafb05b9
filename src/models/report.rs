//! Leak report structures
//!
//! A [`LeakReport`] is derived entirely from the analyzer's text; nothing in
//! here needs the raw text again to be rendered.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The four analyzer-defined classifications of unreleased memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeakCategory {
    DefinitelyLost,
    IndirectlyLost,
    PossiblyLost,
    StillReachable,
}

impl LeakCategory {
    /// All categories in report order
    pub const ALL: [LeakCategory; 4] = [
        LeakCategory::DefinitelyLost,
        LeakCategory::IndirectlyLost,
        LeakCategory::PossiblyLost,
        LeakCategory::StillReachable,
    ];

    /// The label the analyzer prints in front of the counts
    pub fn label(&self) -> &'static str {
        match self {
            LeakCategory::DefinitelyLost => "definitely lost",
            LeakCategory::IndirectlyLost => "indirectly lost",
            LeakCategory::PossiblyLost => "possibly lost",
            LeakCategory::StillReachable => "still reachable",
        }
    }

    /// What the category means for the program under test
    pub fn explanation(&self) -> &'static str {
        match self {
            LeakCategory::DefinitelyLost => {
                "Memory with no remaining pointer to it. This is a real leak and should be fixed."
            }
            LeakCategory::IndirectlyLost => {
                "Memory only reachable through blocks that are themselves lost. Fixing the definite leaks usually fixes these."
            }
            LeakCategory::PossiblyLost => {
                "Memory reachable only through a pointer into the middle of the block. Likely a leak unless pointer arithmetic is intended."
            }
            LeakCategory::StillReachable => {
                "Memory still pointed to at exit but never freed. Not a leak in the strict sense."
            }
        }
    }
}

impl fmt::Display for LeakCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.label();
        let mut chars = label.chars();
        match chars.next() {
            Some(first) => write!(f, "{}{}", first.to_ascii_uppercase(), chars.as_str()),
            None => Ok(()),
        }
    }
}

/// Bytes and blocks reported for one category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeakCategoryCount {
    pub category: LeakCategory,
    pub bytes: u64,
    pub blocks: u64,
}

impl LeakCategoryCount {
    /// A zero-valued count, used for categories absent from the text
    pub fn zero(category: LeakCategory) -> Self {
        Self {
            category,
            bytes: 0,
            blocks: 0,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.bytes == 0 && self.blocks == 0
    }
}

/// Blocks hidden by suppression files, reported for information only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SuppressedCount {
    pub bytes: u64,
    pub blocks: u64,
}

/// Aggregate allocation counts from the "total heap usage" line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HeapUsageSummary {
    pub total_allocs: u64,
    pub total_frees: u64,
    pub total_bytes_allocated: u64,
}

/// Counts from the "ERROR SUMMARY" line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ErrorSummary {
    pub errors: u64,
    pub contexts: u64,
}

/// Overall classification of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Clean,
    LeaksDetected,
    AnalysisFailed,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Clean => write!(f, "clean"),
            Verdict::LeaksDetected => write!(f, "leaks detected"),
            Verdict::AnalysisFailed => write!(f, "analysis failed"),
        }
    }
}

/// A line matched a pattern but its numbers could not be read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseWarning {
    /// Which value fell back to zero, e.g. "definitely lost bytes"
    pub field: String,
    /// The text that failed to parse
    pub value: String,
    /// 1-based line number in the diagnostic text
    pub line: usize,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}: could not read {} from '{}', using 0",
            self.line, self.field, self.value
        )
    }
}

/// Decides which categories count toward a leak verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VerdictPolicy {
    /// When false, "still reachable" memory is informational only
    pub still_reachable_is_leak: bool,
}

impl VerdictPolicy {
    pub fn counts(&self, category: LeakCategory) -> bool {
        category != LeakCategory::StillReachable || self.still_reachable_is_leak
    }
}

/// Structured summary of one analyzer run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeakReport {
    pub usage: HeapUsageSummary,
    /// Always one entry per category, in [`LeakCategory::ALL`] order
    pub categories: Vec<LeakCategoryCount>,
    pub suppressed: Option<SuppressedCount>,
    pub error_summary: Option<ErrorSummary>,
    /// The analyzer printed "All heap blocks were freed"
    pub all_heap_freed: bool,
    pub verdict: Verdict,
    /// The policy the verdict was derived under
    #[serde(default)]
    pub policy: VerdictPolicy,
    pub warnings: Vec<ParseWarning>,
    /// Why the analysis failed, set only for [`Verdict::AnalysisFailed`]
    pub failure: Option<String>,
}

impl LeakReport {
    /// An empty report with every category at zero
    pub fn empty() -> Self {
        Self {
            usage: HeapUsageSummary::default(),
            categories: LeakCategory::ALL.iter().map(|c| LeakCategoryCount::zero(*c)).collect(),
            suppressed: None,
            error_summary: None,
            all_heap_freed: false,
            verdict: Verdict::Clean,
            policy: VerdictPolicy::default(),
            warnings: Vec::new(),
            failure: None,
        }
    }

    /// Report for a run where the analyzer could not execute the target
    pub fn analysis_failed(reason: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::AnalysisFailed,
            failure: Some(reason.into()),
            ..Self::empty()
        }
    }

    pub fn category(&self, category: LeakCategory) -> LeakCategoryCount {
        self.categories
            .iter()
            .find(|c| c.category == category)
            .copied()
            .unwrap_or_else(|| LeakCategoryCount::zero(category))
    }

    pub fn is_clean(&self) -> bool {
        self.verdict == Verdict::Clean
    }

    /// Bytes lost across every category the policy counts as a leak
    pub fn total_leaked_bytes(&self, policy: VerdictPolicy) -> u64 {
        self.categories
            .iter()
            .filter(|c| policy.counts(c.category))
            .map(|c| c.bytes)
            .sum()
    }

    /// Bytes lost under the policy this report was parsed with
    pub fn leaked_bytes(&self) -> u64 {
        self.total_leaked_bytes(self.policy)
    }

    /// Derive the verdict from the category counts
    pub fn derive_verdict(categories: &[LeakCategoryCount], policy: VerdictPolicy) -> Verdict {
        let leaking = categories
            .iter()
            .any(|c| policy.counts(c.category) && !c.is_zero());
        if leaking {
            Verdict::LeaksDetected
        } else {
            Verdict::Clean
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report_is_clean_with_all_categories() {
        let report = LeakReport::empty();
        assert_eq!(report.verdict, Verdict::Clean);
        assert_eq!(report.categories.len(), 4);
        assert!(report.categories.iter().all(|c| c.is_zero()));
    }

    #[test]
    fn test_analysis_failed_report() {
        let report = LeakReport::analysis_failed("valgrind: command not found");
        assert_eq!(report.verdict, Verdict::AnalysisFailed);
        assert_eq!(report.failure.as_deref(), Some("valgrind: command not found"));
        assert!(!report.is_clean());
    }

    #[test]
    fn test_still_reachable_is_informational_by_default() {
        let mut categories: Vec<_> = LeakCategory::ALL.iter().map(|c| LeakCategoryCount::zero(*c)).collect();
        categories[3].bytes = 72;
        categories[3].blocks = 2;

        assert_eq!(LeakReport::derive_verdict(&categories, VerdictPolicy::default()), Verdict::Clean);

        let strict = VerdictPolicy { still_reachable_is_leak: true };
        assert_eq!(LeakReport::derive_verdict(&categories, strict), Verdict::LeaksDetected);
    }

    #[test]
    fn test_blocks_alone_mark_a_leak() {
        let mut categories: Vec<_> = LeakCategory::ALL.iter().map(|c| LeakCategoryCount::zero(*c)).collect();
        categories[0].blocks = 1;
        assert_eq!(
            LeakReport::derive_verdict(&categories, VerdictPolicy::default()),
            Verdict::LeaksDetected
        );
    }

    #[test]
    fn test_category_display() {
        assert_eq!(LeakCategory::DefinitelyLost.to_string(), "Definitely lost");
        assert_eq!(LeakCategory::StillReachable.label(), "still reachable");
    }
}
