//! Tool availability structures

use super::config::StrategyKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two external tools leakscope drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tool {
    Compiler,
    Analyzer,
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tool::Compiler => write!(f, "compiler"),
            Tool::Analyzer => write!(f, "analyzer"),
        }
    }
}

/// Outcome of one probe, kept for the status listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolStatus {
    /// The program that was probed, e.g. "gcc" or "wsl"
    pub program: String,
    /// None for the probe of the indirection layer itself
    pub tool: Option<Tool>,
    pub strategy: StrategyKind,
    pub found: bool,
}

/// Which tools can be reached, and through which strategies
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ToolAvailability {
    pub compiler_found: bool,
    pub analyzer_found: bool,
    /// The preferred strategy for a found tool goes through the indirection layer
    pub via_indirection_layer: bool,
    /// The indirection layer itself answered its probe
    pub indirection_available: bool,
    /// Strategies that resolved the compiler, in configured order
    pub compiler_strategies: Vec<StrategyKind>,
    /// Strategies that resolved the analyzer, in configured order
    pub analyzer_strategies: Vec<StrategyKind>,
    pub statuses: Vec<ToolStatus>,
}

impl ToolAvailability {
    pub fn strategies_for(&self, tool: Tool) -> &[StrategyKind] {
        match tool {
            Tool::Compiler => &self.compiler_strategies,
            Tool::Analyzer => &self.analyzer_strategies,
        }
    }

    /// The first strategy that resolved the tool
    pub fn preferred(&self, tool: Tool) -> Option<StrategyKind> {
        self.strategies_for(tool).first().copied()
    }

    /// The indirection layer works but is missing one of the tools
    pub fn needs_setup(&self) -> bool {
        self.indirection_available
            && (!self.compiler_strategies.contains(&StrategyKind::Indirection)
                || !self.analyzer_strategies.contains(&StrategyKind::Indirection))
    }
}
