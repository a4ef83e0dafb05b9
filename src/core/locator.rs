//! Tool location
//!
//! Tools are resolved through an ordered list of invocation strategies. Each
//! strategy is probed in turn with `<tool> --version`; every strategy that
//! answers is remembered, and the first one is preferred. Absence is a normal
//! outcome and never an error.

use super::exec::{self, ExecError};
use crate::models::config::{Settings, StrategyKind};
use crate::models::tools::{Tool, ToolAvailability, ToolStatus};
use crate::utils::paths::to_indirection_path;
use std::ffi::OsString;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

/// How to build a command line for one strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationStrategy {
    pub kind: StrategyKind,
    indirection_command: String,
}

impl InvocationStrategy {
    pub fn new(kind: StrategyKind, indirection_command: impl Into<String>) -> Self {
        Self {
            kind,
            indirection_command: indirection_command.into(),
        }
    }

    pub fn from_settings(kind: StrategyKind, settings: &Settings) -> Self {
        Self::new(kind, settings.indirection_command.clone())
    }

    /// Start a command that runs `program` under this strategy
    pub fn command(&self, program: &str) -> Command {
        match self.kind {
            StrategyKind::Direct => Command::new(program),
            StrategyKind::Indirection => {
                let mut command = Command::new(&self.indirection_command);
                command.arg(program);
                command
            }
        }
    }

    /// A host path in the form the invoked tool expects
    pub fn path_arg(&self, path: &Path) -> OsString {
        match self.kind {
            StrategyKind::Direct => path.as_os_str().to_os_string(),
            StrategyKind::Indirection => OsString::from(to_indirection_path(path)),
        }
    }

    /// The name shown in status lines
    pub fn display_program(&self, program: &str) -> String {
        match self.kind {
            StrategyKind::Direct => program.to_string(),
            StrategyKind::Indirection => format!("{} {}", self.indirection_command, program),
        }
    }
}

/// Resolves the compiler and analyzer
#[derive(Debug, Clone)]
pub struct ToolLocator {
    compiler: String,
    analyzer: String,
    indirection_command: String,
    strategies: Vec<StrategyKind>,
    probe_timeout: Duration,
}

impl ToolLocator {
    pub fn new(settings: &Settings) -> Self {
        Self {
            compiler: settings.compiler.clone(),
            analyzer: settings.analyzer.clone(),
            indirection_command: settings.indirection_command.clone(),
            strategies: settings.strategies.clone(),
            probe_timeout: Duration::from_secs(settings.probe_timeout_secs),
        }
    }

    fn probe(&self, command: Command) -> bool {
        match exec::run_with_timeout(command, self.probe_timeout) {
            Ok(output) => output.success(),
            Err(err @ ExecError::Timeout { .. }) => {
                log::warn!("probe timed out: {}", err);
                false
            }
            Err(err) => {
                log::debug!("probe failed: {}", err);
                false
            }
        }
    }

    fn probe_tool(&self, strategy: &InvocationStrategy, program: &str) -> bool {
        let mut command = strategy.command(program);
        command.arg("--version");
        self.probe(command)
    }

    fn probe_indirection_layer(&self) -> bool {
        let mut command = Command::new(&self.indirection_command);
        command.arg("--status");
        self.probe(command)
    }

    /// Probe every strategy for both tools
    pub fn check_availability(&self) -> ToolAvailability {
        let mut availability = ToolAvailability::default();
        let mut indirection_probed = false;

        for kind in &self.strategies {
            let strategy = InvocationStrategy::new(*kind, self.indirection_command.clone());

            if *kind == StrategyKind::Indirection {
                if indirection_probed {
                    continue;
                }
                indirection_probed = true;

                let layer_ok = self.probe_indirection_layer();
                availability.statuses.push(ToolStatus {
                    program: self.indirection_command.clone(),
                    tool: None,
                    strategy: *kind,
                    found: layer_ok,
                });
                log::info!("indirection layer `{}` available: {}", self.indirection_command, layer_ok);
                if !layer_ok {
                    continue;
                }
                availability.indirection_available = true;
            }

            for (tool, program) in [(Tool::Compiler, &self.compiler), (Tool::Analyzer, &self.analyzer)] {
                let strategies = match tool {
                    Tool::Compiler => &mut availability.compiler_strategies,
                    Tool::Analyzer => &mut availability.analyzer_strategies,
                };
                if strategies.contains(kind) {
                    continue;
                }

                let found = self.probe_tool(&strategy, program);
                log::info!("{} `{}` via {}: {}", tool, program, kind, if found { "found" } else { "missing" });
                if found {
                    strategies.push(*kind);
                }
                availability.statuses.push(ToolStatus {
                    program: strategy.display_program(program),
                    tool: Some(tool),
                    strategy: *kind,
                    found,
                });
            }
        }

        availability.compiler_found = !availability.compiler_strategies.is_empty();
        availability.analyzer_found = !availability.analyzer_strategies.is_empty();
        availability.via_indirection_layer = availability.preferred(Tool::Compiler)
            == Some(StrategyKind::Indirection)
            || availability.preferred(Tool::Analyzer) == Some(StrategyKind::Indirection);

        availability
    }
}
