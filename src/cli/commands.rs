//! Command implementations

use super::Args;
use crate::config::{self, CliArgs, DEFAULT_CONFIG_FILE};
use crate::core::Session;
use crate::error::{ErrorSeverity, LeakscopeError, OptionExt, Result};
use crate::models::config::{OutputFormat, Settings};
use crate::models::report::Verdict;
use crate::models::run::RunOutcome;
use crate::models::tools::ToolAvailability;
use crate::output::{self, create_formatter, create_writer, ProgressReporter};
use crate::utils::paths::is_c_source;
use std::path::Path;
use std::sync::Arc;

/// Available commands
#[derive(Debug)]
pub enum Command {
    /// Write a default configuration file
    Init,
    /// Probe for the compiler and analyzer
    CheckTools(Args),
    /// Compile a `.c` file and stop
    Compile(Args),
    /// Analyze an existing executable
    Analyze(Args),
    /// Compile a `.c` file, then analyze the result
    CompileAndAnalyze(Args),
}

impl Command {
    /// Create a command from parsed arguments
    pub fn from_args(args: Args) -> Self {
        if args.init {
            return Command::Init;
        }
        if args.check_tools {
            return Command::CheckTools(args);
        }
        if args.compile_only {
            return Command::Compile(args);
        }
        match &args.file {
            Some(file) if is_c_source(file) => Command::CompileAndAnalyze(args),
            _ => Command::Analyze(args),
        }
    }

    fn args(&self) -> Option<&Args> {
        match self {
            Command::Init => None,
            Command::CheckTools(args)
            | Command::Compile(args)
            | Command::Analyze(args)
            | Command::CompileAndAnalyze(args) => Some(args),
        }
    }

    fn input(&self) -> Result<&Path> {
        self.args()
            .and_then(|args| args.file.as_deref())
            .ok_or_error(|| LeakscopeError::config_error("No input file given. Pass a .c source file or an executable."))
    }

    /// Validate the command arguments
    pub fn validate(&self) -> Result<()> {
        if let Some(config_path) = self.args().and_then(|args| args.config.as_ref()) {
            if !config_path.exists() {
                return Err(LeakscopeError::ConfigNotFound {
                    path: config_path.clone(),
                });
            }
        }

        match self {
            Command::Init | Command::CheckTools(_) => Ok(()),
            Command::Compile(_) | Command::Analyze(_) | Command::CompileAndAnalyze(_) => {
                let input = self.input()?;
                if !input.exists() {
                    return Err(LeakscopeError::SourceNotFound {
                        path: input.to_path_buf(),
                    });
                }
                Ok(())
            }
        }
    }

    /// Load the layered settings for this invocation
    pub fn settings(&self) -> Result<Settings> {
        match self.args() {
            Some(args) => config::load_config(CliArgs::from(args)),
            None => Ok(Settings::default()),
        }
    }

    /// Execute the command, returning the process exit code
    pub fn execute(&self) -> Result<i32> {
        self.validate()?;
        let settings = self.settings()?;
        if settings.verbose {
            log::debug!("settings: {:#?}", settings);
        }

        let reporter = Arc::new(ProgressReporter::new(
            settings.quiet,
            settings.verbose,
            settings.show_progress,
        ));
        let session = Session::new(settings.clone(), Arc::clone(&reporter));
        let binary = self.args().and_then(|args| args.binary.clone());

        let (content, code) = match self {
            Command::Init => return init_config(Path::new(DEFAULT_CONFIG_FILE)),
            Command::CheckTools(_) => {
                let availability = session.check_tools()?;
                let code = if availability.compiler_found && availability.analyzer_found { 0 } else { 1 };
                (render_availability(&availability, &settings)?, code)
            }
            Command::Compile(_) => {
                let outcome = session.compile(self.input()?, binary)?;
                let content = match settings.output_format {
                    OutputFormat::Json => serde_json::to_string_pretty(&outcome)? + "\n",
                    _ => output::format_compile_text(&outcome, settings.use_colors),
                };
                (content, 0)
            }
            Command::Analyze(_) => {
                let outcome = session.analyze(self.input()?)?;
                (render_outcome(&outcome, &settings)?, outcome_exit_code(&outcome))
            }
            Command::CompileAndAnalyze(_) => {
                let outcome = session.compile_and_analyze(self.input()?, binary)?;
                (render_outcome(&outcome, &settings)?, outcome_exit_code(&outcome))
            }
        };

        create_writer(settings.output_file.as_ref()).write(&content)?;
        if let Some(path) = &settings.output_file {
            reporter.print(&format!("Report written to {}", path.display()));
        }

        Ok(code)
    }

    /// Run the command and handle errors
    pub fn run(&self) -> i32 {
        match self.execute() {
            Ok(code) => code,
            Err(err) => {
                eprintln!("{}: {}", err.severity(), err.user_message());
                if let Some(hint) = err.suggestion() {
                    eprintln!("hint: {}", hint);
                }

                // The requested action did not complete, even for warnings
                match err.severity() {
                    ErrorSeverity::Warning | ErrorSeverity::Error => 1,
                    ErrorSeverity::Critical => 2,
                }
            }
        }
    }
}

fn init_config(path: &Path) -> Result<i32> {
    if path.exists() {
        println!("Configuration file already exists at: {}", path.display());
        println!("To overwrite it, delete the file first and run this command again.");
        return Ok(0);
    }

    config::create_default_config(path)?;

    println!("Created default configuration file at: {}", path.display());
    println!("\nExample configuration options:");
    println!("  - compiler / analyzer: programs to run (gcc, valgrind)");
    println!("  - strategies: invocation order, e.g. [\"indirection\", \"direct\"]");
    println!("  - analysis_timeout_secs: kill valgrind after this many seconds");
    println!("  - still_reachable_is_leak: count still reachable memory as a leak");
    Ok(0)
}

fn render_outcome(outcome: &RunOutcome, settings: &Settings) -> Result<String> {
    let formatter = create_formatter(
        &settings.output_format,
        settings.use_colors,
        settings.verbose,
        settings.quiet,
        settings.show_raw_output,
    );
    formatter.format(outcome)
}

fn render_availability(availability: &ToolAvailability, settings: &Settings) -> Result<String> {
    match settings.output_format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(availability)? + "\n"),
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(vec![]);
            writer.write_record(["Program", "Tool", "Strategy", "Found"])?;
            for status in &availability.statuses {
                writer.write_record([
                    status.program.clone(),
                    status.tool.map(|t| t.to_string()).unwrap_or_default(),
                    status.strategy.to_string(),
                    status.found.to_string(),
                ])?;
            }
            let bytes = writer
                .into_inner()
                .map_err(|e| LeakscopeError::Csv { source: e.into_error().into() })?;
            String::from_utf8(bytes).map_err(|e| LeakscopeError::CsvSerialize { source: e })
        }
        OutputFormat::Text => Ok(output::format_availability_text(availability, settings.use_colors)),
    }
}

/// 0 when the program is clean, 1 for leaks or a failed analysis
pub fn outcome_exit_code(outcome: &RunOutcome) -> i32 {
    match (&outcome.report, &outcome.basic_run) {
        (Some(report), _) => match report.verdict {
            Verdict::Clean => 0,
            Verdict::LeaksDetected | Verdict::AnalysisFailed => 1,
        },
        (None, Some(result)) if result.exit_code == Some(0) => 0,
        _ => 1,
    }
}
