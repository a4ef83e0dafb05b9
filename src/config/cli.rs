//! Command-line argument configuration source

use std::path::PathBuf;

use super::ConfigSource;
use crate::cli::args::{Args, OutputFormat as CliOutputFormat};
use crate::error::Result;
use crate::models::config::{OutputFormat, PartialSettings};

/// Command-line argument configuration source
#[derive(Debug)]
pub struct CliConfig {
    args: CliArgs,
    name: String,
    priority: u8,
}

/// The subset of the command line that maps onto settings
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub output_format: Option<OutputFormat>,
    pub output_file: Option<PathBuf>,
    pub quiet: bool,
    pub verbose: bool,
    pub no_colors: bool,
    pub no_progress: bool,
    pub no_raw_output: bool,
    pub no_fallback: bool,
    pub strict_reachable: bool,
    pub analysis_timeout: Option<u64>,
    pub compile_timeout: Option<u64>,
    pub config: Option<PathBuf>,
}

impl From<&Args> for CliArgs {
    fn from(args: &Args) -> Self {
        Self {
            output_format: args.output.map(|format| match format {
                CliOutputFormat::Text => OutputFormat::Text,
                CliOutputFormat::Json => OutputFormat::Json,
                CliOutputFormat::Csv => OutputFormat::Csv,
            }),
            output_file: args.output_file.clone(),
            quiet: args.quiet,
            verbose: args.verbose,
            no_colors: args.no_colors,
            no_progress: args.no_progress,
            no_raw_output: args.no_raw_output,
            no_fallback: args.no_fallback,
            strict_reachable: args.strict_reachable,
            analysis_timeout: args.timeout,
            compile_timeout: args.compile_timeout,
            config: args.config.clone(),
        }
    }
}

impl CliConfig {
    /// Create a new CLI configuration source
    pub fn new(args: CliArgs) -> Self {
        Self {
            args,
            name: "command-line arguments".to_string(),
            priority: 30,
        }
    }

    /// Create a CLI configuration source from Args
    pub fn from_args(args: &Args) -> Self {
        Self::new(CliArgs::from(args))
    }

    /// Get the config file path if specified
    pub fn config_path(&self) -> Option<&PathBuf> {
        self.args.config.as_ref()
    }
}

impl ConfigSource for CliConfig {
    fn load(&self) -> Result<PartialSettings> {
        let mut settings = PartialSettings {
            output_format: self.args.output_format,
            output_file: self.args.output_file.clone(),
            analysis_timeout_secs: self.args.analysis_timeout,
            compile_timeout_secs: self.args.compile_timeout,
            ..Default::default()
        };

        // Flags only ever override in one direction
        if self.args.quiet {
            settings.quiet = Some(true);
        }
        if self.args.verbose {
            settings.verbose = Some(true);
        }
        if self.args.no_colors {
            settings.use_colors = Some(false);
        }
        if self.args.no_progress {
            settings.show_progress = Some(false);
        }
        if self.args.no_raw_output {
            settings.show_raw_output = Some(false);
        }
        if self.args.no_fallback {
            settings.basic_run_fallback = Some(false);
        }
        if self.args.strict_reachable {
            settings.still_reachable_is_leak = Some(true);
        }

        Ok(settings)
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> u8 {
        self.priority
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_config_source() {
        let args = CliArgs {
            output_format: Some(OutputFormat::Json),
            strict_reachable: true,
            analysis_timeout: Some(60),
            ..Default::default()
        };

        let cli_config = CliConfig::new(args);
        assert!(cli_config.is_available());
        assert_eq!(cli_config.priority(), 30);

        let settings = cli_config.load().unwrap();
        assert_eq!(settings.output_format, Some(OutputFormat::Json));
        assert_eq!(settings.still_reachable_is_leak, Some(true));
        assert_eq!(settings.analysis_timeout_secs, Some(60));
        // Unset flags leave lower layers alone
        assert_eq!(settings.quiet, None);
        assert_eq!(settings.use_colors, None);
    }

    #[test]
    fn test_from_args() {
        let args = Args::parse_from([
            "leakscope",
            "leak.c",
            "--output",
            "csv",
            "--output-file",
            "report.csv",
            "--no-colors",
            "--no-raw-output",
            "--no-fallback",
            "--compile-timeout",
            "45",
        ]);

        let cli_config = CliConfig::from_args(&args);
        let settings = cli_config.load().unwrap();

        assert_eq!(settings.output_format, Some(OutputFormat::Csv));
        assert_eq!(settings.output_file, Some(PathBuf::from("report.csv")));
        assert_eq!(settings.use_colors, Some(false));
        assert_eq!(settings.show_raw_output, Some(false));
        assert_eq!(settings.basic_run_fallback, Some(false));
        assert_eq!(settings.compile_timeout_secs, Some(45));
        assert_eq!(cli_config.config_path(), None);
    }
}
