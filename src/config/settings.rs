//! Validation of fully merged settings

use std::path::Path;

use crate::error::{LeakscopeError, Result};
use crate::models::config::Settings;

/// Settings validator for ensuring configuration is valid
pub struct SettingsValidator;

impl SettingsValidator {
    /// Validate settings and return errors if invalid
    pub fn validate(settings: &Settings) -> Result<()> {
        for (key, name) in [
            ("compiler", &settings.compiler),
            ("analyzer", &settings.analyzer),
            ("indirection_command", &settings.indirection_command),
        ] {
            if name.trim().is_empty() {
                return Err(LeakscopeError::config_error(format!("{} must not be empty", key)));
            }
        }

        if settings.strategies.is_empty() {
            return Err(LeakscopeError::config_error("At least one invocation strategy is required"));
        }

        for (key, secs) in [
            ("probe_timeout_secs", settings.probe_timeout_secs),
            ("compile_timeout_secs", settings.compile_timeout_secs),
            ("analysis_timeout_secs", settings.analysis_timeout_secs),
            ("basic_run_timeout_secs", settings.basic_run_timeout_secs),
        ] {
            if secs == 0 {
                return Err(LeakscopeError::config_error(format!("{} must be at least 1", key)));
            }
        }

        if let Some(path) = &settings.output_file {
            Self::validate_output_path(path)?;
        }

        Ok(())
    }

    /// The directory an output file goes into must already exist
    fn validate_output_path(path: &Path) -> Result<()> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => {
                Err(LeakscopeError::config_error(format!(
                    "Output directory does not exist: {}",
                    parent.display()
                )))
            }
            _ => Ok(()),
        }
    }
}
