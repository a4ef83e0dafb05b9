//! Configuration file parsing utilities

use std::fs;
use std::path::{Path, PathBuf};

use super::file::DEFAULT_CONFIG_FILE;
use crate::error::{LeakscopeError, Result, ResultExt};
use crate::models::config::PartialSettings;

/// Parse a TOML configuration file into PartialSettings
pub fn parse_config_file<P: AsRef<Path>>(path: P) -> Result<PartialSettings> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(LeakscopeError::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(path).map_err(|e| LeakscopeError::ConfigRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_config_content(&content, path)
}

/// Parse TOML configuration content into PartialSettings
pub fn parse_config_content<P: AsRef<Path>>(content: &str, path: P) -> Result<PartialSettings> {
    let path = path.as_ref();

    let settings: PartialSettings = toml::from_str(content).map_err(|e| LeakscopeError::ConfigParse {
        path: path.to_path_buf(),
        source: e,
    })?;

    validate_partial_settings(&settings, path)?;

    Ok(settings)
}

fn invalid(path: &Path, what: &str) -> LeakscopeError {
    LeakscopeError::config_error(format!("{} in config file: {}", what, path.display()))
}

/// Validate partial settings for obvious errors
pub fn validate_partial_settings<P: AsRef<Path>>(settings: &PartialSettings, path: P) -> Result<()> {
    let path = path.as_ref();

    for (key, value) in [
        ("compiler", &settings.compiler),
        ("analyzer", &settings.analyzer),
        ("indirection_command", &settings.indirection_command),
    ] {
        if matches!(value, Some(name) if name.trim().is_empty()) {
            return Err(invalid(path, &format!("Invalid empty {}", key)));
        }
    }

    if matches!(&settings.strategies, Some(list) if list.is_empty()) {
        return Err(invalid(path, "Empty strategies list"));
    }

    for (key, value) in [
        ("probe_timeout_secs", settings.probe_timeout_secs),
        ("compile_timeout_secs", settings.compile_timeout_secs),
        ("analysis_timeout_secs", settings.analysis_timeout_secs),
        ("basic_run_timeout_secs", settings.basic_run_timeout_secs),
    ] {
        if value == Some(0) {
            return Err(invalid(path, &format!("Invalid {} 0, must be at least 1", key)));
        }
    }

    if matches!(&settings.output_file, Some(file) if file.as_os_str().is_empty()) {
        return Err(invalid(path, "Invalid empty output_file"));
    }

    Ok(())
}

/// Candidate config locations in lookup order
pub fn default_config_locations() -> Vec<PathBuf> {
    let mut locations = vec![PathBuf::from(DEFAULT_CONFIG_FILE)];
    if let Some(home_dir) = dirs::home_dir() {
        locations.push(home_dir.join(DEFAULT_CONFIG_FILE));
    }
    if let Some(config_dir) = dirs::config_dir() {
        locations.push(config_dir.join("leakscope").join("config.toml"));
    }
    locations
}

/// Find and load configuration from default locations
pub fn find_default_config() -> Result<Option<PartialSettings>> {
    for location in default_config_locations() {
        if location.is_file() {
            log::debug!("using configuration file {}", location.display());
            return parse_config_file(location).map(Some);
        }
    }
    Ok(None)
}

/// Create a default configuration file at the specified path
pub fn create_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(LeakscopeError::io_error)?;
        }
    }

    fs::write(path, include_str!("default_config.toml"))
        .with_context(|| format!("Failed to write default config to {}", path.display()))?;

    Ok(())
}
