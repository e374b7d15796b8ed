//! Configuration file handling.
//!
//! This module provides loading and saving of trivy-report configuration
//! from a TOML file.
//!
//! # Configuration Location
//!
//! The configuration file is stored at:
//! - Linux: `~/.config/trivy-report/config.toml`
//! - macOS: `~/Library/Application Support/trivy-report/config.toml`
//! - Windows: `%APPDATA%\trivy-report\config.toml`
//!
//! # Example Configuration
//!
//! ```toml
//! output = "report.xlsx"
//! sheet_name = "Vulnerabilities"
//! include_severities = ["MEDIUM", "HIGH", "CRITICAL"]
//! trivy_path = "trivy"
//! diff_format = "text"
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::{Severity, SeverityFilter};
use crate::output::{DiffFormat, DEFAULT_SHEET_NAME};

/// Application configuration.
///
/// Every field has a default, so a partial file is valid. Command-line flags
/// take precedence over these values.
///
/// # Example
///
/// ```no_run
/// use trivy_report::Config;
///
/// let config = Config::load().unwrap();
/// println!("Default output: {}", config.output);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path of the exported spreadsheet when `--output` is not given.
    ///
    /// Default: `report.xlsx`
    pub output: String,

    /// Name of the single worksheet in the exported workbook.
    ///
    /// Default: `Vulnerabilities`
    pub sheet_name: String,

    /// Severities kept in the exported spreadsheet.
    ///
    /// Labels are matched case-sensitively against the report.
    /// Default: `["MEDIUM", "HIGH", "CRITICAL"]`
    pub include_severities: Vec<Severity>,

    /// Trivy executable name or path.
    ///
    /// Default: `trivy`
    pub trivy_path: String,

    /// Default output format for `diff`.
    ///
    /// Default: `text`
    pub diff_format: DiffFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output: "report.xlsx".to_string(),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            include_severities: SeverityFilter::default().included().to_vec(),
            trivy_path: "trivy".to_string(),
            diff_format: DiffFormat::Text,
        }
    }
}

impl Config {
    /// Loads configuration from the config file.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves the configuration to the config file.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Returns the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("trivy-report")
            .join("config.toml")
    }

    pub fn severity_filter(&self) -> SeverityFilter {
        SeverityFilter::new(self.include_severities.iter().copied())
    }

    /// Generates a string containing the default configuration.
    pub fn generate_default_config() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.output, "report.xlsx");
        assert_eq!(config.sheet_name, "Vulnerabilities");
        assert_eq!(config.trivy_path, "trivy");
        assert_eq!(config.diff_format, DiffFormat::Text);
        assert_eq!(config.severity_filter(), SeverityFilter::default());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str("output = \"out.xlsx\"").unwrap();
        assert_eq!(config.output, "out.xlsx");
        assert_eq!(config.include_severities, Config::default().include_severities);
    }

    #[test]
    fn test_custom_severities() {
        let config: Config =
            toml::from_str("include_severities = [\"CRITICAL\", \"LOW\"]").unwrap();
        assert_eq!(
            config.severity_filter().included(),
            &[Severity::Critical, Severity::Low]
        );
    }

    #[test]
    fn test_unknown_severity_rejected() {
        assert!(toml::from_str::<Config>("include_severities = [\"high\"]").is_err());
        assert!(toml::from_str::<Config>("include_severities = [\"NEGLIGIBLE\"]").is_err());
    }

    #[test]
    fn test_diff_format_parse() {
        let config: Config = toml::from_str("diff_format = \"json\"").unwrap();
        assert_eq!(config.diff_format, DiffFormat::Json);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.trivy_path = "/opt/trivy/bin/trivy".to_string();
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_generate_default_config_parses() {
        let text = Config::generate_default_config();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, Config::default());
    }
}
