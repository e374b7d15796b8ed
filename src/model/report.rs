use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

use super::Vulnerability;
use crate::error::{ReportError, Result};

/// The vulnerability list of a Trivy JSON report.
///
/// Only `Results[0].Vulnerabilities` is read. Other results and top-level
/// metadata besides `ArtifactName` are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanReport {
    /// Name used in messages, usually the path the report was read from.
    pub label: String,
    pub artifact_name: Option<String>,
    pub vulnerabilities: Vec<Vulnerability>,
}

impl ScanReport {
    /// Reads and validates a report file.
    ///
    /// # Errors
    ///
    /// - [`ReportError::PathNotFound`] if `path` does not exist. Nothing is read.
    /// - [`ReportError::Io`] if the file cannot be read.
    /// - [`ReportError::MalformedReport`] if it is not JSON or lacks the
    ///   `Results[0].Vulnerabilities` shape.
    pub fn load(path: &Path) -> Result<Self> {
        require_path(path)?;

        let content = fs::read_to_string(path).map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_json_str(path.display().to_string(), &content)
    }

    pub fn from_json_str(label: impl Into<String>, content: &str) -> Result<Self> {
        let label = label.into();
        let value: Value = serde_json::from_str(content)
            .map_err(|e| ReportError::malformed(label.clone(), format!("invalid JSON: {}", e)))?;
        Self::from_value(label, value)
    }

    /// Validates an already-parsed document.
    pub fn from_value(label: impl Into<String>, value: Value) -> Result<Self> {
        let label = label.into();

        let Value::Object(mut root) = value else {
            return Err(ReportError::malformed(label, "top level is not an object"));
        };

        let artifact_name = root
            .get("ArtifactName")
            .and_then(Value::as_str)
            .map(str::to_string);

        let results = match root.remove("Results") {
            Some(Value::Array(results)) => results,
            Some(_) => {
                return Err(ReportError::malformed(label, "\"Results\" is not an array"));
            }
            None => return Err(ReportError::malformed(label, "missing \"Results\"")),
        };

        let Some(first) = results.into_iter().next() else {
            return Err(ReportError::malformed(label, "\"Results\" is empty"));
        };

        let entries = match first {
            Value::Object(mut result) => match result.remove("Vulnerabilities") {
                Some(Value::Array(entries)) => entries,
                Some(_) => {
                    return Err(ReportError::malformed(
                        label,
                        "\"Results[0].Vulnerabilities\" is not an array",
                    ));
                }
                None => {
                    return Err(ReportError::malformed(
                        label,
                        "missing \"Results[0].Vulnerabilities\"",
                    ));
                }
            },
            _ => {
                return Err(ReportError::malformed(label, "\"Results[0]\" is not an object"));
            }
        };

        let mut vulnerabilities = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            match Vulnerability::from_value(entry) {
                Some(vuln) => vulnerabilities.push(vuln),
                None => {
                    return Err(ReportError::malformed(
                        label,
                        format!("vulnerability #{} is not an object", index),
                    ));
                }
            }
        }

        debug!(
            report = %label,
            count = vulnerabilities.len(),
            "Loaded scan report"
        );

        Ok(Self {
            label,
            artifact_name,
            vulnerabilities,
        })
    }
}

/// Fails with [`ReportError::PathNotFound`] unless `path` exists.
pub fn require_path(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(ReportError::PathNotFound {
            path: path.to_path_buf(),
        })
    }
}
