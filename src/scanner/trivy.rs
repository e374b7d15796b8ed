use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

use crate::error::{ReportError, Result};

/// Runs `trivy rootfs <target> -f json --output <report>`.
pub struct TrivyScanner {
    binary: String,
}

impl TrivyScanner {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }
}

impl Default for TrivyScanner {
    fn default() -> Self {
        Self::new("trivy")
    }
}

impl super::Scanner for TrivyScanner {
    fn name(&self) -> &'static str {
        "Trivy"
    }

    fn scan(&self, target: &Path, report_path: &Path) -> Result<()> {
        if !target.exists() {
            return Err(ReportError::PathNotFound {
                path: target.to_path_buf(),
            });
        }

        let target = target.canonicalize().map_err(|source| ReportError::Io {
            path: target.to_path_buf(),
            source,
        })?;

        debug!(
            binary = %self.binary,
            target = %target.display(),
            report = %report_path.display(),
            "Running trivy rootfs"
        );

        let output = Command::new(&self.binary)
            .arg("rootfs")
            .arg(&target)
            .args(["-f", "json", "--output"])
            .arg(report_path)
            .output()
            .map_err(|e| ReportError::Scanner {
                message: format!("failed to execute {}: {}. Is Trivy installed?", self.binary, e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ReportError::Scanner {
                message: format!(
                    "{} exited with {}: {}",
                    self.binary,
                    output.status,
                    stderr.trim()
                ),
            });
        }

        info!(report = %report_path.display(), "Trivy scan finished");
        Ok(())
    }
}
