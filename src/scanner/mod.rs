//! External vulnerability scanners.
//!
//! This module provides the [`Scanner`] trait for tools that produce a JSON
//! report for a target, and [`TrivyScanner`], which runs `trivy rootfs`.
//! No detection happens in this crate: the scanner's report is consumed as-is
//! by [`ScanReport::load`](crate::model::ScanReport::load).
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use trivy_report::scanner::{default_report_path, Scanner, TrivyScanner};
//!
//! let scanner = TrivyScanner::default();
//! let target = Path::new("./build");
//! let report = default_report_path(target);
//! scanner.scan(target, &report)?;
//! # Ok::<(), trivy_report::ReportError>(())
//! ```

mod trivy;

pub use trivy::TrivyScanner;

use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Trait for external tools that scan a target and write a JSON report.
pub trait Scanner {
    /// Returns the human-readable name of this scanner.
    fn name(&self) -> &'static str;

    /// Scans `target` and writes the JSON report to `report_path`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::PathNotFound`](crate::ReportError::PathNotFound)
    /// if `target` does not exist, or
    /// [`ReportError::Scanner`](crate::ReportError::Scanner) if the tool
    /// cannot be run or reports a failure.
    fn scan(&self, target: &Path, report_path: &Path) -> Result<()>;
}

/// Returns `report_<name>.json` in the current directory, where `<name>` is
/// the last component of the resolved target path.
pub fn default_report_path(target: &Path) -> PathBuf {
    let resolved = fs::canonicalize(target).unwrap_or_else(|_| target.to_path_buf());
    let name = resolved
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "root".to_string());
    PathBuf::from(format!("report_{}.json", name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_report_path_uses_dir_name() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("build-42");
        fs::create_dir(&target).unwrap();

        assert_eq!(
            default_report_path(&target),
            PathBuf::from("report_build-42.json")
        );
    }

    #[test]
    fn test_default_report_path_resolves_dot_segments() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("app");
        fs::create_dir(&target).unwrap();

        assert_eq!(
            default_report_path(&target.join(".")),
            PathBuf::from("report_app.json")
        );
    }

    #[test]
    fn test_default_report_path_missing_target() {
        assert_eq!(
            default_report_path(Path::new("does/not/exist")),
            PathBuf::from("report_exist.json")
        );
    }
}
