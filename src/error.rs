//! Error types for report loading, export, and diffing.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while turning a scan report into a spreadsheet or a diff.
///
/// Every variant is terminal for the current invocation. Nothing is retried and
/// no partial output is written once an error has been raised.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A supplied input path does not exist.
    #[error("cannot find {}", path.display())]
    PathNotFound { path: PathBuf },

    /// The report parsed (or failed to parse) but lacks the expected shape.
    #[error("malformed report {report}: {reason}")]
    MalformedReport { report: String, reason: String },

    /// Reading an input report failed.
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The spreadsheet could not be built or written.
    #[error("failed to write spreadsheet {}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },

    /// The external scanner could not be run or exited with a failure.
    #[error("scanner failed: {message}")]
    Scanner { message: String },
}

impl ReportError {
    pub(crate) fn malformed(report: impl Into<String>, reason: impl Into<String>) -> Self {
        ReportError::MalformedReport {
            report: report.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = ReportError> = std::result::Result<T, E>;
