//! Resolved-vulnerability diff between two scans.
//!
//! The diff is one-directional: it reports identifiers present in the earlier
//! report and absent from the later one. Newly introduced findings are not
//! reported.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

use crate::error::{ReportError, Result};
use crate::model::ScanReport;

/// Identifiers resolved between two scans, sorted by code point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedVulnerabilities {
    pub count: usize,
    pub resolved: Vec<String>,
}

impl ResolvedVulnerabilities {
    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }

    /// Text summary: a count line followed by the space-joined identifiers.
    pub fn to_text(&self) -> String {
        format!("{} CVE(s) addressed:\n{}", self.count, self.resolved.join(" "))
    }
}

/// Collects the distinct vulnerability identifiers of a report.
///
/// # Errors
///
/// Returns [`ReportError::MalformedReport`] if a record has no string
/// `VulnerabilityID`.
pub fn vulnerability_ids(report: &ScanReport) -> Result<BTreeSet<&str>> {
    report
        .vulnerabilities
        .iter()
        .enumerate()
        .map(|(index, vuln)| {
            vuln.id().ok_or_else(|| {
                ReportError::malformed(
                    report.label.clone(),
                    format!("vulnerability #{} has no string \"VulnerabilityID\"", index),
                )
            })
        })
        .collect()
}

/// Computes the identifiers in `before` that no longer appear in `after`.
pub fn diff_reports(before: &ScanReport, after: &ScanReport) -> Result<ResolvedVulnerabilities> {
    let before_ids = vulnerability_ids(before)?;
    let after_ids = vulnerability_ids(after)?;

    // BTreeSet iterates in ascending byte order, which for UTF-8 is code point order.
    let resolved: Vec<String> = before_ids
        .difference(&after_ids)
        .map(|id| id.to_string())
        .collect();

    debug!(
        before = %before.label,
        after = %after.label,
        before_count = before_ids.len(),
        after_count = after_ids.len(),
        resolved = resolved.len(),
        "Computed resolved vulnerabilities"
    );

    Ok(ResolvedVulnerabilities {
        count: resolved.len(),
        resolved,
    })
}
