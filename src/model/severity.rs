use serde::{Deserialize, Serialize};

use super::Vulnerability;

/// Severity levels as emitted by Trivy.
///
/// Matching is case-sensitive: only the exact upper-case labels are recognized.
/// Variants are ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Unknown,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Unknown => "UNKNOWN",
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }

    /// Parses a Trivy severity label. Returns `None` for anything outside the
    /// vocabulary, including differently cased labels.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "UNKNOWN" => Some(Severity::Unknown),
            "LOW" => Some(Severity::Low),
            "MEDIUM" => Some(Severity::Medium),
            "HIGH" => Some(Severity::High),
            "CRITICAL" => Some(Severity::Critical),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The set of severities kept by the spreadsheet export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeverityFilter {
    included: Vec<Severity>,
}

impl SeverityFilter {
    pub fn new(included: impl IntoIterator<Item = Severity>) -> Self {
        let mut levels: Vec<Severity> = Vec::new();
        for severity in included {
            if !levels.contains(&severity) {
                levels.push(severity);
            }
        }
        Self { included: levels }
    }

    pub fn included(&self) -> &[Severity] {
        &self.included
    }

    /// Returns true if the record's `Severity` is one of the included levels.
    ///
    /// Records with a missing, non-string, or unrecognized severity never match.
    pub fn matches(&self, vuln: &Vulnerability) -> bool {
        vuln.severity()
            .map(|s| self.included.contains(&s))
            .unwrap_or(false)
    }
}

impl Default for SeverityFilter {
    fn default() -> Self {
        Self::new([Severity::Medium, Severity::High, Severity::Critical])
    }
}
