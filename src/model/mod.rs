//! Core data types for Trivy scan reports.
//!
//! - [`ScanReport`] - The vulnerability list of a parsed Trivy JSON report
//! - [`Vulnerability`] - One opaque vulnerability record
//! - [`Severity`] - The Trivy severity vocabulary
//!
//! # Example
//!
//! ```
//! use trivy_report::ScanReport;
//!
//! let report = ScanReport::from_json_str(
//!     "inline",
//!     r#"{"Results":[{"Vulnerabilities":[{"VulnerabilityID":"CVE-1","Severity":"HIGH"}]}]}"#,
//! )
//! .unwrap();
//!
//! assert_eq!(report.vulnerabilities.len(), 1);
//! ```

mod report;
mod severity;
mod vulnerability;

pub use report::*;
pub use severity::*;
pub use vulnerability::*;
