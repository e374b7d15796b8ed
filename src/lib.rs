pub mod config;
pub mod diff;
pub mod error;
pub mod filter;
pub mod model;
pub mod output;
pub mod scanner;

pub use config::Config;
pub use diff::{diff_reports, ResolvedVulnerabilities};
pub use error::ReportError;
pub use filter::{filter_report, FilteredReportTable};
pub use model::{ScanReport, Severity, SeverityFilter, Vulnerability};
pub use output::export_report;
pub use scanner::Scanner;
