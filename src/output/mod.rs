mod cli;
mod json;
mod xlsx;

pub use cli::{print_diff_text, print_export_summary};
pub use json::print_diff_json;
pub use xlsx::{write_xlsx, DEFAULT_SHEET_NAME};

use crate::diff::ResolvedVulnerabilities;
use crate::filter::{filter_report, FilteredReportTable};
use crate::model::{ScanReport, SeverityFilter};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Output format for diff results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffFormat {
    /// Count line followed by the space-joined identifiers
    #[default]
    Text,
    /// JSON object with `count` and `resolved`
    Json,
}

impl std::str::FromStr for DiffFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(DiffFormat::Text),
            "json" => Ok(DiffFormat::Json),
            _ => Err(format!("Unknown format: {}. Use 'text' or 'json'", s)),
        }
    }
}

/// Filters a report and writes the kept rows to an `.xlsx` file.
///
/// The table and workbook are built in full before the output file is created.
pub fn export_report(
    report: &ScanReport,
    filter: &SeverityFilter,
    sheet_name: &str,
    path: &Path,
) -> crate::error::Result<FilteredReportTable> {
    let table = filter_report(report, filter);
    write_xlsx(&table, sheet_name, path)?;
    Ok(table)
}

pub fn print_diff(result: &ResolvedVulnerabilities, format: DiffFormat) -> Result<()> {
    match format {
        DiffFormat::Text => print_diff_text(result),
        DiffFormat::Json => print_diff_json(result),
    }
}
