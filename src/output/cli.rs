use crate::diff::ResolvedVulnerabilities;
use crate::filter::FilteredReportTable;
use crate::model::{Severity, SeverityFilter};
use anyhow::Result;
use chrono::Utc;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct VulnRow {
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "CVE")]
    cve: String,
    #[tabled(rename = "Package")]
    package: String,
    #[tabled(rename = "Installed")]
    installed: String,
    #[tabled(rename = "Fixed In")]
    fixed_in: String,
    #[tabled(rename = "Title")]
    title: String,
}

/// Print a preview of the exported rows and a severity summary.
pub fn print_export_summary(
    table: &FilteredReportTable,
    filter: &SeverityFilter,
    artifact: Option<&str>,
    output: &str,
) -> Result<()> {
    println!();
    println!(
        "Report converted at: {}",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    );
    if let Some(artifact) = artifact {
        println!("Artifact: {}", artifact);
    }
    println!();
    if table.is_empty() {
        println!(
            "No vulnerabilities matched the severity filter ({} total in report).",
            table.total()
        );
    } else {
        println!(
            "Exported {} of {} vulnerabilities:",
            table.rows().len(),
            table.total()
        );
        println!();

        let rows: Vec<VulnRow> = table
            .rows()
            .iter()
            .map(|v| VulnRow {
                severity: format_severity(v.severity(), v.severity_label()),
                cve: v.id().unwrap_or("-").to_string(),
                package: truncate(v.get_str("PkgName").unwrap_or("-"), 30),
                installed: truncate(v.get_str("InstalledVersion").unwrap_or("-"), 20),
                fixed_in: truncate(v.get_str("FixedVersion").unwrap_or("-"), 20),
                title: truncate(v.get_str("Title").unwrap_or("-"), 50),
            })
            .collect();

        let rendered = Table::new(rows).with(Style::rounded()).to_string();
        println!("{}", rendered);
    }

    println!();
    print!("{}", format_summary(table, filter));
    println!("Spreadsheet written to: {}", output);

    Ok(())
}

/// Print the resolved identifiers as a count line and one space-joined line.
pub fn print_diff_text(result: &ResolvedVulnerabilities) -> Result<()> {
    println!("{}", result.to_text());
    Ok(())
}

fn format_summary(table: &FilteredReportTable, filter: &SeverityFilter) -> String {
    let mut levels = filter.included().to_vec();
    levels.sort_by(|a, b| b.cmp(a));

    let counts: Vec<String> = levels
        .iter()
        .map(|level| {
            let count = table
                .rows()
                .iter()
                .filter(|v| v.severity() == Some(*level))
                .count();
            format!("{} {}", count, level.as_str().to_lowercase())
        })
        .collect();

    let mut summary = String::from("Summary:\n");
    summary.push_str(&format!("  Vulnerabilities: {}\n", counts.join(", ")));
    summary.push_str(&format!("  Columns: {}\n", table.columns().len()));
    summary
}

fn format_severity(severity: Option<Severity>, label: Option<&str>) -> String {
    match severity {
        Some(Severity::Critical) => "\x1b[31mCRITICAL\x1b[0m".to_string(),
        Some(Severity::High) => "\x1b[91mHIGH\x1b[0m".to_string(),
        Some(Severity::Medium) => "\x1b[33mMEDIUM\x1b[0m".to_string(),
        Some(Severity::Low) => "\x1b[32mLOW\x1b[0m".to_string(),
        Some(Severity::Unknown) => "UNKNOWN".to_string(),
        None => label.unwrap_or("-").to_string(),
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::filter_report;
    use crate::model::ScanReport;
    use serde_json::json;

    fn sample() -> FilteredReportTable {
        let report = ScanReport::from_value(
            "r",
            json!({"Results": [{"Vulnerabilities": [
                {"VulnerabilityID": "CVE-1", "Severity": "LOW"},
                {"VulnerabilityID": "CVE-2", "Severity": "HIGH"},
                {"VulnerabilityID": "CVE-3", "Severity": "LOW"}
            ]}]}),
        )
        .unwrap();
        filter_report(&report, &SeverityFilter::new([Severity::Low]))
    }

    #[test]
    fn test_summary_counts_included_levels() {
        let filter = SeverityFilter::new([Severity::Low]);
        assert_eq!(
            format_summary(&sample(), &filter),
            "Summary:\n  Vulnerabilities: 2 low\n  Columns: 2\n"
        );
    }

    #[test]
    fn test_summary_orders_custom_levels_by_severity() {
        let filter = SeverityFilter::new([Severity::Low, Severity::High]);
        let report = ScanReport::from_value(
            "r",
            json!({"Results": [{"Vulnerabilities": [
                {"VulnerabilityID": "CVE-1", "Severity": "LOW"},
                {"VulnerabilityID": "CVE-2", "Severity": "HIGH"}
            ]}]}),
        )
        .unwrap();
        let table = filter_report(&report, &filter);
        assert_eq!(
            format_summary(&table, &filter),
            "Summary:\n  Vulnerabilities: 1 high, 1 low\n  Columns: 2\n"
        );
    }

    #[test]
    fn test_summary_default_levels_highest_first() {
        let report = ScanReport::from_value(
            "r",
            json!({"Results": [{"Vulnerabilities": [
                {"VulnerabilityID": "CVE-1", "Severity": "CRITICAL"},
                {"VulnerabilityID": "CVE-2", "Severity": "MEDIUM"},
                {"VulnerabilityID": "CVE-3", "Severity": "MEDIUM"}
            ]}]}),
        )
        .unwrap();
        let filter = SeverityFilter::default();
        let table = filter_report(&report, &filter);
        assert_eq!(
            format_summary(&table, &filter),
            "Summary:\n  Vulnerabilities: 1 critical, 0 high, 2 medium\n  Columns: 2\n"
        );
    }

    #[test]
    fn test_truncate_short() {
        assert_eq!(truncate("openssl", 30), "openssl");
    }

    #[test]
    fn test_truncate_long() {
        assert_eq!(truncate("abcdefghij", 8), "abcde...");
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("ééééééééé", 6), "ééé...");
    }

    #[test]
    fn test_format_severity_unrecognized_label() {
        assert_eq!(format_severity(None, Some("NEGLIGIBLE")), "NEGLIGIBLE");
        assert_eq!(format_severity(None, None), "-");
        assert_eq!(format_severity(Some(Severity::Unknown), Some("UNKNOWN")), "UNKNOWN");
    }
}
