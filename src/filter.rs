//! Severity filtering of a report into a table.
//!
//! The filter is a row filter, never a projection: the table's columns are the
//! union of every field seen on any input record, in first-seen order, so a
//! dropped LOW record still contributes its columns.

use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use crate::model::{ScanReport, SeverityFilter, Vulnerability};

/// Vulnerability rows kept by a [`SeverityFilter`], plus the column layout.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredReportTable {
    columns: Vec<String>,
    rows: Vec<Vulnerability>,
    total: usize,
}

impl FilteredReportTable {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vulnerability] {
        &self.rows
    }

    /// Number of records in the source report before filtering.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates a row's cells in column order. Absent fields yield `None`.
    pub fn cells<'a>(&'a self, row: &'a Vulnerability) -> impl Iterator<Item = Option<&'a Value>> {
        self.columns.iter().map(move |column| row.get(column))
    }
}

/// Builds the filtered table for a report.
pub fn filter_report(report: &ScanReport, filter: &SeverityFilter) -> FilteredReportTable {
    let mut columns: Vec<String> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for vuln in &report.vulnerabilities {
        for key in vuln.fields().keys() {
            if !index.contains_key(key.as_str()) {
                index.insert(key.as_str(), columns.len());
                columns.push(key.clone());
            }
        }
    }

    let rows: Vec<Vulnerability> = report
        .vulnerabilities
        .iter()
        .filter(|v| filter.matches(v))
        .cloned()
        .collect();

    debug!(
        report = %report.label,
        kept = rows.len(),
        total = report.vulnerabilities.len(),
        columns = columns.len(),
        "Filtered vulnerabilities by severity"
    );

    FilteredReportTable {
        columns,
        rows,
        total: report.vulnerabilities.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Severity;
    use serde_json::json;

    fn report(value: Value) -> ScanReport {
        ScanReport::from_value("test", value).unwrap()
    }

    fn ids(table: &FilteredReportTable) -> Vec<&str> {
        table.rows().iter().filter_map(|v| v.id()).collect()
    }

    #[test]
    fn test_keeps_only_high_from_high_and_low() {
        let r = report(json!({"Results": [{"Vulnerabilities": [
            {"VulnerabilityID": "CVE-1", "Severity": "HIGH"},
            {"VulnerabilityID": "CVE-2", "Severity": "LOW"}
        ]}]}));

        let table = filter_report(&r, &SeverityFilter::default());
        assert_eq!(ids(&table), ["CVE-1"]);
        assert_eq!(table.total(), 2);
    }

    #[test]
    fn test_empty_vulnerabilities_header_only() {
        let r = report(json!({"Results": [{"Vulnerabilities": []}]}));
        let table = filter_report(&r, &SeverityFilter::default());
        assert!(table.is_empty());
        assert!(table.columns().is_empty());
    }

    #[test]
    fn test_preserves_relative_order() {
        let r = report(json!({"Results": [{"Vulnerabilities": [
            {"VulnerabilityID": "CVE-5", "Severity": "MEDIUM"},
            {"VulnerabilityID": "CVE-3", "Severity": "UNKNOWN"},
            {"VulnerabilityID": "CVE-1", "Severity": "CRITICAL"},
            {"VulnerabilityID": "CVE-4", "Severity": "LOW"},
            {"VulnerabilityID": "CVE-2", "Severity": "HIGH"}
        ]}]}));

        let table = filter_report(&r, &SeverityFilter::default());
        assert_eq!(ids(&table), ["CVE-5", "CVE-1", "CVE-2"]);
    }

    #[test]
    fn test_excludes_unexpected_case_and_vocabulary() {
        let r = report(json!({"Results": [{"Vulnerabilities": [
            {"VulnerabilityID": "CVE-1", "Severity": "high"},
            {"VulnerabilityID": "CVE-2", "Severity": "NEGLIGIBLE"},
            {"VulnerabilityID": "CVE-3"},
            {"VulnerabilityID": "CVE-4", "Severity": null}
        ]}]}));

        let table = filter_report(&r, &SeverityFilter::default());
        assert!(table.is_empty());
    }

    #[test]
    fn test_column_union_first_seen_order() {
        let r = report(json!({"Results": [{"Vulnerabilities": [
            {"VulnerabilityID": "CVE-1", "Severity": "LOW", "OnlyOnLow": true},
            {"VulnerabilityID": "CVE-2", "PkgName": "zlib", "Severity": "HIGH"},
            {"Severity": "MEDIUM", "Title": "t", "VulnerabilityID": "CVE-3"}
        ]}]}));

        let table = filter_report(&r, &SeverityFilter::default());
        assert_eq!(
            table.columns(),
            ["VulnerabilityID", "Severity", "OnlyOnLow", "PkgName", "Title"]
        );

        let cells: Vec<Option<&Value>> = table.cells(&table.rows()[0]).collect();
        assert_eq!(
            cells,
            [
                Some(&json!("CVE-2")),
                Some(&json!("HIGH")),
                None,
                Some(&json!("zlib")),
                None
            ]
        );
    }

    #[test]
    fn test_row_fields_are_untouched() {
        let record = json!({
            "VulnerabilityID": "CVE-2023-0464",
            "PkgName": "libssl3",
            "InstalledVersion": "3.0.2-0ubuntu1.7",
            "Severity": "HIGH",
            "CVSS": {"nvd": {"V3Score": 7.5}},
            "CweIDs": ["CWE-295"]
        });
        let r = report(json!({"Results": [{"Vulnerabilities": [record.clone()]}]}));

        let table = filter_report(&r, &SeverityFilter::default());
        assert_eq!(table.rows()[0], Vulnerability::from_value(record).unwrap());
    }

    #[test]
    fn test_idempotent() {
        let r = report(json!({"Results": [{"Vulnerabilities": [
            {"VulnerabilityID": "CVE-1", "Severity": "HIGH", "A": 1},
            {"VulnerabilityID": "CVE-2", "Severity": "LOW", "B": 2}
        ]}]}));

        let first = filter_report(&r, &SeverityFilter::default());
        let second = filter_report(&r, &SeverityFilter::default());
        assert_eq!(first, second);
    }

    #[test]
    fn test_custom_filter() {
        let r = report(json!({"Results": [{"Vulnerabilities": [
            {"VulnerabilityID": "CVE-1", "Severity": "HIGH"},
            {"VulnerabilityID": "CVE-2", "Severity": "LOW"}
        ]}]}));

        let table = filter_report(&r, &SeverityFilter::new([Severity::Low]));
        assert_eq!(ids(&table), ["CVE-2"]);
    }
}
