//! JSON output formatter.
//!
//! Formats validation reports as machine-readable JSON for orchestration
//! tooling.

use std::io::Write;

use serde::Serialize;

use super::ReportFormatter;
use crate::validate::pipeline::ValidationReport;
use crate::validate::summary::Outcome;

/// Formats reports as JSON.
pub struct JsonFormatter;

#[derive(Serialize)]
struct JsonReport {
    layer: String,
    outcome: Outcome,
    exit_code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    skipped: Option<String>,
    diagnostics: Vec<JsonDiagnostic>,
    summary: JsonSummary,
}

#[derive(Serialize)]
struct JsonDiagnostic {
    check: String,
    severity: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    actual: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    recommendation: Option<String>,
}

#[derive(Serialize)]
struct JsonSummary {
    total: usize,
    errors: usize,
    warnings: usize,
}

#[derive(Serialize)]
struct JsonChain {
    exit_code: i32,
    layers: Vec<JsonReport>,
}

impl JsonFormatter {
    /// Create a new JSON formatter.
    pub fn new() -> Self {
        Self
    }

    fn report(report: &ValidationReport) -> JsonReport {
        let summary = report.summary();
        JsonReport {
            layer: report.layer.to_string(),
            outcome: summary.outcome,
            exit_code: summary.exit_code(),
            skipped: report.skipped.clone(),
            diagnostics: report
                .diagnostics
                .iter()
                .map(|d| JsonDiagnostic {
                    check: d.check.0.clone(),
                    severity: d.severity.to_string(),
                    message: d.message.clone(),
                    location: d.location.clone(),
                    expected: d.expected.clone(),
                    actual: d.actual.clone(),
                    recommendation: d.recommendation.clone(),
                })
                .collect(),
            summary: JsonSummary {
                total: report.diagnostics.len(),
                errors: summary.errors,
                warnings: summary.warnings,
            },
        }
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for JsonFormatter {
    fn format<W: Write>(&self, report: &ValidationReport, writer: &mut W) -> std::io::Result<()> {
        serde_json::to_writer_pretty(&mut *writer, &Self::report(report))
            .map_err(std::io::Error::other)?;
        writeln!(writer)
    }

    fn format_all<W: Write>(
        &self,
        reports: &[ValidationReport],
        writer: &mut W,
    ) -> std::io::Result<()> {
        let chain = JsonChain {
            exit_code: reports.iter().map(ValidationReport::exit_code).max().unwrap_or(0),
            layers: reports.iter().map(Self::report).collect(),
        };
        serde_json::to_writer_pretty(&mut *writer, &chain).map_err(std::io::Error::other)?;
        writeln!(writer)
    }
}
