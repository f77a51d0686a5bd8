//! Report formatters.
//!
//! This module renders validation reports in different formats
//! (human-readable text, JSON).

pub mod human;
pub mod json;

use std::io::Write;

use serde::{Deserialize, Serialize};

use super::pipeline::ValidationReport;

/// Output format for validation reports.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `[VALIDATE-<LAYER>]` lines on stderr.
    #[default]
    Human,
    /// A JSON document on stdout.
    Json,
}

/// Trait for rendering validation reports.
pub trait ReportFormatter {
    /// Format one report to the given writer.
    fn format<W: Write>(&self, report: &ValidationReport, writer: &mut W) -> std::io::Result<()>;

    /// Format the reports of a chained run.
    fn format_all<W: Write>(
        &self,
        reports: &[ValidationReport],
        writer: &mut W,
    ) -> std::io::Result<()> {
        for report in reports {
            self.format(report, writer)?;
        }
        Ok(())
    }
}

pub use human::HumanFormatter;
pub use json::JsonFormatter;
