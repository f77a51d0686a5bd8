//! Human-readable output formatter.
//!
//! Each finding is a tagged line followed by indented detail lines and a
//! blank separator; the report ends with a single outcome line:
//!
//! ```text
//! [VALIDATE-C2] ERROR: Container 'api': System not found: shop
//!   Location: containers[0].system_id
//!   Expected: one of: store
//!
//! [VALIDATE-C2] FAILED
//! ```

use std::io::Write;

use super::ReportFormatter;
use crate::validate::pipeline::ValidationReport;
use crate::validate::Severity;

/// Formats reports for terminal display.
pub struct HumanFormatter;

impl HumanFormatter {
    pub fn new() -> Self {
        Self
    }

    fn severity_label(severity: Severity) -> &'static str {
        match severity {
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        }
    }
}

impl Default for HumanFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for HumanFormatter {
    fn format<W: Write>(&self, report: &ValidationReport, writer: &mut W) -> std::io::Result<()> {
        let tag = report.layer.tag();

        if let Some(ref reason) = report.skipped {
            return writeln!(writer, "[VALIDATE-{}] {}", tag, reason);
        }

        for diag in &report.diagnostics {
            writeln!(
                writer,
                "[VALIDATE-{}] {}: {}",
                tag,
                Self::severity_label(diag.severity),
                diag.message
            )?;

            let details = [
                ("Location", &diag.location),
                ("Expected", &diag.expected),
                ("Actual", &diag.actual),
                ("Recommendation", &diag.recommendation),
            ];
            for (label, value) in details {
                if let Some(value) = value {
                    writeln!(writer, "  {}: {}", label, value)?;
                }
            }

            writeln!(writer)?;
        }

        writeln!(writer, "[VALIDATE-{}] {}", tag, report.summary().outcome.label())
    }
}
