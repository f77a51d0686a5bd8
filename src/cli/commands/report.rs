//! Report emission shared by the validation commands.

use super::dispatcher::Streams;
use crate::error::Result;
use crate::validate::{
    HumanFormatter, JsonFormatter, OutputFormat, ReportFormatter, ValidationReport,
};

/// Write reports in `format`.
///
/// Human reports go to stderr, where the calling workflow expects them;
/// JSON goes to stdout so it can be piped.
pub fn emit(
    format: OutputFormat,
    reports: &[ValidationReport],
    chained: bool,
    streams: &mut Streams<'_>,
) -> Result<()> {
    let mut output = Vec::new();
    match format {
        OutputFormat::Human => {
            let formatter = HumanFormatter::new();
            if chained {
                formatter.format_all(reports, &mut output)?;
            } else {
                for report in reports {
                    formatter.format(report, &mut output)?;
                }
            }
            streams.stderr.write_all(&output)?;
            streams.stderr.flush()?;
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new();
            match reports {
                [report] if !chained => formatter.format(report, &mut output)?,
                _ => formatter.format_all(reports, &mut output)?,
            }
            streams.stdout.write_all(&output)?;
            streams.stdout.flush()?;
        }
    }
    Ok(())
}
