//! Severity aggregation and the exit-code contract.
//!
//! Downstream orchestration branches on exactly three exit codes: halt on
//! 2, continue with a notice on 1, proceed silently on 0.

use serde::Serialize;

use super::diagnostic::Diagnostic;

/// Overall result of a validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Passed,
    PassedWithWarnings,
    Failed,
}

impl Outcome {
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Passed => 0,
            Outcome::PassedWithWarnings => 1,
            Outcome::Failed => 2,
        }
    }

    /// Text of the final report line.
    pub fn label(self) -> &'static str {
        match self {
            Outcome::Passed => "PASSED",
            Outcome::PassedWithWarnings => "PASSED with warnings",
            Outcome::Failed => "FAILED",
        }
    }
}

/// Counts of findings by severity plus the derived outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub errors: usize,
    pub warnings: usize,
    pub outcome: Outcome,
}

impl Summary {
    /// Aggregate findings; the worst finding decides the outcome.
    pub fn aggregate(diagnostics: &[Diagnostic]) -> Self {
        let errors = diagnostics.iter().filter(|d| d.is_error()).count();
        let warnings = diagnostics.len() - errors;
        let outcome = if errors > 0 {
            Outcome::Failed
        } else if warnings > 0 {
            Outcome::PassedWithWarnings
        } else {
            Outcome::Passed
        };
        Self {
            errors,
            warnings,
            outcome,
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.outcome.exit_code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::CheckId;

    fn error() -> Diagnostic {
        Diagnostic::error(CheckId::new("schema"), "err")
    }

    fn warning() -> Diagnostic {
        Diagnostic::warning(CheckId::new("schema"), "warn")
    }

    #[test]
    fn no_findings_pass() {
        let summary = Summary::aggregate(&[]);
        assert_eq!(summary.outcome, Outcome::Passed);
        assert_eq!(summary.exit_code(), 0);
    }

    #[test]
    fn warnings_only_pass_with_warnings() {
        let summary = Summary::aggregate(&[warning(), warning()]);
        assert_eq!(summary.warnings, 2);
        assert_eq!(summary.errors, 0);
        assert_eq!(summary.exit_code(), 1);
    }

    #[test]
    fn any_error_fails() {
        let summary = Summary::aggregate(&[warning(), error(), warning()]);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.warnings, 2);
        assert_eq!(summary.outcome, Outcome::Failed);
        assert_eq!(summary.exit_code(), 2);
    }

    #[test]
    fn outcome_labels() {
        assert_eq!(Outcome::Passed.label(), "PASSED");
        assert_eq!(Outcome::PassedWithWarnings.label(), "PASSED with warnings");
        assert_eq!(Outcome::Failed.label(), "FAILED");
    }

    #[test]
    fn outcome_ordering_matches_exit_codes() {
        assert!(Outcome::Passed < Outcome::PassedWithWarnings);
        assert!(Outcome::PassedWithWarnings < Outcome::Failed);
    }
}
