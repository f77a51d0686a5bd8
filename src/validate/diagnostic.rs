//! Validation findings.
//!
//! A [`Diagnostic`] carries the optional `Location` / `Expected` / `Actual` /
//! `Recommendation` details the report emitter prints under each finding.

use super::check::{CheckId, Severity};

/// A finding produced by a validation stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// The check that produced this diagnostic.
    pub check: CheckId,
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
    /// Where in the document the problem is, e.g. `systems[2].relations[0]`.
    pub location: Option<String>,
    pub expected: Option<String>,
    pub actual: Option<String>,
    /// How to fix the issue.
    pub recommendation: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic.
    pub fn new(check: CheckId, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            check,
            severity,
            message: message.into(),
            location: None,
            expected: None,
            actual: None,
            recommendation: None,
        }
    }

    pub fn error(check: CheckId, message: impl Into<String>) -> Self {
        Self::new(check, Severity::Error, message)
    }

    pub fn warning(check: CheckId, message: impl Into<String>) -> Self {
        Self::new(check, Severity::Warning, message)
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    pub fn with_actual(mut self, actual: impl Into<String>) -> Self {
        self.actual = Some(actual.into());
        self
    }

    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = Some(recommendation.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}
