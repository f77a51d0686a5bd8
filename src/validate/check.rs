//! Check definitions.
//!
//! This module provides the core traits and types for the validation stages:
//!
//! - [`Check`] - The trait every post-lineage stage implements
//! - [`CheckId`] - Unique identifier for a check
//! - [`Severity`] - Severity level for diagnostics (Warning, Error)
//! - [`CheckContext`] - Everything a stage may look at

use super::diagnostic::Diagnostic;
use super::references::ParentIndex;
use crate::config::Settings;
use crate::model::{Entity, Field, LayerSpec};

/// Unique identifier for a check.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CheckId(pub String);

impl CheckId {
    /// Create a new check ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for CheckId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Advisory finding; the document is still usable.
    Warning,
    /// Structural or referential violation; the run fails.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Inputs shared by every stage of one validation run.
pub struct CheckContext<'a> {
    pub spec: &'static LayerSpec,
    /// Non-empty entity collection of the document.
    pub entities: &'a [Field<Entity>],
    pub parent: &'a ParentIndex,
    pub settings: &'a Settings,
}

impl<'a> CheckContext<'a> {
    /// Well-formed entities with their document index.
    pub fn objects(&self) -> impl Iterator<Item = (usize, &'a Entity)> {
        self.entities
            .iter()
            .enumerate()
            .filter_map(|(idx, e)| e.get().map(|entity| (idx, entity)))
    }
}

/// A validation stage run after lineage has been established.
///
/// Stages never stop at the first problem; each returns every finding so
/// a user can fix all of them in one pass.
pub trait Check {
    /// Unique identifier for this check.
    fn id(&self) -> CheckId;

    /// Human-readable name of the check.
    fn name(&self) -> &str;

    /// Run the check and return any diagnostics.
    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Diagnostic>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_id_equality() {
        assert_eq!(CheckId::new("schema"), CheckId::new("schema"));
        assert_ne!(CheckId::new("schema"), CheckId::new("cycles"));
    }

    #[test]
    fn check_id_display() {
        assert_eq!(format!("{}", CheckId::new("lineage")), "lineage");
    }

    #[test]
    fn severity_ordering() {
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn severity_display() {
        assert_eq!(format!("{}", Severity::Warning), "warning");
        assert_eq!(format!("{}", Severity::Error), "error");
    }
}
