//! Parent-timestamp lineage.
//!
//! Every layer declares the document it was generated from. A document whose
//! timestamp is not strictly later than its parent's was produced out of
//! order, and nothing else about it is worth validating.

use std::path::{Path, PathBuf};

use super::check::CheckId;
use super::diagnostic::Diagnostic;
use crate::error::ArchlintError;
use crate::model::{parse_timestamp, Document, Field, Layer};

fn lineage_id() -> CheckId {
    CheckId::new("lineage")
}

/// The result of trying to load a parent document.
#[derive(Debug)]
pub enum ParentDocument {
    Loaded { path: PathBuf, document: Document },
    Missing { path: PathBuf },
    Unreadable { path: PathBuf, message: String },
}

impl ParentDocument {
    /// Load the parent document at `path`, recording why it is unusable.
    pub fn load(path: &Path) -> Self {
        match Document::load(path) {
            Ok(document) => ParentDocument::Loaded {
                path: path.to_path_buf(),
                document,
            },
            Err(ArchlintError::DocumentNotFound { path }) => ParentDocument::Missing { path },
            Err(e) => ParentDocument::Unreadable {
                path: path.to_path_buf(),
                message: e.to_string(),
            },
        }
    }

    pub fn document(&self) -> Option<&Document> {
        match self {
            ParentDocument::Loaded { document, .. } => Some(document),
            _ => None,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            ParentDocument::Loaded { path, .. }
            | ParentDocument::Missing { path }
            | ParentDocument::Unreadable { path, .. } => path,
        }
    }
}

/// Verify that `document` (of `layer`) was generated after `parent`.
///
/// Any failure is blocking: the caller must skip every later stage.
pub fn check_lineage(
    document: &Document,
    layer: Layer,
    parent: &ParentDocument,
) -> Result<(), Vec<Diagnostic>> {
    let parent_layer = layer.parent().unwrap_or(Layer::Init);

    let parent_doc = match parent {
        ParentDocument::Loaded { document, .. } => document,
        ParentDocument::Missing { path } => {
            return Err(vec![Diagnostic::error(
                lineage_id(),
                format!("Parent file not found: {}", path.display()),
            )
            .with_recommendation(format!(
                "Run the {} generation step first",
                parent_layer
            ))]);
        }
        ParentDocument::Unreadable { path, message } => {
            return Err(vec![Diagnostic::error(
                lineage_id(),
                "Failed to read parent file",
            )
            .with_location(path.display().to_string())
            .with_actual(message.clone())]);
        }
    };

    let parent_location = parent.path().display().to_string();
    let Some(parent_raw) = parent_doc.timestamp() else {
        return Err(vec![Diagnostic::error(
            lineage_id(),
            "Parent file missing metadata.timestamp",
        )
        .with_location(parent_location)]);
    };
    let parent_ts = parse_timestamp(parent_raw).map_err(|e| {
        vec![
            Diagnostic::error(lineage_id(), format!("Invalid timestamp format: {}", e))
                .with_location(format!("{} metadata.timestamp", parent_location))
                .with_actual(parent_raw),
        ]
    })?;

    let metadata = match &document.metadata {
        Field::Present(metadata) => metadata,
        Field::Missing => {
            return Err(vec![
                Diagnostic::error(lineage_id(), "Missing metadata field").with_location("metadata")
            ]);
        }
        invalid => {
            return Err(vec![Diagnostic::error(
                lineage_id(),
                format!("'metadata' {}", invalid.type_error().unwrap_or_default()),
            )
            .with_location("metadata")]);
        }
    };

    let declared = match &metadata.parent {
        Field::Missing => None,
        Field::Present(stamp) => match &stamp.timestamp {
            Field::Missing => None,
            Field::Present(declared) => Some(declared.as_str()),
            invalid => {
                return Err(vec![Diagnostic::error(
                    lineage_id(),
                    format!(
                        "'metadata.parent.timestamp' {}",
                        invalid.type_error().unwrap_or_default()
                    ),
                )
                .with_location("metadata.parent.timestamp")
                .with_expected(parent_raw)]);
            }
        },
        invalid => {
            return Err(vec![Diagnostic::error(
                lineage_id(),
                format!("'metadata.parent' {}", invalid.type_error().unwrap_or_default()),
            )
            .with_location("metadata.parent")]);
        }
    };

    if let Some(declared) = declared {
        let matches = match parse_timestamp(declared) {
            Ok(declared_ts) => declared_ts == parent_ts,
            Err(_) => declared == parent_raw,
        };
        if !matches {
            return Err(vec![Diagnostic::error(lineage_id(), "Parent timestamp mismatch")
                .with_location("metadata.parent.timestamp")
                .with_expected(parent_raw)
                .with_actual(declared)
                .with_recommendation(format!(
                    "Regenerate this document from the current {}",
                    parent_layer.file_name()
                ))]);
        }
    }

    let Some(current_raw) = metadata.timestamp.as_deref() else {
        return Err(vec![Diagnostic::error(
            lineage_id(),
            match metadata.timestamp.type_error() {
                Some(err) => format!("'metadata.timestamp' {}", err),
                None => "Missing metadata.timestamp".to_string(),
            },
        )
        .with_location("metadata.timestamp")]);
    };
    let current_ts = parse_timestamp(current_raw).map_err(|e| {
        vec![
            Diagnostic::error(lineage_id(), format!("Invalid timestamp format: {}", e))
                .with_location("metadata.timestamp")
                .with_expected("ISO 8601 timestamp")
                .with_actual(current_raw),
        ]
    })?;

    if current_ts <= parent_ts {
        return Err(vec![Diagnostic::error(
            lineage_id(),
            "Timestamp must be newer than parent timestamp",
        )
        .with_location("metadata.timestamp")
        .with_expected(format!(
            "later than {} ({})",
            parent_raw,
            parent_layer.file_name()
        ))
        .with_actual(current_raw)
        .with_recommendation("Ensure the file is generated after its parent")]);
    }

    tracing::debug!(%layer, parent = %parent_raw, current = %current_raw, "lineage ok");
    Ok(())
}
