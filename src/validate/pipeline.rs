//! The validation pipeline.
//!
//! One run takes a document through lineage, then the registered checks in
//! order (schema, references, cycles), and aggregates everything found into
//! a [`ValidationReport`].

use std::fs;
use std::io::Read;

use chrono::Utc;

use super::check::{Check, CheckContext, CheckId};
use super::cycles::CycleCheck;
use super::diagnostic::Diagnostic;
use super::init::check_init;
use super::lineage::{check_lineage, ParentDocument};
use super::references::{ParentIndex, ReferenceCheck};
use super::schema::{check_schema, SchemaCheck};
use super::summary::Summary;
use crate::config::{DocumentSource, ValidationConfig};
use crate::model::{Document, Field, Layer};

fn input_id() -> CheckId {
    CheckId::new("input")
}

/// The result of validating one document.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub layer: Layer,
    pub diagnostics: Vec<Diagnostic>,
    /// Set when the run was skipped instead of performed.
    pub skipped: Option<String>,
}

impl ValidationReport {
    pub fn new(layer: Layer, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            layer,
            diagnostics,
            skipped: None,
        }
    }

    /// A run that did not happen, e.g. because there was nothing to check.
    pub fn skipped(layer: Layer, reason: impl Into<String>) -> Self {
        Self {
            layer,
            diagnostics: Vec::new(),
            skipped: Some(reason.into()),
        }
    }

    pub fn summary(&self) -> Summary {
        Summary::aggregate(&self.diagnostics)
    }

    pub fn exit_code(&self) -> i32 {
        self.summary().exit_code()
    }

    pub fn is_skipped(&self) -> bool {
        self.skipped.is_some()
    }
}

/// Runs the validation stages for a layer.
pub struct Validator {
    checks: Vec<Box<dyn Check>>,
}

impl Validator {
    /// Create a validator with no post-lineage checks.
    pub fn new() -> Self {
        Self { checks: Vec::new() }
    }

    /// Create a validator with the schema, reference, and cycle checks.
    pub fn with_builtins() -> Self {
        let mut validator = Self::new();
        validator.register(Box::new(SchemaCheck));
        validator.register(Box::new(ReferenceCheck));
        validator.register(Box::new(CycleCheck));
        validator
    }

    /// Append a check; checks run in registration order.
    pub fn register(&mut self, check: Box<dyn Check>) {
        self.checks.push(check);
    }

    /// Validate the document described by `config`.
    ///
    /// `stdin` is read only when the document source is standard input.
    pub fn run(&self, config: &ValidationConfig, stdin: &mut dyn Read) -> ValidationReport {
        let layer = config.layer;
        let document = match read_document(&config.document, stdin) {
            Ok(document) => document,
            Err(diagnostic) => return ValidationReport::new(layer, vec![*diagnostic]),
        };
        tracing::debug!(%layer, source = %config.document, "document loaded");
        self.validate(&document, config)
    }

    /// Validate an already-parsed document.
    pub fn validate(&self, document: &Document, config: &ValidationConfig) -> ValidationReport {
        let layer = config.layer;
        let Some(spec) = layer.spec() else {
            return ValidationReport::new(layer, check_init(document, Utc::now()));
        };

        let Some(parent_path) = config.parent.as_deref() else {
            let diagnostic = Diagnostic::error(
                CheckId::new("lineage"),
                "No parent document configured",
            )
            .with_recommendation("Pass --parent or validate from a knowledge base");
            return ValidationReport::new(layer, vec![diagnostic]);
        };
        let parent = ParentDocument::load(parent_path);
        if let Err(diagnostics) = check_lineage(document, layer, &parent) {
            tracing::debug!(%layer, "lineage failed; skipping remaining stages");
            return ValidationReport::new(layer, diagnostics);
        }

        let entities = match document.entities(layer) {
            Field::Present(entities) if !entities.is_empty() => entities,
            _ => {
                tracing::debug!(%layer, "entity collection unusable; stopping after schema");
                return ValidationReport::new(
                    layer,
                    check_schema(document, spec, &config.settings),
                );
            }
        };

        let parent_index = parent
            .document()
            .map(|parent_doc| ParentIndex::from_document(spec, parent_doc))
            .unwrap_or_default();
        let ctx = CheckContext {
            spec,
            entities,
            parent: &parent_index,
            settings: &config.settings,
        };

        let mut diagnostics = Vec::new();
        for check in &self.checks {
            let found = check.check(&ctx);
            tracing::debug!(
                %layer,
                check = %check.id(),
                findings = found.len(),
                "{}",
                check.name()
            );
            diagnostics.extend(found);
        }
        ValidationReport::new(layer, diagnostics)
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// Read and parse the input document, turning failures into a diagnostic.
fn read_document(
    source: &DocumentSource,
    stdin: &mut dyn Read,
) -> Result<Document, Box<Diagnostic>> {
    let text = match source {
        DocumentSource::Stdin => {
            let mut text = String::new();
            stdin.read_to_string(&mut text).map_err(|e| {
                Box::new(
                    Diagnostic::error(input_id(), "Failed to read input")
                        .with_location(source.to_string())
                        .with_actual(e.to_string()),
                )
            })?;
            text
        }
        DocumentSource::File(path) => {
            if !path.exists() {
                return Err(Box::new(
                    Diagnostic::error(
                        input_id(),
                        format!("Input file not found: {}", path.display()),
                    )
                    .with_location(source.to_string()),
                ));
            }
            fs::read_to_string(path).map_err(|e| {
                Box::new(
                    Diagnostic::error(input_id(), "Failed to read input")
                        .with_location(source.to_string())
                        .with_actual(e.to_string()),
                )
            })?
        }
    };

    Document::parse(&text, &source.to_string()).map_err(|e| {
        let message = match e {
            crate::error::ArchlintError::DocumentParse { message, .. } => message,
            other => other.to_string(),
        };
        Box::new(
            Diagnostic::error(input_id(), "Invalid JSON")
                .with_location(source.to_string())
                .with_actual(message),
        )
    })
}
