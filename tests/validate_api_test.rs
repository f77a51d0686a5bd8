//! Integration tests for the validation pipeline API.

use std::cell::Cell;
use std::fs;
use std::io::Cursor;
use std::path::PathBuf;
use std::rc::Rc;

use archlint::config::{DocumentSource, KnowledgeBase, ValidationConfig};
use archlint::model::{Document, Layer};
use archlint::validate::{
    Check, CheckContext, CheckId, Diagnostic, Outcome, Severity, ValidationReport, Validator,
};
use serde_json::json;
use tempfile::TempDir;

/// A knowledge base containing only an init document.
fn setup_knowledge_base() -> (TempDir, KnowledgeBase) {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("knowledge-base");
    fs::create_dir_all(&root).unwrap();
    fs::write(
        root.join("init.json"),
        json!({
            "metadata": {"timestamp": "2024-01-01T00:00:00Z"},
            "repositories": [{"name": "shop", "path": "/srv/shop"}]
        })
        .to_string(),
    )
    .unwrap();
    (temp, KnowledgeBase::new(root))
}

fn c1(timestamp: &str, systems: serde_json::Value) -> Document {
    Document::parse(
        &json!({"metadata": {"timestamp": timestamp}, "systems": systems}).to_string(),
        "c1-systems.json",
    )
    .unwrap()
}

/// Counts entities and records that it ran.
struct CountingCheck {
    ran: Rc<Cell<bool>>,
}

impl Check for CountingCheck {
    fn id(&self) -> CheckId {
        CheckId::new("counting")
    }

    fn name(&self) -> &str {
        "Entity count"
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Diagnostic> {
        self.ran.set(true);
        vec![Diagnostic::warning(
            self.id(),
            format!("{} {}(s)", ctx.objects().count(), ctx.spec.noun()),
        )]
    }
}

/// Validate a C1 document with only the counting check; returns whether it ran.
fn run_counting(document: &Document, kb: &KnowledgeBase) -> (ValidationReport, bool) {
    let ran = Rc::new(Cell::new(false));
    let mut validator = Validator::new();
    validator.register(Box::new(CountingCheck { ran: Rc::clone(&ran) }));
    let report = validator.validate(document, &ValidationConfig::for_layer(Layer::C1, kb));
    (report, ran.get())
}

#[test]
fn empty_validator_passes_after_lineage() {
    let (_temp, kb) = setup_knowledge_base();
    let doc = c1("2024-01-02T00:00:00Z", json!([{"id": "shop-web"}]));

    let report = Validator::new().validate(&doc, &ValidationConfig::for_layer(Layer::C1, &kb));

    assert!(report.diagnostics.is_empty());
    assert_eq!(report.summary().outcome, Outcome::Passed);
    assert_eq!(report.exit_code(), 0);
}

#[test]
fn registered_check_sees_entities() {
    let (_temp, kb) = setup_knowledge_base();
    let doc = c1(
        "2024-01-02T00:00:00Z",
        json!([{"id": "shop-web"}, {"id": "shop-api"}, "not an object"]),
    );
    let (report, ran) = run_counting(&doc, &kb);

    assert!(ran);
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].message, "2 system(s)");
    assert_eq!(report.diagnostics[0].severity, Severity::Warning);
    assert_eq!(report.exit_code(), 1);
}

#[test]
fn lineage_failure_skips_checks() {
    let (_temp, kb) = setup_knowledge_base();
    let doc = c1("2023-12-31T00:00:00Z", json!([{"id": "shop-web"}]));
    let (report, ran) = run_counting(&doc, &kb);

    assert!(!ran);
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].check, CheckId::new("lineage"));
    assert_eq!(report.exit_code(), 2);
}

#[test]
fn unusable_collection_stops_after_schema() {
    let (_temp, kb) = setup_knowledge_base();
    let doc = c1("2024-01-02T00:00:00Z", json!({"id": "shop-web"}));
    let (report, ran) = run_counting(&doc, &kb);

    assert!(!ran);
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(
        report.diagnostics[0].message,
        "'systems' must be an array, found object"
    );
}

#[test]
fn run_reads_document_from_stdin() {
    let (_temp, kb) = setup_knowledge_base();
    let config = ValidationConfig::for_layer(Layer::C1, &kb);
    let input = json!({"metadata": {"timestamp": "2023-01-01T00:00:00Z"}, "systems": []});
    let mut stdin = Cursor::new(input.to_string());

    let report = Validator::with_builtins().run(&config, &mut stdin);

    assert_eq!(
        report.diagnostics[0].message,
        "Timestamp must be newer than parent timestamp"
    );
}

#[test]
fn run_reports_missing_input_file() {
    let (temp, kb) = setup_knowledge_base();
    let missing = temp.path().join("nowhere.json");
    let config = ValidationConfig::for_layer(Layer::C1, &kb)
        .with_document(DocumentSource::File(missing.clone()));

    let report = Validator::with_builtins().run(&config, &mut std::io::empty());

    assert_eq!(report.exit_code(), 2);
    assert_eq!(
        report.diagnostics[0].message,
        format!("Input file not found: {}", missing.display())
    );
}

#[test]
fn explicit_parent_overrides_knowledge_base() {
    let (temp, kb) = setup_knowledge_base();
    let parent = temp.path().join("older-init.json");
    fs::write(
        &parent,
        json!({"metadata": {"timestamp": "2020-01-01T00:00:00Z"}, "repositories": []}).to_string(),
    )
    .unwrap();
    let config = ValidationConfig::for_layer(Layer::C1, &kb).with_parent(PathBuf::from(&parent));
    let doc = c1("2021-01-01T00:00:00Z", json!([{"id": "shop-web"}]));

    let report = Validator::new().validate(&doc, &config);

    assert!(report.diagnostics.is_empty());
}
