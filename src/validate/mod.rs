//! Layer document validation.
//!
//! A run is a fixed sequence of stages:
//!
//! 1. **Lineage** ([`lineage`]) - the document must be newer than its parent.
//!    Failure here ends the run.
//! 2. **Schema** ([`schema`]) - required fields, types, IDs, vocabularies.
//!    An unusable entity collection ends the run.
//! 3. **References** ([`references`]) - parent-layer foreign keys and
//!    same-layer relation endpoints.
//! 4. **Cycles** ([`cycles`]) - circular dependencies among relations.
//!
//! The init manifest has no parent and is checked by [`init`] instead.
//! Findings are aggregated by [`summary`] into the exit-code contract and
//! rendered by [`output`].
//!
//! # Example
//!
//! ```
//! use archlint::config::{KnowledgeBase, ValidationConfig};
//! use archlint::model::Layer;
//! use archlint::validate::{Outcome, Validator};
//! use std::fs;
//! use std::io::Cursor;
//! use tempfile::TempDir;
//!
//! let temp = TempDir::new().unwrap();
//! let kb = KnowledgeBase::new(temp.path());
//! fs::write(
//!     kb.document_path(Layer::Init),
//!     r#"{"metadata": {"timestamp": "2024-01-01T00:00:00Z"}, "repositories": []}"#,
//! )
//! .unwrap();
//!
//! let config = ValidationConfig::for_layer(Layer::C1, &kb);
//! let mut stdin = Cursor::new(r#"{"metadata": {"timestamp": "2023-12-31T00:00:00Z"}}"#);
//! let report = Validator::with_builtins().run(&config, &mut stdin);
//!
//! assert_eq!(report.summary().outcome, Outcome::Failed);
//! assert_eq!(report.exit_code(), 2);
//! ```

pub mod check;
pub mod cycles;
pub mod diagnostic;
pub mod init;
pub mod lineage;
pub mod output;
pub mod pipeline;
pub mod references;
pub mod schema;
pub mod summary;

pub use check::{Check, CheckContext, CheckId, Severity};
pub use cycles::{detect_cycles, CycleCheck};
pub use diagnostic::Diagnostic;
pub use init::check_init;
pub use lineage::{check_lineage, ParentDocument};
pub use output::{HumanFormatter, JsonFormatter, OutputFormat, ReportFormatter};
pub use pipeline::{ValidationReport, Validator};
pub use references::{check_references, is_external, ParentIndex, ReferenceCheck};
pub use schema::{check_schema, is_valid_id, SchemaCheck};
pub use summary::{Outcome, Summary};
