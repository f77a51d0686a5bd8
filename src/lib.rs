//! archlint - Validation for layered architecture documents.
//!
//! archlint checks the JSON documents that describe a codebase at three
//! levels of detail (systems, containers, components) plus the init
//! manifest they are generated from. Each run verifies lineage against the
//! parent document, then schema, references, and relation cycles, and maps
//! the findings onto a three-valued exit code.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Run configuration and project settings
//! - [`error`] - Error types and result aliases
//! - [`model`] - Tolerant document model and per-layer tables
//! - [`validate`] - Validation stages, aggregation, and report output
//!
//! # Example
//!
//! ```
//! use archlint::model::{Document, Layer};
//! use archlint::validate::detect_cycles;
//!
//! let doc = Document::parse(
//!     r#"{"systems": [
//!         {"id": "a", "relations": [{"target": "b"}]},
//!         {"id": "b", "relations": [{"target": "a"}]}
//!     ]}"#,
//!     "c1-systems.json",
//! )
//! .unwrap();
//!
//! let systems = doc.entities(Layer::C1).get().unwrap();
//! assert_eq!(detect_cycles(systems), vec![vec!["a", "b", "a"]]);
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod validate;

pub use error::{ArchlintError, Result};
