//! Document model for layered architecture documents.
//!
//! - [`field`] - tri-state [`Field`] values for untrusted JSON
//! - [`document`] - document, entity, observation, and relation types
//! - [`layer`] - layer identities and per-layer validation tables
//! - [`timestamp`] - ISO-8601 parsing for lineage checks

pub mod document;
pub mod field;
pub mod layer;
pub mod timestamp;

pub use document::{
    Document, Entity, Manifest, Metadata, Observation, ParentStamp, Relation, Repository,
    Runtime, Structure, Technology,
};
pub use field::{Field, FieldValue, JsonKind, Presence};
pub use layer::{EntityField, Extension, Layer, LayerSpec, ParentLink, RelationField};
pub use timestamp::parse_timestamp;
