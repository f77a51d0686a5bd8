//! Layer document types.
//!
//! One set of types covers every layer. Fields that only some layers use
//! (`system_id`, `technology`, `structure`, ...) are simply [`Field::Missing`]
//! elsewhere; which of them are required is decided by the layer table in
//! [`super::layer`].

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};

use super::field::{object_field_value, Field};
use super::layer::Layer;
use crate::error::{ArchlintError, Result};

/// A parsed layer document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Document {
    pub metadata: Field<Metadata>,
    /// Init manifest repositories.
    pub repositories: Field<Vec<Field<Repository>>>,
    pub systems: Field<Vec<Field<Entity>>>,
    pub containers: Field<Vec<Field<Entity>>>,
    pub components: Field<Vec<Field<Entity>>>,
}

/// Document metadata.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub timestamp: Field<String>,
    pub parent: Field<ParentStamp>,
    pub schema_version: Field<String>,
    pub generator: Field<String>,
    pub generated_by: Field<String>,
    pub melly_version: Field<String>,
    pub generated_at: Field<String>,
}

/// The parent document a layer declares it was generated from.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ParentStamp {
    pub timestamp: Field<String>,
}

/// A system, container, or component.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Entity {
    pub id: Field<String>,
    pub name: Field<String>,
    #[serde(rename = "type")]
    pub kind: Field<String>,
    pub system_id: Field<String>,
    pub container_id: Field<String>,
    pub repositories: Field<Vec<String>>,
    pub description: Field<String>,
    pub responsibility: Field<String>,
    pub technology: Field<Technology>,
    pub runtime: Field<Runtime>,
    pub structure: Field<Structure>,
    pub observations: Field<Vec<Field<Observation>>>,
    pub relations: Field<Vec<Field<Relation>>>,
}

/// A categorized note attached to an entity.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Observation {
    pub id: Field<String>,
    pub category: Field<String>,
    pub description: Field<String>,
    pub severity: Field<String>,
}

/// A directed, typed edge between two entities of one layer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Relation {
    pub id: Field<String>,
    pub source: Field<String>,
    pub target: Field<String>,
    #[serde(rename = "type")]
    pub kind: Field<String>,
    pub description: Field<String>,
    pub coupling: Field<String>,
}

/// Container technology stack.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Technology {
    pub primary_language: Field<String>,
    pub framework: Field<Option<String>>,
}

/// Container runtime environment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Runtime {
    pub environment: Field<String>,
    pub platform: Field<String>,
    pub containerized: Field<bool>,
    pub container_technology: Field<Option<String>>,
}

/// Component source layout.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Structure {
    pub path: Field<String>,
    pub language: Field<String>,
    pub files: Field<Vec<Value>>,
}

/// A repository listed in the init manifest.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Repository {
    pub path: Field<String>,
    pub name: Field<String>,
    pub manifests: Field<Vec<Field<Manifest>>>,
}

/// A package manifest discovered in a repository.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Manifest {
    #[serde(rename = "type")]
    pub kind: Field<String>,
    pub path: Field<String>,
    pub data: Field<Map<String, Value>>,
}

object_field_value!(
    Metadata,
    ParentStamp,
    Entity,
    Observation,
    Relation,
    Technology,
    Runtime,
    Structure,
    Repository,
    Manifest,
);

impl Document {
    /// Parse a document from JSON text.
    ///
    /// Only syntactically invalid JSON, or a top-level value that is not an
    /// object, is rejected here. Everything else is left for validation.
    pub fn parse(text: &str, source_name: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| ArchlintError::DocumentParse {
                source_name: source_name.to_string(),
                message: e.to_string(),
            })?;
        if !value.is_object() {
            return Err(ArchlintError::DocumentParse {
                source_name: source_name.to_string(),
                message: "top-level value must be an object".to_string(),
            });
        }
        serde_json::from_value(value).map_err(|e| ArchlintError::DocumentParse {
            source_name: source_name.to_string(),
            message: e.to_string(),
        })
    }

    /// Load and parse a document from disk.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ArchlintError::DocumentNotFound {
                path: path.to_path_buf(),
            });
        }
        let text = fs::read_to_string(path)?;
        Self::parse(&text, &path.display().to_string())
    }

    /// The entity collection for a layer (systems, containers, components).
    ///
    /// The init layer has no entity collection and yields a missing field.
    pub fn entities(&self, layer: Layer) -> &Field<Vec<Field<Entity>>> {
        static NONE: Field<Vec<Field<Entity>>> = Field::Missing;
        match layer {
            Layer::Init => &NONE,
            Layer::C1 => &self.systems,
            Layer::C2 => &self.containers,
            Layer::C3 => &self.components,
        }
    }

    /// The metadata timestamp, if present.
    pub fn timestamp(&self) -> Option<&str> {
        self.metadata.get().and_then(|m| m.timestamp.as_deref())
    }
}

impl Entity {
    /// The entity ID, if present.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Well-formed relations, in document order.
    pub fn relations(&self) -> impl Iterator<Item = &Relation> {
        self.relations
            .get()
            .into_iter()
            .flatten()
            .filter_map(Field::get)
    }

    /// Well-formed observations, in document order.
    pub fn observations(&self) -> impl Iterator<Item = &Observation> {
        self.observations
            .get()
            .into_iter()
            .flatten()
            .filter_map(Field::get)
    }
}

impl Relation {
    /// The relation's origin: its explicit `source`, else the owning entity.
    pub fn origin<'a>(&'a self, owner: &'a str) -> &'a str {
        self.source.as_deref().unwrap_or(owner)
    }
}
