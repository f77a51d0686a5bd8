//! Layer identities and per-layer validation tables.
//!
//! The three entity layers share one validator. Everything that differs
//! between them lives in a [`LayerSpec`]: which fields are required, the
//! closed vocabularies, and how an entity points at its parent layer.

use std::fmt;

use super::document::{Entity, Relation};
use super::field::Presence;

/// One of the four ordered document kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, clap::ValueEnum)]
pub enum Layer {
    /// Repository manifest produced before any C4 layer.
    Init,
    /// Systems.
    #[value(alias = "systems")]
    C1,
    /// Containers.
    #[value(alias = "containers")]
    C2,
    /// Components.
    #[value(alias = "components")]
    C3,
}

impl Layer {
    /// All layers in generation order.
    pub const ALL: [Layer; 4] = [Layer::Init, Layer::C1, Layer::C2, Layer::C3];

    /// Tag used in report lines, e.g. `[VALIDATE-C1]`.
    pub fn tag(self) -> &'static str {
        match self {
            Layer::Init => "INIT",
            Layer::C1 => "C1",
            Layer::C2 => "C2",
            Layer::C3 => "C3",
        }
    }

    /// Conventional file name under the knowledge root.
    pub fn file_name(self) -> &'static str {
        match self {
            Layer::Init => "init.json",
            Layer::C1 => "c1-systems.json",
            Layer::C2 => "c2-containers.json",
            Layer::C3 => "c3-components.json",
        }
    }

    /// The layer this one is generated from.
    pub fn parent(self) -> Option<Layer> {
        match self {
            Layer::Init => None,
            Layer::C1 => Some(Layer::Init),
            Layer::C2 => Some(Layer::C1),
            Layer::C3 => Some(Layer::C2),
        }
    }

    /// Validation table for entity layers; `None` for init.
    pub fn spec(self) -> Option<&'static LayerSpec> {
        match self {
            Layer::Init => None,
            Layer::C1 => Some(&SYSTEMS),
            Layer::C2 => Some(&CONTAINERS),
            Layer::C3 => Some(&COMPONENTS),
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layer::Init => write!(f, "init"),
            Layer::C1 => write!(f, "c1"),
            Layer::C2 => write!(f, "c2"),
            Layer::C3 => write!(f, "c3"),
        }
    }
}

/// Entity fields a layer may require.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityField {
    Id,
    Name,
    Type,
    SystemId,
    ContainerId,
    Repositories,
    Description,
    Responsibility,
    Technology,
    Runtime,
    Structure,
}

impl EntityField {
    pub fn name(self) -> &'static str {
        match self {
            EntityField::Id => "id",
            EntityField::Name => "name",
            EntityField::Type => "type",
            EntityField::SystemId => "system_id",
            EntityField::ContainerId => "container_id",
            EntityField::Repositories => "repositories",
            EntityField::Description => "description",
            EntityField::Responsibility => "responsibility",
            EntityField::Technology => "technology",
            EntityField::Runtime => "runtime",
            EntityField::Structure => "structure",
        }
    }

    /// Presence of this field on an entity.
    pub fn presence(self, entity: &Entity) -> Presence {
        match self {
            EntityField::Id => entity.id.presence(),
            EntityField::Name => entity.name.presence(),
            EntityField::Type => entity.kind.presence(),
            EntityField::SystemId => entity.system_id.presence(),
            EntityField::ContainerId => entity.container_id.presence(),
            EntityField::Repositories => entity.repositories.presence(),
            EntityField::Description => entity.description.presence(),
            EntityField::Responsibility => entity.responsibility.presence(),
            EntityField::Technology => entity.technology.presence(),
            EntityField::Runtime => entity.runtime.presence(),
            EntityField::Structure => entity.structure.presence(),
        }
    }
}

/// Relation fields a layer may require.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationField {
    Id,
    Source,
    Target,
    Type,
    Description,
    Coupling,
}

impl RelationField {
    pub fn name(self) -> &'static str {
        match self {
            RelationField::Id => "id",
            RelationField::Source => "source",
            RelationField::Target => "target",
            RelationField::Type => "type",
            RelationField::Description => "description",
            RelationField::Coupling => "coupling",
        }
    }

    /// Presence of this field on a relation.
    pub fn presence(self, relation: &Relation) -> Presence {
        match self {
            RelationField::Id => relation.id.presence(),
            RelationField::Source => relation.source.presence(),
            RelationField::Target => relation.target.presence(),
            RelationField::Type => relation.kind.presence(),
            RelationField::Description => relation.description.presence(),
            RelationField::Coupling => relation.coupling.presence(),
        }
    }
}

/// How an entity references the layer above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentLink {
    /// Systems list init repositories by name or path.
    Repositories,
    /// Containers name their system in `system_id`.
    SystemId,
    /// Components name their container in `container_id`.
    ContainerId,
}

impl ParentLink {
    pub fn field_name(self) -> &'static str {
        match self {
            ParentLink::Repositories => "repositories",
            ParentLink::SystemId => "system_id",
            ParentLink::ContainerId => "container_id",
        }
    }

    /// Parent IDs an entity references through this link.
    pub fn referenced_ids(self, entity: &Entity) -> Vec<&str> {
        match self {
            ParentLink::Repositories => entity
                .repositories
                .get()
                .map(|repos| repos.iter().map(String::as_str).collect())
                .unwrap_or_default(),
            ParentLink::SystemId => entity.system_id.as_deref().into_iter().collect(),
            ParentLink::ContainerId => entity.container_id.as_deref().into_iter().collect(),
        }
    }
}

/// Nested structure checks only some layers carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extension {
    None,
    /// Container `technology` and `runtime` blocks.
    ContainerRuntime,
    /// Component `structure` block.
    ComponentStructure,
}

/// Validation table for one entity layer.
#[derive(Debug)]
pub struct LayerSpec {
    pub layer: Layer,
    /// Key of the entity collection, e.g. `systems`.
    pub collection: &'static str,
    /// Singular display label, e.g. `System`.
    pub label: &'static str,
    pub entity_fields: &'static [EntityField],
    pub relation_fields: &'static [RelationField],
    pub entity_types: &'static [&'static str],
    pub observation_categories: &'static [&'static str],
    pub relation_types: &'static [&'static str],
    pub parent_link: ParentLink,
    /// Warn when a parent-layer entity has no children in this layer.
    pub require_children: bool,
    /// Warn when too many relations are tightly coupled.
    pub coupling_analysis: bool,
    pub extension: Extension,
}

impl LayerSpec {
    /// Lowercase entity label for messages.
    pub fn noun(&self) -> String {
        self.label.to_lowercase()
    }

    pub fn requires_relation_field(&self, field: RelationField) -> bool {
        self.relation_fields.contains(&field)
    }
}

/// Observation fields required on every layer.
pub const OBSERVATION_FIELDS: [&str; 3] = ["id", "category", "description"];

pub const OBSERVATION_SEVERITIES: &[&str] = &["info", "warning", "critical"];

pub const COUPLING_TYPES: &[&str] = &["loose", "tight"];

pub const RUNTIME_ENVIRONMENTS: &[&str] = &["browser", "server", "cloud", "edge", "mobile"];

pub static SYSTEMS: LayerSpec = LayerSpec {
    layer: Layer::C1,
    collection: "systems",
    label: "System",
    entity_fields: &[
        EntityField::Id,
        EntityField::Name,
        EntityField::Type,
        EntityField::Repositories,
        EntityField::Description,
    ],
    relation_fields: &[
        RelationField::Id,
        RelationField::Source,
        RelationField::Target,
        RelationField::Type,
        RelationField::Description,
    ],
    entity_types: &[
        "web-application",
        "mobile-application",
        "desktop-application",
        "api-service",
        "database",
        "message-broker",
        "cache",
        "cdn",
        "external-service",
        "user-facing",
        "internal-service",
        "data-store",
        "integration",
        "other",
    ],
    observation_categories: &[
        "architectural",
        "technical",
        "quality",
        "security",
        "performance",
        "scalability",
        "maintainability",
        "integration",
        "deployment",
        "data",
        "testing",
        "documentation",
    ],
    relation_types: &[
        "http-rest",
        "http-graphql",
        "http-soap",
        "grpc",
        "websocket",
        "message-queue",
        "event-stream",
        "database-query",
        "database-write",
        "file-io",
        "dependency",
        "inheritance",
        "composition",
        "aggregation",
        "uses",
        "calls",
        "contains",
        "http",
        "https",
        "graphql",
        "rpc",
        "database-connection",
        "file-transfer",
        "authentication",
        "soap",
        "smtp",
        "external-api",
    ],
    parent_link: ParentLink::Repositories,
    require_children: false,
    coupling_analysis: false,
    extension: Extension::None,
};

pub static CONTAINERS: LayerSpec = LayerSpec {
    layer: Layer::C2,
    collection: "containers",
    label: "Container",
    entity_fields: &[
        EntityField::Id,
        EntityField::Name,
        EntityField::Type,
        EntityField::SystemId,
        EntityField::Responsibility,
        EntityField::Technology,
        EntityField::Runtime,
    ],
    relation_fields: &[
        RelationField::Target,
        RelationField::Type,
        RelationField::Description,
    ],
    entity_types: &[
        "web-server",
        "app-server",
        "database",
        "cache",
        "message-broker",
        "spa",
        "api",
        "worker",
        "file-storage",
        "web-application",
        "application-server",
        "spa-client",
        "mobile-app",
        "desktop-app",
    ],
    observation_categories: &[
        "architectural",
        "technical",
        "quality",
        "security",
        "performance",
        "scalability",
        "maintainability",
        "integration",
        "deployment",
        "data",
        "testing",
        "documentation",
        "technology",
        "runtime",
        "communication",
        "data-storage",
        "authentication",
        "configuration",
        "monitoring",
        "dependencies",
    ],
    relation_types: &[
        "http-rest",
        "http-graphql",
        "grpc",
        "websocket",
        "database-connection",
        "database-query",
        "database-write",
        "database-read-write",
        "cache-access",
        "cache-read",
        "cache-write",
        "cache-read-write",
        "message-publish",
        "message-subscribe",
        "message-consumer",
        "file-read",
        "file-write",
        "cdn-fetch",
        "stream",
        "dependency",
        "uses",
        "calls",
        "contains",
    ],
    parent_link: ParentLink::SystemId,
    require_children: true,
    coupling_analysis: false,
    extension: Extension::ContainerRuntime,
};

pub static COMPONENTS: LayerSpec = LayerSpec {
    layer: Layer::C3,
    collection: "components",
    label: "Component",
    entity_fields: &[
        EntityField::Id,
        EntityField::Name,
        EntityField::Type,
        EntityField::ContainerId,
        EntityField::Responsibility,
        EntityField::Structure,
    ],
    relation_fields: &[
        RelationField::Target,
        RelationField::Type,
        RelationField::Coupling,
        RelationField::Description,
    ],
    entity_types: &[
        "service",
        "controller",
        "repository",
        "model",
        "utility",
        "middleware",
        "view",
        "component",
        "config",
        "facade",
        "factory",
        "adapter",
    ],
    observation_categories: &[
        "design-patterns",
        "code-quality",
        "dependencies",
        "testing",
        "complexity",
        "maintainability",
        "code-structure",
        "error-handling",
        "performance",
        "security",
        "documentation",
        "coupling",
        "cohesion",
    ],
    relation_types: &[
        "dependency",
        "interface-implementation",
        "event-publisher",
        "event-subscriber",
        "uses",
        "calls",
        "imports",
        "injects",
        "observes",
        "delegates",
        "provides",
        "consumes",
        "inherits",
        "implements",
        "composes",
        "aggregates",
        "notifies",
        "extends",
    ],
    parent_link: ParentLink::ContainerId,
    require_children: true,
    coupling_analysis: true,
    extension: Extension::ComponentStructure,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::field::Field;

    #[test]
    fn layers_are_ordered() {
        assert!(Layer::Init < Layer::C1);
        assert!(Layer::C1 < Layer::C2);
        assert!(Layer::C2 < Layer::C3);
    }

    #[test]
    fn parent_chain() {
        assert_eq!(Layer::Init.parent(), None);
        assert_eq!(Layer::C1.parent(), Some(Layer::Init));
        assert_eq!(Layer::C2.parent(), Some(Layer::C1));
        assert_eq!(Layer::C3.parent(), Some(Layer::C2));
    }

    #[test]
    fn only_entity_layers_have_specs() {
        assert!(Layer::Init.spec().is_none());
        for layer in [Layer::C1, Layer::C2, Layer::C3] {
            assert_eq!(layer.spec().unwrap().layer, layer);
        }
    }

    #[test]
    fn tags_and_file_names() {
        assert_eq!(Layer::C2.tag(), "C2");
        assert_eq!(Layer::C3.file_name(), "c3-components.json");
        assert_eq!(Layer::Init.to_string(), "init");
    }

    #[test]
    fn entity_field_presence() {
        let entity = Entity {
            id: Field::Present("api".into()),
            ..Default::default()
        };
        assert_eq!(EntityField::Id.presence(&entity), Presence::Present);
        assert_eq!(EntityField::Name.presence(&entity), Presence::Missing);
    }

    #[test]
    fn parent_link_collects_ids() {
        let entity = Entity {
            system_id: Field::Present("shop".into()),
            repositories: Field::Present(vec!["/repo-a".into(), "/repo-b".into()]),
            ..Default::default()
        };
        assert_eq!(ParentLink::SystemId.referenced_ids(&entity), vec!["shop"]);
        assert_eq!(
            ParentLink::Repositories.referenced_ids(&entity),
            vec!["/repo-a", "/repo-b"]
        );
        assert!(ParentLink::ContainerId.referenced_ids(&entity).is_empty());
    }

    #[test]
    fn only_c1_requires_relation_ids() {
        assert!(SYSTEMS.requires_relation_field(RelationField::Id));
        assert!(!CONTAINERS.requires_relation_field(RelationField::Id));
        assert!(COMPONENTS.requires_relation_field(RelationField::Coupling));
    }
}
