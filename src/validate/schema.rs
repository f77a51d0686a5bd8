//! Structural validation of one entity layer.
//!
//! This stage checks required fields, field types, ID format and uniqueness,
//! vocabulary membership, and the nested blocks some layers carry. Missing or
//! malformed structure is an error; vocabulary drift and thin content are
//! warnings.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::check::{Check, CheckContext, CheckId};
use super::diagnostic::Diagnostic;
use crate::config::Settings;
use crate::model::layer::{
    COUPLING_TYPES, OBSERVATION_FIELDS, OBSERVATION_SEVERITIES, RUNTIME_ENVIRONMENTS,
};
use crate::model::{
    Document, Entity, Extension, Field, LayerSpec, Observation, Presence, Relation,
    RelationField,
};

/// Lowercase alphanumeric tokens joined by single hyphens.
pub const ID_PATTERN: &str = r"^[a-z0-9]+(-[a-z0-9]+)*$";

static ID_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(ID_PATTERN).unwrap());

/// Whether `id` matches [`ID_PATTERN`].
pub fn is_valid_id(id: &str) -> bool {
    ID_REGEX.is_match(id)
}

/// How an entity is named in messages: its ID, else its index.
pub(crate) fn describe(spec: &LayerSpec, idx: usize, entity: &Entity) -> String {
    match entity.id() {
        Some(id) => format!("{} '{}'", spec.label, id),
        None => format!("{} at index {}", spec.label, idx),
    }
}

/// Run schema checks over a whole document.
///
/// An empty, absent, or non-array entity collection yields a single
/// document-level error; nothing else can be checked in that case.
pub fn check_schema(
    document: &Document,
    spec: &'static LayerSpec,
    settings: &Settings,
) -> Vec<Diagnostic> {
    match document.entities(spec.layer) {
        Field::Present(entities) if !entities.is_empty() => {
            SchemaRules { spec, settings }.entities(entities)
        }
        Field::Invalid { .. } => {
            let err = document
                .entities(spec.layer)
                .type_error()
                .unwrap_or_default();
            vec![
                Diagnostic::error(schema_id(), format!("'{}' {}", spec.collection, err))
                    .with_location(spec.collection),
            ]
        }
        _ => vec![Diagnostic::error(
            schema_id(),
            format!(
                "No {} found ({} array is empty)",
                spec.collection, spec.collection
            ),
        )
        .with_location(spec.collection)],
    }
}

fn schema_id() -> CheckId {
    CheckId::new("schema")
}

/// Schema stage, as run by the validator pipeline.
pub struct SchemaCheck;

impl Check for SchemaCheck {
    fn id(&self) -> CheckId {
        schema_id()
    }

    fn name(&self) -> &str {
        "Schema"
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Diagnostic> {
        SchemaRules {
            spec: ctx.spec,
            settings: ctx.settings,
        }
        .entities(ctx.entities)
    }
}

struct SchemaRules<'a> {
    spec: &'static LayerSpec,
    settings: &'a Settings,
}

impl SchemaRules<'_> {
    fn entities(&self, entities: &[Field<Entity>]) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        let mut seen_ids = HashSet::new();

        for (idx, field) in entities.iter().enumerate() {
            let location = format!("{}[{}]", self.spec.collection, idx);
            let entity = match field {
                Field::Present(entity) => entity,
                _ => {
                    diagnostics.push(
                        Diagnostic::error(
                            schema_id(),
                            format!("{} at index {} is not an object", self.spec.label, idx),
                        )
                        .with_location(location),
                    );
                    continue;
                }
            };

            self.required_fields(idx, entity, &location, &mut diagnostics);
            self.identity(entity, &location, &mut seen_ids, &mut diagnostics);
            self.entity_type(entity, &location, &mut diagnostics);

            if let Some(repos) = entity.repositories.get() {
                if repos.is_empty() {
                    diagnostics.push(
                        Diagnostic::error(
                            schema_id(),
                            format!(
                                "{}: 'repositories' array is empty",
                                describe(self.spec, idx, entity)
                            ),
                        )
                        .with_location(format!("{}.repositories", location)),
                    );
                }
            }

            match self.spec.extension {
                Extension::None => {}
                Extension::ContainerRuntime => {
                    self.container_runtime(idx, entity, &location, &mut diagnostics)
                }
                Extension::ComponentStructure => {
                    self.component_structure(idx, entity, &location, &mut diagnostics)
                }
            }

            self.observations(idx, entity, &location, &mut diagnostics);
            self.relations(idx, entity, &location, &mut diagnostics);
        }

        tracing::debug!(
            layer = %self.spec.layer,
            entities = entities.len(),
            findings = diagnostics.len(),
            "schema stage complete"
        );
        diagnostics
    }

    fn required_fields(
        &self,
        idx: usize,
        entity: &Entity,
        location: &str,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        for field in self.spec.entity_fields {
            match field.presence(entity) {
                Presence::Present => {}
                Presence::Missing => diagnostics.push(
                    Diagnostic::error(
                        schema_id(),
                        format!(
                            "{} at index {}: Missing required field '{}'",
                            self.spec.label,
                            idx,
                            field.name()
                        ),
                    )
                    .with_location(location),
                ),
                Presence::WrongType(err) => diagnostics.push(
                    Diagnostic::error(
                        schema_id(),
                        format!(
                            "{}: '{}' {}",
                            describe(self.spec, idx, entity),
                            field.name(),
                            err
                        ),
                    )
                    .with_location(format!("{}.{}", location, field.name())),
                ),
            }
        }
    }

    fn identity(
        &self,
        entity: &Entity,
        location: &str,
        seen_ids: &mut HashSet<String>,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let Some(id) = entity.id() else {
            return;
        };
        if !is_valid_id(id) {
            diagnostics.push(
                Diagnostic::error(
                    schema_id(),
                    format!("Invalid {} ID format: {}", self.spec.noun(), id),
                )
                .with_location(format!("{}.id", location))
                .with_expected(ID_PATTERN)
                .with_actual(id),
            );
        }
        if !seen_ids.insert(id.to_string()) {
            diagnostics.push(
                Diagnostic::error(
                    schema_id(),
                    format!("Duplicate {} ID: {}", self.spec.noun(), id),
                )
                .with_location(format!("{}.id", location)),
            );
        }
    }

    fn entity_type(&self, entity: &Entity, location: &str, diagnostics: &mut Vec<Diagnostic>) {
        if let Some(kind) = entity.kind.as_deref() {
            if !self.spec.entity_types.contains(&kind) {
                diagnostics.push(
                    Diagnostic::warning(
                        schema_id(),
                        format!(
                            "Unknown {} type: {} ({}: {})",
                            self.spec.noun(),
                            kind,
                            self.spec.noun(),
                            entity.id().unwrap_or("unknown")
                        ),
                    )
                    .with_location(format!("{}.type", location)),
                );
            }
        }
    }

    fn container_runtime(
        &self,
        idx: usize,
        entity: &Entity,
        location: &str,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let who = describe(self.spec, idx, entity);

        if let Some(tech) = entity.technology.get() {
            let at = format!("{}.technology", location);
            nested_required(
                &who,
                "technology.primary_language",
                tech.primary_language.presence(),
                &at,
                diagnostics,
            );
            nested_required(
                &who,
                "technology.framework",
                tech.framework.presence(),
                &at,
                diagnostics,
            );
        }

        if let Some(runtime) = entity.runtime.get() {
            let at = format!("{}.runtime", location);
            nested_required(
                &who,
                "runtime.environment",
                runtime.environment.presence(),
                &at,
                diagnostics,
            );
            if let Some(env) = runtime.environment.as_deref() {
                if !RUNTIME_ENVIRONMENTS.contains(&env) {
                    diagnostics.push(
                        Diagnostic::warning(
                            schema_id(),
                            format!("{}: Unknown environment: {}", who, env),
                        )
                        .with_location(at.clone())
                        .with_expected(RUNTIME_ENVIRONMENTS.join(", ")),
                    );
                }
            }
            nested_required(
                &who,
                "runtime.platform",
                runtime.platform.presence(),
                &at,
                diagnostics,
            );
            nested_required(
                &who,
                "runtime.containerized",
                runtime.containerized.presence(),
                &at,
                diagnostics,
            );
            if runtime.containerized.get() == Some(&true) {
                match runtime.container_technology.presence() {
                    Presence::Missing => diagnostics.push(
                        Diagnostic::error(
                            schema_id(),
                            format!(
                                "{}: Missing 'runtime.container_technology' (required when containerized=true)",
                                who
                            ),
                        )
                        .with_location(at),
                    ),
                    presence => nested_required(
                        &who,
                        "runtime.container_technology",
                        presence,
                        &at,
                        diagnostics,
                    ),
                }
            }
        }
    }

    fn component_structure(
        &self,
        idx: usize,
        entity: &Entity,
        location: &str,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let Some(structure) = entity.structure.get() else {
            return;
        };
        let who = describe(self.spec, idx, entity);
        let at = format!("{}.structure", location);
        nested_required(&who, "structure.path", structure.path.presence(), &at, diagnostics);
        nested_required(
            &who,
            "structure.language",
            structure.language.presence(),
            &at,
            diagnostics,
        );
        if let Some(type_err) = structure.files.type_error() {
            diagnostics.push(
                Diagnostic::error(schema_id(), format!("{}: 'structure.files' {}", who, type_err))
                    .with_location(at.clone()),
            );
        }
        if structure.files.get().is_some_and(Vec::is_empty) {
            diagnostics.push(
                Diagnostic::warning(schema_id(), format!("{}: Empty 'files' array", who))
                    .with_location(at),
            );
        }
    }

    fn observations(
        &self,
        idx: usize,
        entity: &Entity,
        location: &str,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let who = describe(self.spec, idx, entity);
        let observations = match &entity.observations {
            Field::Present(list) if !list.is_empty() => list,
            Field::Invalid { .. } => {
                diagnostics.push(
                    Diagnostic::error(
                        schema_id(),
                        format!(
                            "{}: 'observations' {}",
                            who,
                            entity.observations.type_error().unwrap_or_default()
                        ),
                    )
                    .with_location(format!("{}.observations", location)),
                );
                return;
            }
            _ => {
                diagnostics.push(
                    Diagnostic::warning(schema_id(), format!("{}: No observations", who))
                        .with_location(format!("{}.observations", location))
                        .with_recommendation(format!(
                            "Add observations to document {} characteristics",
                            self.spec.noun()
                        )),
                );
                return;
            }
        };

        let mut seen = HashSet::new();
        for (obs_idx, field) in observations.iter().enumerate() {
            let at = format!("{}.observations[{}]", location, obs_idx);
            let Field::Present(obs) = field else {
                diagnostics.push(
                    Diagnostic::error(
                        schema_id(),
                        format!("{}: Observation at index {} is not an object", who, obs_idx),
                    )
                    .with_location(at),
                );
                continue;
            };
            self.observation(&who, obs_idx, obs, &at, &mut seen, diagnostics);
        }
    }

    fn observation(
        &self,
        who: &str,
        obs_idx: usize,
        obs: &Observation,
        at: &str,
        seen: &mut HashSet<String>,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let fields = [
            (OBSERVATION_FIELDS[0], obs.id.presence()),
            (OBSERVATION_FIELDS[1], obs.category.presence()),
            (OBSERVATION_FIELDS[2], obs.description.presence()),
            ("severity", optional(obs.severity.presence())),
        ];
        for (name, presence) in fields {
            match presence {
                Presence::Present => {}
                Presence::Missing => diagnostics.push(
                    Diagnostic::error(
                        schema_id(),
                        format!("{}: Observation at index {} missing '{}'", who, obs_idx, name),
                    )
                    .with_location(at),
                ),
                Presence::WrongType(err) => diagnostics.push(
                    Diagnostic::error(
                        schema_id(),
                        format!("{}: Observation at index {} '{}' {}", who, obs_idx, name, err),
                    )
                    .with_location(at),
                ),
            }
        }

        if let Some(id) = obs.id.as_deref() {
            if !seen.insert(id.to_string()) {
                diagnostics.push(
                    Diagnostic::error(
                        schema_id(),
                        format!("{}: Duplicate observation ID: {}", who, id),
                    )
                    .with_location(at),
                );
            }
        }

        if let Some(category) = obs.category.as_deref() {
            if !self.spec.observation_categories.contains(&category) {
                diagnostics.push(
                    Diagnostic::warning(
                        schema_id(),
                        format!("{}: Unknown observation category: {}", who, category),
                    )
                    .with_location(at),
                );
            }
        }

        if let Some(severity) = obs.severity.as_deref() {
            if !OBSERVATION_SEVERITIES.contains(&severity) {
                diagnostics.push(
                    Diagnostic::warning(
                        schema_id(),
                        format!("{}: Unknown observation severity: {}", who, severity),
                    )
                    .with_location(at)
                    .with_expected(OBSERVATION_SEVERITIES.join(", ")),
                );
            }
        }

        if let Some(description) = obs.description.as_deref() {
            if self.is_short(description) {
                let name = obs.id.as_deref().map_or_else(|| obs_idx.to_string(), String::from);
                diagnostics.push(
                    Diagnostic::warning(
                        schema_id(),
                        format!(
                            "{}: Observation '{}' has short description (< {} chars)",
                            who, name, self.settings.min_description_length
                        ),
                    )
                    .with_location(at),
                );
            }
        }
    }

    fn relations(
        &self,
        idx: usize,
        entity: &Entity,
        location: &str,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let who = describe(self.spec, idx, entity);
        let relations = match &entity.relations {
            Field::Present(list) if !list.is_empty() => list,
            Field::Invalid { .. } => {
                diagnostics.push(
                    Diagnostic::error(
                        schema_id(),
                        format!(
                            "{}: 'relations' {}",
                            who,
                            entity.relations.type_error().unwrap_or_default()
                        ),
                    )
                    .with_location(format!("{}.relations", location)),
                );
                return;
            }
            _ => {
                diagnostics.push(
                    Diagnostic::warning(schema_id(), format!("{}: No relations", who))
                        .with_location(format!("{}.relations", location))
                        .with_recommendation(format!(
                            "Add relations to document {} dependencies",
                            self.spec.noun()
                        )),
                );
                return;
            }
        };

        let mut seen = HashSet::new();
        for (rel_idx, field) in relations.iter().enumerate() {
            let at = format!("{}.relations[{}]", location, rel_idx);
            let Field::Present(rel) = field else {
                diagnostics.push(
                    Diagnostic::error(
                        schema_id(),
                        format!("{}: Relation at index {} is not an object", who, rel_idx),
                    )
                    .with_location(at),
                );
                continue;
            };
            self.relation(&who, rel_idx, rel, &at, &mut seen, diagnostics);
        }
    }

    fn relation(
        &self,
        who: &str,
        rel_idx: usize,
        rel: &Relation,
        at: &str,
        seen: &mut HashSet<String>,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        const ALL: [RelationField; 6] = [
            RelationField::Id,
            RelationField::Source,
            RelationField::Target,
            RelationField::Type,
            RelationField::Description,
            RelationField::Coupling,
        ];
        for field in ALL {
            let presence = field.presence(rel);
            let presence = if self.spec.requires_relation_field(field) {
                presence
            } else {
                optional(presence)
            };
            match presence {
                Presence::Present => {}
                Presence::Missing => diagnostics.push(
                    Diagnostic::error(
                        schema_id(),
                        format!(
                            "{}: Relation at index {} missing '{}'",
                            who,
                            rel_idx,
                            field.name()
                        ),
                    )
                    .with_location(at),
                ),
                Presence::WrongType(err) => diagnostics.push(
                    Diagnostic::error(
                        schema_id(),
                        format!(
                            "{}: Relation at index {} '{}' {}",
                            who,
                            rel_idx,
                            field.name(),
                            err
                        ),
                    )
                    .with_location(at),
                ),
            }
        }

        if self.spec.requires_relation_field(RelationField::Id) {
            if let Some(id) = rel.id.as_deref() {
                if !seen.insert(id.to_string()) {
                    diagnostics.push(
                        Diagnostic::error(
                            schema_id(),
                            format!("{}: Duplicate relation ID: {}", who, id),
                        )
                        .with_location(at),
                    );
                }
            }
        }

        if let Some(kind) = rel.kind.as_deref() {
            if !self.spec.relation_types.contains(&kind) {
                diagnostics.push(
                    Diagnostic::warning(
                        schema_id(),
                        format!("{}: Unknown relation type: {}", who, kind),
                    )
                    .with_location(at),
                );
            }
        }

        if let Some(coupling) = rel.coupling.as_deref() {
            if !COUPLING_TYPES.contains(&coupling) {
                diagnostics.push(
                    Diagnostic::warning(
                        schema_id(),
                        format!("{}: Unknown coupling: {}", who, coupling),
                    )
                    .with_location(at)
                    .with_expected(COUPLING_TYPES.join(", ")),
                );
            }
        }

        if let Some(description) = rel.description.as_deref() {
            if self.is_short(description) {
                let name = rel.id.as_deref().map_or_else(|| rel_idx.to_string(), String::from);
                diagnostics.push(
                    Diagnostic::warning(
                        schema_id(),
                        format!(
                            "{}: Relation '{}' has short description (< {} chars)",
                            who, name, self.settings.min_description_length
                        ),
                    )
                    .with_location(at),
                );
            }
        }
    }

    fn is_short(&self, text: &str) -> bool {
        text.chars().count() < self.settings.min_description_length
    }
}

/// Treat absence as fine; keep type errors.
fn optional(presence: Presence) -> Presence {
    match presence {
        Presence::Missing => Presence::Present,
        other => other,
    }
}

fn nested_required(
    who: &str,
    path: &str,
    presence: Presence,
    at: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match presence {
        Presence::Present => {}
        Presence::Missing => diagnostics.push(
            Diagnostic::error(schema_id(), format!("{}: Missing '{}'", who, path))
                .with_location(at),
        ),
        Presence::WrongType(err) => diagnostics.push(
            Diagnostic::error(schema_id(), format!("{}: '{}' {}", who, path, err))
                .with_location(at),
        ),
    }
}
