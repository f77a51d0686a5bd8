//! Referential integrity.
//!
//! Parent-layer foreign keys must resolve (errors). Same-layer relation
//! endpoints should resolve (warnings) unless they point outside the
//! document set.

use std::collections::{BTreeSet, HashSet};

use super::check::{Check, CheckContext, CheckId};
use super::diagnostic::Diagnostic;
use super::schema::describe;
use crate::config::Settings;
use crate::model::{Document, Entity, Field, LayerSpec, ParentLink};

fn references_id() -> CheckId {
    CheckId::new("references")
}

/// Whether a relation endpoint refers to something outside the document set.
pub fn is_external(endpoint: &str) -> bool {
    endpoint.starts_with("http://") || endpoint.starts_with("https://") || endpoint.contains('#')
}

/// IDs a layer may reference in its parent document.
#[derive(Debug, Clone, Default)]
pub struct ParentIndex {
    ids: BTreeSet<String>,
    ordered: Vec<String>,
}

impl ParentIndex {
    /// Build the index a layer resolves against.
    ///
    /// Systems resolve repositories by either name or path; containers and
    /// components resolve against the parent layer's entity IDs.
    pub fn from_document(spec: &LayerSpec, parent: &Document) -> Self {
        let mut index = Self::default();
        match spec.parent_link {
            ParentLink::Repositories => {
                for repo in parent.repositories.get().into_iter().flatten() {
                    let Some(repo) = repo.get() else { continue };
                    if let Some(name) = repo.name.as_deref() {
                        index.insert(name);
                    }
                    if let Some(path) = repo.path.as_deref() {
                        index.insert(path);
                    }
                }
            }
            ParentLink::SystemId | ParentLink::ContainerId => {
                let Some(parent_layer) = spec.layer.parent() else {
                    return index;
                };
                for entity in parent.entities(parent_layer).get().into_iter().flatten() {
                    if let Some(id) = entity.get().and_then(Entity::id) {
                        index.insert(id);
                    }
                }
            }
        }
        index
    }

    fn insert(&mut self, id: &str) {
        if self.ids.insert(id.to_string()) {
            self.ordered.push(id.to_string());
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// IDs in parent document order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ordered.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for ParentIndex {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut index = Self::default();
        for id in iter {
            index.insert(id.as_ref());
        }
        index
    }
}

fn parent_label(link: ParentLink) -> &'static str {
    match link {
        ParentLink::Repositories => "Repository",
        ParentLink::SystemId => "System",
        ParentLink::ContainerId => "Container",
    }
}

/// Run every referential check over one layer's entities.
pub fn check_references(
    entities: &[Field<Entity>],
    parent: &ParentIndex,
    spec: &LayerSpec,
    settings: &Settings,
) -> Vec<Diagnostic> {
    let objects: Vec<(usize, &Entity)> = entities
        .iter()
        .enumerate()
        .filter_map(|(idx, e)| e.get().map(|entity| (idx, entity)))
        .collect();

    let mut diagnostics = Vec::new();
    parent_links(&objects, parent, spec, &mut diagnostics);
    relation_endpoints(&objects, spec, &mut diagnostics);
    if spec.require_children {
        child_coverage(&objects, parent, spec, &mut diagnostics);
    }
    if spec.coupling_analysis {
        coupling_ratio(&objects, settings.tight_coupling_ratio, &mut diagnostics);
    }

    tracing::debug!(
        layer = %spec.layer,
        parent_ids = parent.ids.len(),
        findings = diagnostics.len(),
        "reference stage complete"
    );
    diagnostics
}

fn parent_links(
    objects: &[(usize, &Entity)],
    parent: &ParentIndex,
    spec: &LayerSpec,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let link = spec.parent_link;
    let available = if parent.is_empty() {
        format!("no {} entries in the parent document", link.field_name())
    } else {
        format!("one of: {}", parent.iter().collect::<Vec<_>>().join(", "))
    };

    for &(idx, entity) in objects {
        for id in link.referenced_ids(entity) {
            if parent.contains(id) {
                continue;
            }
            diagnostics.push(
                Diagnostic::error(
                    references_id(),
                    format!(
                        "{}: {} not found: {}",
                        describe(spec, idx, entity),
                        parent_label(link),
                        id
                    ),
                )
                .with_location(format!("{}[{}].{}", spec.collection, idx, link.field_name()))
                .with_expected(available.clone())
                .with_actual(id),
            );
        }
    }
}

fn relation_endpoints(
    objects: &[(usize, &Entity)],
    spec: &LayerSpec,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let known: HashSet<&str> = objects.iter().filter_map(|(_, e)| e.id()).collect();

    for &(idx, entity) in objects {
        let Some(owner) = entity.id() else { continue };
        let Some(relations) = entity.relations.get() else {
            continue;
        };
        for (rel_idx, rel) in relations.iter().enumerate() {
            let Some(rel) = rel.get() else { continue };
            let location = format!("{}[{}].relations[{}]", spec.collection, idx, rel_idx);

            let endpoints = [("source", rel.source.as_deref()), ("target", rel.target.as_deref())];
            for (role, endpoint) in endpoints {
                let Some(endpoint) = endpoint else { continue };
                if is_external(endpoint) || known.contains(endpoint) {
                    continue;
                }
                diagnostics.push(
                    Diagnostic::warning(
                        references_id(),
                        format!("Relation {} not found: {}", role, endpoint),
                    )
                    .with_location(location.clone())
                    .with_recommendation(format!(
                        "Use a {} ID from this document or an external URL",
                        spec.noun()
                    )),
                );
            }

            if let Some(target) = rel.target.as_deref() {
                if rel.origin(owner) == target {
                    diagnostics.push(
                        Diagnostic::warning(
                            references_id(),
                            format!("Self-referencing relation: {}", target),
                        )
                        .with_location(location),
                    );
                }
            }
        }
    }
}

fn child_coverage(
    objects: &[(usize, &Entity)],
    parent: &ParentIndex,
    spec: &LayerSpec,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let referenced: HashSet<&str> = objects
        .iter()
        .flat_map(|(_, e)| spec.parent_link.referenced_ids(e))
        .collect();

    for parent_id in parent.iter() {
        if referenced.contains(parent_id) {
            continue;
        }
        diagnostics.push(
            Diagnostic::warning(
                references_id(),
                format!(
                    "{} '{}' has no {}",
                    parent_label(spec.parent_link),
                    parent_id,
                    spec.collection
                ),
            )
            .with_recommendation(format!(
                "Add {} for '{}' or remove it from the parent document",
                spec.collection, parent_id
            )),
        );
    }
}

fn coupling_ratio(
    objects: &[(usize, &Entity)],
    threshold: f64,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let mut total = 0usize;
    let mut tight = 0usize;
    for (_, entity) in objects {
        for rel in entity.relations() {
            if let Some(coupling) = rel.coupling.as_deref() {
                total += 1;
                if coupling == "tight" {
                    tight += 1;
                }
            }
        }
    }
    if total == 0 {
        return;
    }

    let ratio = tight as f64 / total as f64;
    if ratio > threshold {
        diagnostics.push(
            Diagnostic::warning(
                references_id(),
                format!(
                    "High tight coupling: {} of {} relations ({:.0}%) are tight",
                    tight,
                    total,
                    ratio * 100.0
                ),
            )
            .with_expected(format!("at most {:.0}% tight", threshold * 100.0))
            .with_recommendation("Consider introducing interfaces to loosen dependencies"),
        );
    }
}

/// Reference stage, as run by the validator pipeline.
pub struct ReferenceCheck;

impl Check for ReferenceCheck {
    fn id(&self) -> CheckId {
        references_id()
    }

    fn name(&self) -> &str {
        "Referential integrity"
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Diagnostic> {
        check_references(ctx.entities, ctx.parent, ctx.spec, ctx.settings)
    }
}
