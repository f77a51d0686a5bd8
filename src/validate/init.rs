//! Init manifest validation.
//!
//! The init document lists the repositories every later layer is derived
//! from. It has no parent, so instead of lineage it is checked against the
//! filesystem: repository paths must exist and manifests should be present.

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::{Map, Value};

use super::check::CheckId;
use super::diagnostic::Diagnostic;
use crate::model::{parse_timestamp, Document, Field, Manifest, Metadata, Presence, Repository};

/// Manifest types the repository scanner emits.
pub const MANIFEST_TYPES: &[&str] = &[
    "npm",
    "composer",
    "cargo",
    "go-mod",
    "gradle",
    "maven",
    "requirements-txt",
    "pyproject-toml",
    "gemfile",
    "unknown",
];

static SEMVER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+$").unwrap());

/// Largest tolerated gap between `timestamp` and `generated_at`, in seconds.
const GENERATED_AT_TOLERANCE_SECS: i64 = 3600;

fn init_id() -> CheckId {
    CheckId::new("init")
}

/// Validate an init document. `now` bounds how recent its timestamp may be.
pub fn check_init(document: &Document, now: DateTime<Utc>) -> Vec<Diagnostic> {
    let mut diagnostics = structure(document);
    if !diagnostics.is_empty() {
        return diagnostics;
    }

    let repositories = document.repositories.get().map(Vec::as_slice).unwrap_or_default();
    repository_paths(repositories, &mut diagnostics);
    manifests(repositories, &mut diagnostics);
    if let Some(metadata) = document.metadata.get() {
        timestamps(metadata, now, &mut diagnostics);
    }

    let total_manifests: usize = repositories
        .iter()
        .filter_map(Field::get)
        .filter_map(|repo| repo.manifests.get())
        .map(Vec::len)
        .sum();
    if total_manifests == 0 {
        diagnostics.push(
            Diagnostic::warning(init_id(), "No package manifests found")
                .with_recommendation("Ensure repositories contain package manifest files"),
        );
    }

    tracing::debug!(
        repositories = repositories.len(),
        manifests = total_manifests,
        findings = diagnostics.len(),
        "init checks complete"
    );
    diagnostics
}

/// Errors here make the rest of the checks meaningless.
fn structure(document: &Document) -> Vec<Diagnostic> {
    let mut errors = Vec::new();

    match &document.metadata {
        Field::Missing => {
            errors.push(
                Diagnostic::error(init_id(), "Missing required field: metadata")
                    .with_location("metadata"),
            );
            return errors;
        }
        Field::Invalid { .. } => {
            errors.push(
                Diagnostic::error(
                    init_id(),
                    format!(
                        "'metadata' {}",
                        document.metadata.type_error().unwrap_or_default()
                    ),
                )
                .with_location("metadata"),
            );
            return errors;
        }
        Field::Present(metadata) => {
            let fields = [
                ("schema_version", metadata.schema_version.presence()),
                ("generator", metadata.generator.presence()),
                ("generated_by", metadata.generated_by.presence()),
                ("timestamp", metadata.timestamp.presence()),
                ("melly_version", metadata.melly_version.presence()),
            ];
            for (name, presence) in fields {
                let message = match presence {
                    Presence::Present => continue,
                    Presence::Missing => format!("Missing required field: metadata.{}", name),
                    Presence::WrongType(err) => format!("'metadata.{}' {}", name, err),
                };
                errors.push(
                    Diagnostic::error(init_id(), message)
                        .with_location(format!("metadata.{}", name)),
                );
            }

            if let Some(version) = metadata.schema_version.as_deref() {
                if !SEMVER.is_match(version) {
                    errors.push(
                        Diagnostic::error(
                            init_id(),
                            format!("Invalid schema_version format: {}", version),
                        )
                        .with_location("metadata.schema_version")
                        .with_expected("semver MAJOR.MINOR.PATCH")
                        .with_actual(version),
                    );
                }
            }

            if let Some(raw) = metadata.timestamp.as_deref() {
                if parse_timestamp(raw).is_err() {
                    errors.push(
                        Diagnostic::error(init_id(), format!("Invalid timestamp format: {}", raw))
                            .with_location("metadata.timestamp")
                            .with_expected("ISO 8601 timestamp"),
                    );
                }
            }
        }
    }

    match &document.repositories {
        Field::Missing => errors.push(
            Diagnostic::error(init_id(), "Missing required field: repositories")
                .with_location("repositories"),
        ),
        Field::Invalid { .. } => errors.push(
            Diagnostic::error(init_id(), "Field 'repositories' must be an array")
                .with_location("repositories"),
        ),
        Field::Present(repos) if repos.is_empty() => errors.push(
            Diagnostic::error(init_id(), "No repositories found (repositories array is empty)")
                .with_location("repositories"),
        ),
        Field::Present(_) => {}
    }

    errors
}

fn repository_paths(repositories: &[Field<Repository>], diagnostics: &mut Vec<Diagnostic>) {
    let mut seen_paths = HashSet::new();
    let mut seen_names = HashSet::new();

    for (idx, field) in repositories.iter().enumerate() {
        let location = format!("repositories[{}]", idx);
        let Field::Present(repo) = field else {
            diagnostics.push(
                Diagnostic::error(
                    init_id(),
                    format!("Repository at index {} is not an object", idx),
                )
                .with_location(location),
            );
            continue;
        };

        if let Some(name) = repo.name.as_deref() {
            if !seen_names.insert(name) {
                diagnostics.push(
                    Diagnostic::warning(init_id(), format!("Duplicate repository name: {}", name))
                        .with_location(format!("{}.name", location)),
                );
            }
        }

        let path = match &repo.path {
            Field::Present(path) => path,
            Field::Missing => {
                diagnostics.push(
                    Diagnostic::error(
                        init_id(),
                        format!("Repository at index {}: Missing 'path' field", idx),
                    )
                    .with_location(location),
                );
                continue;
            }
            invalid => {
                diagnostics.push(
                    Diagnostic::error(
                        init_id(),
                        format!(
                            "Repository at index {}: 'path' {}",
                            idx,
                            invalid.type_error().unwrap_or_default()
                        ),
                    )
                    .with_location(location),
                );
                continue;
            }
        };
        let location = format!("{}.path", location);

        let fs_path = Path::new(path);
        if !fs_path.is_absolute() {
            diagnostics.push(
                Diagnostic::error(init_id(), format!("Repository path must be absolute: {}", path))
                    .with_location(location),
            );
            continue;
        }
        if !seen_paths.insert(path.as_str()) {
            diagnostics.push(
                Diagnostic::error(init_id(), format!("Duplicate repository path: {}", path))
                    .with_location(location.clone()),
            );
        }
        if !fs_path.exists() {
            diagnostics.push(
                Diagnostic::error(
                    init_id(),
                    format!("Repository path does not exist: {}", path),
                )
                .with_location(location),
            );
        } else if !fs_path.is_dir() {
            diagnostics.push(
                Diagnostic::error(
                    init_id(),
                    format!("Repository path is not a directory: {}", path),
                )
                .with_location(location),
            );
        }
    }
}

fn manifests(repositories: &[Field<Repository>], diagnostics: &mut Vec<Diagnostic>) {
    for (repo_idx, repo) in repositories.iter().enumerate() {
        let Some(repo) = repo.get() else { continue };
        let repo_name = repo.name.as_deref().unwrap_or("unknown");
        let location = format!("repositories[{}].manifests", repo_idx);

        let list = match &repo.manifests {
            Field::Missing => continue,
            Field::Invalid { .. } => {
                diagnostics.push(
                    Diagnostic::error(
                        init_id(),
                        format!("Repository '{}': manifests must be an array", repo_name),
                    )
                    .with_location(location),
                );
                continue;
            }
            Field::Present(list) => list,
        };

        for (idx, manifest) in list.iter().enumerate() {
            let at = format!("{}[{}]", location, idx);
            match manifest {
                Field::Present(manifest) => {
                    manifest_entry(repo.path.as_deref(), idx, manifest, &at, diagnostics)
                }
                _ => diagnostics.push(
                    Diagnostic::error(
                        init_id(),
                        format!(
                            "Manifest at index {} in '{}' is not an object",
                            idx, repo_name
                        ),
                    )
                    .with_location(at),
                ),
            }
        }
    }
}

fn manifest_entry(
    repo_path: Option<&str>,
    idx: usize,
    manifest: &Manifest,
    at: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let fields = [
        ("type", manifest.kind.presence()),
        ("path", manifest.path.presence()),
        ("data", manifest.data.presence()),
    ];
    for (name, presence) in fields {
        match presence {
            Presence::Present => {}
            Presence::Missing => diagnostics.push(
                Diagnostic::error(
                    init_id(),
                    format!("Manifest at index {}: Missing '{}' field", idx, name),
                )
                .with_location(at),
            ),
            Presence::WrongType(err) if name == "data" => diagnostics.push(
                Diagnostic::error(init_id(), "Manifest 'data' field must be an object")
                    .with_location(at)
                    .with_actual(err),
            ),
            Presence::WrongType(err) => diagnostics.push(
                Diagnostic::error(
                    init_id(),
                    format!("Manifest at index {}: '{}' {}", idx, name, err),
                )
                .with_location(at),
            ),
        }
    }

    let kind = manifest.kind.as_deref();
    if let Some(kind) = kind {
        if !MANIFEST_TYPES.contains(&kind) {
            diagnostics.push(
                Diagnostic::warning(init_id(), format!("Unknown manifest type: {}", kind))
                    .with_location(at),
            );
        }
    }

    if let Some(manifest_path) = manifest.path.as_deref() {
        if Path::new(manifest_path).is_absolute() {
            diagnostics.push(
                Diagnostic::error(
                    init_id(),
                    format!("Manifest path should be relative: {}", manifest_path),
                )
                .with_location(at),
            );
        } else if let Some(repo_path) = repo_path.filter(|p| !p.is_empty()) {
            let full = Path::new(repo_path).join(manifest_path);
            if !full.exists() {
                diagnostics.push(
                    Diagnostic::warning(
                        init_id(),
                        format!("Manifest file not found: {}", full.display()),
                    )
                    .with_location(at),
                );
            }
        }
    }

    if let (Some(kind), Some(data)) = (kind, manifest.data.get()) {
        if let Some(message) = manifest_data_warning(kind, data) {
            diagnostics.push(Diagnostic::warning(init_id(), message).with_location(at));
        }
    }
}

/// Per-ecosystem sanity checks on parsed manifest data.
fn manifest_data_warning(kind: &str, data: &Map<String, Value>) -> Option<&'static str> {
    match kind {
        "npm" if !data.contains_key("name") => Some("NPM manifest missing 'name' field in data"),
        "composer" if !data.contains_key("name") => {
            Some("Composer manifest missing 'name' field in data")
        }
        "cargo" => {
            let package = data.get("package")?;
            let has_name = package.as_object().is_some_and(|p| p.contains_key("name"));
            (!has_name).then_some("Cargo manifest missing 'package.name' field in data")
        }
        _ => None,
    }
}

fn timestamps(metadata: &Metadata, now: DateTime<Utc>, diagnostics: &mut Vec<Diagnostic>) {
    let Some(raw) = metadata.timestamp.as_deref() else {
        return;
    };
    let Ok(timestamp) = parse_timestamp(raw) else {
        return;
    };

    if timestamp > now {
        diagnostics.push(
            Diagnostic::warning(init_id(), format!("Timestamp is in the future: {}", raw))
                .with_location("metadata.timestamp"),
        );
    }

    match &metadata.generated_at {
        Field::Missing => {}
        Field::Present(generated_raw) => match parse_timestamp(generated_raw) {
            Ok(generated_at) => {
                let diff = (timestamp - generated_at).num_seconds().abs();
                if diff > GENERATED_AT_TOLERANCE_SECS {
                    diagnostics.push(
                        Diagnostic::warning(
                            init_id(),
                            "Timestamp and generated_at differ by more than 1 hour",
                        )
                        .with_location("metadata.generated_at"),
                    );
                }
            }
            Err(_) => diagnostics.push(
                Diagnostic::warning(
                    init_id(),
                    format!("Invalid generated_at format: {}", generated_raw),
                )
                .with_location("metadata.generated_at"),
            ),
        },
        Field::Invalid { found } => diagnostics.push(
            Diagnostic::warning(init_id(), format!("Invalid generated_at format: {}", found))
                .with_location("metadata.generated_at"),
        ),
    }
}
