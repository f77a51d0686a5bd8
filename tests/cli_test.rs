//! Integration tests for the archlint binary.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const INIT_TS: &str = "2024-01-01T00:00:00Z";

/// A project with a knowledge base holding an init manifest for `/repo-a`.
fn setup_project() -> TempDir {
    let temp = TempDir::new().unwrap();
    let kb = temp.path().join("knowledge-base");
    fs::create_dir_all(&kb).unwrap();
    let repo = temp.path().join("repo-a");
    fs::create_dir_all(&repo).unwrap();
    fs::write(repo.join("package.json"), r#"{"name": "repo-a"}"#).unwrap();
    fs::write(kb.join("init.json"), init_document(&repo).to_string()).unwrap();
    temp
}

fn init_document(repo: &Path) -> Value {
    json!({
        "metadata": {
            "schema_version": "1.0.0",
            "generator": "melly-init",
            "generated_by": "scanner",
            "timestamp": INIT_TS,
            "melly_version": "0.4.0"
        },
        "repositories": [{
            "path": repo,
            "name": "repo-a",
            "manifests": [{"type": "npm", "path": "package.json", "data": {"name": "repo-a"}}]
        }]
    })
}

fn system(id: &str, relations: Value) -> Value {
    json!({
        "id": id,
        "name": id,
        "type": "web-application",
        "repositories": ["repo-a"],
        "description": "A system under test",
        "observations": [
            {"id": "obs-1", "category": "architectural", "description": "Single deployable unit"}
        ],
        "relations": relations
    })
}

fn relation(id: &str, source: &str, target: &str) -> Value {
    json!({
        "id": id,
        "source": source,
        "target": target,
        "type": "http-rest",
        "description": "Calls over HTTP"
    })
}

fn archlint(project: &Path) -> Command {
    let mut cmd = Command::new(cargo_bin("archlint"));
    cmd.env_remove("ARCHLINT_KNOWLEDGE_ROOT");
    cmd.env_remove("RUST_LOG");
    cmd.arg("--project").arg(project);
    cmd
}

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("archlint"));
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("architecture documents"));
    Ok(())
}

#[test]
fn cli_shows_version() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("archlint"));
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn validate_init_passes() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project();
    archlint(temp.path())
        .args(["validate", "init"])
        .assert()
        .code(0)
        .stderr(predicate::str::contains("[VALIDATE-INIT] PASSED"));
    Ok(())
}

#[test]
fn validate_init_without_manifest_skips() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    archlint(temp.path())
        .args(["validate", "init"])
        .assert()
        .code(0)
        .stderr(predicate::str::contains(
            "[VALIDATE-INIT] No init.json file found - skipping validation",
        ));
    Ok(())
}

#[test]
fn scenario_a_lineage_and_references_pass() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project();
    let doc = json!({
        "metadata": {"timestamp": "2024-01-01T00:00:01Z"},
        "systems": [system("web-app", json!([relation("r1", "web-app", "https://cdn.example.com")]))]
    });
    archlint(temp.path())
        .args(["validate", "c1"])
        .write_stdin(doc.to_string())
        .assert()
        .code(0)
        .stderr(predicate::str::diff("[VALIDATE-C1] PASSED\n"));
    Ok(())
}

#[test]
fn scenario_b_equal_timestamp_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project();
    let doc = json!({
        "metadata": {"timestamp": INIT_TS},
        "systems": [system("web-app", json!([]))]
    });
    archlint(temp.path())
        .args(["validate", "c1"])
        .write_stdin(doc.to_string())
        .assert()
        .code(2)
        .stderr(predicate::str::contains(
            "[VALIDATE-C1] ERROR: Timestamp must be newer than parent timestamp",
        ))
        .stderr(predicate::str::contains("[VALIDATE-C1] FAILED"));
    Ok(())
}

#[test]
fn scenario_c_cycle_warns() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project();
    let doc = json!({
        "metadata": {"timestamp": "2024-01-02T00:00:00Z"},
        "systems": [
            system("a", json!([relation("r1", "a", "b")])),
            system("b", json!([relation("r2", "b", "c")])),
            system("c", json!([relation("r3", "c", "a")]))
        ]
    });
    archlint(temp.path())
        .args(["validate", "c1"])
        .write_stdin(doc.to_string())
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "[VALIDATE-C1] WARNING: Circular dependency detected: a -> b -> c -> a",
        ))
        .stderr(predicate::str::contains("[VALIDATE-C1] PASSED with warnings"));
    Ok(())
}

#[test]
fn scenario_d_ghost_container_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project();
    let kb = temp.path().join("knowledge-base");
    fs::write(
        kb.join("c2-containers.json"),
        json!({
            "metadata": {"timestamp": "2024-01-03T00:00:00Z"},
            "containers": [{"id": "api"}]
        })
        .to_string(),
    )?;
    let c3 = temp.path().join("c3.json");
    fs::write(
        &c3,
        json!({
            "metadata": {"timestamp": "2024-01-04T00:00:00Z"},
            "components": [{
                "id": "auth",
                "name": "Auth",
                "type": "service",
                "container_id": "ghost",
                "responsibility": "Authenticates users",
                "structure": {"path": "src/auth", "language": "rust", "files": ["mod.rs"]}
            }]
        })
        .to_string(),
    )?;

    archlint(temp.path())
        .args(["validate", "c3", "--input"])
        .arg(&c3)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("ERROR: Component 'auth': Container not found: ghost"))
        .stderr(predicate::str::contains("  Expected: one of: api"));
    Ok(())
}

#[test]
fn invalid_json_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project();
    archlint(temp.path())
        .args(["validate", "c1", "--input", "-"])
        .write_stdin("{ not json")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("[VALIDATE-C1] ERROR: Invalid JSON"));
    Ok(())
}

#[test]
fn missing_parent_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project();
    let doc = json!({"metadata": {"timestamp": "2024-01-05T00:00:00Z"}, "containers": []});
    archlint(temp.path())
        .args(["validate", "c2"])
        .write_stdin(doc.to_string())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Parent file not found"))
        .stderr(predicate::str::contains("Recommendation: Run the c1 generation step first"));
    Ok(())
}

#[test]
fn json_format_goes_to_stdout() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project();
    let doc = json!({
        "metadata": {"timestamp": "2024-01-02T00:00:00Z"},
        "systems": [system("web-app", json!([]))]
    });
    let output = archlint(temp.path())
        .args(["validate", "c1", "--format", "json"])
        .write_stdin(doc.to_string())
        .assert()
        .code(1)
        .get_output()
        .stdout
        .clone();

    let report: Value = serde_json::from_slice(&output)?;
    assert_eq!(report["layer"], "c1");
    assert_eq!(report["outcome"], "passed_with_warnings");
    assert_eq!(report["summary"]["warnings"], 1);
    assert_eq!(report["diagnostics"][0]["message"], "System 'web-app': No relations");
    Ok(())
}

#[test]
fn knowledge_root_from_env() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let repo = temp.path().join("repo-a");
    fs::create_dir_all(&repo)?;
    fs::write(repo.join("package.json"), "{}")?;
    let docs = temp.path().join("docs");
    fs::create_dir_all(&docs)?;
    fs::write(docs.join("init.json"), init_document(&repo).to_string())?;

    archlint(temp.path())
        .env("ARCHLINT_KNOWLEDGE_ROOT", "docs")
        .args(["validate", "init"])
        .assert()
        .code(0)
        .stderr(predicate::str::contains("[VALIDATE-INIT] PASSED"));
    Ok(())
}

#[test]
fn chain_validates_layers_in_order() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project();
    let kb = temp.path().join("knowledge-base");
    fs::write(
        kb.join("c1-systems.json"),
        json!({
            "metadata": {"timestamp": "2024-01-02T00:00:00Z"},
            "systems": [system("web-app", json!([]))]
        })
        .to_string(),
    )?;

    archlint(temp.path())
        .arg("chain")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("[VALIDATE-INIT] PASSED"))
        .stderr(predicate::str::contains("[VALIDATE-C1] PASSED with warnings"))
        .stderr(predicate::str::contains(
            "[VALIDATE-C2] No c2-containers.json file found - chain ends here",
        ));
    Ok(())
}

#[test]
fn chain_json_reports_every_layer() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project();
    let output = archlint(temp.path())
        .args(["chain", "--format", "json"])
        .assert()
        .code(0)
        .get_output()
        .stdout
        .clone();

    let chain: Value = serde_json::from_slice(&output)?;
    assert_eq!(chain["exit_code"], 0);
    let layers = chain["layers"].as_array().unwrap();
    assert_eq!(layers.len(), 2);
    assert_eq!(layers[0]["layer"], "init");
    assert_eq!(layers[1]["skipped"], "No c1-systems.json file found - chain ends here");
    Ok(())
}

#[test]
fn broken_settings_file_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project();
    fs::write(temp.path().join(".archlint.yml"), "format: [")?;
    archlint(temp.path())
        .args(["validate", "init"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Error: Failed to parse settings"));
    Ok(())
}

#[test]
fn unknown_layer_is_usage_error() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("archlint"));
    cmd.args(["validate", "c4"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'c4'"));
    Ok(())
}
