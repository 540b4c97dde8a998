//! Integration tests for the svelte-twig binary.
//!
//! Each test lays out a small AST directory in a temp dir, runs the binary
//! against it and checks the written files, the reported diagnostics and the
//! exit status.

use pretty_assertions::assert_eq;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const CARD: &str = include_str!("../../twig-transformer/tests/fixtures/Card.svelte.json");

// ============================================================================
// SHARED TEST INFRASTRUCTURE
// ============================================================================

/// A diagnostic from the JSON output
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct JsonDiagnostic {
    #[serde(rename = "type")]
    diagnostic_type: String,
    filename: String,
    start: JsonPosition,
    message: String,
    code: String,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct JsonPosition {
    line: u32,
    column: u32,
    offset: u32,
}

/// Creates an input directory holding `cards/Card.svelte.json`.
fn card_project() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "cards/Card.svelte.json", CARD);
    dir
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_svelte-twig"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("failed to run svelte-twig")
}

fn json_diagnostics(output: &Output) -> Vec<JsonDiagnostic> {
    serde_json::from_slice(&output.stdout).expect("stdout is not a JSON diagnostic list")
}

fn yaml(text: &str) -> serde_yaml::Value {
    serde_yaml::from_str(text).unwrap()
}

// ============================================================================
// OUTPUT FILES
// ============================================================================

#[test]
fn test_writes_template_and_metadata() {
    let dir = card_project();
    let output = run(dir.path(), &[".", "--namespace", "mytheme"]);
    assert!(output.status.success(), "{output:?}");

    let component_dir = dir.path().join("components/cards/card");
    let twig = fs::read_to_string(component_dir.join("card.twig")).unwrap();
    assert!(twig.starts_with("{% set label = title|default('Untitled') %}\n"));
    assert!(twig.contains(
        "{% include 'mytheme:button' with rest|merge({ label: label, primary: true }) only %}"
    ));

    let metadata = yaml(&fs::read_to_string(component_dir.join("card.component.yml")).unwrap());
    assert_eq!(metadata["name"], yaml("Card"));
    assert_eq!(metadata["props"]["properties"]["count"], yaml("{ type: number, default: 0 }"));
    assert_eq!(metadata["slots"], yaml("{ header: {}, content: {} }"));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("translated 1 of 1 file with 0 errors and 1 warning"));
}

#[test]
fn test_no_metadata_flag() {
    let dir = card_project();
    let output = run(dir.path(), &["--namespace", "mytheme", "--no-metadata", "--out", "dist"]);
    assert!(output.status.success(), "{output:?}");

    let component_dir = dir.path().join("dist/cards/card");
    assert!(component_dir.join("card.twig").is_file());
    assert!(!component_dir.join("card.component.yml").exists());
}

#[test]
fn test_dry_run_writes_nothing() {
    let dir = card_project();
    let output = run(dir.path(), &["--namespace", "mytheme", "--dry-run"]);
    assert!(output.status.success(), "{output:?}");
    assert!(!dir.path().join("components").exists());
}

#[test]
fn test_override_sidecar_is_merged() {
    let dir = card_project();
    write(dir.path(), "cards/Card.override.yml", "status: stable\nslots:\n  footer: {}\n");

    let output = run(dir.path(), &["--namespace", "mytheme"]);
    assert!(output.status.success(), "{output:?}");

    let path = dir.path().join("components/cards/card/card.component.yml");
    let metadata = yaml(&fs::read_to_string(path).unwrap());
    assert_eq!(metadata["status"], yaml("stable"));
    assert_eq!(metadata["slots"], yaml("{ header: {}, content: {}, footer: {} }"));
}

// ============================================================================
// CONFIGURATION
// ============================================================================

#[test]
fn test_config_file_namespace() {
    let dir = card_project();
    write(dir.path(), "svelte-twig.json", r#"{ "namespace": "fromfile", "defaultSlot": "body" }"#);

    let output = run(dir.path(), &[]);
    assert!(output.status.success(), "{output:?}");

    let twig = fs::read_to_string(dir.path().join("components/cards/card/card.twig")).unwrap();
    assert!(twig.contains("'fromfile:button'"));
    assert!(twig.contains("{% block body %}{% endblock %}"));
}

#[test]
fn test_missing_namespace_fails() {
    let dir = card_project();
    let output = run(dir.path(), &[]);
    assert!(!output.status.success());
    assert!(!dir.path().join("components").exists());
}

#[test]
fn test_invalid_config_file_fails() {
    let dir = card_project();
    write(dir.path(), "svelte-twig.json", r#"{ "namespcae": "typo" }"#);

    let output = run(dir.path(), &["--namespace", "mytheme"]);
    assert!(!output.status.success());
}

// ============================================================================
// DIAGNOSTICS AND EXIT STATUS
// ============================================================================

#[test]
fn test_json_output() {
    let dir = card_project();
    let output = run(dir.path(), &["--namespace", "mytheme", "--output", "json"]);
    assert!(output.status.success(), "{output:?}");

    let diagnostics = json_diagnostics(&output);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].diagnostic_type, "Warning");
    assert_eq!(diagnostics[0].code, "slot-name-fallback");
    assert_eq!(diagnostics[0].filename, "cards/Card.svelte.json");
    // No `.svelte` source next to the AST, so no line information.
    assert_eq!(diagnostics[0].start.line, 0);
}

#[test]
fn test_threshold_error_hides_warnings() {
    let dir = card_project();
    let output = run(
        dir.path(),
        &["--namespace", "mytheme", "--output", "json", "--threshold", "error"],
    );
    assert!(output.status.success(), "{output:?}");
    assert!(json_diagnostics(&output).is_empty());
}

#[test]
fn test_fail_on_warnings() {
    let dir = card_project();
    let output = run(dir.path(), &["--namespace", "mytheme", "--fail-on-warnings"]);
    assert_eq!(output.status.code(), Some(1));
    // Outputs are still written.
    assert!(dir.path().join("components/cards/card/card.twig").is_file());
}

#[test]
fn test_unreadable_ast_is_reported_per_file() {
    let dir = card_project();
    write(dir.path(), "broken/Bad.svelte.json", "{ not json");

    let output = run(dir.path(), &["--namespace", "mytheme", "--output", "json"]);
    assert_eq!(output.status.code(), Some(1));

    let diagnostics = json_diagnostics(&output);
    let load_errors: Vec<&JsonDiagnostic> = diagnostics
        .iter()
        .filter(|d| d.code == "load-error")
        .collect();
    assert_eq!(load_errors.len(), 1);
    assert_eq!(load_errors[0].filename, "broken/Bad.svelte.json");
    assert_eq!(load_errors[0].diagnostic_type, "Error");

    // The healthy component is unaffected.
    assert!(dir.path().join("components/cards/card/card.twig").is_file());
    assert!(!dir.path().join("components/broken").exists());
}

#[test]
fn test_write_failure_fails_the_run() {
    let dir = card_project();
    write(dir.path(), "out", "not a directory");

    let output = run(
        dir.path(),
        &["--namespace", "mytheme", "--out", "out", "--output", "json"],
    );
    assert_eq!(output.status.code(), Some(1));

    let diagnostics = json_diagnostics(&output);
    let write_errors: Vec<&JsonDiagnostic> = diagnostics
        .iter()
        .filter(|d| d.code == "write-error")
        .collect();
    assert_eq!(write_errors.len(), 1);
    assert_eq!(write_errors[0].diagnostic_type, "Error");
    assert_eq!(write_errors[0].filename, "cards/Card.svelte.json");
}

#[test]
fn test_ignore_patterns() {
    let dir = card_project();
    write(dir.path(), "drafts/Draft.svelte.json", CARD);

    let output = run(dir.path(), &["--namespace", "mytheme", "--ignore", "drafts/**"]);
    assert!(output.status.success(), "{output:?}");
    assert!(dir.path().join("components/cards/card/card.twig").is_file());
    assert!(!dir.path().join("components/drafts").exists());
}
