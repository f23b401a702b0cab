mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use common::{write_manifest, SCENARIO_MANIFEST};

fn cli() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("proxy-intercept").unwrap();
    cmd.env_remove("PROXY_INTERCEPT_GROUP_DEPTH")
        .env_remove("PROXY_INTERCEPT_DISABLED_KINDS")
        .env_remove("RUST_LOG");
    cmd
}

fn json_output(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).unwrap()
}

#[test]
fn test_extract_lists_selector_tags() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(dir.path(), SCENARIO_MANIFEST);

    cli()
        .arg("extract")
        .arg(&manifest)
        .args(["AccountService", "transfer"])
        .assert()
        .success()
        .stdout(predicate::eq("Audited\nCheckRole\n"));
}

#[test]
fn test_extract_json_and_overrides() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(dir.path(), SCENARIO_MANIFEST);

    let json = json_output(
        cli()
            .args(["--json", "--disable", "Audited", "extract"])
            .arg(&manifest)
            .args(["AccountService", "transfer"]),
    );
    assert_eq!(json["type"], "AccountService");
    assert_eq!(json["tags"], serde_json::json!([{ "kind": "CheckRole" }]));

    let json = json_output(
        cli()
            .args(["--json", "--group-depth", "0", "extract"])
            .arg(&manifest)
            .args(["AccountService", "transfer"]),
    );
    assert_eq!(json["tags"], serde_json::json!([{ "kind": "Audited" }]));
}

#[test]
fn test_extract_unmarked_method() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(dir.path(), SCENARIO_MANIFEST);

    cli()
        .arg("extract")
        .arg(&manifest)
        .args(["Clock", "now"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no interceptor bindings"));
}

#[test]
fn test_explain_reports_chain_and_original_value() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(dir.path(), SCENARIO_MANIFEST);

    let json = json_output(
        cli()
            .args(["--json", "explain"])
            .arg(&manifest)
            .args(["AccountService", "transfer", "--returns", "42"]),
    );
    let chain = serde_json::json!(["AuditBehavior", "RoleBehavior"]);
    assert_eq!(json["chain"], chain);
    assert_eq!(json["executed"], json["chain"]);
    assert_eq!(json["tags"], serde_json::json!(["Audited", "CheckRole"]));
    assert_eq!(json["original_invoked"], true);
    assert_eq!(json["outcome"], serde_json::json!({ "returned": 42 }));
}

#[test]
fn test_explain_stop_at_and_failure() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(dir.path(), SCENARIO_MANIFEST);

    let json = json_output(
        cli()
            .args(["--json", "explain"])
            .arg(&manifest)
            .args(["AccountService", "transfer", "--stop-at", "AuditBehavior"]),
    );
    assert_eq!(json["executed"], serde_json::json!(["AuditBehavior"]));
    assert_eq!(json["original_invoked"], false);

    cli()
        .arg("explain")
        .arg(&manifest)
        .args(["AccountService", "transfer"])
        .args(["--fail", "insufficient funds"])
        .assert()
        .success()
        .stdout(predicate::str::contains("failed:   insufficient funds"))
        .stdout(predicate::str::contains("AuditBehavior -> RoleBehavior"));
}

#[test]
fn test_explain_unknown_method_fails() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(dir.path(), SCENARIO_MANIFEST);

    cli()
        .arg("explain")
        .arg(&manifest)
        .args(["AccountService", "close"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no method 'close'"));
}

#[test]
fn test_check_valid_manifest() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(dir.path(), SCENARIO_MANIFEST);

    cli()
        .arg("check")
        .arg(&manifest)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "manifest OK: 2 selectors, 1 groups, 2 behaviors, 2 types",
        ));
}

#[test]
fn test_check_rejects_unknown_selector() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(
        dir.path(),
        r#"{"selectors": ["Audited"], "behaviors": [{"name": "Timer", "bindings": ["Timed"]}]}"#,
    );

    cli()
        .arg("check")
        .arg(&manifest)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Timer"))
        .stderr(predicate::str::contains("Timed"));
}

#[test]
fn test_missing_manifest_fails_with_path() {
    cli()
        .args(["check", "/nonexistent/manifest.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("/nonexistent/manifest.json"));
}
