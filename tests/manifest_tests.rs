//! Loading manifests from disk and dispatching through what they describe.

mod common;

use std::sync::Arc;

use common::*;
use proxy_intercept::{
    BehaviorRegistry, BehaviorResolver, DeclaresMarkers, Dispatcher, Manifest, ManifestError,
    MarkerExtractor, Tag, TagSet,
};
use tempfile::TempDir;

fn load_scenario() -> (TempDir, Manifest) {
    let dir = TempDir::new().unwrap();
    let path = write_manifest(dir.path(), SCENARIO_MANIFEST);
    let manifest = assert_ok(Manifest::from_path(&path), "load scenario manifest");
    (dir, manifest)
}

#[test]
fn test_manifest_drives_dispatch() {
    let (_dir, manifest) = load_scenario();
    assert_ok(manifest.validate(), "validate scenario");

    let recorder = Recorder::default();
    let built = manifest.build_registry(|spec| passthrough(&spec.name, &recorder));
    let registry = assert_ok(built, "build registry");
    let dispatcher: Dispatcher<AccountService, Account, u64, String> =
        Dispatcher::new(Arc::new(manifest.build_catalog()), Arc::new(registry));

    let service = account_service(100);
    let account = Account {
        owner: "bob".to_string(),
        amount: 40,
    };
    let transfer = service.transfer_method();
    let result = dispatcher.invoke(&service, transfer, account, |svc, _, a| svc.transfer(a));

    assert_eq!(result, Ok(60));
    assert_eq!(recorder.entries(), vec!["AuditBehavior", "RoleBehavior"]);
}

#[test]
fn test_declared_types_extract_like_hand_built_ones() {
    let (_dir, manifest) = load_scenario();
    let found = manifest.find_method("AccountService", "transfer");
    let (ty, method) = assert_ok(found, "find transfer");

    let catalog = Arc::new(manifest.build_catalog());
    let from_manifest = MarkerExtractor::new(catalog).extract(ty, method);
    let service = account_service(0);
    let extractor = MarkerExtractor::new(Arc::new(scenario_catalog()));
    let by_hand = extractor.extract(service.type_metadata(), service.transfer_method());
    assert_eq!(from_manifest, by_hand);
}

#[test]
fn test_behavior_bound_to_several_selectors_needs_all() {
    let json = r#"{
        "selectors": ["Audited", "CheckRole"],
        "behaviors": [
            { "name": "AuditedAdmin", "bindings": ["Audited", "CheckRole(role=admin)"] },
            { "name": "AnyAudit", "bindings": ["Audited"], "priority": 5 }
        ]
    }"#;
    let manifest: Manifest = json.parse().unwrap();
    let recorder = Recorder::default();
    let registry: BehaviorRegistry<AccountService, Account, u64, String> = manifest
        .build_registry(|spec| passthrough(&spec.name, &recorder))
        .unwrap();

    let audited_only: TagSet = [Tag::new("Audited")].into_iter().collect();
    let admin: TagSet = ["Audited", "CheckRole(role=admin)"]
        .iter()
        .map(|s| s.parse::<Tag>().unwrap())
        .collect();

    let names = |tags: &TagSet| -> Vec<String> {
        registry
            .resolve(tags)
            .iter()
            .map(|b| b.name().to_string())
            .collect()
    };
    assert_eq!(names(&audited_only), vec!["AnyAudit"]);
    assert_eq!(names(&admin), vec!["AuditedAdmin", "AnyAudit"]);
}

#[test]
fn test_missing_file_reports_path() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.json");

    let err = assert_err(Manifest::from_path(&missing), "load missing manifest");
    assert!(matches!(
        err,
        ManifestError::Io { ref path, .. } if *path == missing
    ));
    assert_error_contains(&err, "absent.json", "io error message");
}

#[test]
fn test_invalid_tag_is_a_parse_error() {
    let dir = TempDir::new().unwrap();
    let json = r#"{"selectors": ["A"], "behaviors": [{"name": "x", "bindings": ["A(role"]}]}"#;
    let path = write_manifest(dir.path(), json);

    let err = assert_err(Manifest::from_path(&path), "load malformed manifest");
    assert!(matches!(err, ManifestError::Parse(_)));
}

#[test]
fn test_unknown_selector_names_behavior() {
    let json = r#"{"selectors": ["A"], "behaviors": [{"name": "Timer", "bindings": ["Timed"]}]}"#;
    let manifest: Manifest = json.parse().unwrap();
    let err = assert_err(manifest.validate(), "validate");
    assert_error_contains(&err, "Timer", "unknown selector message");
    assert_error_contains(&err, "Timed", "unknown selector message");
}
