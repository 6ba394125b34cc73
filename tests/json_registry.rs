use camino::Utf8PathBuf;
use serde_json::json;
use std::fs;
use tempfile::tempdir;
use zmm_lib::core::json_registry::JsonRegistry;

fn registry() -> (tempfile::TempDir, JsonRegistry) {
    let tmp = tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).unwrap();
    (tmp, JsonRegistry::new(&root.join("Json").join("JsonFiles.json")))
}

fn read(reg: &JsonRegistry) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(&reg.path).unwrap()).unwrap()
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_add_creates_missing_registry() {
    let (_tmp, reg) = registry();

    reg.add_entries(&names(&["A"])).unwrap();

    assert_eq!(read(&reg), json!({"Default": [], "ZMM": ["A"]}));
}

#[test]
fn test_add_is_idempotent_and_keeps_other_keys() {
    let (_tmp, reg) = registry();
    fs::create_dir_all(reg.path.parent().unwrap()).unwrap();
    fs::write(&reg.path, r#"{"Default": ["Base"], "Other": 1, "ZMM": ["A"]}"#).unwrap();

    reg.add_entries(&names(&["A", "B"])).unwrap();
    reg.add_entries(&names(&["B"])).unwrap();

    assert_eq!(
        read(&reg),
        json!({"Default": ["Base"], "Other": 1, "ZMM": ["A", "B"]})
    );
}

#[test]
fn test_remove_by_exact_name_and_drop_empty_key() {
    let (_tmp, reg) = registry();
    reg.add_entries(&names(&["A", "AB"])).unwrap();

    reg.remove_entries(&names(&["A"])).unwrap();
    assert_eq!(reg.entries(), vec!["AB"]);

    reg.remove_entries(&names(&["AB"])).unwrap();
    assert_eq!(read(&reg), json!({"Default": []}));
}

#[test]
fn test_remove_on_missing_registry_is_noop() {
    let (_tmp, reg) = registry();

    reg.remove_entries(&names(&["A"])).unwrap();

    assert!(!reg.path.exists());
}

#[test]
fn test_corrupt_registry() {
    let (_tmp, reg) = registry();
    fs::create_dir_all(reg.path.parent().unwrap()).unwrap();
    fs::write(&reg.path, "{ not json").unwrap();

    // Removing leaves the unreadable file alone.
    reg.remove_entries(&names(&["A"])).unwrap();
    assert_eq!(fs::read_to_string(&reg.path).unwrap(), "{ not json");
    assert!(reg.entries().is_empty());

    // Adding starts over.
    reg.add_entries(&names(&["A"])).unwrap();
    assert_eq!(read(&reg), json!({"Default": [], "ZMM": ["A"]}));
}

#[test]
fn test_non_array_zmm_is_reset_on_add() {
    let (_tmp, reg) = registry();
    fs::create_dir_all(reg.path.parent().unwrap()).unwrap();
    fs::write(&reg.path, r#"{"Default": ["Base"], "ZMM": "oops"}"#).unwrap();

    reg.add_entries(&names(&["A"])).unwrap();

    assert_eq!(read(&reg), json!({"Default": ["Base"], "ZMM": ["A"]}));
}
