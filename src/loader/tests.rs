use super::*;
use crate::chains;
use std::fs;
use tempfile::TempDir;

fn data_dir_with(file: &str, content: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(file), content).unwrap();
    dir
}

#[test]
fn test_missing_file_is_not_found() {
    let dir = TempDir::new().unwrap();
    let loader = RegistryLoader::new(dir.path());

    let err = loader.load_records(Registry::Tokens).unwrap_err();
    assert!(matches!(err, LoadError::NotFound { .. }));
    assert!(err.to_string().contains("tokens.json"));
}

#[test]
fn test_invalid_json_is_parse_error() {
    let dir = data_dir_with("tokens.json", "[\n  {\"chainId\": 1,}\n]");
    let loader = RegistryLoader::new(dir.path());

    let err = loader.load_records(Registry::Tokens).unwrap_err();
    match err {
        LoadError::Parse { message, .. } => assert!(message.contains("line 2")),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn test_scoped_records_keep_file_index() {
    let dir = data_dir_with(
        "tokens.json",
        r#"[{"chainId": 10}, {"chainId": 1}, {"chainId": 8453}]"#,
    );
    let loader = RegistryLoader::new(dir.path());
    let mut records = BTreeMap::new();
    records.insert(Registry::Tokens, loader.load_records(Registry::Tokens).unwrap());
    let registries = Registries::new(records, serde_json::json!({}));

    let indices: Vec<usize> = registries
        .scoped(Registry::Tokens, &chains::TOKENS)
        .map(|r| r.index)
        .collect();
    assert_eq!(indices, vec![1, 2]);
    assert_eq!(registries.records(Registry::Tokens).len(), 3);
    assert!(registries.records(Registry::Vaults).is_empty());
}

#[test]
fn test_load_all_requires_every_file() {
    let dir = TempDir::new().unwrap();
    for registry in Registry::ALL {
        let content = if registry.is_record_array() { "[]" } else { "{}" };
        fs::write(dir.path().join(registry.file_name()), content).unwrap();
    }
    let loader = RegistryLoader::new(dir.path());
    let registries = loader.load_all().unwrap();
    assert!(registries.points().is_some());

    fs::remove_file(dir.path().join("points.json")).unwrap();
    let err = loader.load_all().unwrap_err();
    assert!(matches!(err, LoadError::NotFound { .. }));
}

#[test]
fn test_object_where_array_expected() {
    let dir = data_dir_with("custom-warnings.json", r#"{"vaults": []}"#);
    let loader = RegistryLoader::new(dir.path());

    let err = loader.load_records(Registry::CustomWarnings).unwrap_err();
    assert!(matches!(err, LoadError::Shape { expected: "array", .. }));
}

#[test]
fn test_every_registry_has_distinct_file() {
    let mut names: Vec<&str> = Registry::ALL.iter().map(|r| r.file_name()).collect();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), Registry::ALL.len());
}
