// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde::Deserialize;
use std::collections::BTreeMap;

type Counters = BTreeMap<String, u32>;

#[test]
fn save_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    let mut value = Counters::new();
    value.insert("fed".to_string(), 3);

    save_json(&path, &value).unwrap();
    let loaded: Counters = load_json(&path).unwrap().unwrap();
    assert_eq!(loaded, value);
}

#[test]
fn save_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deacon/nested/state.json");
    save_json(&path, &Counters::new()).unwrap();
    assert!(path.is_file());
}

#[test]
fn output_is_pretty_printed_with_trailing_newline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    let mut value = Counters::new();
    value.insert("a".to_string(), 1);
    save_json(&path, &value).unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.ends_with('\n'));
    assert!(raw.contains("  \"a\": 1"), "{raw:?}");
}

#[test]
fn missing_file_loads_as_none() {
    let dir = tempfile::tempdir().unwrap();
    let loaded: Option<Counters> = load_json(&dir.path().join("absent.json")).unwrap();
    assert!(loaded.is_none());
}

#[test]
fn empty_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, "").unwrap();
    let err = load_json::<Counters>(&path).unwrap_err();
    assert!(matches!(err, StorageError::Empty { .. }));
}

#[test]
fn malformed_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, "{not json").unwrap();
    let err = load_json::<Counters>(&path).unwrap_err();
    assert!(matches!(err, StorageError::Parse { .. }));
}

#[test]
fn save_replaces_existing_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, "old").unwrap();
    save_json(&path, &Counters::new()).unwrap();
    let loaded: Counters = load_json(&path).unwrap().unwrap();
    assert!(loaded.is_empty());
    // No temp file left behind
    assert!(!path.with_extension("tmp").exists());
}

#[cfg(unix)]
#[test]
fn mode_is_applied() {
    use std::os::unix::fs::PermissionsExt;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("paused.json");
    save_text_with_mode(&path, "{}\n", Some(0o600)).unwrap();
    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Strict {
    required: String,
}

#[test]
fn type_mismatch_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, "{\"other\": 1}").unwrap();
    let err = load_json::<Strict>(&path).unwrap_err();
    assert!(matches!(err, StorageError::Parse { .. }));
}
