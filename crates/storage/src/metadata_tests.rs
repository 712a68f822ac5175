// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn canonical_rewrite_preserves_unknown_keys() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("metadata.json");
    std::fs::write(
        &path,
        r#"{"backend":"sqlite","mode":"local","database":"gastown","custom":{"a":1}}"#,
    )
    .unwrap();

    let mut meta = BeadsMetadata::load(&path).unwrap().unwrap();
    meta.backend = "dolt".to_string();
    meta.save(&path).unwrap();

    let again = BeadsMetadata::load(&path).unwrap().unwrap();
    assert_eq!(again.backend, "dolt");
    assert_eq!(again.extra["custom"]["a"], 1);
}

#[test]
fn server_addr_requires_server_mode() {
    let meta = BeadsMetadata {
        mode: "server".to_string(),
        server_host: Some("127.0.0.1".to_string()),
        server_port: Some(3306),
        ..Default::default()
    };
    assert_eq!(meta.server_addr().as_deref(), Some("127.0.0.1:3306"));

    let local = BeadsMetadata {
        mode: "local".to_string(),
        server_host: Some("127.0.0.1".to_string()),
        server_port: Some(3306),
        ..Default::default()
    };
    assert_eq!(local.server_addr(), None);
}

#[test]
fn server_addr_missing_host_is_none() {
    let meta = BeadsMetadata {
        mode: "server".to_string(),
        server_port: Some(3306),
        ..Default::default()
    };
    assert_eq!(meta.server_addr(), None);
}

#[test]
fn missing_file_loads_as_none() {
    let dir = tempfile::tempdir().unwrap();
    assert!(BeadsMetadata::load(&dir.path().join("metadata.json"))
        .unwrap()
        .is_none());
}
