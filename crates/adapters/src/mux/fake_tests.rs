// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn spawn_then_lookup() {
    let mux = FakeMux::new();
    mux.new_session_with_command("gt-witness", Path::new("/town"), "claude -p hi")
        .await
        .unwrap();

    assert!(mux.has_session("gt-witness").await.unwrap());
    assert!(!mux.has_session("gt-wit").await.unwrap(), "no prefix match");
    assert_eq!(
        mux.pane_current_command("gt-witness").await.unwrap(),
        "claude"
    );
}

#[tokio::test]
async fn duplicate_spawn_fails() {
    let mux = FakeMux::new();
    mux.new_session_with_command("gt-Toast", Path::new("/t"), "x")
        .await
        .unwrap();
    let err = mux
        .new_session_with_command("gt-Toast", Path::new("/t"), "x")
        .await
        .unwrap_err();
    assert!(matches!(err, MuxError::SessionExists(_)));
}

#[tokio::test]
async fn kill_order_is_recorded() {
    let mux = FakeMux::new();
    mux.add_session("hq-mayor", "claude");
    mux.add_session("hq-deacon", "claude");
    mux.kill_session_with_processes("hq-mayor").await.unwrap();
    mux.kill_session("hq-deacon").await.unwrap();
    assert_eq!(mux.kill_order(), vec!["hq-mayor", "hq-deacon"]);
}

#[tokio::test]
async fn environment_set_is_idempotent() {
    let mux = FakeMux::new();
    mux.add_session("gt-witness", "claude");
    mux.set_environment("gt-witness", "GT_ROLE", "witness")
        .await
        .unwrap();
    mux.set_environment("gt-witness", "GT_ROLE", "witness")
        .await
        .unwrap();
    let env = mux.show_environment("gt-witness").await.unwrap();
    assert_eq!(env, vec![("GT_ROLE".to_string(), "witness".to_string())]);
}

#[tokio::test]
async fn rename_refuses_existing_target() {
    let mux = FakeMux::new();
    mux.add_session("gt-old", "claude");
    mux.add_session("gt-new", "claude");
    let err = mux.rename_session("gt-old", "gt-new").await.unwrap_err();
    assert!(matches!(err, MuxError::SessionExists(_)));
}

#[tokio::test]
async fn rename_moves_pane_state() {
    let mux = FakeMux::new();
    mux.add_session("gt-old", "claude");
    mux.set_pane_pid("gt-old", 4242);
    mux.rename_session("gt-old", "gt-new").await.unwrap();
    assert!(!mux.has_session("gt-old").await.unwrap());
    assert_eq!(mux.pane_pid("gt-new").await.unwrap(), 4242);
}

#[tokio::test]
async fn no_server_reads_as_empty() {
    let mux = FakeMux::new();
    mux.add_session("gt-witness", "claude");
    mux.set_no_server(true);
    assert!(!mux.has_session("gt-witness").await.unwrap());
    assert!(mux.list_sessions().await.unwrap().is_empty());
}
