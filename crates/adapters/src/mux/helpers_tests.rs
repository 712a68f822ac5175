// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;

#[tokio::test]
async fn wait_for_command_returns_agent_command() {
    let mux = FakeMux::new();
    mux.add_session("gt-witness", "claude");
    let command = wait_for_command(&mux, "gt-witness", KNOWN_SHELLS, Duration::from_secs(1))
        .await
        .unwrap();
    assert_eq!(command, "claude");
}

#[tokio::test]
async fn wait_for_command_times_out_on_shell() {
    let mux = FakeMux::new();
    mux.add_session("gt-witness", "bash");
    let err = wait_for_command(&mux, "gt-witness", KNOWN_SHELLS, Duration::from_millis(300))
        .await
        .unwrap_err();
    assert!(matches!(err, MuxError::Failed { .. }), "{err:?}");
}

#[tokio::test]
async fn wait_for_command_sees_late_starts() {
    let mux = FakeMux::new();
    mux.add_session("gt-witness", "bash");
    let poller = mux.clone();
    let handle = tokio::spawn(async move {
        wait_for_command(&poller, "gt-witness", KNOWN_SHELLS, Duration::from_secs(2)).await
    });
    tokio::time::sleep(Duration::from_millis(250)).await;
    mux.set_pane_command("gt-witness", "claude");
    let command = handle.await.unwrap().unwrap();
    assert_eq!(command, "claude");
}

#[tokio::test]
async fn wait_for_command_propagates_missing_session() {
    let mux = FakeMux::new();
    let err = wait_for_command(&mux, "gt-gone", KNOWN_SHELLS, Duration::from_secs(1))
        .await
        .unwrap_err();
    assert!(matches!(err, MuxError::SessionNotFound(_)));
}

#[tokio::test]
async fn is_agent_alive_matches_process_names() {
    let mux = FakeMux::new();
    mux.add_session("gt-witness", "claude");
    let names = vec!["claude".to_string(), "node".to_string()];
    assert!(is_agent_alive(&mux, "gt-witness", &names).await.unwrap());

    mux.set_pane_command("gt-witness", "bash");
    assert!(!is_agent_alive(&mux, "gt-witness", &names).await.unwrap());
}

#[tokio::test]
async fn is_agent_alive_false_for_missing_session() {
    let mux = FakeMux::new();
    let names = vec!["claude".to_string()];
    assert!(!is_agent_alive(&mux, "gt-gone", &names).await.unwrap());
}

#[tokio::test]
async fn accept_bypass_is_noop_without_dialog() {
    let mux = FakeMux::new();
    mux.add_session("gt-witness", "claude");
    mux.set_pane_content("gt-witness", "normal agent output");
    accept_bypass_warning(&mux, "gt-witness").await.unwrap();
    assert!(!mux
        .calls()
        .iter()
        .any(|c| matches!(c, MuxCall::SendRawKeys { .. })));
}

#[tokio::test]
async fn accept_bypass_dismisses_dialog() {
    let mux = FakeMux::new();
    mux.add_session("gt-witness", "claude");
    mux.set_pane_content(
        "gt-witness",
        "WARNING: Bypassing Permissions\n  No, exit\n  Yes, I accept",
    );
    accept_bypass_warning(&mux, "gt-witness").await.unwrap();
    let raw: Vec<_> = mux
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            MuxCall::SendRawKeys { keys, .. } => Some(keys),
            _ => None,
        })
        .collect();
    assert_eq!(raw, vec![vec!["Down".to_string(), "Enter".to_string()]]);
}

#[tokio::test]
async fn wait_for_shell_ready_succeeds_on_shell() {
    let mux = FakeMux::new();
    mux.add_session("gt-crew-max", "zsh");
    wait_for_shell_ready(&mux, "gt-crew-max", Duration::from_secs(1))
        .await
        .unwrap();
}
