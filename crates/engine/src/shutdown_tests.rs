// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::lifecycle::Lifecycle;
use gt_adapters::{FakeMux, MuxCall};
use gt_core::Town;
use std::time::Duration;

fn lifecycle(mux: &FakeMux) -> (tempfile::TempDir, Lifecycle<FakeMux>) {
    let dir = tempfile::tempdir().unwrap();
    let town = Town::new(dir.path());
    let lifecycle =
        Lifecycle::new(mux.clone(), town).with_graceful_timeout(Duration::from_millis(50));
    (dir, lifecycle)
}

fn add_town_sessions(mux: &FakeMux) {
    mux.add_session("hq-mayor", "claude");
    mux.add_session("hq-boot", "claude");
    mux.add_session("hq-deacon", "claude");
}

#[tokio::test]
async fn shutdown_order_is_mayor_boot_deacon() {
    let mux = FakeMux::new();
    add_town_sessions(&mux);
    mux.add_session("gt-witness", "claude");
    let (_dir, lifecycle) = lifecycle(&mux);

    let report = lifecycle.stop_town(true, None).await.unwrap();

    assert_eq!(mux.kill_order(), vec!["hq-mayor", "hq-boot", "hq-deacon"]);
    assert_eq!(report.stopped, vec!["hq-mayor", "hq-boot", "hq-deacon"]);
    // Rig sessions are not the town's to stop
    assert!(mux.get_session("gt-witness").is_some());
}

#[tokio::test]
async fn shutdown_sweeps_tracked_pids() {
    let mux = FakeMux::new();
    add_town_sessions(&mux);
    let (_dir, lifecycle) = lifecycle(&mux);
    let town = lifecycle.town().clone();

    // Records for processes that are already gone
    std::fs::create_dir_all(town.pids_dir()).unwrap();
    for session in ["hq-mayor", "hq-boot", "hq-deacon"] {
        std::fs::write(town.pid_file(session), "999999999\n").unwrap();
    }

    lifecycle.stop_town(true, None).await.unwrap();

    for session in ["hq-mayor", "hq-boot", "hq-deacon"] {
        assert!(
            !town.pid_file(session).exists(),
            "{session} record survived the sweep"
        );
    }
}

#[tokio::test]
async fn absent_sessions_are_skipped() {
    let mux = FakeMux::new();
    mux.add_session("hq-deacon", "claude");
    let (_dir, lifecycle) = lifecycle(&mux);

    let report = lifecycle.stop_town(true, None).await.unwrap();
    assert_eq!(report.stopped, vec!["hq-deacon"]);
    assert_eq!(mux.kill_order(), vec!["hq-deacon"]);
    assert!(report.first_error.is_none());
}

#[tokio::test]
async fn session_cache_short_circuits_lookup() {
    let mux = FakeMux::new();
    add_town_sessions(&mux);
    let (_dir, lifecycle) = lifecycle(&mux);

    // Cache claims only the deacon exists; the others must be left alone
    let cache = vec!["hq-deacon".to_string()];
    let report = lifecycle.stop_town(true, Some(&cache)).await.unwrap();

    assert_eq!(report.stopped, vec!["hq-deacon"]);
    assert!(mux.get_session("hq-mayor").is_some());
    assert!(mux.get_session("hq-boot").is_some());
}

#[tokio::test]
async fn graceful_shutdown_interrupts_each_session() {
    let mux = FakeMux::new();
    add_town_sessions(&mux);
    let (_dir, lifecycle) = lifecycle(&mux);

    lifecycle.stop_town(false, None).await.unwrap();

    let interrupted: Vec<String> = mux
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            MuxCall::SendRawKeys { name, keys } if keys == ["C-c"] => Some(name),
            _ => None,
        })
        .collect();
    assert_eq!(interrupted, vec!["hq-mayor", "hq-boot", "hq-deacon"]);
}
