// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use gt_adapters::beads::HookedBead;
use gt_adapters::git::WorktreeStatus;
use gt_adapters::{FakeBeads, FakeGit, FakeMux};
use gt_core::{test_support, FakeClock};

struct Fixture {
    _dir: tempfile::TempDir,
    town: Town,
    registry: PrefixRegistry,
    mux: FakeMux,
    beads: FakeBeads,
    git: FakeGit,
    clock: FakeClock,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    Fixture {
        town: Town::new(dir.path()),
        _dir: dir,
        registry: test_support::registry(&[("gastown", "gt")]),
        mux: FakeMux::new(),
        beads: FakeBeads::new(),
        git: FakeGit::new(),
        clock: FakeClock::default(),
    }
}

fn hooked(id: &str, assignee: &str, age: Option<chrono::Duration>, clock: &FakeClock) -> HookedBead {
    HookedBead {
        id: id.to_string(),
        title: format!("bead {id}"),
        assignee: assignee.to_string(),
        updated_at: age.map(|d| clock.now() - d),
    }
}

async fn run(f: &Fixture, options: &StaleScanOptions) -> StaleScanReport {
    scan_stale_hooks(
        &f.town, &f.registry, &f.mux, &f.beads, &f.git, &f.clock, options,
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn live_agent_keeps_its_hook() {
    let f = fixture();
    f.mux.add_session("gt-Toast", "claude");
    f.beads.push_hooked(hooked(
        "gt-abc",
        "gastown/polecats/Toast",
        Some(chrono::Duration::hours(5)),
        &f.clock,
    ));

    let report = run(&f, &StaleScanOptions::default()).await;
    assert_eq!(report.total_hooked, 1);
    assert_eq!(report.stale_count, 0);
    assert_eq!(report.unhooked, 0);
    let row = &report.results[0];
    assert!(row.session_checked);
    assert!(row.agent_alive);
    // Age alone never outranks a live session
    assert!(!row.stale);
    assert!(f.beads.status_updates().is_empty());
}

#[tokio::test]
async fn dead_agent_is_unhooked_with_partial_work_noted() {
    let f = fixture();
    // Session gt-Toast is absent; the worktree holds uncommitted changes
    f.beads.push_hooked(hooked(
        "gt-abc",
        "gastown/polecats/Toast",
        Some(chrono::Duration::minutes(5)),
        &f.clock,
    ));
    let worktree = f.town.polecat_worktree("gastown", "Toast");
    f.git.set_status(
        &worktree,
        WorktreeStatus {
            dirty: true,
            unpushed: Some(2),
        },
    );

    let report = run(&f, &StaleScanOptions::default()).await;
    assert_eq!(report.stale_count, 1);
    assert_eq!(report.unhooked, 1);
    let row = &report.results[0];
    assert!(row.stale && row.unhooked);
    assert!(row.partial_work);
    assert!(row.worktree_dirty);
    assert_eq!(row.unpushed_count, Some(2));
    assert_eq!(
        f.beads.status_updates(),
        vec![("gt-abc".to_string(), "open".to_string())]
    );
}

#[tokio::test]
async fn staleness_ignores_age_when_session_is_checkable() {
    let f = fixture();
    // Updated seconds ago, but the session is already gone
    f.beads.push_hooked(hooked(
        "gt-abc",
        "gastown/polecats/Toast",
        Some(chrono::Duration::seconds(10)),
        &f.clock,
    ));

    let report = run(&f, &StaleScanOptions::default()).await;
    assert_eq!(report.stale_count, 1);
}

#[tokio::test]
async fn unparseable_assignee_falls_back_to_age() {
    let f = fixture();
    f.beads.push_hooked(hooked(
        "gt-old",
        "who/knows/what/this/is",
        Some(chrono::Duration::hours(2)),
        &f.clock,
    ));
    f.beads.push_hooked(hooked(
        "gt-new",
        "who/knows/what/this/is",
        Some(chrono::Duration::minutes(5)),
        &f.clock,
    ));

    let report = run(&f, &StaleScanOptions::default()).await;
    let old = report.results.iter().find(|r| r.bead_id == "gt-old").unwrap();
    let new = report.results.iter().find(|r| r.bead_id == "gt-new").unwrap();
    assert!(!old.session_checked);
    assert!(old.stale);
    assert!(!new.stale);
}

#[tokio::test]
async fn unregistered_rig_falls_back_to_age() {
    let f = fixture();
    // Parses as an identity, but the rig has no prefix: not checkable
    f.beads.push_hooked(hooked(
        "xx-1",
        "elsewhere/polecats/Ghost",
        Some(chrono::Duration::hours(2)),
        &f.clock,
    ));

    let report = run(&f, &StaleScanOptions::default()).await;
    assert!(!report.results[0].session_checked);
    assert!(report.results[0].stale);
}

#[tokio::test]
async fn worktree_probe_failure_does_not_block_unhook() {
    let f = fixture();
    f.beads.push_hooked(hooked(
        "gt-abc",
        "gastown/polecats/Toast",
        None,
        &f.clock,
    ));
    let worktree = f.town.polecat_worktree("gastown", "Toast");
    f.git.set_status_error(&worktree, "gitdir missing");

    let report = run(&f, &StaleScanOptions::default()).await;
    let row = &report.results[0];
    assert!(row.unhooked);
    assert!(row.worktree_error.as_deref().unwrap().contains("gitdir missing"));
    assert_eq!(report.unhooked, 1);
}

#[tokio::test]
async fn dry_run_reports_without_unhooking() {
    let f = fixture();
    f.beads.push_hooked(hooked(
        "gt-abc",
        "gastown/polecats/Toast",
        Some(chrono::Duration::hours(1)),
        &f.clock,
    ));

    let options = StaleScanOptions {
        dry_run: true,
        ..Default::default()
    };
    let report = run(&f, &options).await;
    assert_eq!(report.stale_count, 1);
    assert_eq!(report.unhooked, 0);
    assert!(!report.results[0].unhooked);
    assert!(f.beads.status_updates().is_empty());
}

#[tokio::test]
async fn crew_worktree_is_probed_at_crew_path() {
    let f = fixture();
    f.beads.push_hooked(hooked(
        "gt-abc",
        "gastown/crew/max",
        None,
        &f.clock,
    ));
    f.git.set_status(
        &f.town.crew_worktree("gastown", "max"),
        WorktreeStatus {
            dirty: true,
            unpushed: None,
        },
    );

    let report = run(&f, &StaleScanOptions::default()).await;
    assert!(report.results[0].partial_work);
}

#[tokio::test]
async fn paused_town_blocks_live_scan_but_not_dry_run() {
    let f = fixture();
    crate::pause::pause(&f.town, "maintenance", "mayor", f.clock.now()).unwrap();
    f.beads.push_hooked(hooked(
        "gt-abc",
        "gastown/polecats/Toast",
        None,
        &f.clock,
    ));

    let err = scan_stale_hooks(
        &f.town,
        &f.registry,
        &f.mux,
        &f.beads,
        &f.git,
        &f.clock,
        &StaleScanOptions::default(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DeaconError::Paused(_)));

    let options = StaleScanOptions {
        dry_run: true,
        ..Default::default()
    };
    let report = run(&f, &options).await;
    assert_eq!(report.stale_count, 1);
}
