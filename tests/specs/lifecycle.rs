//! Session lifecycle scenarios.

use crate::prelude::town_fixture;
use gt_adapters::{FakeMux, MuxCall};
use gt_core::beacon::{Beacon, Topic};
use gt_core::Role;
use gt_engine::{Lifecycle, StartSpec};
use std::time::Duration;

/// A witness session whose pane degenerated to a bare shell is a zombie:
/// starting the witness again must replace it and leave a verified
/// session plus a pid record.
#[tokio::test]
async fn zombie_witness_is_replaced_by_start() {
    let fixture = town_fixture(&[("foo", "gt-foo")]);
    let mux = FakeMux::new();
    mux.add_session("gt-foo-witness", "bash");

    let lifecycle = Lifecycle::new(mux.clone(), fixture.town.clone());
    let mut spec = StartSpec::new(
        "gt-foo-witness",
        fixture.town.root(),
        Role::Witness,
    );
    spec.rig_name = Some("foo".to_string());
    spec.beacon = Some(Beacon::new("witness (rig: foo)", "deacon", Topic::Ready));
    spec.wait_for_agent = true;
    spec.wait_fatal = true;
    spec.verify_survived = true;

    lifecycle.start_session(&spec).await.unwrap();

    // The zombie died first, then a fresh session appeared
    assert_eq!(mux.kill_order(), vec!["gt-foo-witness"]);
    let pane = mux.get_session("gt-foo-witness").unwrap();
    assert_eq!(pane.pane_command, "claude");
    assert!(fixture.town.pid_file("gt-foo-witness").exists());
}

/// Stopping the whole town kills Mayor, then Boot, then Deacon - Boot is
/// Deacon's watchdog and must die first - and then sweeps the pid files.
#[tokio::test]
async fn town_shutdown_is_ordered_and_sweeps_pids() {
    let fixture = town_fixture(&[("gastown", "gt")]);
    let mux = FakeMux::new();
    for session in ["hq-deacon", "hq-mayor", "hq-boot", "gt-witness"] {
        mux.add_session(session, "claude");
    }
    std::fs::create_dir_all(fixture.town.pids_dir()).unwrap();
    for session in ["hq-mayor", "hq-boot", "hq-deacon"] {
        std::fs::write(fixture.town.pid_file(session), "999999999\n").unwrap();
    }

    let lifecycle = Lifecycle::new(mux.clone(), fixture.town.clone())
        .with_graceful_timeout(Duration::from_millis(50));
    let report = lifecycle.stop_town(true, None).await.unwrap();

    assert_eq!(
        mux.kill_order(),
        vec!["hq-mayor", "hq-boot", "hq-deacon"],
        "shutdown order is a hard invariant"
    );
    assert_eq!(report.stopped, vec!["hq-mayor", "hq-boot", "hq-deacon"]);
    for session in ["hq-mayor", "hq-boot", "hq-deacon"] {
        assert!(!fixture.town.pid_file(session).exists());
    }
    // Rig sessions survive a town shutdown
    assert!(mux.get_session("gt-witness").is_some());
}

/// A graceful stop interrupts before it kills; the interrupt and the kill
/// both target the same session.
#[tokio::test]
async fn graceful_stop_escalates() {
    let fixture = town_fixture(&[("gastown", "gt")]);
    let mux = FakeMux::new();
    mux.add_session("gt-witness", "claude");

    let lifecycle = Lifecycle::new(mux.clone(), fixture.town.clone())
        .with_graceful_timeout(Duration::from_millis(50));
    lifecycle.stop_session("gt-witness", true).await.unwrap();

    let calls = mux.calls();
    let interrupt = calls
        .iter()
        .position(|c| matches!(c, MuxCall::SendRawKeys { name, .. } if name == "gt-witness"));
    let kill = calls
        .iter()
        .position(|c| matches!(c, MuxCall::KillWithProcesses(name) if name == "gt-witness"));
    assert!(interrupt.unwrap() < kill.unwrap());
}
