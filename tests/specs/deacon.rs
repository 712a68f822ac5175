//! Patrol scenarios.

use crate::prelude::{clock_at, town_fixture};
use gt_adapters::convoy::StrandedConvoy;
use gt_adapters::git::WorktreeStatus;
use gt_adapters::{FakeBeads, FakeConvoys, FakeGit, FakeMux};
use gt_core::Clock;
use gt_deacon::{
    feed_stranded, scan_stale_hooks, ConvoyAction, FeedOptions, FeedStrandedState,
    StaleScanOptions,
};

fn convoy(id: &str, ready: u32) -> StrandedConvoy {
    StrandedConvoy {
        id: id.to_string(),
        title: String::new(),
        ready_count: ready,
        ready_issues: Vec::new(),
    }
}

/// A convoy fed five minutes ago with a ten-minute cooldown is skipped,
/// and the report says how long is left.
#[tokio::test]
async fn feed_stranded_honors_cooldowns() {
    let fixture = town_fixture(&[("gastown", "gt")]);
    let mut state = FeedStrandedState::default();
    state.record_feed("gt-cv-abc", clock_at(0).now());
    state.save(&fixture.town, clock_at(0).now()).unwrap();

    let convoys = FakeConvoys::new();
    convoys.push_stranded(convoy("gt-cv-abc", 2));

    let report = feed_stranded(
        &fixture.town,
        &convoys,
        &clock_at(5 * 60),
        &FeedOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(
        (report.fed, report.closed, report.skipped, report.errors),
        (0, 0, 1, 0)
    );
    assert_eq!(report.details[0].action, ConvoyAction::Cooldown);
    assert_eq!(report.details[0].cooldown_remaining_secs, Some(5 * 60));
    assert!(convoys.fed().is_empty());
}

/// With a cap of two, four hungry convoys produce two feeds and two limit
/// rows, and only the fed pair gets fresh state entries.
#[tokio::test]
async fn feed_stranded_caps_each_cycle() {
    let fixture = town_fixture(&[("gastown", "gt")]);
    let convoys = FakeConvoys::new();
    for n in 0..4 {
        convoys.push_stranded(convoy(&format!("gt-cv-{n}"), 1));
    }

    let options = FeedOptions {
        max_per_cycle: 2,
        ..Default::default()
    };
    let report = feed_stranded(&fixture.town, &convoys, &clock_at(0), &options)
        .await
        .unwrap();

    let actions: Vec<ConvoyAction> = report.details.iter().map(|d| d.action).collect();
    assert_eq!(
        actions,
        vec![
            ConvoyAction::Fed,
            ConvoyAction::Fed,
            ConvoyAction::Limit,
            ConvoyAction::Limit,
        ]
    );

    let state = FeedStrandedState::load(&fixture.town).unwrap();
    assert_eq!(state.convoys.len(), 2);
    for record in state.convoys.values() {
        assert_eq!(record.last_feed_time, clock_at(0).now());
    }
}

/// A hooked bead whose assignee's session is gone gets unhooked, and the
/// dirty worktree is noted in the result instead of silently discarded.
#[tokio::test]
async fn stale_hook_unhook_preserves_partial_work_note() {
    let fixture = town_fixture(&[("gastown", "gt")]);
    let beads = FakeBeads::new();
    beads.push_hooked(gt_adapters::beads::HookedBead {
        id: "gt-abc".to_string(),
        title: "refit the flare stack".to_string(),
        assignee: "gastown/polecats/Toast".to_string(),
        updated_at: Some(clock_at(0).now()),
    });

    let git = FakeGit::new();
    git.set_status(
        &fixture.town.polecat_worktree("gastown", "Toast"),
        WorktreeStatus {
            dirty: true,
            unpushed: Some(1),
        },
    );

    let report = scan_stale_hooks(
        &fixture.town,
        &fixture.registry,
        &FakeMux::new(),
        &beads,
        &git,
        &clock_at(60),
        &StaleScanOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(report.stale_count, 1);
    assert_eq!(report.unhooked, 1);
    let row = &report.results[0];
    assert!(row.unhooked && row.partial_work && row.worktree_dirty);
    // The external status reset actually happened
    assert_eq!(
        beads.status_updates(),
        vec![("gt-abc".to_string(), "open".to_string())]
    );
}
