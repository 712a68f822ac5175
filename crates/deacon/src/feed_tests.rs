// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::DateTime;
use chrono::Utc;
use gt_adapters::convoy::StrandedConvoy;
use gt_adapters::FakeConvoys;
use gt_core::FakeClock;

fn town() -> (tempfile::TempDir, Town) {
    let dir = tempfile::tempdir().unwrap();
    let town = Town::new(dir.path());
    (dir, town)
}

fn convoy(id: &str, ready: u32) -> StrandedConvoy {
    StrandedConvoy {
        id: id.to_string(),
        title: format!("convoy {id}"),
        ready_count: ready,
        ready_issues: (0..ready).map(|n| format!("{id}-{n}")).collect(),
    }
}

fn clock_at(secs: i64) -> FakeClock {
    FakeClock::new(DateTime::<Utc>::from_timestamp(1_700_000_000 + secs, 0).unwrap())
}

#[tokio::test]
async fn feeds_stranded_convoys_and_records_state() {
    let (_dir, town) = town();
    let convoys = FakeConvoys::new();
    convoys.push_stranded(convoy("gt-cv-abc", 2));
    let clock = clock_at(0);

    let report = feed_stranded(&town, &convoys, &clock, &FeedOptions::default())
        .await
        .unwrap();

    assert_eq!(report.fed, 1);
    assert_eq!(report.errors, 0);
    assert_eq!(convoys.fed(), vec!["gt-cv-abc"]);

    let state = FeedStrandedState::load(&town).unwrap();
    assert_eq!(state.convoys["gt-cv-abc"].feed_count, 1);
    assert_eq!(state.convoys["gt-cv-abc"].last_feed_time, clock.now());
}

#[tokio::test]
async fn convoy_in_cooldown_is_skipped_with_remaining_time() {
    let (_dir, town) = town();
    // Fed five minutes ago with a ten minute cooldown
    let mut state = FeedStrandedState::default();
    state.record_feed("gt-cv-abc", clock_at(0).now());
    state.save(&town, clock_at(0).now()).unwrap();

    let convoys = FakeConvoys::new();
    convoys.push_stranded(convoy("gt-cv-abc", 2));
    let clock = clock_at(300);

    let report = feed_stranded(&town, &convoys, &clock, &FeedOptions::default())
        .await
        .unwrap();

    assert_eq!(report.fed, 0);
    assert_eq!(report.closed, 0);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.errors, 0);
    assert_eq!(report.details.len(), 1);
    let row = &report.details[0];
    assert_eq!(row.action, ConvoyAction::Cooldown);
    assert_eq!(row.cooldown_remaining_secs, Some(300));
    assert!(convoys.fed().is_empty());
}

#[tokio::test]
async fn per_cycle_cap_limits_feeds() {
    let (_dir, town) = town();
    let convoys = FakeConvoys::new();
    for n in 0..4 {
        convoys.push_stranded(convoy(&format!("gt-cv-{n}"), 1));
    }
    let clock = clock_at(0);
    let options = FeedOptions {
        max_per_cycle: 2,
        ..Default::default()
    };

    let report = feed_stranded(&town, &convoys, &clock, &options)
        .await
        .unwrap();

    assert_eq!(report.fed, 2);
    assert_eq!(report.skipped, 2);
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

    let state = FeedStrandedState::load(&town).unwrap();
    assert_eq!(state.convoys.len(), 2);
    for record in state.convoys.values() {
        assert_eq!(record.last_feed_time, clock.now());
    }
}

#[tokio::test]
async fn empty_convoys_are_closed_outside_the_rate_limit() {
    let (_dir, town) = town();
    let convoys = FakeConvoys::new();
    convoys.set_check_closes(true);
    for n in 0..3 {
        convoys.push_stranded(convoy(&format!("gt-cv-{n}"), 0));
    }
    convoys.push_stranded(convoy("gt-cv-live", 1));
    let clock = clock_at(0);
    let options = FeedOptions {
        max_per_cycle: 1,
        ..Default::default()
    };

    let report = feed_stranded(&town, &convoys, &clock, &options)
        .await
        .unwrap();

    assert_eq!(report.closed, 3);
    assert_eq!(report.fed, 1);
    assert_eq!(convoys.checked().len(), 3);
}

#[tokio::test]
async fn dispatch_failure_is_recorded_and_cycle_continues() {
    let (_dir, town) = town();
    let convoys = FakeConvoys::new();
    convoys.fail_sling("no dogs available");
    convoys.push_stranded(convoy("gt-cv-a", 1));
    convoys.push_stranded(convoy("gt-cv-b", 1));
    let clock = clock_at(0);

    let report = feed_stranded(&town, &convoys, &clock, &FeedOptions::default())
        .await
        .unwrap();

    assert_eq!(report.fed, 0);
    assert_eq!(report.errors, 2);
    assert!(report.details[0]
        .error
        .as_deref()
        .unwrap()
        .contains("no dogs available"));

    // Failed dispatches do not burn the cooldown
    let state = FeedStrandedState::load(&town).unwrap();
    assert!(state.convoys.is_empty());
}

#[tokio::test]
async fn paused_town_feeds_nothing() {
    let (_dir, town) = town();
    crate::pause::pause(&town, "maintenance", "mayor", clock_at(0).now()).unwrap();
    let convoys = FakeConvoys::new();
    convoys.push_stranded(convoy("gt-cv-abc", 1));

    let err = feed_stranded(&town, &convoys, &clock_at(0), &FeedOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DeaconError::Paused(_)));
    assert!(convoys.fed().is_empty());
}

#[tokio::test]
async fn corrupt_state_aborts_before_dispatch() {
    let (_dir, town) = town();
    std::fs::create_dir_all(town.deacon_dir()).unwrap();
    std::fs::write(town.feed_state_path(), "{bad json").unwrap();
    let convoys = FakeConvoys::new();
    convoys.push_stranded(convoy("gt-cv-abc", 1));

    let result = feed_stranded(&town, &convoys, &clock_at(0), &FeedOptions::default()).await;
    assert!(result.is_err());
    assert!(convoys.fed().is_empty());
}
