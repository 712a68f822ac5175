// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deacon state pruning.
//!
//! State entries outlive their usefulness when the convoy or bead they
//! track disappears upstream. Pruning drops entries for entities the
//! caller knows are gone, plus anything idle past the retention window so
//! the stores stay bounded even when upstream knowledge is unavailable.

use chrono::{DateTime, Duration, Utc};
use gt_core::Town;
use tracing::info;

use crate::error::DeaconError;
use crate::state::{FeedStrandedState, RedispatchState};

/// Entries idle this long are dropped regardless of upstream state.
pub fn default_retention() -> Duration {
    Duration::days(7)
}

/// What a prune pass removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneReport {
    pub feed_entries_removed: u32,
    pub redispatch_entries_removed: u32,
}

/// Prune both deacon state stores.
///
/// `live_convoys` / `live_beads` are the ids the caller knows still exist;
/// `None` means unknown, in which case only the retention window applies.
pub fn prune_state(
    town: &Town,
    now: DateTime<Utc>,
    retention: Duration,
    live_convoys: Option<&[String]>,
    live_beads: Option<&[String]>,
) -> Result<PruneReport, DeaconError> {
    let mut report = PruneReport::default();

    let mut feed = FeedStrandedState::load(town)?;
    let before = feed.convoys.len();
    feed.convoys.retain(|id, record| {
        let known_live = live_convoys.map(|live| live.iter().any(|l| l == id));
        if known_live == Some(false) {
            return false;
        }
        now - record.last_feed_time < retention
    });
    report.feed_entries_removed = (before - feed.convoys.len()) as u32;
    if report.feed_entries_removed > 0 {
        feed.save(town, now)?;
    }

    let mut redispatch = RedispatchState::load(town)?;
    let before = redispatch.beads.len();
    redispatch.beads.retain(|id, record| {
        let known_live = live_beads.map(|live| live.iter().any(|l| l == id));
        if known_live == Some(false) {
            return false;
        }
        now - record.last_attempt_time < retention
    });
    report.redispatch_entries_removed = (before - redispatch.beads.len()) as u32;
    if report.redispatch_entries_removed > 0 {
        redispatch.save(town)?;
    }

    if report != PruneReport::default() {
        info!(
            feed = report.feed_entries_removed,
            redispatch = report.redispatch_entries_removed,
            "pruned deacon state"
        );
    }
    Ok(report)
}

#[cfg(test)]
#[path = "prune_tests.rs"]
mod tests;
