// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deacon state stores.
//!
//! All stores share one pattern: read, mutate in memory, write atomically.
//! A missing file is zero-value state; an empty or corrupt file is an
//! error so a patrol never dispatches on top of silently-lost history.

use chrono::{DateTime, Duration, Utc};
use gt_core::Town;
use gt_storage::atomic::{load_json, save_json};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::DeaconError;

/// Per-convoy feed bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvoyFeedRecord {
    pub convoy_id: String,
    pub feed_count: u32,
    pub last_feed_time: DateTime<Utc>,
}

/// `deacon/feed-stranded-state.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedStrandedState {
    #[serde(default)]
    pub convoys: BTreeMap<String, ConvoyFeedRecord>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl FeedStrandedState {
    pub fn load(town: &Town) -> Result<Self, DeaconError> {
        Ok(load_json(&town.feed_state_path())?.unwrap_or_default())
    }

    pub fn save(&mut self, town: &Town, now: DateTime<Utc>) -> Result<(), DeaconError> {
        self.last_updated = Some(now);
        save_json(&town.feed_state_path(), self)?;
        Ok(())
    }

    pub fn record_feed(&mut self, convoy_id: &str, now: DateTime<Utc>) {
        let record = self
            .convoys
            .entry(convoy_id.to_string())
            .or_insert_with(|| ConvoyFeedRecord {
                convoy_id: convoy_id.to_string(),
                feed_count: 0,
                last_feed_time: now,
            });
        record.feed_count += 1;
        record.last_feed_time = now;
    }

    pub fn last_feed(&self, convoy_id: &str) -> Option<DateTime<Utc>> {
        self.convoys.get(convoy_id).map(|r| r.last_feed_time)
    }
}

/// Per-bead redispatch bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedispatchRecord {
    pub bead_id: String,
    pub attempt_count: u32,
    pub last_attempt_time: DateTime<Utc>,
    #[serde(default)]
    pub last_rig: String,
    #[serde(default)]
    pub escalated: bool,
    #[serde(default)]
    pub escalated_at: Option<DateTime<Utc>>,
}

/// `deacon/redispatch-state.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedispatchState {
    #[serde(default)]
    pub beads: BTreeMap<String, RedispatchRecord>,
}

impl RedispatchState {
    pub fn load(town: &Town) -> Result<Self, DeaconError> {
        Ok(load_json(&town.redispatch_state_path())?.unwrap_or_default())
    }

    pub fn save(&self, town: &Town) -> Result<(), DeaconError> {
        save_json(&town.redispatch_state_path(), self)?;
        Ok(())
    }

    /// Increment the attempt counter, returning the updated record.
    pub fn record_attempt(
        &mut self,
        bead_id: &str,
        rig: &str,
        now: DateTime<Utc>,
    ) -> &RedispatchRecord {
        let record = self
            .beads
            .entry(bead_id.to_string())
            .or_insert_with(|| RedispatchRecord {
                bead_id: bead_id.to_string(),
                attempt_count: 0,
                last_attempt_time: now,
                last_rig: String::new(),
                escalated: false,
                escalated_at: None,
            });
        record.attempt_count += 1;
        record.last_attempt_time = now;
        record.last_rig = rig.to_string();
        record
    }

    pub fn escalate(&mut self, bead_id: &str, now: DateTime<Utc>) {
        if let Some(record) = self.beads.get_mut(bead_id) {
            if !record.escalated {
                record.escalated = true;
                record.escalated_at = Some(now);
            }
        }
    }
}

/// Whether `last` is recent enough that another dispatch must wait.
pub fn is_in_cooldown(last: Option<DateTime<Utc>>, cooldown: Duration, now: DateTime<Utc>) -> bool {
    match last {
        None => false,
        Some(last) => {
            let elapsed = now - last;
            elapsed >= Duration::zero() && elapsed < cooldown
        }
    }
}

/// Time left in the cooldown window, clamped to `[0, cooldown]`.
pub fn cooldown_remaining(
    last: Option<DateTime<Utc>>,
    cooldown: Duration,
    now: DateTime<Utc>,
) -> Duration {
    let Some(last) = last else {
        return Duration::zero();
    };
    let remaining = cooldown - (now - last);
    remaining.clamp(Duration::zero(), cooldown)
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
