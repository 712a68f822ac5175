// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The redispatch patrol.
//!
//! When a stale hook is reclaimed, the deacon receives a notification that
//! a previously-hooked bead is open again. Redispatch slings it back onto
//! the rig, rate-limited per bead; a bead that keeps coming back gets
//! escalated instead of bounced forever.

use chrono::Duration;
use gt_adapters::convoy::ConvoyCli;
use gt_core::{Clock, Town};
use tracing::{info, warn};

use crate::error::DeaconError;
use crate::pause::ensure_not_paused;
use crate::state::{cooldown_remaining, is_in_cooldown, RedispatchState};

/// Redispatch tuning.
#[derive(Debug, Clone)]
pub struct RedispatchOptions {
    /// Minimum time between redispatch attempts of the same bead.
    pub cooldown: Duration,
    /// Attempt count at which a bead is escalated instead of retried.
    pub escalation_threshold: u32,
}

impl Default for RedispatchOptions {
    fn default() -> Self {
        Self {
            cooldown: Duration::minutes(15),
            escalation_threshold: 3,
        }
    }
}

/// A parsed recovery notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredNotice {
    pub bead_id: String,
    pub rig: String,
}

impl RecoveredNotice {
    /// Recognise a `RECOVERED_BEAD <id>` message whose body names the
    /// previous polecat and confirms the bead was hooked. Anything else is
    /// not a recovery notice.
    pub fn parse(subject: &str, body: &str) -> Option<Self> {
        let bead_id = subject.strip_prefix("RECOVERED_BEAD ")?.trim();
        if bead_id.is_empty() {
            return None;
        }

        let mut rig = None;
        let mut previous_status = None;
        for line in body.lines() {
            if let Some(value) = line.strip_prefix("Polecat:") {
                let value = value.trim();
                rig = value.split('/').next().map(|r| r.to_string());
            } else if let Some(value) = line.strip_prefix("Previous Status:") {
                previous_status = Some(value.trim().to_string());
            }
        }

        let rig = rig.filter(|r| !r.is_empty())?;
        if previous_status.as_deref() != Some("hooked") {
            return None;
        }

        Some(Self {
            bead_id: bead_id.to_string(),
            rig,
        })
    }
}

/// What a redispatch attempt decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedispatchOutcome {
    /// The bead was slung back onto its rig.
    Redispatched { attempt: u32 },
    /// This attempt crossed the escalation threshold; the bead was still
    /// dispatched, but future recoveries will be refused.
    Escalated { attempt: u32 },
    /// Escalated on a previous cycle; nothing dispatched.
    AlreadyEscalated,
    /// Still cooling down from the previous attempt.
    Cooldown { remaining_secs: i64 },
    /// The external dispatch failed.
    Failed { error: String },
}

/// Handle one recovery notice.
pub async fn redispatch_recovered<C: ConvoyCli, K: Clock>(
    town: &Town,
    gt: &C,
    clock: &K,
    notice: &RecoveredNotice,
    options: &RedispatchOptions,
) -> Result<RedispatchOutcome, DeaconError> {
    ensure_not_paused(town)?;

    let mut state = RedispatchState::load(town)?;
    let now = clock.now();

    if let Some(record) = state.beads.get(&notice.bead_id) {
        if record.escalated {
            info!(bead = %notice.bead_id, "recovery of escalated bead ignored");
            return Ok(RedispatchOutcome::AlreadyEscalated);
        }
        if is_in_cooldown(Some(record.last_attempt_time), options.cooldown, now) {
            let remaining =
                cooldown_remaining(Some(record.last_attempt_time), options.cooldown, now);
            return Ok(RedispatchOutcome::Cooldown {
                remaining_secs: remaining.num_seconds(),
            });
        }
    }

    if let Err(e) = gt.sling_bead(&notice.bead_id, &notice.rig).await {
        warn!(bead = %notice.bead_id, error = %e, "redispatch failed");
        return Ok(RedispatchOutcome::Failed {
            error: e.to_string(),
        });
    }

    let attempt = state
        .record_attempt(&notice.bead_id, &notice.rig, now)
        .attempt_count;
    let outcome = if attempt >= options.escalation_threshold {
        state.escalate(&notice.bead_id, now);
        warn!(bead = %notice.bead_id, attempt, "bead escalated after repeated recoveries");
        RedispatchOutcome::Escalated { attempt }
    } else {
        info!(bead = %notice.bead_id, rig = %notice.rig, attempt, "redispatched recovered bead");
        RedispatchOutcome::Redispatched { attempt }
    };
    state.save(town)?;
    Ok(outcome)
}

#[cfg(test)]
#[path = "redispatch_tests.rs"]
mod tests;
