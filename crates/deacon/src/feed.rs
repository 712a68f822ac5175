// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The feed-stranded patrol.
//!
//! A stranded convoy has ready work but no live owner. The patrol
//! dispatches a feed dog per convoy, rate-limited by a per-convoy cooldown
//! and a per-cycle cap so a flapping convoy cannot monopolise the dogs.
//! Convoys with nothing ready are closed instead, outside the rate limit.

use chrono::Duration;
use gt_adapters::convoy::ConvoyCli;
use gt_core::{Clock, Town};
use tracing::{info, warn};

use crate::error::DeaconError;
use crate::pause::ensure_not_paused;
use crate::state::{cooldown_remaining, is_in_cooldown, FeedStrandedState};

/// Feed patrol tuning.
#[derive(Debug, Clone)]
pub struct FeedOptions {
    /// Maximum convoys fed per patrol cycle.
    pub max_per_cycle: u32,
    /// Minimum time between feeds of the same convoy.
    pub cooldown: Duration,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            max_per_cycle: 3,
            cooldown: Duration::minutes(10),
        }
    }
}

/// What happened to one convoy this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvoyAction {
    /// A feed dog was dispatched.
    Fed,
    /// The convoy had no ready work and was closed.
    Closed,
    /// Still cooling down from the previous feed.
    Cooldown,
    /// The per-cycle cap was already reached.
    Limit,
    /// The external dispatch failed.
    Error,
}

/// Per-convoy outcome row.
#[derive(Debug, Clone)]
pub struct ConvoyOutcome {
    pub convoy_id: String,
    pub title: String,
    pub action: ConvoyAction,
    /// Remaining cooldown, whole seconds, for `Cooldown` rows.
    pub cooldown_remaining_secs: Option<i64>,
    pub error: Option<String>,
}

/// Aggregate patrol result.
#[derive(Debug, Clone, Default)]
pub struct FeedReport {
    pub fed: u32,
    pub closed: u32,
    pub skipped: u32,
    pub errors: u32,
    pub details: Vec<ConvoyOutcome>,
}

/// Run one feed-stranded cycle.
///
/// Convoys are processed in listing order; per-convoy failures are
/// recorded and the cycle continues.
pub async fn feed_stranded<C: ConvoyCli, K: Clock>(
    town: &Town,
    convoys: &C,
    clock: &K,
    options: &FeedOptions,
) -> Result<FeedReport, DeaconError> {
    ensure_not_paused(town)?;

    let stranded = convoys.list_stranded().await?;
    let mut state = FeedStrandedState::load(town)?;
    let mut report = FeedReport::default();

    for convoy in &stranded {
        let mut outcome = ConvoyOutcome {
            convoy_id: convoy.id.clone(),
            title: convoy.title.clone(),
            action: ConvoyAction::Error,
            cooldown_remaining_secs: None,
            error: None,
        };

        if convoy.ready_count == 0 {
            // Nothing to feed; closing is not rate-limited
            match convoys.check(&convoy.id).await {
                Ok(check) if check.closed => {
                    info!(convoy = %convoy.id, "closed empty convoy");
                    outcome.action = ConvoyAction::Closed;
                    report.closed += 1;
                }
                Ok(_) => {
                    outcome.action = ConvoyAction::Error;
                    outcome.error = Some("convoy check did not close it".to_string());
                    report.errors += 1;
                }
                Err(e) => {
                    warn!(convoy = %convoy.id, error = %e, "convoy check failed");
                    outcome.error = Some(e.to_string());
                    report.errors += 1;
                }
            }
            report.details.push(outcome);
            continue;
        }

        if report.fed >= options.max_per_cycle {
            outcome.action = ConvoyAction::Limit;
            report.skipped += 1;
            report.details.push(outcome);
            continue;
        }

        let now = clock.now();
        let last = state.last_feed(&convoy.id);
        if is_in_cooldown(last, options.cooldown, now) {
            let remaining = cooldown_remaining(last, options.cooldown, now);
            outcome.action = ConvoyAction::Cooldown;
            outcome.cooldown_remaining_secs = Some(remaining.num_seconds());
            report.skipped += 1;
            report.details.push(outcome);
            continue;
        }

        match convoys.sling_feed(&convoy.id).await {
            Ok(()) => {
                state.record_feed(&convoy.id, now);
                info!(convoy = %convoy.id, "dispatched feed dog");
                outcome.action = ConvoyAction::Fed;
                report.fed += 1;
            }
            Err(e) => {
                warn!(convoy = %convoy.id, error = %e, "feed dispatch failed");
                outcome.error = Some(e.to_string());
                report.errors += 1;
            }
        }
        report.details.push(outcome);
    }

    state.save(town, clock.now())?;
    Ok(report)
}

#[cfg(test)]
#[path = "feed_tests.rs"]
mod tests;
