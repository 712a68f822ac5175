// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The stale-hook patrol.
//!
//! A hook is stale when the bead is assigned to an agent whose session is
//! gone. Before unhooking, the agent's working tree is inspected so any
//! partial work is flagged in the scan result instead of silently
//! abandoned; the inspection is best-effort and never blocks the unhook.

use chrono::{DateTime, Duration, Utc};
use gt_adapters::beads::BeadsCli;
use gt_adapters::git::GitCli;
use gt_adapters::mux::Multiplexer;
use gt_core::{names, Clock, Identity, PrefixRegistry, Town};
use tracing::{info, warn};

use crate::error::DeaconError;
use crate::pause::ensure_not_paused;

/// Stale scan tuning.
#[derive(Debug, Clone)]
pub struct StaleScanOptions {
    /// Age threshold for beads whose assignee cannot be resolved to a
    /// session; liveness wins over age whenever the session is checkable.
    pub max_age: Duration,
    /// Report only; do not unhook.
    pub dry_run: bool,
}

impl Default for StaleScanOptions {
    fn default() -> Self {
        Self {
            max_age: Duration::minutes(30),
            dry_run: false,
        }
    }
}

/// One scanned hook.
#[derive(Debug, Clone, Default)]
pub struct StaleHookRow {
    pub bead_id: String,
    pub assignee: String,
    pub age_secs: Option<i64>,
    /// Whether the assignee resolved to a checkable session.
    pub session_checked: bool,
    pub agent_alive: bool,
    pub stale: bool,
    pub unhooked: bool,
    pub partial_work: bool,
    pub worktree_dirty: bool,
    pub unpushed_count: Option<u32>,
    pub worktree_error: Option<String>,
}

/// Aggregate scan result.
#[derive(Debug, Clone)]
pub struct StaleScanReport {
    pub scanned_at: DateTime<Utc>,
    pub total_hooked: u32,
    pub stale_count: u32,
    pub unhooked: u32,
    pub results: Vec<StaleHookRow>,
}

/// Run one stale-hook scan.
pub async fn scan_stale_hooks<M, B, G, K>(
    town: &Town,
    registry: &PrefixRegistry,
    mux: &M,
    beads: &B,
    git: &G,
    clock: &K,
    options: &StaleScanOptions,
) -> Result<StaleScanReport, DeaconError>
where
    M: Multiplexer,
    B: BeadsCli,
    G: GitCli,
    K: Clock,
{
    if !options.dry_run {
        ensure_not_paused(town)?;
    }

    let now = clock.now();
    let hooked = beads.list_hooked().await?;
    let mut report = StaleScanReport {
        scanned_at: now,
        total_hooked: hooked.len() as u32,
        stale_count: 0,
        unhooked: 0,
        results: Vec::new(),
    };

    for bead in &hooked {
        let mut row = StaleHookRow {
            bead_id: bead.id.clone(),
            assignee: bead.assignee.clone(),
            age_secs: bead.updated_at.map(|t| (now - t).num_seconds()),
            ..Default::default()
        };

        // Resolve assignee → identity → session; failures fall back to age
        let identity = Identity::parse_address(&bead.assignee).ok();
        let session = identity
            .as_ref()
            .and_then(|id| names::session_name(registry, id).ok());

        if let Some(session) = &session {
            row.session_checked = true;
            row.agent_alive = mux.has_session(session).await?;
            row.stale = !row.agent_alive;
        } else {
            let too_old = bead
                .updated_at
                .map(|t| t < now - options.max_age)
                .unwrap_or(false);
            row.stale = too_old;
        }

        if row.stale && !row.agent_alive {
            if let Some(worktree) = identity.as_ref().and_then(|id| town.worktree_for(id)) {
                match git.worktree_status(&worktree).await {
                    Ok(status) => {
                        row.worktree_dirty = status.dirty;
                        row.unpushed_count = status.unpushed;
                        row.partial_work = status.has_partial_work();
                        if row.partial_work {
                            info!(
                                bead = %bead.id,
                                worktree = %worktree.display(),
                                dirty = status.dirty,
                                "stale hook holds partial work"
                            );
                        }
                    }
                    Err(e) => {
                        // Best effort; the unhook still proceeds
                        warn!(bead = %bead.id, error = %e, "worktree inspection failed");
                        row.worktree_error = Some(e.to_string());
                    }
                }
            }

            if !options.dry_run {
                match beads.set_status(&bead.id, "open").await {
                    Ok(()) => {
                        info!(bead = %bead.id, assignee = %bead.assignee, "unhooked stale bead");
                        row.unhooked = true;
                        report.unhooked += 1;
                    }
                    Err(e) => {
                        warn!(bead = %bead.id, error = %e, "unhook failed");
                    }
                }
            }
        }

        if row.stale {
            report.stale_count += 1;
        }
        report.results.push(row);
    }

    Ok(report)
}

#[cfg(test)]
#[path = "stale_tests.rs"]
mod tests;
