// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ordered town shutdown.
//!
//! Mayor first, then Boot, then Deacon: Boot is Deacon's watchdog and
//! would respawn it if Deacon died first. After the sessions are gone, the
//! PID-tracker sweep reaps anything that escaped the kill cascade.

use crate::error::EngineError;
use crate::lifecycle::Lifecycle;
use crate::pid_tracker::{self, SweepReport};
use gt_adapters::mux::Multiplexer;
use gt_core::names::{HQ_BOOT, HQ_DEACON, HQ_MAYOR};
use tracing::{info, warn};

/// Shutdown order. Do not reorder: Boot must die before Deacon.
const TOWN_SESSIONS: [&str; 3] = [HQ_MAYOR, HQ_BOOT, HQ_DEACON];

/// Outcome of a town shutdown.
#[derive(Debug, Default)]
pub struct TownStopReport {
    /// Sessions that were present and stopped, in order.
    pub stopped: Vec<String>,
    /// Result of the PID-tracker sweep.
    pub sweep: SweepReport,
    /// First per-session failure, if any. The remaining sessions are
    /// still processed.
    pub first_error: Option<String>,
}

impl<M: Multiplexer> Lifecycle<M> {
    /// Stop the town-level sessions in order, then sweep tracked PIDs.
    ///
    /// `session_cache` avoids re-listing when the caller already knows
    /// what exists.
    pub async fn stop_town(
        &self,
        force: bool,
        session_cache: Option<&[String]>,
    ) -> Result<TownStopReport, EngineError> {
        let mut report = TownStopReport::default();

        for session in TOWN_SESSIONS {
            let present = match session_cache {
                Some(cache) => cache.iter().any(|s| s == session),
                None => self.mux.has_session(session).await?,
            };
            if !present {
                continue;
            }

            if !force {
                if let Err(e) = self.mux.send_raw_keys(session, &["C-c"]).await {
                    warn!(session, error = %e, "interrupt delivery failed");
                }
                self.wait_for_exit(session, self.graceful_timeout).await;
            }

            let reason = if force {
                "forced shutdown"
            } else {
                "user shutdown"
            };
            info!(
                target: "session-death",
                session,
                reason,
                source = "gt down",
                "stopping town session"
            );

            match self.mux.kill_session_with_processes(session).await {
                Ok(()) => report.stopped.push(session.to_string()),
                Err(e) => {
                    warn!(session, error = %e, "town session kill failed");
                    if report.first_error.is_none() {
                        report.first_error = Some(format!("stopping {session}: {e}"));
                    }
                }
            }
        }

        report.sweep = pid_tracker::kill_tracked_pids(&self.town);
        info!(
            killed = report.sweep.killed,
            errors = report.sweep.errors.len(),
            "pid tracker sweep complete"
        );

        Ok(report)
    }
}

#[cfg(test)]
#[path = "shutdown_tests.rs"]
mod tests;
