// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session stop, zombie-aware replacement, and exit waits.

use crate::error::EngineError;
use crate::lifecycle::Lifecycle;
use crate::pid_tracker;
use crate::runtime::all_process_names;
use gt_adapters::mux::{is_agent_alive, Multiplexer};
use std::time::Duration;
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(200);

impl<M: Multiplexer> Lifecycle<M> {
    /// Stop a session: interrupt, wait for a graceful exit, then kill.
    ///
    /// Returns whether a session was actually present. The PID record is
    /// removed either way.
    pub async fn stop_session(
        &self,
        session_id: &str,
        graceful: bool,
    ) -> Result<bool, EngineError> {
        if !self.mux.has_session(session_id).await? {
            pid_tracker::untrack_pid(&self.town, session_id)?;
            return Ok(false);
        }

        if graceful {
            if let Err(e) = self.mux.send_raw_keys(session_id, &["C-c"]).await {
                debug!(session = session_id, error = %e, "interrupt delivery failed");
            }
            if self.wait_for_exit(session_id, self.graceful_timeout).await {
                pid_tracker::untrack_pid(&self.town, session_id)?;
                return Ok(true);
            }
            debug!(session = session_id, "graceful window elapsed, killing");
        }

        self.mux.kill_session_with_processes(session_id).await?;
        pid_tracker::untrack_pid(&self.town, session_id)?;
        Ok(true)
    }

    /// Kill a session holding this name.
    ///
    /// With `only_if_zombie`, a session whose agent process is alive is
    /// left untouched and [`EngineError::AlreadyRunning`] is returned.
    /// Returns whether anything was killed.
    pub async fn kill_existing(
        &self,
        session_id: &str,
        only_if_zombie: bool,
    ) -> Result<bool, EngineError> {
        if !self.mux.has_session(session_id).await? {
            return Ok(false);
        }

        if only_if_zombie {
            let names = all_process_names();
            if is_agent_alive(&self.mux, session_id, &names).await? {
                return Err(EngineError::AlreadyRunning(session_id.to_string()));
            }
        }

        if let Err(e) = self.mux.kill_session_with_processes(session_id).await {
            warn!(session = session_id, error = %e, "kill failed");
            return Err(e.into());
        }
        Ok(true)
    }

    /// Poll until the session disappears or the timeout elapses.
    /// Returns whether the session is gone.
    pub async fn wait_for_exit(&self, session_id: &str, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            match self.mux.has_session(session_id).await {
                Ok(false) => return true,
                Ok(true) => {}
                // A vanished server means no session either
                Err(_) => return true,
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

#[cfg(test)]
#[path = "stop_tests.rs"]
mod tests;
