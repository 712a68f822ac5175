// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Multiplexer adapter: the only place that spawns the tmux binary.
//!
//! The trait is deliberately narrow and primitive; composite behaviors
//! (waiting for an agent, dismissing dialogs) are free functions over any
//! implementation so they test against [`FakeMux`] without a tmux server.

mod tmux;

pub use tmux::TmuxMux;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeMux, FakePane, MuxCall};

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Pane commands that mean "still a shell, the agent has not started yet".
pub const KNOWN_SHELLS: &[&str] = &["bash", "zsh", "sh", "fish", "dash", "ksh"];

/// Errors from multiplexer operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MuxError {
    #[error("no multiplexer server running")]
    NoServer,
    #[error("session already exists: {0}")]
    SessionExists(String),
    #[error("session not found: {0}")]
    SessionNotFound(String),
    #[error("tmux {op}: {detail}")]
    Failed { op: &'static str, detail: String },
}

impl MuxError {
    pub fn failed(op: &'static str, detail: impl Into<String>) -> Self {
        Self::Failed {
            op,
            detail: detail.into(),
        }
    }
}

/// Adapter over the terminal multiplexer.
///
/// `has_session` and every `-t` target use exact name matching; prefix
/// matches must never resolve. Where tmux reports "no server running",
/// lookups degrade to "no sessions exist" instead of erroring.
#[async_trait]
pub trait Multiplexer: Clone + Send + Sync + 'static {
    /// Exact-match existence check.
    async fn has_session(&self, name: &str) -> Result<bool, MuxError>;

    /// All current session names (empty when the server is down).
    async fn list_sessions(&self) -> Result<Vec<String>, MuxError>;

    /// Create a detached session whose initial pane runs `cmd`.
    async fn new_session_with_command(
        &self,
        name: &str,
        workdir: &Path,
        cmd: &str,
    ) -> Result<(), MuxError>;

    /// Kill a session. Killing an absent session succeeds.
    async fn kill_session(&self, name: &str) -> Result<(), MuxError>;

    /// Kill a session and terminate its descendant processes.
    async fn kill_session_with_processes(&self, name: &str) -> Result<(), MuxError>;

    /// Keep the pane around after its process exits (for auto-respawn).
    async fn set_remain_on_exit(&self, name: &str, on: bool) -> Result<(), MuxError>;

    /// Install a pane-died hook that respawns the pane's command.
    async fn set_auto_respawn_hook(&self, name: &str) -> Result<(), MuxError>;

    /// Set a session environment variable. Idempotent.
    async fn set_environment(&self, name: &str, key: &str, value: &str) -> Result<(), MuxError>;

    /// The session's environment as `(key, value)` pairs.
    async fn show_environment(&self, name: &str) -> Result<Vec<(String, String)>, MuxError>;

    /// Paste literal text then press Enter, with a debounce so a slow
    /// agent's input buffer does not drop the trailing newline.
    async fn send_keys(&self, name: &str, text: &str) -> Result<(), MuxError>;

    /// Send raw key names (`C-c`, `Down`, `Enter`) without interpretation
    /// as literal text.
    async fn send_raw_keys(&self, name: &str, keys: &[&str]) -> Result<(), MuxError>;

    /// The pid of the pane's foreground process.
    async fn pane_pid(&self, name: &str) -> Result<i32, MuxError>;

    /// The pane's current command name (`bash`, `claude`, …).
    async fn pane_current_command(&self, name: &str) -> Result<String, MuxError>;

    /// The last `lines` lines of pane content.
    async fn capture_pane(&self, name: &str, lines: u32) -> Result<String, MuxError>;

    /// Rename a session in place, preserving attached clients.
    async fn rename_session(&self, from: &str, to: &str) -> Result<(), MuxError>;

    /// Set a session option (theming, titles).
    async fn set_option(&self, name: &str, option: &str, value: &str) -> Result<(), MuxError>;
}

/// Poll the pane until its command is *not* one of `exclude` (normally the
/// shell list), returning that command. Errors on timeout.
pub async fn wait_for_command<M: Multiplexer>(
    mux: &M,
    name: &str,
    exclude: &[&str],
    timeout: Duration,
) -> Result<String, MuxError> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let command = mux.pane_current_command(name).await?;
        if !exclude.contains(&command.as_str()) {
            return Ok(command);
        }
        if tokio::time::Instant::now() >= deadline {
            return Err(MuxError::failed(
                "wait-for-command",
                format!(
                    "pane of {name} still running {command:?} after {}s",
                    timeout.as_secs()
                ),
            ));
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
}

/// Poll the pane until its command *is* a shell (ready for input).
pub async fn wait_for_shell_ready<M: Multiplexer>(
    mux: &M,
    name: &str,
    timeout: Duration,
) -> Result<(), MuxError> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let command = mux.pane_current_command(name).await?;
        if KNOWN_SHELLS.contains(&command.as_str()) {
            return Ok(());
        }
        if tokio::time::Instant::now() >= deadline {
            return Err(MuxError::failed(
                "wait-for-shell",
                format!("pane of {name} never returned to a shell"),
            ));
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
}

/// Whether the pane's current command is one of the runtime's known agent
/// process names. A missing session is simply "not alive".
pub async fn is_agent_alive<M: Multiplexer>(
    mux: &M,
    name: &str,
    process_names: &[String],
) -> Result<bool, MuxError> {
    match mux.pane_current_command(name).await {
        Ok(command) => Ok(process_names.iter().any(|p| p == &command)),
        Err(MuxError::SessionNotFound(_)) | Err(MuxError::NoServer) => Ok(false),
        Err(e) => Err(e),
    }
}

const BYPASS_WARNING_MARKER: &str = "Bypassing Permissions";
const BYPASS_ACCEPT_MARKER: &str = "Yes, I accept";

/// Dismiss the agent's bypass-permissions warning dialog if it is on
/// screen. Best-effort: a session without the dialog is a no-op.
pub async fn accept_bypass_warning<M: Multiplexer>(mux: &M, name: &str) -> Result<(), MuxError> {
    let content = mux.capture_pane(name, 50).await?;
    if !content.contains(BYPASS_WARNING_MARKER) && !content.contains(BYPASS_ACCEPT_MARKER) {
        return Ok(());
    }
    // Arrow down to the accept option and confirm
    mux.send_raw_keys(name, &["Down", "Enter"]).await
}

#[cfg(test)]
#[path = "helpers_tests.rs"]
mod helpers_tests;
