// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tmux implementation of the multiplexer adapter.

use super::{Multiplexer, MuxError};
use crate::process;
use crate::subprocess::{run_with_timeout, TMUX_TIMEOUT};
use async_trait::async_trait;
use std::path::Path;
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;
use tracing::warn;

/// Delay between pasting literal text and pressing Enter, so the agent's
/// input handling does not swallow the newline.
const SEND_KEYS_DEBOUNCE: Duration = Duration::from_millis(100);

/// Tmux-backed multiplexer adapter.
#[derive(Clone, Default)]
pub struct TmuxMux;

impl TmuxMux {
    pub fn new() -> Self {
        Self
    }

    async fn run(&self, op: &'static str, args: &[&str]) -> Result<Output, MuxError> {
        let mut cmd = Command::new("tmux");
        cmd.args(args);
        run_with_timeout(cmd, TMUX_TIMEOUT, op)
            .await
            .map_err(|detail| MuxError::Failed { op, detail })
    }

    /// Run a tmux subcommand and classify a non-zero exit from stderr.
    async fn run_checked(&self, op: &'static str, args: &[&str]) -> Result<Output, MuxError> {
        let output = self.run(op, args).await?;
        if output.status.success() {
            return Ok(output);
        }
        Err(classify(op, &String::from_utf8_lossy(&output.stderr)))
    }
}

/// Map tmux stderr onto the error taxonomy.
fn classify(op: &'static str, stderr: &str) -> MuxError {
    let lower = stderr.to_lowercase();
    if lower.contains("no server running") || lower.contains("error connecting to") {
        return MuxError::NoServer;
    }
    if lower.contains("duplicate session") {
        return MuxError::SessionExists(stderr.trim().to_string());
    }
    if lower.contains("can't find session")
        || lower.contains("session not found")
        || lower.contains("no such session")
    {
        return MuxError::SessionNotFound(stderr.trim().to_string());
    }
    MuxError::Failed {
        op,
        detail: stderr.trim().to_string(),
    }
}

/// Exact-match target for `-t`. The leading `=` disables tmux's
/// prefix matching.
fn target(name: &str) -> String {
    format!("={name}")
}

#[async_trait]
impl Multiplexer for TmuxMux {
    async fn has_session(&self, name: &str) -> Result<bool, MuxError> {
        let output = self
            .run("has-session", &["has-session", "-t", &target(name)])
            .await?;
        if output.status.success() {
            return Ok(true);
        }
        match classify("has-session", &String::from_utf8_lossy(&output.stderr)) {
            MuxError::NoServer | MuxError::SessionNotFound(_) => Ok(false),
            err => Err(err),
        }
    }

    async fn list_sessions(&self) -> Result<Vec<String>, MuxError> {
        let output = self
            .run(
                "list-sessions",
                &["list-sessions", "-F", "#{session_name}"],
            )
            .await?;
        if !output.status.success() {
            return match classify("list-sessions", &String::from_utf8_lossy(&output.stderr)) {
                MuxError::NoServer => Ok(Vec::new()),
                err => Err(err),
            };
        }
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(|l| l.to_string())
            .filter(|l| !l.is_empty())
            .collect())
    }

    async fn new_session_with_command(
        &self,
        name: &str,
        workdir: &Path,
        cmd: &str,
    ) -> Result<(), MuxError> {
        if !workdir.exists() {
            return Err(MuxError::failed(
                "new-session",
                format!("working directory does not exist: {}", workdir.display()),
            ));
        }
        let workdir = workdir.display().to_string();
        self.run_checked(
            "new-session",
            &["new-session", "-d", "-s", name, "-c", &workdir, cmd],
        )
        .await?;
        Ok(())
    }

    async fn kill_session(&self, name: &str) -> Result<(), MuxError> {
        let output = self
            .run("kill-session", &["kill-session", "-t", &target(name)])
            .await?;
        if output.status.success() {
            return Ok(());
        }
        match classify("kill-session", &String::from_utf8_lossy(&output.stderr)) {
            // Already gone is success for a kill
            MuxError::NoServer | MuxError::SessionNotFound(_) => Ok(()),
            err => Err(err),
        }
    }

    async fn kill_session_with_processes(&self, name: &str) -> Result<(), MuxError> {
        // Gather the pane's descendants first; tmux only signals the pane
        // process itself, and a shell's children survive the HUP.
        let descendants = match self.pane_pid(name).await {
            Ok(pid) => collect_descendants(pid).await,
            Err(MuxError::SessionNotFound(_)) | Err(MuxError::NoServer) => Vec::new(),
            Err(e) => {
                warn!(session = name, error = %e, "pane pid lookup failed before kill");
                Vec::new()
            }
        };

        self.kill_session(name).await?;

        for pid in descendants {
            if process::pid_alive(pid) {
                if let Err(e) = process::terminate(pid) {
                    warn!(pid, error = %e, "failed to terminate descendant");
                }
            }
        }
        Ok(())
    }

    async fn set_remain_on_exit(&self, name: &str, on: bool) -> Result<(), MuxError> {
        let value = if on { "on" } else { "off" };
        self.run_checked(
            "set-option",
            &["set-option", "-t", &target(name), "remain-on-exit", value],
        )
        .await?;
        Ok(())
    }

    async fn set_auto_respawn_hook(&self, name: &str) -> Result<(), MuxError> {
        self.run_checked(
            "set-hook",
            &[
                "set-hook",
                "-t",
                &target(name),
                "pane-died",
                "respawn-pane -k",
            ],
        )
        .await?;
        Ok(())
    }

    async fn set_environment(&self, name: &str, key: &str, value: &str) -> Result<(), MuxError> {
        self.run_checked(
            "set-environment",
            &["set-environment", "-t", &target(name), key, value],
        )
        .await?;
        Ok(())
    }

    async fn show_environment(&self, name: &str) -> Result<Vec<(String, String)>, MuxError> {
        let output = self
            .run_checked(
                "show-environment",
                &["show-environment", "-t", &target(name)],
            )
            .await?;
        let mut env = Vec::new();
        for line in String::from_utf8_lossy(&output.stdout).lines() {
            // Lines starting with '-' mark variables unset for the session
            if line.starts_with('-') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                env.push((key.to_string(), value.to_string()));
            }
        }
        Ok(env)
    }

    async fn send_keys(&self, name: &str, text: &str) -> Result<(), MuxError> {
        // -l = literal mode, -- = end of options (text may start with -)
        self.run_checked(
            "send-keys",
            &["send-keys", "-t", &target(name), "-l", "--", text],
        )
        .await?;
        tokio::time::sleep(SEND_KEYS_DEBOUNCE).await;
        self.run_checked("send-keys", &["send-keys", "-t", &target(name), "Enter"])
            .await?;
        Ok(())
    }

    async fn send_raw_keys(&self, name: &str, keys: &[&str]) -> Result<(), MuxError> {
        let mut args = vec!["send-keys", "-t"];
        let t = target(name);
        args.push(&t);
        args.extend_from_slice(keys);
        self.run_checked("send-keys", &args).await?;
        Ok(())
    }

    async fn pane_pid(&self, name: &str) -> Result<i32, MuxError> {
        let output = self
            .run_checked(
                "list-panes",
                &["list-panes", "-t", &target(name), "-F", "#{pane_pid}"],
            )
            .await?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let first = stdout.lines().next().unwrap_or("").trim();
        first.parse::<i32>().map_err(|_| {
            MuxError::failed("list-panes", format!("unparseable pane pid {first:?}"))
        })
    }

    async fn pane_current_command(&self, name: &str) -> Result<String, MuxError> {
        let output = self
            .run_checked(
                "display-message",
                &[
                    "display-message",
                    "-p",
                    "-t",
                    &target(name),
                    "#{pane_current_command}",
                ],
            )
            .await?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn capture_pane(&self, name: &str, lines: u32) -> Result<String, MuxError> {
        let start = format!("-{lines}");
        let output = self
            .run_checked(
                "capture-pane",
                &["capture-pane", "-p", "-t", &target(name), "-S", &start],
            )
            .await?;
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    async fn rename_session(&self, from: &str, to: &str) -> Result<(), MuxError> {
        self.run_checked(
            "rename-session",
            &["rename-session", "-t", &target(from), to],
        )
        .await?;
        Ok(())
    }

    async fn set_option(&self, name: &str, option: &str, value: &str) -> Result<(), MuxError> {
        self.run_checked(
            "set-option",
            &["set-option", "-t", &target(name), option, value],
        )
        .await?;
        Ok(())
    }
}

/// Walk `pgrep -P` to gather the descendant pids of `root`, depth-first.
async fn collect_descendants(root: i32) -> Vec<i32> {
    let mut all = Vec::new();
    let mut frontier = vec![root];
    while let Some(pid) = frontier.pop() {
        let output = Command::new("pgrep")
            .args(["-P", &pid.to_string()])
            .output()
            .await;
        let Ok(output) = output else {
            break;
        };
        for line in String::from_utf8_lossy(&output.stdout).lines() {
            if let Ok(child) = line.trim().parse::<i32>() {
                all.push(child);
                frontier.push(child);
            }
        }
    }
    all
}

#[cfg(test)]
#[path = "tmux_tests.rs"]
mod tests;
