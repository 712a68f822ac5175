// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent runtime profiles.
//!
//! A runtime profile describes how to launch one kind of agent binary and
//! how to recognise it once running. The session engine treats the record
//! as opaque configuration; adding an agent means adding a profile here.

use crate::error::EngineError;
use gt_core::Role;
use std::time::Duration;

/// Resolved launch configuration for one agent kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRuntime {
    pub id: &'static str,
    /// The binary the pane runs.
    pub binary: &'static str,
    /// Whether the agent runs SessionStart hooks (beacons for hookless
    /// agents carry an explicit prime instruction instead).
    pub supports_hooks: bool,
    /// Flag that resumes a previous conversation.
    pub resume_flag: &'static str,
    /// Pane commands that mean "the agent is alive".
    pub process_names: &'static [&'static str],
    /// Settle time after the agent process appears.
    pub ready_delay: Duration,
    /// Optional prompt prefix for bootstrap prompt detection.
    pub prompt_prefix: Option<&'static str>,
    /// Directory (relative to the session workdir) holding settings.
    pub settings_dir: &'static str,
    pub settings_file: &'static str,
    /// Environment variable pointing the agent at its settings directory.
    pub config_dir_env: Option<&'static str>,
    /// Settings written when none exist yet.
    pub default_settings: &'static str,
}

impl AgentRuntime {
    pub fn process_names_owned(&self) -> Vec<String> {
        self.process_names.iter().map(|s| s.to_string()).collect()
    }

    /// Render the launch command with the startup prompt as the agent's
    /// initial input.
    pub fn build_command(&self, prompt: &str) -> String {
        format!("{} {}", self.binary, shell_quote(prompt))
    }
}

const CLAUDE_DEFAULT_SETTINGS: &str = r#"{
  "permissions": {
    "defaultMode": "bypassPermissions"
  }
}
"#;

const CLAUDE: AgentRuntime = AgentRuntime {
    id: "claude",
    binary: "claude",
    supports_hooks: true,
    resume_flag: "--continue",
    process_names: &["claude", "node"],
    ready_delay: Duration::from_secs(2),
    prompt_prefix: None,
    settings_dir: ".claude",
    settings_file: "settings.json",
    config_dir_env: Some("CLAUDE_CONFIG_DIR"),
    default_settings: CLAUDE_DEFAULT_SETTINGS,
};

const CODEX: AgentRuntime = AgentRuntime {
    id: "codex",
    binary: "codex",
    supports_hooks: false,
    resume_flag: "resume",
    process_names: &["codex"],
    ready_delay: Duration::from_secs(3),
    prompt_prefix: Some("> "),
    settings_dir: ".codex",
    settings_file: "config.json",
    config_dir_env: Some("CODEX_HOME"),
    default_settings: "{}\n",
};

const RUNTIMES: &[&AgentRuntime] = &[&CLAUDE, &CODEX];

/// Resolve the runtime for a role, honoring an explicit override.
///
/// Every role currently defaults to the claude profile; the override
/// selects another registered runtime by id.
pub fn runtime_for(_role: Role, agent_override: Option<&str>) -> Result<AgentRuntime, EngineError> {
    match agent_override {
        None => Ok(CLAUDE.clone()),
        Some(id) => RUNTIMES
            .iter()
            .find(|r| r.id == id)
            .map(|r| (*r).clone())
            .ok_or_else(|| EngineError::UnknownRuntime(id.to_string())),
    }
}

/// Union of every registered runtime's process names; used when checking
/// liveness of a session whose runtime is unknown.
pub fn all_process_names() -> Vec<String> {
    let mut names: Vec<String> = RUNTIMES
        .iter()
        .flat_map(|r| r.process_names.iter().map(|s| s.to_string()))
        .collect();
    names.sort();
    names.dedup();
    names
}

/// Single-quote a string for a POSIX shell command line.
fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
