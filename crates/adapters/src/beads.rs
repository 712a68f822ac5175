// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Beads (issue database) CLI adapter.
//!
//! All invocations run from the town root so the CLI's prefix routing file
//! resolves issue ids to the right rig database. `BEADS_DIR` is explicitly
//! scrubbed from the child environment; setting it bypasses routing.

use crate::subprocess::{run_with_timeout, BEADS_TIMEOUT};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;
use tokio::process::Command;

/// Label that marks an issue as an agent's identity record.
pub const AGENT_LABEL: &str = "gt:agent";

/// Errors from beads CLI invocations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BeadsError {
    #[error("bd {op}: {detail}")]
    Failed { op: String, detail: String },
    #[error("bd {op}: unparseable output: {detail}")]
    Parse { op: String, detail: String },
}

/// A bead currently assigned to an agent (status `hooked`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HookedBead {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub assignee: String,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// An agent-identity bead.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AgentBead {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub assignee: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub status: String,
}

/// Adapter over the beads issue-database CLI.
#[async_trait]
pub trait BeadsCli: Clone + Send + Sync + 'static {
    /// All beads in status `hooked`, town-wide.
    async fn list_hooked(&self) -> Result<Vec<HookedBead>, BeadsError>;

    /// Reset a bead's status (e.g. back to `open` when unhooking).
    async fn set_status(&self, id: &str, status: &str) -> Result<(), BeadsError>;

    /// All agent-identity beads (label `gt:agent`), town-wide.
    async fn list_agent_beads(&self) -> Result<Vec<AgentBead>, BeadsError>;

    /// Create an agent bead for the given path address; returns the id.
    async fn create_agent_bead(&self, path_address: &str) -> Result<String, BeadsError>;

    /// Add a label to an existing bead.
    async fn add_label(&self, id: &str, label: &str) -> Result<(), BeadsError>;

    /// Close a bead with a reason.
    async fn close(&self, id: &str, reason: &str) -> Result<(), BeadsError>;
}

/// Real adapter shelling out to `bd`.
#[derive(Clone)]
pub struct BdCli {
    town_root: PathBuf,
}

impl BdCli {
    pub fn new(town_root: impl Into<PathBuf>) -> Self {
        Self {
            town_root: town_root.into(),
        }
    }

    async fn run(&self, op: &str, args: &[&str]) -> Result<String, BeadsError> {
        let mut cmd = Command::new("bd");
        cmd.args(args)
            .current_dir(&self.town_root)
            .env_remove("BEADS_DIR");
        let output = run_with_timeout(cmd, BEADS_TIMEOUT, op)
            .await
            .map_err(|detail| BeadsError::Failed {
                op: op.to_string(),
                detail,
            })?;
        if !output.status.success() {
            return Err(BeadsError::Failed {
                op: op.to_string(),
                detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn parse<T: serde::de::DeserializeOwned>(op: &str, stdout: &str) -> Result<T, BeadsError> {
        serde_json::from_str(stdout).map_err(|e| BeadsError::Parse {
            op: op.to_string(),
            detail: e.to_string(),
        })
    }
}

#[async_trait]
impl BeadsCli for BdCli {
    async fn list_hooked(&self) -> Result<Vec<HookedBead>, BeadsError> {
        let stdout = self
            .run("list", &["list", "--status=hooked", "--json"])
            .await?;
        Self::parse("list", &stdout)
    }

    async fn set_status(&self, id: &str, status: &str) -> Result<(), BeadsError> {
        let status_arg = format!("--status={status}");
        self.run("update", &["update", id, &status_arg]).await?;
        Ok(())
    }

    async fn list_agent_beads(&self) -> Result<Vec<AgentBead>, BeadsError> {
        let label_arg = format!("--label={AGENT_LABEL}");
        let stdout = self.run("list", &["list", &label_arg, "--json"]).await?;
        Self::parse("list", &stdout)
    }

    async fn create_agent_bead(&self, path_address: &str) -> Result<String, BeadsError> {
        let title = format!("Agent: {path_address}");
        let label_arg = format!("--add-label={AGENT_LABEL}");
        let assignee_arg = format!("--assignee={path_address}");
        let stdout = self
            .run(
                "create",
                &["create", &title, &label_arg, &assignee_arg, "--json"],
            )
            .await?;

        #[derive(Deserialize)]
        struct Created {
            id: String,
        }
        let created: Created = Self::parse("create", &stdout)?;
        Ok(created.id)
    }

    async fn add_label(&self, id: &str, label: &str) -> Result<(), BeadsError> {
        let label_arg = format!("--add-label={label}");
        self.run("update", &["update", id, &label_arg]).await?;
        Ok(())
    }

    async fn close(&self, id: &str, reason: &str) -> Result<(), BeadsError> {
        self.run("close", &["close", id, "--reason", reason]).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "beads_tests.rs"]
mod tests;
