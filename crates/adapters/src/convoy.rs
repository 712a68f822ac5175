// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Convoy operations via the `gt` dispatcher.
//!
//! The deacon's patrols re-enter the workspace CLI for convoy listing,
//! empty-convoy closure, and feed-dog dispatch, rather than reimplementing
//! the convoy queries against the issue database.

use crate::subprocess::{run_with_timeout, GT_CLI_TIMEOUT};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;
use tokio::process::Command;

/// Errors from `gt` invocations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvoyError {
    #[error("gt {op}: {detail}")]
    Failed { op: String, detail: String },
    #[error("gt {op}: unparseable output: {detail}")]
    Parse { op: String, detail: String },
}

/// A convoy with ready work and no live owner.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StrandedConvoy {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub ready_count: u32,
    #[serde(default)]
    pub ready_issues: Vec<String>,
}

/// Outcome of `gt convoy check`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConvoyCheck {
    #[serde(default)]
    pub closed: bool,
}

/// Adapter over `gt` convoy operations.
#[async_trait]
pub trait ConvoyCli: Clone + Send + Sync + 'static {
    async fn list_stranded(&self) -> Result<Vec<StrandedConvoy>, ConvoyError>;

    /// Re-evaluate a convoy, closing it if it has no remaining work.
    async fn check(&self, id: &str) -> Result<ConvoyCheck, ConvoyError>;

    /// Dispatch a feed dog for the convoy.
    async fn sling_feed(&self, id: &str) -> Result<(), ConvoyError>;

    /// Sling a recovered bead back onto a rig's polecats.
    async fn sling_bead(&self, bead_id: &str, rig: &str) -> Result<(), ConvoyError>;
}

/// Real adapter shelling out to `gt`.
#[derive(Clone)]
pub struct GtConvoyCli {
    town_root: PathBuf,
}

impl GtConvoyCli {
    pub fn new(town_root: impl Into<PathBuf>) -> Self {
        Self {
            town_root: town_root.into(),
        }
    }

    async fn run(&self, op: &str, args: &[&str]) -> Result<String, ConvoyError> {
        let mut cmd = Command::new("gt");
        cmd.args(args).current_dir(&self.town_root);
        let output = run_with_timeout(cmd, GT_CLI_TIMEOUT, op)
            .await
            .map_err(|detail| ConvoyError::Failed {
                op: op.to_string(),
                detail,
            })?;
        if !output.status.success() {
            return Err(ConvoyError::Failed {
                op: op.to_string(),
                detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

#[async_trait]
impl ConvoyCli for GtConvoyCli {
    async fn list_stranded(&self) -> Result<Vec<StrandedConvoy>, ConvoyError> {
        let stdout = self
            .run("convoy-stranded", &["convoy", "stranded", "--json"])
            .await?;
        serde_json::from_str(&stdout).map_err(|e| ConvoyError::Parse {
            op: "convoy-stranded".to_string(),
            detail: e.to_string(),
        })
    }

    async fn check(&self, id: &str) -> Result<ConvoyCheck, ConvoyError> {
        let stdout = self
            .run("convoy-check", &["convoy", "check", id, "--json"])
            .await?;
        serde_json::from_str(&stdout).map_err(|e| ConvoyError::Parse {
            op: "convoy-check".to_string(),
            detail: e.to_string(),
        })
    }

    async fn sling_feed(&self, id: &str) -> Result<(), ConvoyError> {
        let var = format!("convoy={id}");
        self.run(
            "sling",
            &[
                "sling",
                "mol-convoy-feed",
                "deacon/dogs",
                "--var",
                &var,
            ],
        )
        .await?;
        Ok(())
    }

    async fn sling_bead(&self, bead_id: &str, rig: &str) -> Result<(), ConvoyError> {
        self.run("sling", &["sling", bead_id, rig]).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "convoy_tests.rs"]
mod tests;
