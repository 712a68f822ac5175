// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The on-disk town layout.
//!
//! ```text
//! <townRoot>/
//!   .beads/routes.jsonl
//!   .runtime/pids/<sessionID>.pid
//!   .runtime/deacon/paused.json
//!   mayor/rigs.json
//!   deacon/feed-stranded-state.json
//!   deacon/redispatch-state.json
//!   <rig>/.repo.git/
//!   <rig>/.beads/
//!   <rig>/refinery/rig/
//!   <rig>/witness/rig/
//!   <rig>/polecats/<name>/<rig>/
//!   <rig>/crew/<name>/
//! ```
//!
//! Every path the supervisor touches is derived here so the layout exists
//! in exactly one place.

use std::path::{Path, PathBuf};

/// Errors locating a town.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TownError {
    #[error("no town root found above {0} (missing mayor/rigs.json)")]
    NotFound(PathBuf),
}

/// Handle to a town root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Town {
    root: PathBuf,
}

impl Town {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Walk upward from `start` looking for a directory containing
    /// `mayor/rigs.json`.
    pub fn discover(start: &Path) -> Result<Self, TownError> {
        let mut dir = Some(start);
        while let Some(candidate) = dir {
            if candidate.join("mayor").join("rigs.json").is_file() {
                return Ok(Self::new(candidate));
            }
            dir = candidate.parent();
        }
        Err(TownError::NotFound(start.to_path_buf()))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn runtime_dir(&self) -> PathBuf {
        self.root.join(".runtime")
    }

    pub fn pids_dir(&self) -> PathBuf {
        self.runtime_dir().join("pids")
    }

    pub fn pid_file(&self, session_id: &str) -> PathBuf {
        self.pids_dir().join(format!("{session_id}.pid"))
    }

    pub fn paused_path(&self) -> PathBuf {
        self.runtime_dir().join("deacon").join("paused.json")
    }

    pub fn deacon_dir(&self) -> PathBuf {
        self.root.join("deacon")
    }

    pub fn feed_state_path(&self) -> PathBuf {
        self.deacon_dir().join("feed-stranded-state.json")
    }

    pub fn redispatch_state_path(&self) -> PathBuf {
        self.deacon_dir().join("redispatch-state.json")
    }

    pub fn routes_path(&self) -> PathBuf {
        self.root.join(".beads").join("routes.jsonl")
    }

    pub fn rigs_path(&self) -> PathBuf {
        self.root.join("mayor").join("rigs.json")
    }

    pub fn rig_dir(&self, rig: &str) -> PathBuf {
        self.root.join(rig)
    }

    /// The rig's bare repository; all worktrees point into it.
    pub fn bare_repo_dir(&self, rig: &str) -> PathBuf {
        self.rig_dir(rig).join(".repo.git")
    }

    pub fn beads_dir(&self, rig: &str) -> PathBuf {
        self.rig_dir(rig).join(".beads")
    }

    pub fn beads_metadata_path(&self, rig: &str) -> PathBuf {
        self.beads_dir(rig).join("metadata.json")
    }

    /// Where the storage server keeps its per-rig databases.
    pub fn storage_data_dir(&self) -> PathBuf {
        self.root.join(".dolt-data")
    }

    pub fn witness_worktree(&self, rig: &str) -> PathBuf {
        self.rig_dir(rig).join("witness").join("rig")
    }

    pub fn refinery_worktree(&self, rig: &str) -> PathBuf {
        self.rig_dir(rig).join("refinery").join("rig")
    }

    /// Polecat worktrees nest the rig name once more:
    /// `<rig>/polecats/<name>/<rig>`.
    pub fn polecat_worktree(&self, rig: &str, name: &str) -> PathBuf {
        self.rig_dir(rig).join("polecats").join(name).join(rig)
    }

    pub fn polecat_dir(&self, rig: &str, name: &str) -> PathBuf {
        self.rig_dir(rig).join("polecats").join(name)
    }

    pub fn crew_worktree(&self, rig: &str, name: &str) -> PathBuf {
        self.rig_dir(rig).join("crew").join(name)
    }

    /// Where an identity's working tree lives, when it has one.
    pub fn worktree_for(&self, identity: &crate::Identity) -> Option<PathBuf> {
        use crate::Role;
        let rig = identity.rig.as_deref()?;
        match identity.role {
            Role::Witness => Some(self.witness_worktree(rig)),
            Role::Refinery => Some(self.refinery_worktree(rig)),
            Role::Polecat => Some(self.polecat_worktree(rig, identity.name.as_deref()?)),
            Role::Crew => Some(self.crew_worktree(rig, identity.name.as_deref()?)),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "town_tests.rs"]
mod tests;
