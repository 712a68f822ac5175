// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake CLI adapters for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use crate::beads::{AgentBead, BeadsCli, BeadsError, HookedBead};
use crate::convoy::{ConvoyCheck, ConvoyCli, ConvoyError, StrandedConvoy};
use crate::git::{GitCli, GitError, WorktreeStatus};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Scripted beads CLI. Serves the configured listings and records
/// mutations for assertions.
#[derive(Clone, Default)]
pub struct FakeBeads {
    inner: Arc<Mutex<FakeBeadsState>>,
}

#[derive(Default)]
struct FakeBeadsState {
    hooked: Vec<HookedBead>,
    agent_beads: Vec<AgentBead>,
    status_updates: Vec<(String, String)>,
    created: Vec<String>,
    labels_added: Vec<(String, String)>,
    closed: Vec<(String, String)>,
    fail_with: Option<String>,
    next_id: u32,
}

impl FakeBeads {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_hooked(&self, bead: HookedBead) {
        self.inner.lock().hooked.push(bead);
    }

    pub fn push_agent_bead(&self, bead: AgentBead) {
        self.inner.lock().agent_beads.push(bead);
    }

    /// Make every call fail with the given detail.
    pub fn fail_with(&self, detail: &str) {
        self.inner.lock().fail_with = Some(detail.to_string());
    }

    pub fn status_updates(&self) -> Vec<(String, String)> {
        self.inner.lock().status_updates.clone()
    }

    pub fn created(&self) -> Vec<String> {
        self.inner.lock().created.clone()
    }

    pub fn labels_added(&self) -> Vec<(String, String)> {
        self.inner.lock().labels_added.clone()
    }

    pub fn closed(&self) -> Vec<(String, String)> {
        self.inner.lock().closed.clone()
    }

    fn check_fail(&self, op: &str) -> Result<(), BeadsError> {
        match &self.inner.lock().fail_with {
            Some(detail) => Err(BeadsError::Failed {
                op: op.to_string(),
                detail: detail.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl BeadsCli for FakeBeads {
    async fn list_hooked(&self) -> Result<Vec<HookedBead>, BeadsError> {
        self.check_fail("list")?;
        Ok(self.inner.lock().hooked.clone())
    }

    async fn set_status(&self, id: &str, status: &str) -> Result<(), BeadsError> {
        self.check_fail("update")?;
        self.inner
            .lock()
            .status_updates
            .push((id.to_string(), status.to_string()));
        Ok(())
    }

    async fn list_agent_beads(&self) -> Result<Vec<AgentBead>, BeadsError> {
        self.check_fail("list")?;
        Ok(self.inner.lock().agent_beads.clone())
    }

    async fn create_agent_bead(&self, path_address: &str) -> Result<String, BeadsError> {
        self.check_fail("create")?;
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let id = format!("fake-{}", inner.next_id);
        inner.created.push(path_address.to_string());
        Ok(id)
    }

    async fn add_label(&self, id: &str, label: &str) -> Result<(), BeadsError> {
        self.check_fail("update")?;
        self.inner
            .lock()
            .labels_added
            .push((id.to_string(), label.to_string()));
        Ok(())
    }

    async fn close(&self, id: &str, reason: &str) -> Result<(), BeadsError> {
        self.check_fail("close")?;
        self.inner
            .lock()
            .closed
            .push((id.to_string(), reason.to_string()));
        Ok(())
    }
}

/// Scripted git CLI keyed by worktree path.
#[derive(Clone, Default)]
pub struct FakeGit {
    inner: Arc<Mutex<FakeGitState>>,
}

#[derive(Default)]
struct FakeGitState {
    statuses: BTreeMap<PathBuf, WorktreeStatus>,
    status_errors: BTreeMap<PathBuf, String>,
    default_branches: BTreeMap<PathBuf, String>,
    tracked: Vec<(PathBuf, String)>,
    sparse: Vec<PathBuf>,
    added_worktrees: Vec<(PathBuf, PathBuf, String)>,
    pruned: Vec<PathBuf>,
    sparse_disabled: Vec<PathBuf>,
}

impl FakeGit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&self, path: &Path, status: WorktreeStatus) {
        self.inner
            .lock()
            .statuses
            .insert(path.to_path_buf(), status);
    }

    /// Make status probes of `path` fail (simulates a broken worktree).
    pub fn set_status_error(&self, path: &Path, detail: &str) {
        self.inner
            .lock()
            .status_errors
            .insert(path.to_path_buf(), detail.to_string());
    }

    pub fn set_default_branch(&self, bare: &Path, branch: &str) {
        self.inner
            .lock()
            .default_branches
            .insert(bare.to_path_buf(), branch.to_string());
    }

    pub fn set_tracked(&self, dir: &Path, file: &str) {
        self.inner
            .lock()
            .tracked
            .push((dir.to_path_buf(), file.to_string()));
    }

    pub fn set_sparse(&self, dir: &Path) {
        self.inner.lock().sparse.push(dir.to_path_buf());
    }

    pub fn added_worktrees(&self) -> Vec<(PathBuf, PathBuf, String)> {
        self.inner.lock().added_worktrees.clone()
    }

    pub fn sparse_disabled(&self) -> Vec<PathBuf> {
        self.inner.lock().sparse_disabled.clone()
    }
}

#[async_trait]
impl GitCli for FakeGit {
    async fn worktree_status(&self, path: &Path) -> Result<WorktreeStatus, GitError> {
        let inner = self.inner.lock();
        if let Some(detail) = inner.status_errors.get(path) {
            return Err(GitError::Failed {
                op: "status".to_string(),
                detail: detail.clone(),
            });
        }
        Ok(inner.statuses.get(path).cloned().unwrap_or_default())
    }

    async fn default_branch(&self, bare: &Path) -> Result<String, GitError> {
        self.inner
            .lock()
            .default_branches
            .get(bare)
            .cloned()
            .ok_or_else(|| GitError::Failed {
                op: "symbolic-ref".to_string(),
                detail: format!("no such bare repo: {}", bare.display()),
            })
    }

    async fn add_worktree(&self, bare: &Path, path: &Path, branch: &str) -> Result<(), GitError> {
        self.inner.lock().added_worktrees.push((
            bare.to_path_buf(),
            path.to_path_buf(),
            branch.to_string(),
        ));
        Ok(())
    }

    async fn prune_worktrees(&self, bare: &Path) -> Result<(), GitError> {
        self.inner.lock().pruned.push(bare.to_path_buf());
        Ok(())
    }

    async fn is_tracked(&self, dir: &Path, file: &str) -> Result<bool, GitError> {
        Ok(self
            .inner
            .lock()
            .tracked
            .iter()
            .any(|(d, f)| d == dir && f == file))
    }

    async fn sparse_checkout_enabled(&self, dir: &Path) -> Result<bool, GitError> {
        Ok(self.inner.lock().sparse.iter().any(|d| d == dir))
    }

    async fn disable_sparse_checkout(&self, dir: &Path) -> Result<(), GitError> {
        let mut inner = self.inner.lock();
        inner.sparse.retain(|d| d != dir);
        inner.sparse_disabled.push(dir.to_path_buf());
        Ok(())
    }
}

/// Scripted convoy CLI.
#[derive(Clone, Default)]
pub struct FakeConvoys {
    inner: Arc<Mutex<FakeConvoysState>>,
}

#[derive(Default)]
struct FakeConvoysState {
    stranded: Vec<StrandedConvoy>,
    checked: Vec<String>,
    fed: Vec<String>,
    slung_beads: Vec<(String, String)>,
    check_closes: bool,
    fail_sling: Option<String>,
}

impl FakeConvoys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_stranded(&self, convoy: StrandedConvoy) {
        self.inner.lock().stranded.push(convoy);
    }

    /// Whether `check` reports convoys as closed (default: false).
    pub fn set_check_closes(&self, closes: bool) {
        self.inner.lock().check_closes = closes;
    }

    pub fn fail_sling(&self, detail: &str) {
        self.inner.lock().fail_sling = Some(detail.to_string());
    }

    pub fn checked(&self) -> Vec<String> {
        self.inner.lock().checked.clone()
    }

    pub fn fed(&self) -> Vec<String> {
        self.inner.lock().fed.clone()
    }

    pub fn slung_beads(&self) -> Vec<(String, String)> {
        self.inner.lock().slung_beads.clone()
    }
}

#[async_trait]
impl ConvoyCli for FakeConvoys {
    async fn list_stranded(&self) -> Result<Vec<StrandedConvoy>, ConvoyError> {
        Ok(self.inner.lock().stranded.clone())
    }

    async fn check(&self, id: &str) -> Result<ConvoyCheck, ConvoyError> {
        let mut inner = self.inner.lock();
        inner.checked.push(id.to_string());
        Ok(ConvoyCheck {
            closed: inner.check_closes,
        })
    }

    async fn sling_feed(&self, id: &str) -> Result<(), ConvoyError> {
        let mut inner = self.inner.lock();
        if let Some(detail) = &inner.fail_sling {
            return Err(ConvoyError::Failed {
                op: "sling".to_string(),
                detail: detail.clone(),
            });
        }
        inner.fed.push(id.to_string());
        Ok(())
    }

    async fn sling_bead(&self, bead_id: &str, rig: &str) -> Result<(), ConvoyError> {
        let mut inner = self.inner.lock();
        if let Some(detail) = &inner.fail_sling {
            return Err(ConvoyError::Failed {
                op: "sling".to_string(),
                detail: detail.clone(),
            });
        }
        inner
            .slung_beads
            .push((bead_id.to_string(), rig.to_string()));
        Ok(())
    }
}
