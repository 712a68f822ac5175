// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Git CLI adapter.
//!
//! Gas Town never parses repository internals beyond `.git` gitdir files;
//! everything else goes through the git binary: cleanliness probes before
//! unhooking, default-branch discovery from bare repos, and worktree
//! re-creation by the doctor.

use crate::subprocess::{run_with_timeout, GIT_TIMEOUT};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::process::Command;

/// Errors from git invocations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GitError {
    #[error("git {op}: {detail}")]
    Failed { op: String, detail: String },
}

impl GitError {
    fn failed(op: &str, detail: impl Into<String>) -> Self {
        Self::Failed {
            op: op.to_string(),
            detail: detail.into(),
        }
    }
}

/// Cleanliness of a working tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorktreeStatus {
    /// Uncommitted changes (staged, unstaged, or untracked).
    pub dirty: bool,
    /// Commits ahead of the upstream branch; `None` when there is no
    /// upstream to compare against.
    pub unpushed: Option<u32>,
}

impl WorktreeStatus {
    /// Whether there is any work that would be lost by discarding the tree.
    pub fn has_partial_work(&self) -> bool {
        self.dirty || self.unpushed.unwrap_or(0) > 0
    }
}

/// Adapter over the git CLI.
#[async_trait]
pub trait GitCli: Clone + Send + Sync + 'static {
    /// Probe a working tree for uncommitted and unpushed work.
    async fn worktree_status(&self, path: &Path) -> Result<WorktreeStatus, GitError>;

    /// The default branch of a bare repository (`symbolic-ref HEAD`).
    async fn default_branch(&self, bare: &Path) -> Result<String, GitError>;

    /// Register and populate a worktree of `bare` at `path` on `branch`.
    async fn add_worktree(&self, bare: &Path, path: &Path, branch: &str) -> Result<(), GitError>;

    /// Drop stale worktree registrations from a bare repository.
    async fn prune_worktrees(&self, bare: &Path) -> Result<(), GitError>;

    /// Whether `file` is tracked in the repository containing `dir`.
    async fn is_tracked(&self, dir: &Path, file: &str) -> Result<bool, GitError>;

    /// Whether the clone at `dir` has `core.sparseCheckout` enabled.
    async fn sparse_checkout_enabled(&self, dir: &Path) -> Result<bool, GitError>;

    /// Disable sparse checkout and materialize the masked paths.
    async fn disable_sparse_checkout(&self, dir: &Path) -> Result<(), GitError>;
}

/// Real adapter shelling out to `git`.
#[derive(Clone, Default)]
pub struct SystemGitCli;

impl SystemGitCli {
    pub fn new() -> Self {
        Self
    }

    async fn run(&self, op: &str, dir: Option<&Path>, args: &[&str]) -> Result<String, GitError> {
        let mut cmd = Command::new("git");
        if let Some(dir) = dir {
            cmd.arg("-C").arg(dir);
        }
        cmd.args(args);
        let output = run_with_timeout(cmd, GIT_TIMEOUT, op)
            .await
            .map_err(|detail| GitError::failed(op, detail))?;
        if !output.status.success() {
            return Err(GitError::failed(
                op,
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

#[async_trait]
impl GitCli for SystemGitCli {
    async fn worktree_status(&self, path: &Path) -> Result<WorktreeStatus, GitError> {
        let porcelain = self
            .run("status", Some(path), &["status", "--porcelain"])
            .await?;
        let dirty = !porcelain.trim().is_empty();

        // No upstream is a normal condition for a fresh polecat branch
        let unpushed = match self
            .run(
                "rev-list",
                Some(path),
                &["rev-list", "--count", "@{upstream}..HEAD"],
            )
            .await
        {
            Ok(count) => count.trim().parse::<u32>().ok(),
            Err(_) => None,
        };

        Ok(WorktreeStatus { dirty, unpushed })
    }

    async fn default_branch(&self, bare: &Path) -> Result<String, GitError> {
        let bare_arg = bare.display().to_string();
        let stdout = self
            .run(
                "symbolic-ref",
                None,
                &[
                    "--git-dir",
                    &bare_arg,
                    "symbolic-ref",
                    "--short",
                    "HEAD",
                ],
            )
            .await?;
        let branch = stdout.trim().to_string();
        if branch.is_empty() {
            return Err(GitError::failed("symbolic-ref", "empty HEAD"));
        }
        Ok(branch)
    }

    async fn add_worktree(&self, bare: &Path, path: &Path, branch: &str) -> Result<(), GitError> {
        let bare_arg = bare.display().to_string();
        let path_arg = path.display().to_string();
        self.run(
            "worktree-add",
            None,
            &[
                "--git-dir",
                &bare_arg,
                "worktree",
                "add",
                &path_arg,
                branch,
            ],
        )
        .await?;
        Ok(())
    }

    async fn prune_worktrees(&self, bare: &Path) -> Result<(), GitError> {
        let bare_arg = bare.display().to_string();
        self.run(
            "worktree-prune",
            None,
            &["--git-dir", &bare_arg, "worktree", "prune"],
        )
        .await?;
        Ok(())
    }

    async fn is_tracked(&self, dir: &Path, file: &str) -> Result<bool, GitError> {
        let mut cmd = Command::new("git");
        cmd.arg("-C")
            .arg(dir)
            .args(["ls-files", "--error-unmatch", file]);
        let output = run_with_timeout(cmd, GIT_TIMEOUT, "ls-files")
            .await
            .map_err(|detail| GitError::failed("ls-files", detail))?;
        Ok(output.status.success())
    }

    async fn sparse_checkout_enabled(&self, dir: &Path) -> Result<bool, GitError> {
        let mut cmd = Command::new("git");
        cmd.arg("-C")
            .arg(dir)
            .args(["config", "--bool", "core.sparseCheckout"]);
        let output = run_with_timeout(cmd, GIT_TIMEOUT, "config")
            .await
            .map_err(|detail| GitError::failed("config", detail))?;
        // Unset key exits non-zero; that reads as "not sparse"
        if !output.status.success() {
            return Ok(false);
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim() == "true")
    }

    async fn disable_sparse_checkout(&self, dir: &Path) -> Result<(), GitError> {
        self.run(
            "sparse-checkout",
            Some(dir),
            &["sparse-checkout", "disable"],
        )
        .await?;
        Ok(())
    }
}

/// Parse a worktree `.git` file (`gitdir: <path>`) into the target path.
pub fn parse_gitdir_file(content: &str) -> Option<PathBuf> {
    let line = content.lines().next()?;
    let path = line.strip_prefix("gitdir:")?.trim();
    if path.is_empty() {
        return None;
    }
    Some(PathBuf::from(path))
}

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;
