// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worktree integrity checks.
//!
//! Every agent working tree is a worktree of its rig's bare repo,
//! identified by a `.git` file containing `gitdir: <path>`. Two distinct
//! failure classes: the bare repo itself is gone (reinstall territory, no
//! auto-fix) and the worktree registration is gone (re-addable).

use crate::context::CheckContext;
use crate::framework::{Category, Check, CheckResult, DoctorError};
use async_trait::async_trait;
use gt_adapters::git::{parse_gitdir_file, GitCli};
use gt_core::Town;
use std::path::PathBuf;
use tracing::info;

/// All worktree directories a rig may have on disk.
pub fn rig_worktrees(town: &Town, rig: &str) -> Vec<PathBuf> {
    let mut trees = vec![town.witness_worktree(rig), town.refinery_worktree(rig)];

    let polecats = town.rig_dir(rig).join("polecats");
    if let Ok(entries) = std::fs::read_dir(&polecats) {
        for entry in entries.flatten() {
            if entry.path().is_dir() {
                trees.push(entry.path().join(rig));
            }
        }
    }
    let crew = town.rig_dir(rig).join("crew");
    if let Ok(entries) = std::fs::read_dir(&crew) {
        for entry in entries.flatten() {
            if entry.path().is_dir() {
                trees.push(entry.path());
            }
        }
    }
    trees
}

/// Why a worktree is broken.
#[derive(Debug, Clone, PartialEq, Eq)]
enum BrokenKind {
    /// The rig's bare repo is missing; only a reinstall helps.
    MissingBareRepo,
    /// The gitdir target under the bare repo is gone; re-addable.
    MissingWorktreeEntry,
    /// The `.git` file itself is unreadable.
    MalformedGitFile,
}

#[derive(Debug, Clone)]
struct BrokenWorktree {
    rig: String,
    path: PathBuf,
    kind: BrokenKind,
}

fn scan_broken(ctx: &CheckContext) -> Vec<BrokenWorktree> {
    let mut broken = Vec::new();
    for rig in ctx.rig_names() {
        let bare_exists = ctx.town.bare_repo_dir(&rig).is_dir();
        for tree in rig_worktrees(&ctx.town, &rig) {
            let git_file = tree.join(".git");
            if !git_file.is_file() {
                continue;
            }
            let Ok(content) = std::fs::read_to_string(&git_file) else {
                broken.push(BrokenWorktree {
                    rig: rig.clone(),
                    path: tree,
                    kind: BrokenKind::MalformedGitFile,
                });
                continue;
            };
            let Some(gitdir) = parse_gitdir_file(&content) else {
                broken.push(BrokenWorktree {
                    rig: rig.clone(),
                    path: tree,
                    kind: BrokenKind::MalformedGitFile,
                });
                continue;
            };
            if gitdir.is_dir() {
                continue;
            }
            let kind = if bare_exists {
                BrokenKind::MissingWorktreeEntry
            } else {
                BrokenKind::MissingBareRepo
            };
            broken.push(BrokenWorktree {
                rig: rig.clone(),
                path: tree,
                kind,
            });
        }
    }
    broken
}

/// `.git` files must point at live gitdirs.
pub struct WorktreeGitdirCheck<G: GitCli> {
    git: G,
    broken: Vec<BrokenWorktree>,
}

impl<G: GitCli> WorktreeGitdirCheck<G> {
    pub fn new(git: G) -> Self {
        Self {
            git,
            broken: Vec::new(),
        }
    }
}

#[async_trait]
impl<G: GitCli> Check for WorktreeGitdirCheck<G> {
    fn name(&self) -> &'static str {
        "worktree-gitdir"
    }

    fn description(&self) -> &'static str {
        "worktree .git files point at existing gitdirs"
    }

    fn category(&self) -> Category {
        Category::Worktrees
    }

    fn can_fix(&self) -> bool {
        true
    }

    async fn run(&mut self, ctx: &CheckContext) -> CheckResult {
        self.broken = scan_broken(ctx);
        if self.broken.is_empty() {
            return CheckResult::ok(self.name(), Category::Worktrees, "all gitdirs resolve");
        }

        let details: Vec<String> = self
            .broken
            .iter()
            .map(|b| {
                let kind = match b.kind {
                    BrokenKind::MissingBareRepo => "bare repo missing, reinstall the rig",
                    BrokenKind::MissingWorktreeEntry => "worktree entry missing, re-addable",
                    BrokenKind::MalformedGitFile => "unreadable .git file",
                };
                format!("{}: {}", b.path.display(), kind)
            })
            .collect();
        CheckResult::error(
            self.name(),
            Category::Worktrees,
            format!("{} broken worktree(s)", self.broken.len()),
        )
        .with_details(details)
        .with_fix_hint("gt doctor --fix re-adds worktrees whose bare repo survives")
    }

    async fn fix(&mut self, ctx: &CheckContext) -> Result<(), DoctorError> {
        if self.broken.is_empty() {
            self.broken = scan_broken(ctx);
        }

        let mut errors = Vec::new();
        for broken in &self.broken {
            // Only the re-addable class is safely fixable
            if broken.kind != BrokenKind::MissingWorktreeEntry {
                continue;
            }
            let bare = ctx.town.bare_repo_dir(&broken.rig);
            let result: Result<(), DoctorError> = async {
                let git_file = broken.path.join(".git");
                if git_file.is_file() {
                    std::fs::remove_file(&git_file).map_err(|e| {
                        DoctorError::io(format!("removing {}", git_file.display()), e)
                    })?;
                }
                self.git.prune_worktrees(&bare).await?;
                let branch = self.git.default_branch(&bare).await?;
                self.git.add_worktree(&bare, &broken.path, &branch).await?;
                info!(path = %broken.path.display(), "re-added worktree");
                Ok(())
            }
            .await;
            if let Err(e) = result {
                errors.push(format!("{}: {e}", broken.path.display()));
            }
        }
        self.broken.clear();
        DoctorError::join(errors)
    }
}

/// A worktree referencing a vanished bare repo is unrecoverable here.
#[derive(Default)]
pub struct BareRepoCheck;

impl BareRepoCheck {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Check for BareRepoCheck {
    fn name(&self) -> &'static str {
        "bare-repo"
    }

    fn description(&self) -> &'static str {
        "every worktree's bare repository exists"
    }

    fn category(&self) -> Category {
        Category::Worktrees
    }

    async fn run(&mut self, ctx: &CheckContext) -> CheckResult {
        let mut details = Vec::new();
        for rig in ctx.rig_names() {
            if ctx.town.bare_repo_dir(&rig).is_dir() {
                continue;
            }
            for tree in rig_worktrees(&ctx.town, &rig) {
                let git_file = tree.join(".git");
                let Ok(content) = std::fs::read_to_string(&git_file) else {
                    continue;
                };
                if content.contains(".repo.git") {
                    details.push(format!(
                        "{} references missing {}",
                        tree.display(),
                        ctx.town.bare_repo_dir(&rig).display()
                    ));
                }
            }
        }
        if details.is_empty() {
            CheckResult::ok(self.name(), Category::Worktrees, "bare repos present")
        } else {
            CheckResult::error(
                self.name(),
                Category::Worktrees,
                "worktrees reference missing bare repos",
            )
            .with_details(details)
            .with_fix_hint("reinstall the rig (gt rig add)")
        }
    }
}

/// Sparse-checkout clones are a legacy layout.
pub struct SparseCheckoutCheck<G: GitCli> {
    git: G,
    sparse: Vec<PathBuf>,
}

impl<G: GitCli> SparseCheckoutCheck<G> {
    pub fn new(git: G) -> Self {
        Self {
            git,
            sparse: Vec::new(),
        }
    }

    async fn detect(&self, ctx: &CheckContext) -> Vec<PathBuf> {
        let mut sparse = Vec::new();
        for rig in ctx.rig_names() {
            for tree in rig_worktrees(&ctx.town, &rig) {
                if !tree.join(".git").exists() {
                    continue;
                }
                if self.git.sparse_checkout_enabled(&tree).await.unwrap_or(false) {
                    sparse.push(tree);
                }
            }
        }
        sparse
    }
}

#[async_trait]
impl<G: GitCli> Check for SparseCheckoutCheck<G> {
    fn name(&self) -> &'static str {
        "sparse-checkout"
    }

    fn description(&self) -> &'static str {
        "no clone still uses the legacy sparse checkout"
    }

    fn category(&self) -> Category {
        Category::Worktrees
    }

    fn can_fix(&self) -> bool {
        true
    }

    async fn run(&mut self, ctx: &CheckContext) -> CheckResult {
        self.sparse = self.detect(ctx).await;
        if self.sparse.is_empty() {
            return CheckResult::ok(self.name(), Category::Worktrees, "no sparse checkouts");
        }
        let details = self
            .sparse
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        CheckResult::warning(
            self.name(),
            Category::Worktrees,
            format!("{} legacy sparse checkout(s)", self.sparse.len()),
        )
        .with_details(details)
        .with_fix_hint("gt doctor --fix disables sparse checkout and materializes paths")
    }

    async fn fix(&mut self, ctx: &CheckContext) -> Result<(), DoctorError> {
        if self.sparse.is_empty() {
            self.sparse = self.detect(ctx).await;
        }
        let mut errors = Vec::new();
        for tree in &self.sparse {
            if let Err(e) = self.git.disable_sparse_checkout(tree).await {
                errors.push(format!("{}: {e}", tree.display()));
            }
        }
        self.sparse.clear();
        DoctorError::join(errors)
    }
}

#[cfg(test)]
#[path = "worktrees_tests.rs"]
mod tests;
