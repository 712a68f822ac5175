// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Town configuration checks.

use crate::context::CheckContext;
use crate::framework::{Category, Check, CheckResult, DoctorError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

/// Keys dropped when the merge queue moved into the refinery.
const DEPRECATED_RIG_KEYS: &[&str] = &["merge_queue", "mq_branch"];

/// Registered rigs exist on disk and carry a beads prefix.
#[derive(Default)]
pub struct RigRegistryCheck;

impl RigRegistryCheck {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Check for RigRegistryCheck {
    fn name(&self) -> &'static str {
        "rig-registry"
    }

    fn description(&self) -> &'static str {
        "rigs.json entries match the on-disk town"
    }

    fn category(&self) -> Category {
        Category::Config
    }

    async fn run(&mut self, ctx: &CheckContext) -> CheckResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        for rig in ctx.rig_names() {
            if !ctx.town.rig_dir(&rig).is_dir() {
                errors.push(format!("{rig}: registered but missing on disk"));
            }
            let entry = ctx.rigs.rig(&rig);
            if entry.and_then(|e| e.prefix()).is_none() {
                warnings.push(format!("{rig}: no beads prefix configured"));
            }
        }

        if !errors.is_empty() {
            let mut details = errors;
            details.extend(warnings);
            CheckResult::error(self.name(), Category::Config, "rig registry mismatch")
                .with_details(details)
                .with_fix_hint("remove the entry or reinstall the rig")
        } else if !warnings.is_empty() {
            CheckResult::warning(self.name(), Category::Config, "rigs without prefixes")
                .with_details(warnings)
        } else {
            CheckResult::ok(self.name(), Category::Config, "rig registry consistent")
        }
    }
}

/// Deprecated merge-queue keys in rigs.json.
#[derive(Default)]
pub struct MergeQueueKeysCheck {
    affected: Vec<String>,
}

impl MergeQueueKeysCheck {
    pub fn new() -> Self {
        Self::default()
    }

    fn detect(ctx: &CheckContext) -> Vec<String> {
        ctx.rigs
            .rigs
            .iter()
            .filter(|(_, entry)| {
                DEPRECATED_RIG_KEYS
                    .iter()
                    .any(|key| entry.extra.contains_key(*key))
            })
            .map(|(name, _)| name.clone())
            .collect()
    }
}

#[async_trait]
impl Check for MergeQueueKeysCheck {
    fn name(&self) -> &'static str {
        "merge-queue-keys"
    }

    fn description(&self) -> &'static str {
        "rigs.json carries no deprecated merge-queue keys"
    }

    fn category(&self) -> Category {
        Category::Config
    }

    fn can_fix(&self) -> bool {
        true
    }

    async fn run(&mut self, ctx: &CheckContext) -> CheckResult {
        self.affected = Self::detect(ctx);
        if self.affected.is_empty() {
            return CheckResult::ok(self.name(), Category::Config, "no deprecated keys");
        }
        CheckResult::warning(
            self.name(),
            Category::Config,
            format!("{} rig(s) carry deprecated keys", self.affected.len()),
        )
        .with_details(self.affected.clone())
        .with_fix_hint("gt doctor --fix removes the keys")
    }

    async fn fix(&mut self, ctx: &CheckContext) -> Result<(), DoctorError> {
        // The rigs model in ctx is a snapshot; rewrite from disk
        let path = ctx.town.rigs_path();
        let Some(mut rigs) =
            gt_storage::atomic::load_json::<gt_core::RigsFile>(&path)?
        else {
            return Ok(());
        };
        let mut changed = false;
        for entry in rigs.rigs.values_mut() {
            for key in DEPRECATED_RIG_KEYS {
                changed |= entry.extra.remove(*key).is_some();
            }
        }
        if changed {
            gt_storage::atomic::save_json(&path, &rigs)?;
            info!("removed deprecated merge-queue keys from rigs.json");
        }
        self.affected.clear();
        Ok(())
    }
}

/// The refinery's landing worktree must ignore Gas Town runtime files.
const LAND_IGNORE_LINES: &[&str] = &[".beads/", ".runtime/"];

#[derive(Default)]
pub struct LandGitignoreCheck {
    affected: Vec<PathBuf>,
}

impl LandGitignoreCheck {
    pub fn new() -> Self {
        Self::default()
    }

    fn missing_lines(content: &str) -> Vec<&'static str> {
        LAND_IGNORE_LINES
            .iter()
            .filter(|line| !content.lines().any(|l| l.trim() == **line))
            .copied()
            .collect()
    }

    fn detect(ctx: &CheckContext) -> Vec<PathBuf> {
        let mut affected = Vec::new();
        for rig in ctx.rig_names() {
            let worktree = ctx.town.refinery_worktree(&rig);
            if !worktree.is_dir() {
                continue;
            }
            let content =
                std::fs::read_to_string(worktree.join(".gitignore")).unwrap_or_default();
            if !Self::missing_lines(&content).is_empty() {
                affected.push(worktree);
            }
        }
        affected
    }
}

#[async_trait]
impl Check for LandGitignoreCheck {
    fn name(&self) -> &'static str {
        "land-gitignore"
    }

    fn description(&self) -> &'static str {
        "landing worktrees gitignore runtime files"
    }

    fn category(&self) -> Category {
        Category::Config
    }

    fn can_fix(&self) -> bool {
        true
    }

    async fn run(&mut self, ctx: &CheckContext) -> CheckResult {
        self.affected = Self::detect(ctx);
        if self.affected.is_empty() {
            return CheckResult::ok(self.name(), Category::Config, "gitignores complete");
        }
        let details = self
            .affected
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        CheckResult::warning(
            self.name(),
            Category::Config,
            format!("{} landing worktree(s) missing ignore lines", self.affected.len()),
        )
        .with_details(details)
        .with_fix_hint("gt doctor --fix appends the missing lines")
    }

    async fn fix(&mut self, ctx: &CheckContext) -> Result<(), DoctorError> {
        if self.affected.is_empty() {
            self.affected = Self::detect(ctx);
        }
        let mut errors = Vec::new();
        for worktree in &self.affected {
            let path = worktree.join(".gitignore");
            let mut content = std::fs::read_to_string(&path).unwrap_or_default();
            let missing = Self::missing_lines(&content);
            if missing.is_empty() {
                continue;
            }
            if !content.is_empty() && !content.ends_with('\n') {
                content.push('\n');
            }
            for line in missing {
                content.push_str(line);
                content.push('\n');
            }
            if let Err(e) = gt_storage::atomic::save_text(&path, &content) {
                errors.push(format!("{}: {e}", path.display()));
            }
        }
        self.affected.clear();
        DoctorError::join(errors)
    }
}

/// `deacon/patrols.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatrolConfig {
    #[serde(default)]
    pub patrols: Vec<PatrolEntry>,
    #[serde(default)]
    pub heartbeat: Heartbeat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatrolEntry {
    pub name: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heartbeat {
    #[serde(default)]
    pub enabled: bool,
}

/// Patrols the deacon runs by default.
const DEFAULT_PATROLS: &[&str] = &["feed-stranded", "scan-stale-hooks", "redispatch"];

fn patrols_path(ctx: &CheckContext) -> PathBuf {
    ctx.town.deacon_dir().join("patrols.json")
}

/// The deacon must have something to do: at least one enabled patrol or
/// an enabled heartbeat.
#[derive(Default)]
pub struct PatrolHooksCheck;

impl PatrolHooksCheck {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Check for PatrolHooksCheck {
    fn name(&self) -> &'static str {
        "patrol-hooks"
    }

    fn description(&self) -> &'static str {
        "the deacon has at least one patrol or heartbeat wired"
    }

    fn category(&self) -> Category {
        Category::Config
    }

    fn can_fix(&self) -> bool {
        true
    }

    async fn run(&mut self, ctx: &CheckContext) -> CheckResult {
        let config = match gt_storage::atomic::load_json::<PatrolConfig>(&patrols_path(ctx)) {
            Ok(config) => config.unwrap_or_default(),
            Err(e) => {
                return CheckResult::error(
                    self.name(),
                    Category::Config,
                    format!("patrol config unreadable: {e}"),
                )
            }
        };
        let wired =
            config.patrols.iter().any(|p| p.enabled) || config.heartbeat.enabled;
        if wired {
            CheckResult::ok(self.name(), Category::Config, "patrols wired")
        } else {
            CheckResult::error(
                self.name(),
                Category::Config,
                "no enabled patrol and no heartbeat",
            )
            .with_fix_hint("gt doctor --fix writes the default patrol set")
        }
    }

    async fn fix(&mut self, ctx: &CheckContext) -> Result<(), DoctorError> {
        let path = patrols_path(ctx);
        let mut config = gt_storage::atomic::load_json::<PatrolConfig>(&path)
            .unwrap_or_default()
            .unwrap_or_default();

        // Enable the defaults without discarding anything already there
        for name in DEFAULT_PATROLS {
            match config.patrols.iter_mut().find(|p| p.name == *name) {
                Some(entry) => entry.enabled = true,
                None => config.patrols.push(PatrolEntry {
                    name: name.to_string(),
                    enabled: true,
                }),
            }
        }
        gt_storage::atomic::save_json(&path, &config)?;
        info!("wrote default patrol configuration");
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
