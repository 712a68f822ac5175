// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent settings hygiene.

use crate::checks::worktrees::rig_worktrees;
use crate::context::CheckContext;
use crate::framework::{Category, Check, CheckResult, DoctorError};
use async_trait::async_trait;
use gt_adapters::git::GitCli;
use std::path::PathBuf;
use tracing::info;

/// The settings file agents actually read.
const SETTINGS_FILE: &str = ".claude/settings.json";
/// Legacy per-machine settings that shadow the canonical file.
const LEGACY_SETTINGS_FILE: &str = ".claude/settings.local.json";

/// Hook commands the current generator emits. Any other `gt` hook command
/// is a leftover from a removed feature.
const KNOWN_HOOK_COMMANDS: &[&str] = &["gt prime", "gt hook"];

/// Every directory that may hold agent settings: the town root (mayor,
/// deacon, boot) plus each rig worktree.
fn settings_roots(ctx: &CheckContext) -> Vec<PathBuf> {
    let mut roots = vec![ctx.town.root().to_path_buf()];
    for rig in ctx.rig_names() {
        roots.extend(rig_worktrees(&ctx.town, &rig));
    }
    roots
}

/// Legacy `settings.local.json` files are stale and removed, unless
/// source control says they are deliberately tracked.
pub struct SettingsLocationCheck<G: GitCli> {
    git: G,
    stale: Vec<PathBuf>,
}

impl<G: GitCli> SettingsLocationCheck<G> {
    pub fn new(git: G) -> Self {
        Self {
            git,
            stale: Vec::new(),
        }
    }

    fn detect(ctx: &CheckContext) -> Vec<PathBuf> {
        settings_roots(ctx)
            .into_iter()
            .filter(|root| root.join(LEGACY_SETTINGS_FILE).is_file())
            .collect()
    }
}

#[async_trait]
impl<G: GitCli> Check for SettingsLocationCheck<G> {
    fn name(&self) -> &'static str {
        "settings-location"
    }

    fn description(&self) -> &'static str {
        "no legacy settings.local.json files remain"
    }

    fn category(&self) -> Category {
        Category::Settings
    }

    fn can_fix(&self) -> bool {
        true
    }

    async fn run(&mut self, ctx: &CheckContext) -> CheckResult {
        self.stale = Self::detect(ctx);
        if self.stale.is_empty() {
            return CheckResult::ok(self.name(), Category::Settings, "settings in place");
        }
        let details = self
            .stale
            .iter()
            .map(|p| p.join(LEGACY_SETTINGS_FILE).display().to_string())
            .collect();
        CheckResult::warning(
            self.name(),
            Category::Settings,
            format!("{} legacy settings file(s)", self.stale.len()),
        )
        .with_details(details)
        .with_fix_hint("gt doctor --fix removes untracked ones")
    }

    async fn fix(&mut self, ctx: &CheckContext) -> Result<(), DoctorError> {
        if self.stale.is_empty() {
            self.stale = Self::detect(ctx);
        }
        let mut errors = Vec::new();
        for root in &self.stale {
            let path = root.join(LEGACY_SETTINGS_FILE);
            // A tracked file is user-authored content; preserve it
            let tracked = self
                .git
                .is_tracked(root, LEGACY_SETTINGS_FILE)
                .await
                .unwrap_or(false);
            if tracked {
                info!(path = %path.display(), "legacy settings tracked, preserving");
                continue;
            }
            match std::fs::remove_file(&path) {
                Ok(()) => info!(path = %path.display(), "removed legacy settings"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => errors.push(format!("{}: {e}", path.display())),
            }
        }
        self.stale.clear();
        DoctorError::join(errors)
    }
}

/// Strip hook commands that the generator no longer emits.
#[derive(Default)]
pub struct StaleHookCommandsCheck {
    affected: Vec<PathBuf>,
}

impl StaleHookCommandsCheck {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_stale_command(command: &str) -> bool {
        let command = command.trim();
        (command == "gt" || command.starts_with("gt "))
            && !KNOWN_HOOK_COMMANDS
                .iter()
                .any(|known| command == *known || command.starts_with(&format!("{known} ")))
    }

    /// Remove stale commands in place. Returns whether anything changed.
    fn strip_stale(value: &mut serde_json::Value) -> bool {
        let Some(hooks) = value.get_mut("hooks").and_then(|h| h.as_object_mut()) else {
            return false;
        };
        let mut changed = false;
        for (_event, matchers) in hooks.iter_mut() {
            let Some(matchers) = matchers.as_array_mut() else {
                continue;
            };
            for matcher in matchers.iter_mut() {
                let Some(entries) = matcher.get_mut("hooks").and_then(|h| h.as_array_mut())
                else {
                    continue;
                };
                let before = entries.len();
                entries.retain(|entry| {
                    entry
                        .get("command")
                        .and_then(|c| c.as_str())
                        .is_none_or(|c| !Self::is_stale_command(c))
                });
                changed |= entries.len() != before;
            }
            matchers.retain(|m| {
                m.get("hooks")
                    .and_then(|h| h.as_array())
                    .is_none_or(|h| !h.is_empty())
            });
        }
        changed
    }

    fn detect(ctx: &CheckContext) -> Vec<PathBuf> {
        let mut affected = Vec::new();
        for root in settings_roots(ctx) {
            let path = root.join(SETTINGS_FILE);
            let Ok(content) = std::fs::read_to_string(&path) else {
                continue;
            };
            let Ok(mut value) = serde_json::from_str::<serde_json::Value>(&content) else {
                continue;
            };
            if Self::strip_stale(&mut value) {
                affected.push(path);
            }
        }
        affected
    }
}

#[async_trait]
impl Check for StaleHookCommandsCheck {
    fn name(&self) -> &'static str {
        "stale-hook-commands"
    }

    fn description(&self) -> &'static str {
        "settings hooks only run commands the generator still emits"
    }

    fn category(&self) -> Category {
        Category::Settings
    }

    fn can_fix(&self) -> bool {
        true
    }

    async fn run(&mut self, ctx: &CheckContext) -> CheckResult {
        self.affected = Self::detect(ctx);
        if self.affected.is_empty() {
            return CheckResult::ok(self.name(), Category::Settings, "hook commands current");
        }
        let details = self
            .affected
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        CheckResult::warning(
            self.name(),
            Category::Settings,
            format!("{} settings file(s) with stale hook commands", self.affected.len()),
        )
        .with_details(details)
        .with_fix_hint("gt doctor --fix strips the stale commands")
    }

    async fn fix(&mut self, ctx: &CheckContext) -> Result<(), DoctorError> {
        if self.affected.is_empty() {
            self.affected = Self::detect(ctx);
        }
        let mut errors = Vec::new();
        for path in &self.affected {
            let result: Result<(), DoctorError> = (|| {
                let content = std::fs::read_to_string(path)
                    .map_err(|e| DoctorError::io(format!("reading {}", path.display()), e))?;
                let mut value: serde_json::Value = serde_json::from_str(&content)
                    .map_err(|e| DoctorError::Partial(format!("{}: {e}", path.display())))?;
                // Strip after parse so an on-disk override cannot re-inject
                Self::strip_stale(&mut value);
                gt_storage::atomic::save_json(path, &value)?;
                Ok(())
            })();
            if let Err(e) = result {
                errors.push(e.to_string());
            }
        }
        self.affected.clear();
        DoctorError::join(errors)
    }
}

/// Legacy priming files superseded by `gt prime`.
const LEGACY_PRIMING_FILES: &[&str] = &["GT_PRIMING.md", ".gt-priming.md"];

/// Old on-disk priming notes shadow the live `gt prime` output.
#[derive(Default)]
pub struct PrimingFilesCheck {
    stale: Vec<PathBuf>,
}

impl PrimingFilesCheck {
    pub fn new() -> Self {
        Self::default()
    }

    fn detect(ctx: &CheckContext) -> Vec<PathBuf> {
        let mut stale = Vec::new();
        for root in settings_roots(ctx) {
            for name in LEGACY_PRIMING_FILES {
                let path = root.join(name);
                if path.is_file() {
                    stale.push(path);
                }
            }
        }
        stale
    }
}

#[async_trait]
impl Check for PrimingFilesCheck {
    fn name(&self) -> &'static str {
        "priming-files"
    }

    fn description(&self) -> &'static str {
        "no legacy priming files shadow gt prime"
    }

    fn category(&self) -> Category {
        Category::Settings
    }

    fn can_fix(&self) -> bool {
        true
    }

    async fn run(&mut self, ctx: &CheckContext) -> CheckResult {
        self.stale = Self::detect(ctx);
        if self.stale.is_empty() {
            return CheckResult::ok(self.name(), Category::Settings, "no legacy priming files");
        }
        let details = self.stale.iter().map(|p| p.display().to_string()).collect();
        CheckResult::warning(
            self.name(),
            Category::Settings,
            format!("{} legacy priming file(s)", self.stale.len()),
        )
        .with_details(details)
        .with_fix_hint("gt doctor --fix removes them")
    }

    async fn fix(&mut self, ctx: &CheckContext) -> Result<(), DoctorError> {
        if self.stale.is_empty() {
            self.stale = Self::detect(ctx);
        }
        let mut errors = Vec::new();
        for path in &self.stale {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => errors.push(format!("{}: {e}", path.display())),
            }
        }
        self.stale.clear();
        DoctorError::join(errors)
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
