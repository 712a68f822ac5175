// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session hygiene checks.

use crate::context::CheckContext;
use crate::framework::{Category, Check, CheckResult, DoctorError};
use async_trait::async_trait;
use gt_adapters::mux::Multiplexer;
use gt_core::{names, Role};
use gt_engine::pid_tracker::TrackedPid;
use tracing::info;

/// A legacy-format session and its canonical name.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Rename {
    from: String,
    to: String,
    crew: bool,
}

fn legacy_renames(ctx: &CheckContext, sessions: &[String]) -> Vec<Rename> {
    let mut renames = Vec::new();
    for session in sessions {
        for rig in ctx.rigs.rig_names() {
            let Some(prefix) = ctx.registry.prefix_for_rig(rig) else {
                continue;
            };
            let legacy_head = format!("{prefix}-{rig}-");
            let Some(suffix) = session.strip_prefix(&legacy_head) else {
                continue;
            };
            let valid_suffix = suffix == "witness"
                || suffix == "refinery"
                || suffix
                    .strip_prefix("crew-")
                    .is_some_and(|name| !name.is_empty());
            if !valid_suffix {
                continue;
            }
            renames.push(Rename {
                from: session.clone(),
                to: format!("{prefix}-{suffix}"),
                crew: suffix.starts_with("crew-"),
            });
        }
    }
    renames
}

/// Sessions still using the legacy `<prefix>-<rig>-<role>` naming.
pub struct SessionNameFormatCheck<M: Multiplexer> {
    mux: M,
    renames: Vec<Rename>,
}

impl<M: Multiplexer> SessionNameFormatCheck<M> {
    pub fn new(mux: M) -> Self {
        Self {
            mux,
            renames: Vec::new(),
        }
    }
}

#[async_trait]
impl<M: Multiplexer> Check for SessionNameFormatCheck<M> {
    fn name(&self) -> &'static str {
        "session-names"
    }

    fn description(&self) -> &'static str {
        "sessions use the canonical name format"
    }

    fn category(&self) -> Category {
        Category::Sessions
    }

    fn can_fix(&self) -> bool {
        true
    }

    async fn run(&mut self, ctx: &CheckContext) -> CheckResult {
        self.renames.clear();
        let sessions = match self.mux.list_sessions().await {
            Ok(sessions) => sessions,
            Err(e) => {
                return CheckResult::warning(
                    self.name(),
                    Category::Sessions,
                    format!("listing sessions: {e}"),
                )
            }
        };
        self.renames = legacy_renames(ctx, &sessions);
        if self.renames.is_empty() {
            return CheckResult::ok(self.name(), Category::Sessions, "session names canonical");
        }

        let details = self
            .renames
            .iter()
            .map(|r| {
                if r.crew {
                    format!("{} -> {} (crew, rename manually)", r.from, r.to)
                } else {
                    format!("{} -> {}", r.from, r.to)
                }
            })
            .collect();
        CheckResult::warning(
            self.name(),
            Category::Sessions,
            format!("{} legacy session name(s)", self.renames.len()),
        )
        .with_details(details)
        .with_fix_hint("gt doctor --fix renames non-crew sessions")
    }

    async fn fix(&mut self, ctx: &CheckContext) -> Result<(), DoctorError> {
        if self.renames.is_empty() {
            let sessions = self.mux.list_sessions().await?;
            self.renames = legacy_renames(ctx, &sessions);
        }

        let mut errors = Vec::new();
        for rename in &self.renames {
            // Crew sessions carry a human; never auto-rename
            if rename.crew {
                continue;
            }
            // TOCTOU guard: the world may have moved since the run
            if !self.mux.has_session(&rename.from).await? {
                continue;
            }
            if self.mux.has_session(&rename.to).await? {
                errors.push(format!(
                    "{}: target {} already exists",
                    rename.from, rename.to
                ));
                continue;
            }
            match self.mux.rename_session(&rename.from, &rename.to).await {
                Ok(()) => info!(from = %rename.from, to = %rename.to, "renamed session"),
                Err(e) => errors.push(format!("{}: {e}", rename.from)),
            }
        }
        self.renames.clear();
        DoctorError::join(errors)
    }
}

/// A session with a Gas Town prefix that maps to no valid identity.
pub struct OrphanSessionsCheck<M: Multiplexer> {
    mux: M,
    orphans: Vec<(String, bool)>,
}

impl<M: Multiplexer> OrphanSessionsCheck<M> {
    pub fn new(mux: M) -> Self {
        Self {
            mux,
            orphans: Vec::new(),
        }
    }

    fn classify(ctx: &CheckContext, session: &str) -> Option<(String, bool)> {
        let claimed =
            session.starts_with("hq-") || ctx.registry.longest_prefix_match(session).is_some();
        if !claimed {
            // Not ours; never touch foreign sessions
            return None;
        }
        let identity = match names::parse_session_name(&ctx.registry, session) {
            Ok(identity) => identity,
            Err(_) => return Some((session.to_string(), false)),
        };
        let valid = match identity.role {
            Role::Polecat => {
                let (rig, name) = (identity.rig_or_empty(), identity.name_or_empty());
                ctx.town.polecat_dir(rig, name).is_dir()
            }
            Role::Crew => {
                let (rig, name) = (identity.rig_or_empty(), identity.name_or_empty());
                ctx.town.crew_worktree(rig, name).is_dir()
            }
            _ => true,
        };
        if valid {
            None
        } else {
            Some((session.to_string(), identity.role == Role::Crew))
        }
    }
}

#[async_trait]
impl<M: Multiplexer> Check for OrphanSessionsCheck<M> {
    fn name(&self) -> &'static str {
        "orphan-sessions"
    }

    fn description(&self) -> &'static str {
        "every Gas Town session maps to a valid identity"
    }

    fn category(&self) -> Category {
        Category::Sessions
    }

    fn can_fix(&self) -> bool {
        true
    }

    async fn run(&mut self, ctx: &CheckContext) -> CheckResult {
        self.orphans.clear();
        let sessions = match self.mux.list_sessions().await {
            Ok(sessions) => sessions,
            Err(e) => {
                return CheckResult::warning(
                    self.name(),
                    Category::Sessions,
                    format!("listing sessions: {e}"),
                )
            }
        };
        self.orphans = sessions
            .iter()
            .filter_map(|s| Self::classify(ctx, s))
            .collect();
        if self.orphans.is_empty() {
            return CheckResult::ok(self.name(), Category::Sessions, "no orphan sessions");
        }

        let details = self
            .orphans
            .iter()
            .map(|(name, crew)| {
                if *crew {
                    format!("{name} (crew, protected)")
                } else {
                    name.clone()
                }
            })
            .collect();
        CheckResult::warning(
            self.name(),
            Category::Sessions,
            format!("{} orphan session(s)", self.orphans.len()),
        )
        .with_details(details)
        .with_fix_hint("gt doctor --fix kills non-crew orphans")
    }

    async fn fix(&mut self, ctx: &CheckContext) -> Result<(), DoctorError> {
        if self.orphans.is_empty() {
            let sessions = self.mux.list_sessions().await?;
            self.orphans = sessions
                .iter()
                .filter_map(|s| Self::classify(ctx, s))
                .collect();
        }

        let mut errors = Vec::new();
        for (session, crew) in &self.orphans {
            // Crew sessions are always protected from the kill fix
            if *crew {
                continue;
            }
            match self.mux.kill_session_with_processes(session).await {
                Ok(()) => info!(session, "killed orphan session"),
                Err(e) => errors.push(format!("{session}: {e}")),
            }
        }
        self.orphans.clear();
        DoctorError::join(errors)
    }
}

/// Tracked pids whose session is gone but whose process survives.
/// Informational; the shutdown sweep is the remediation path.
pub struct OrphanProcessesCheck<M: Multiplexer> {
    mux: M,
}

impl<M: Multiplexer> OrphanProcessesCheck<M> {
    pub fn new(mux: M) -> Self {
        Self { mux }
    }
}

#[async_trait]
impl<M: Multiplexer> Check for OrphanProcessesCheck<M> {
    fn name(&self) -> &'static str {
        "orphan-processes"
    }

    fn description(&self) -> &'static str {
        "no tracked agent process outlives its session"
    }

    fn category(&self) -> Category {
        Category::Sessions
    }

    async fn run(&mut self, ctx: &CheckContext) -> CheckResult {
        let mut details = Vec::new();
        let entries = match std::fs::read_dir(ctx.town.pids_dir()) {
            Ok(entries) => entries,
            Err(_) => {
                return CheckResult::ok(self.name(), Category::Sessions, "no tracked pids")
            }
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("pid") {
                continue;
            }
            let Some(session) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let Ok(content) = std::fs::read_to_string(&path) else {
                continue;
            };
            let Some(record) = TrackedPid::parse(&content) else {
                continue;
            };
            let session_alive = self.mux.has_session(session).await.unwrap_or(false);
            if !session_alive && gt_adapters::process::pid_alive(record.pid) {
                details.push(format!(
                    "pid {} of {session} outlives its session",
                    record.pid
                ));
            }
        }
        if details.is_empty() {
            CheckResult::ok(self.name(), Category::Sessions, "no orphan processes")
        } else {
            CheckResult::warning(
                self.name(),
                Category::Sessions,
                format!("{} orphan process(es)", details.len()),
            )
            .with_details(details)
            .with_fix_hint("gt down sweeps tracked pids")
        }
    }
}

#[cfg(test)]
#[path = "sessions_tests.rs"]
mod tests;
