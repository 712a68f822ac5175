// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Issue-database checks: agent beads, metadata, server reachability.

use crate::context::CheckContext;
use crate::framework::{Category, Check, CheckResult, DoctorError};
use async_trait::async_trait;
use gt_adapters::beads::{BeadsCli, AGENT_LABEL};
use gt_adapters::subprocess::DIAL_TIMEOUT;
use gt_core::Identity;
use gt_storage::BeadsMetadata;
use std::collections::BTreeSet;
use tracing::info;

/// The storage backend every rig database is expected to run on.
const EXPECTED_BACKEND: &str = "dolt";

/// What the agent-beads fix must do for one identity.
#[derive(Debug, Clone, PartialEq, Eq)]
enum BeadRepair {
    Create(String),
    AddLabel(String),
}

/// Every expected agent identity has a labeled agent bead.
pub struct AgentBeadsCheck<B: BeadsCli> {
    beads: B,
    repairs: Vec<BeadRepair>,
}

impl<B: BeadsCli> AgentBeadsCheck<B> {
    pub fn new(beads: B) -> Self {
        Self {
            beads,
            repairs: Vec::new(),
        }
    }

    async fn detect(&self, ctx: &CheckContext) -> Result<Vec<BeadRepair>, DoctorError> {
        let existing = self.beads.list_agent_beads().await?;
        let mut repairs = Vec::new();
        for identity in ctx.expected_identities() {
            let address = identity.path_address();
            match existing.iter().find(|b| b.assignee == address) {
                None => repairs.push(BeadRepair::Create(address)),
                Some(bead) if !bead.labels.iter().any(|l| l == AGENT_LABEL) => {
                    repairs.push(BeadRepair::AddLabel(bead.id.clone()))
                }
                Some(_) => {}
            }
        }
        Ok(repairs)
    }
}

#[async_trait]
impl<B: BeadsCli> Check for AgentBeadsCheck<B> {
    fn name(&self) -> &'static str {
        "agent-beads"
    }

    fn description(&self) -> &'static str {
        "every agent identity has a labeled agent bead"
    }

    fn category(&self) -> Category {
        Category::Beads
    }

    fn can_fix(&self) -> bool {
        true
    }

    async fn run(&mut self, ctx: &CheckContext) -> CheckResult {
        self.repairs.clear();
        let repairs = match self.detect(ctx).await {
            Ok(repairs) => repairs,
            Err(e) => {
                return CheckResult::warning(
                    self.name(),
                    Category::Beads,
                    format!("listing agent beads: {e}"),
                )
            }
        };
        if repairs.is_empty() {
            return CheckResult::ok(self.name(), Category::Beads, "agent beads present");
        }
        let details = repairs
            .iter()
            .map(|r| match r {
                BeadRepair::Create(address) => format!("missing agent bead for {address}"),
                BeadRepair::AddLabel(id) => format!("{id} lacks the {AGENT_LABEL} label"),
            })
            .collect();
        let result = CheckResult::error(
            self.name(),
            Category::Beads,
            format!("{} agent bead problem(s)", repairs.len()),
        )
        .with_details(details)
        .with_fix_hint("gt doctor --fix creates beads and labels");
        self.repairs = repairs;
        result
    }

    async fn fix(&mut self, ctx: &CheckContext) -> Result<(), DoctorError> {
        if self.repairs.is_empty() {
            self.repairs = self.detect(ctx).await?;
        }
        let mut errors = Vec::new();
        for repair in &self.repairs {
            let result = match repair {
                BeadRepair::Create(address) => self
                    .beads
                    .create_agent_bead(address)
                    .await
                    .map(|id| info!(bead = %id, agent = %address, "created agent bead")),
                BeadRepair::AddLabel(id) => self.beads.add_label(id, AGENT_LABEL).await,
            };
            if let Err(e) = result {
                errors.push(format!("{repair:?}: {e}"));
            }
        }
        self.repairs.clear();
        DoctorError::join(errors)
    }
}

/// Agent beads whose identity no longer exists on disk are closed.
pub struct StaleAgentBeadsCheck<B: BeadsCli> {
    beads: B,
    stale: Vec<String>,
}

impl<B: BeadsCli> StaleAgentBeadsCheck<B> {
    pub fn new(beads: B) -> Self {
        Self {
            beads,
            stale: Vec::new(),
        }
    }

    async fn detect(&self, ctx: &CheckContext) -> Result<Vec<String>, DoctorError> {
        let expected: BTreeSet<String> = ctx
            .expected_identities()
            .iter()
            .map(Identity::path_address)
            .collect();
        let mut stale = Vec::new();
        for bead in self.beads.list_agent_beads().await? {
            if bead.status == "closed" {
                continue;
            }
            if !expected.contains(&bead.assignee) {
                stale.push(bead.id);
            }
        }
        Ok(stale)
    }
}

#[async_trait]
impl<B: BeadsCli> Check for StaleAgentBeadsCheck<B> {
    fn name(&self) -> &'static str {
        "stale-agent-beads"
    }

    fn description(&self) -> &'static str {
        "no agent bead outlives its agent"
    }

    fn category(&self) -> Category {
        Category::Beads
    }

    fn can_fix(&self) -> bool {
        true
    }

    async fn run(&mut self, ctx: &CheckContext) -> CheckResult {
        self.stale.clear();
        let stale = match self.detect(ctx).await {
            Ok(stale) => stale,
            Err(e) => {
                return CheckResult::warning(
                    self.name(),
                    Category::Beads,
                    format!("listing agent beads: {e}"),
                )
            }
        };
        if stale.is_empty() {
            return CheckResult::ok(self.name(), Category::Beads, "no stale agent beads");
        }
        let result = CheckResult::warning(
            self.name(),
            Category::Beads,
            format!("{} stale agent bead(s)", stale.len()),
        )
        .with_details(stale.clone())
        .with_fix_hint("gt doctor --fix closes them");
        self.stale = stale;
        result
    }

    async fn fix(&mut self, ctx: &CheckContext) -> Result<(), DoctorError> {
        if self.stale.is_empty() {
            self.stale = self.detect(ctx).await?;
        }
        let mut errors = Vec::new();
        for id in &self.stale {
            match self.beads.close(id, "agent no longer exists").await {
                Ok(()) => info!(bead = %id, "closed stale agent bead"),
                Err(e) => errors.push(format!("{id}: {e}")),
            }
        }
        self.stale.clear();
        DoctorError::join(errors)
    }
}

/// Rig beads metadata declares the canonical backend, mode, and database.
#[derive(Default)]
pub struct MetadataCheck {
    broken: Vec<String>,
}

impl MetadataCheck {
    pub fn new() -> Self {
        Self::default()
    }

    fn detect(ctx: &CheckContext) -> Vec<String> {
        let mut broken = Vec::new();
        for rig in ctx.rig_names() {
            if !ctx.town.beads_dir(&rig).is_dir() {
                continue;
            }
            let path = ctx.town.beads_metadata_path(&rig);
            match BeadsMetadata::load(&path) {
                Ok(Some(meta)) => {
                    if meta.backend != EXPECTED_BACKEND
                        || !matches!(meta.mode.as_str(), "local" | "server")
                        || meta.database != rig
                    {
                        broken.push(rig);
                    }
                }
                Ok(None) => broken.push(rig),
                Err(_) => broken.push(rig),
            }
        }
        broken
    }
}

#[async_trait]
impl Check for MetadataCheck {
    fn name(&self) -> &'static str {
        "beads-metadata"
    }

    fn description(&self) -> &'static str {
        "rig metadata declares backend, mode, and database"
    }

    fn category(&self) -> Category {
        Category::Storage
    }

    fn can_fix(&self) -> bool {
        true
    }

    async fn run(&mut self, ctx: &CheckContext) -> CheckResult {
        self.broken = Self::detect(ctx);
        if self.broken.is_empty() {
            return CheckResult::ok(self.name(), Category::Storage, "metadata canonical");
        }
        CheckResult::error(
            self.name(),
            Category::Storage,
            format!("{} rig(s) with bad metadata", self.broken.len()),
        )
        .with_details(self.broken.clone())
        .with_fix_hint("gt doctor --fix writes canonical fields")
    }

    async fn fix(&mut self, ctx: &CheckContext) -> Result<(), DoctorError> {
        if self.broken.is_empty() {
            self.broken = Self::detect(ctx);
        }
        let mut errors = Vec::new();
        for rig in &self.broken {
            let path = ctx.town.beads_metadata_path(rig);
            let mut meta = match BeadsMetadata::load(&path) {
                Ok(Some(meta)) => meta,
                // Corrupt or absent files are replaced wholesale
                Ok(None) | Err(_) => BeadsMetadata::default(),
            };
            meta.backend = EXPECTED_BACKEND.to_string();
            if !matches!(meta.mode.as_str(), "local" | "server") {
                meta.mode = "local".to_string();
            }
            meta.database = rig.clone();
            if let Err(e) = meta.save(&path) {
                errors.push(format!("{rig}: {e}"));
            }
        }
        self.broken.clear();
        DoctorError::join(errors)
    }
}

/// Database directories nothing references any more.
#[derive(Default)]
pub struct OrphanedDatabasesCheck {
    orphans: Vec<std::path::PathBuf>,
}

impl OrphanedDatabasesCheck {
    pub fn new() -> Self {
        Self::default()
    }

    fn detect(ctx: &CheckContext) -> Vec<std::path::PathBuf> {
        let mut referenced = BTreeSet::new();
        for rig in ctx.rigs.rig_names() {
            if let Ok(Some(meta)) = BeadsMetadata::load(&ctx.town.beads_metadata_path(rig)) {
                if !meta.database.is_empty() {
                    referenced.insert(meta.database);
                }
            }
            referenced.insert(rig.clone());
        }

        let mut orphans = Vec::new();
        if let Ok(entries) = std::fs::read_dir(ctx.town.storage_data_dir()) {
            for entry in entries.flatten() {
                if !entry.path().is_dir() {
                    continue;
                }
                let Some(name) = entry.file_name().to_str().map(|s| s.to_string()) else {
                    continue;
                };
                if !referenced.contains(&name) {
                    orphans.push(entry.path());
                }
            }
        }
        orphans
    }
}

#[async_trait]
impl Check for OrphanedDatabasesCheck {
    fn name(&self) -> &'static str {
        "orphaned-databases"
    }

    fn description(&self) -> &'static str {
        "every stored database belongs to a registered rig"
    }

    fn category(&self) -> Category {
        Category::Storage
    }

    fn can_fix(&self) -> bool {
        true
    }

    async fn run(&mut self, ctx: &CheckContext) -> CheckResult {
        self.orphans = Self::detect(ctx);
        if self.orphans.is_empty() {
            return CheckResult::ok(self.name(), Category::Storage, "no orphaned databases");
        }
        let details = self
            .orphans
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        CheckResult::warning(
            self.name(),
            Category::Storage,
            format!("{} orphaned database(s)", self.orphans.len()),
        )
        .with_details(details)
        .with_fix_hint("gt doctor --fix removes them")
    }

    async fn fix(&mut self, ctx: &CheckContext) -> Result<(), DoctorError> {
        if self.orphans.is_empty() {
            self.orphans = Self::detect(ctx);
        }
        let mut errors = Vec::new();
        for orphan in &self.orphans {
            if let Err(e) = std::fs::remove_dir_all(orphan) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    errors.push(format!("{}: {e}", orphan.display()));
                }
            }
        }
        self.orphans.clear();
        DoctorError::join(errors)
    }
}

/// Every server-mode database host must answer a TCP dial.
#[derive(Default)]
pub struct StorageServerCheck;

impl StorageServerCheck {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Check for StorageServerCheck {
    fn name(&self) -> &'static str {
        "storage-server"
    }

    fn description(&self) -> &'static str {
        "server-mode beads databases are reachable"
    }

    fn category(&self) -> Category {
        Category::Storage
    }

    async fn run(&mut self, ctx: &CheckContext) -> CheckResult {
        let mut addrs = BTreeSet::new();
        for rig in ctx.rig_names() {
            if let Ok(Some(meta)) = BeadsMetadata::load(&ctx.town.beads_metadata_path(&rig)) {
                if let Some(addr) = meta.server_addr() {
                    addrs.insert(addr);
                }
            }
        }
        if addrs.is_empty() {
            return CheckResult::ok(self.name(), Category::Storage, "no server-mode rigs");
        }

        let mut details = Vec::new();
        for addr in &addrs {
            let dial = tokio::time::timeout(DIAL_TIMEOUT, tokio::net::TcpStream::connect(addr));
            match dial.await {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => details.push(format!("{addr}: {e}")),
                Err(_) => details.push(format!("{addr}: dial timed out")),
            }
        }
        if details.is_empty() {
            CheckResult::ok(
                self.name(),
                Category::Storage,
                format!("{} server(s) reachable", addrs.len()),
            )
        } else {
            // An unreachable server while sessions write locally forks history
            CheckResult::error(
                self.name(),
                Category::Storage,
                "SPLIT-BRAIN RISK: storage server unreachable",
            )
            .with_details(details)
        }
    }
}

/// Minimum supported beads CLI version.
const MIN_BD_VERSION: (u32, u32, u32) = (0, 12, 0);
/// Minimum supported dolt version.
const MIN_DOLT_VERSION: (u32, u32, u32) = (1, 30, 0);

/// Informational: a storage binary exists and is recent enough.
pub struct BinaryVersionCheck {
    name: &'static str,
    binary: &'static str,
    minimum: (u32, u32, u32),
}

impl BinaryVersionCheck {
    pub fn bd() -> Self {
        Self {
            name: "beads-version",
            binary: "bd",
            minimum: MIN_BD_VERSION,
        }
    }

    pub fn dolt() -> Self {
        Self {
            name: "dolt-version",
            binary: "dolt",
            minimum: MIN_DOLT_VERSION,
        }
    }
}

/// Pull the first `x.y.z` out of a `--version` banner.
pub fn parse_version(output: &str) -> Option<(u32, u32, u32)> {
    for token in output.split_whitespace() {
        let token = token.trim_start_matches('v');
        let parts: Vec<&str> = token.split('.').collect();
        if parts.len() < 3 {
            continue;
        }
        let nums: Option<Vec<u32>> = parts[..3]
            .iter()
            .map(|p| {
                p.chars()
                    .take_while(|c| c.is_ascii_digit())
                    .collect::<String>()
                    .parse()
                    .ok()
            })
            .collect();
        if let Some(nums) = nums {
            return Some((nums[0], nums[1], nums[2]));
        }
    }
    None
}

#[async_trait]
impl Check for BinaryVersionCheck {
    fn name(&self) -> &'static str {
        self.name
    }

    fn description(&self) -> &'static str {
        "the storage binary is present and recent enough"
    }

    fn category(&self) -> Category {
        Category::Storage
    }

    async fn run(&mut self, _ctx: &CheckContext) -> CheckResult {
        let output = tokio::process::Command::new(self.binary)
            .arg("--version")
            .output()
            .await;
        let output = match output {
            Ok(output) if output.status.success() => output,
            _ => {
                return CheckResult::error(
                    self.name,
                    Category::Storage,
                    format!("{} binary not found or failing", self.binary),
                )
                .with_fix_hint(format!("install {}", self.binary))
            }
        };
        let banner = String::from_utf8_lossy(&output.stdout).to_string();
        match parse_version(&banner) {
            Some(version) if version >= self.minimum => CheckResult::ok(
                self.name,
                Category::Storage,
                format!("{} {}.{}.{}", self.binary, version.0, version.1, version.2),
            ),
            Some(version) => CheckResult::error(
                self.name,
                Category::Storage,
                format!(
                    "{} {}.{}.{} is below the minimum {}.{}.{}",
                    self.binary,
                    version.0,
                    version.1,
                    version.2,
                    self.minimum.0,
                    self.minimum.1,
                    self.minimum.2
                ),
            ),
            None => CheckResult::warning(
                self.name,
                Category::Storage,
                format!("unparseable {} version banner: {}", self.binary, banner.trim()),
            ),
        }
    }
}

#[cfg(test)]
#[path = "beads_tests.rs"]
mod tests;
