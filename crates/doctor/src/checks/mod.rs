// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Concrete doctor checks.

pub mod beads;
pub mod config;
pub mod env;
pub mod routes;
pub mod sessions;
pub mod settings;
pub mod worktrees;

use crate::framework::Check;
use gt_adapters::{BeadsCli, GitCli, Multiplexer};

/// The standard registry, in run order.
pub fn default_checks<M, G, B>(mux: M, git: G, beads: B) -> Vec<Box<dyn Check>>
where
    M: Multiplexer,
    G: GitCli,
    B: BeadsCli,
{
    vec![
        Box::new(routes::RoutesCheck::new()),
        Box::new(worktrees::BareRepoCheck::new()),
        Box::new(worktrees::WorktreeGitdirCheck::new(git.clone())),
        Box::new(worktrees::SparseCheckoutCheck::new(git.clone())),
        Box::new(sessions::SessionNameFormatCheck::new(mux.clone())),
        Box::new(sessions::OrphanSessionsCheck::new(mux.clone())),
        Box::new(sessions::OrphanProcessesCheck::new(mux.clone())),
        Box::new(env::EnvVarsCheck::new(mux)),
        Box::new(beads::AgentBeadsCheck::new(beads.clone())),
        Box::new(beads::StaleAgentBeadsCheck::new(beads.clone())),
        Box::new(beads::MetadataCheck::new()),
        Box::new(beads::OrphanedDatabasesCheck::new()),
        Box::new(beads::StorageServerCheck::new()),
        Box::new(beads::BinaryVersionCheck::bd()),
        Box::new(beads::BinaryVersionCheck::dolt()),
        Box::new(settings::SettingsLocationCheck::new(git.clone())),
        Box::new(settings::StaleHookCommandsCheck::new()),
        Box::new(settings::PrimingFilesCheck::new()),
        Box::new(config::RigRegistryCheck::new()),
        Box::new(config::MergeQueueKeysCheck::new()),
        Box::new(config::LandGitignoreCheck::new()),
        Box::new(config::PatrolHooksCheck::new()),
    ]
}
