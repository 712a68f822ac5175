// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Canonical per-session environment.
//!
//! The same assembly feeds session startup and the doctor's
//! environment-variables check, so the two can never drift apart.

use gt_core::{Identity, Role, Town};

/// Setting this breaks prefix-based issue routing; it must never appear in
/// an agent session's environment.
pub const FORBIDDEN_ENV: &str = "BEADS_DIR";

/// The canonical environment for an agent session.
pub fn agent_env(
    identity: &Identity,
    town: &Town,
    agent_override: Option<&str>,
) -> Vec<(String, String)> {
    let mut env = vec![("GT_ROLE".to_string(), identity.role.to_string())];

    if let Some(rig) = &identity.rig {
        env.push(("GT_RIG".to_string(), rig.clone()));
    }
    match (identity.role, &identity.name) {
        (Role::Polecat, Some(name)) => env.push(("GT_POLECAT".to_string(), name.clone())),
        (Role::Crew, Some(name)) => env.push(("GT_CREW".to_string(), name.clone())),
        (Role::Dog, Some(name)) => env.push(("GT_DOG".to_string(), name.clone())),
        _ => {}
    }

    env.push((
        "GT_TOWN_ROOT".to_string(),
        town.root().display().to_string(),
    ));
    env.push(("BD_ACTOR".to_string(), identity.path_address()));
    env.push(("GIT_AUTHOR_NAME".to_string(), identity.display_name()));

    if let Some(agent) = agent_override {
        env.push(("GT_AGENT".to_string(), agent.to_string()));
    }

    env
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
