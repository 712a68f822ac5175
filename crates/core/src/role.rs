// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent roles and their classification.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The role an agent plays in the town.
///
/// Two roles are interactive (a human may attach and type); the rest are
/// autonomous, driven entirely by beacons, hooks, and mail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Interactive town coordinator
    Mayor,
    /// Autonomous patrol runner (one per town)
    Deacon,
    /// Deacon's watchdog (one per town)
    Boot,
    /// Per-rig singleton that reviews finished work
    Witness,
    /// Per-rig singleton that lands merged work
    Refinery,
    /// Named per-rig worker
    Polecat,
    /// Named per-rig interactive workspace
    Crew,
    /// Named town-level errand runner
    Dog,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Mayor => "mayor",
            Role::Deacon => "deacon",
            Role::Boot => "boot",
            Role::Witness => "witness",
            Role::Refinery => "refinery",
            Role::Polecat => "polecat",
            Role::Crew => "crew",
            Role::Dog => "dog",
        }
    }

    /// Whether a human is expected to attach to this agent's session.
    pub fn is_interactive(&self) -> bool {
        matches!(self, Role::Mayor | Role::Crew)
    }

    /// Town-level roles have no rig; they live under `hq-*` session names.
    pub fn is_town_level(&self) -> bool {
        matches!(self, Role::Mayor | Role::Deacon | Role::Boot | Role::Dog)
    }

    /// Roles that exist at most once per rig.
    pub fn is_rig_singleton(&self) -> bool {
        matches!(self, Role::Witness | Role::Refinery)
    }

    /// Roles addressed by an individual name.
    pub fn is_named(&self) -> bool {
        matches!(self, Role::Polecat | Role::Crew | Role::Dog)
    }

    pub fn all() -> [Role; 8] {
        [
            Role::Mayor,
            Role::Deacon,
            Role::Boot,
            Role::Witness,
            Role::Refinery,
            Role::Polecat,
            Role::Crew,
            Role::Dog,
        ]
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mayor" => Ok(Role::Mayor),
            "deacon" => Ok(Role::Deacon),
            "boot" => Ok(Role::Boot),
            "witness" => Ok(Role::Witness),
            "refinery" => Ok(Role::Refinery),
            "polecat" => Ok(Role::Polecat),
            "crew" => Ok(Role::Crew),
            "dog" => Ok(Role::Dog),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

/// Error for a role string that names no known role.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

#[cfg(test)]
#[path = "role_tests.rs"]
mod tests;
