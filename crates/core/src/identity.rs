// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent identities and their two string encodings.
//!
//! An identity is `(role, rig?, name?)`. It has a *path address* used on
//! disk and in beads assignee fields (`gastown/polecats/Toast`) and a
//! *beacon address* used in prompts (`polecat Toast (rig: gastown)`). The
//! beacon form never contains `/` so an agent reading it does not mistake
//! it for a filesystem path.

use crate::role::Role;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors from identity construction or address parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("unparseable address: {0:?}")]
    Unparseable(String),
    #[error("{role} requires a rig")]
    MissingRig { role: Role },
    #[error("{role} requires a name")]
    MissingName { role: Role },
    #[error("invalid {role} name {name:?}: {reason}")]
    InvalidName {
        role: Role,
        name: String,
        reason: &'static str,
    },
}

/// A fully-resolved agent identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub role: Role,
    /// Empty for town-level roles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rig: Option<String>,
    /// Empty for singleton roles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Identity {
    pub fn mayor() -> Self {
        Self {
            role: Role::Mayor,
            rig: None,
            name: None,
        }
    }

    pub fn deacon() -> Self {
        Self {
            role: Role::Deacon,
            rig: None,
            name: None,
        }
    }

    pub fn boot() -> Self {
        Self {
            role: Role::Boot,
            rig: None,
            name: None,
        }
    }

    pub fn dog(name: impl Into<String>) -> Result<Self, IdentityError> {
        let name = valid_name(Role::Dog, name.into())?;
        Ok(Self {
            role: Role::Dog,
            rig: None,
            name: Some(name),
        })
    }

    pub fn witness(rig: impl Into<String>) -> Self {
        Self {
            role: Role::Witness,
            rig: Some(rig.into()),
            name: None,
        }
    }

    pub fn refinery(rig: impl Into<String>) -> Self {
        Self {
            role: Role::Refinery,
            rig: Some(rig.into()),
            name: None,
        }
    }

    pub fn polecat(
        rig: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, IdentityError> {
        let name = valid_name(Role::Polecat, name.into())?;
        // These would collide with the singleton and crew session grammars.
        if name == "witness" || name == "refinery" {
            return Err(IdentityError::InvalidName {
                role: Role::Polecat,
                name,
                reason: "reserved for rig singletons",
            });
        }
        if name.starts_with("crew-") {
            return Err(IdentityError::InvalidName {
                role: Role::Polecat,
                name,
                reason: "crew- prefix is reserved for crew sessions",
            });
        }
        Ok(Self {
            role: Role::Polecat,
            rig: Some(rig.into()),
            name: Some(name),
        })
    }

    pub fn crew(rig: impl Into<String>, name: impl Into<String>) -> Result<Self, IdentityError> {
        let name = valid_name(Role::Crew, name.into())?;
        Ok(Self {
            role: Role::Crew,
            rig: Some(rig.into()),
            name: Some(name),
        })
    }

    /// Parse a path address (`gastown/polecats/Toast`, `mayor`,
    /// `deacon/dogs/Rex`) back into an identity. Inverse of
    /// [`Identity::path_address`].
    pub fn parse_address(addr: &str) -> Result<Self, IdentityError> {
        let unparseable = || IdentityError::Unparseable(addr.to_string());
        let parts: Vec<&str> = addr.split('/').collect();
        match parts.as_slice() {
            ["mayor"] => Ok(Self::mayor()),
            ["deacon"] => Ok(Self::deacon()),
            ["boot"] => Ok(Self::boot()),
            ["deacon", "dogs", name] if !name.is_empty() => Self::dog(*name),
            [rig, "witness"] if !rig.is_empty() => Ok(Self::witness(*rig)),
            [rig, "refinery"] if !rig.is_empty() => Ok(Self::refinery(*rig)),
            [rig, "polecats", name] if !rig.is_empty() && !name.is_empty() => {
                Self::polecat(*rig, *name)
            }
            [rig, "crew", name] if !rig.is_empty() && !name.is_empty() => Self::crew(*rig, *name),
            _ => Err(unparseable()),
        }
    }

    /// The on-disk / assignee-field encoding.
    pub fn path_address(&self) -> String {
        match self.role {
            Role::Mayor => "mayor".to_string(),
            Role::Deacon => "deacon".to_string(),
            Role::Boot => "boot".to_string(),
            Role::Dog => format!("deacon/dogs/{}", self.name_or_empty()),
            Role::Witness => format!("{}/witness", self.rig_or_empty()),
            Role::Refinery => format!("{}/refinery", self.rig_or_empty()),
            Role::Polecat => {
                format!("{}/polecats/{}", self.rig_or_empty(), self.name_or_empty())
            }
            Role::Crew => format!("{}/crew/{}", self.rig_or_empty(), self.name_or_empty()),
        }
    }

    /// The prompt-facing encoding. Contains no `/`.
    pub fn beacon_address(&self) -> String {
        match self.role {
            Role::Mayor => "mayor".to_string(),
            Role::Deacon => "deacon".to_string(),
            Role::Boot => "boot".to_string(),
            Role::Dog => format!("dog {}", self.name_or_empty()),
            Role::Witness => format!("witness (rig: {})", self.rig_or_empty()),
            Role::Refinery => format!("refinery (rig: {})", self.rig_or_empty()),
            Role::Polecat => format!(
                "polecat {} (rig: {})",
                self.name_or_empty(),
                self.rig_or_empty()
            ),
            Role::Crew => format!(
                "crew {} (rig: {})",
                self.name_or_empty(),
                self.rig_or_empty()
            ),
        }
    }

    /// A short human label suitable for `GIT_AUTHOR_NAME` and logs.
    pub fn display_name(&self) -> String {
        match (&self.name, &self.rig) {
            (Some(name), _) => format!("{} {}", self.role, name),
            (None, Some(rig)) => format!("{} {}", rig, self.role),
            (None, None) => self.role.to_string(),
        }
    }

    pub fn rig_or_empty(&self) -> &str {
        self.rig.as_deref().unwrap_or("")
    }

    pub fn name_or_empty(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path_address())
    }
}

fn valid_name(role: Role, name: String) -> Result<String, IdentityError> {
    let invalid = |reason| IdentityError::InvalidName {
        role,
        name: name.clone(),
        reason,
    };
    if name.is_empty() {
        return Err(invalid("empty"));
    }
    if name.contains('/') {
        return Err(invalid("contains '/'"));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(invalid("contains whitespace"));
    }
    // tmux uses ':' and '.' in pane targets
    if name.contains(':') || name.contains('.') {
        return Err(invalid("contains tmux target separators"));
    }
    Ok(name)
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;
