// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Canonical session names and their parser.
//!
//! Grammar:
//! - `hq-mayor`, `hq-deacon`, `hq-boot`, `hq-dog-{name}` for town roles
//! - `{prefix}-witness`, `{prefix}-refinery` for rig singletons
//! - `{prefix}-crew-{name}` for crew
//! - `{prefix}-{name}` for polecats
//!
//! Prefixes are globally unique per rig, so session names are globally
//! unique per workspace. The parser refuses any session whose prefix is not
//! registered instead of guessing, and it resolves the prefix by longest
//! match so a short prefix never shadows a longer one.

use crate::identity::{Identity, IdentityError};
use crate::registry::PrefixRegistry;
use crate::role::Role;

pub const HQ_MAYOR: &str = "hq-mayor";
pub const HQ_DEACON: &str = "hq-deacon";
pub const HQ_BOOT: &str = "hq-boot";
const HQ_DOG_PREFIX: &str = "hq-dog-";

/// Errors from encoding or parsing session names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("rig {0:?} has no registered prefix")]
    UnregisteredRig(String),
    #[error("session {0:?} matches no registered prefix")]
    UnknownPrefix(String),
    #[error("session {0:?} is malformed")]
    Malformed(String),
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

/// Encode an identity into its canonical session name.
pub fn session_name(registry: &PrefixRegistry, identity: &Identity) -> Result<String, NameError> {
    let prefix = |rig: &str| {
        registry
            .prefix_for_rig(rig)
            .ok_or_else(|| NameError::UnregisteredRig(rig.to_string()))
    };
    match identity.role {
        Role::Mayor => Ok(HQ_MAYOR.to_string()),
        Role::Deacon => Ok(HQ_DEACON.to_string()),
        Role::Boot => Ok(HQ_BOOT.to_string()),
        Role::Dog => Ok(format!("{HQ_DOG_PREFIX}{}", identity.name_or_empty())),
        Role::Witness => Ok(format!("{}-witness", prefix(identity.rig_or_empty())?)),
        Role::Refinery => Ok(format!("{}-refinery", prefix(identity.rig_or_empty())?)),
        Role::Crew => Ok(format!(
            "{}-crew-{}",
            prefix(identity.rig_or_empty())?,
            identity.name_or_empty()
        )),
        Role::Polecat => Ok(format!(
            "{}-{}",
            prefix(identity.rig_or_empty())?,
            identity.name_or_empty()
        )),
    }
}

/// Parse a session name back into an identity.
///
/// Non-Gas-Town sessions fail with [`NameError::UnknownPrefix`]; they must
/// never be misclassified as belonging to a rig.
pub fn parse_session_name(registry: &PrefixRegistry, s: &str) -> Result<Identity, NameError> {
    match s {
        HQ_MAYOR => return Ok(Identity::mayor()),
        HQ_DEACON => return Ok(Identity::deacon()),
        HQ_BOOT => return Ok(Identity::boot()),
        _ => {}
    }
    if let Some(name) = s.strip_prefix(HQ_DOG_PREFIX) {
        if name.is_empty() {
            return Err(NameError::Malformed(s.to_string()));
        }
        return Ok(Identity::dog(name)?);
    }

    let Some((prefix, rig)) = registry.longest_prefix_match(s) else {
        return Err(NameError::UnknownPrefix(s.to_string()));
    };
    // longest_prefix_match guarantees the "-" and a non-empty remainder
    let rest = &s[prefix.len() + 1..];

    match rest {
        "witness" => Ok(Identity::witness(rig)),
        "refinery" => Ok(Identity::refinery(rig)),
        _ => {
            if let Some(crew_name) = rest.strip_prefix("crew-") {
                if crew_name.is_empty() {
                    return Err(NameError::Malformed(s.to_string()));
                }
                return Ok(Identity::crew(rig, crew_name)?);
            }
            // Anything else is a polecat, even when the name happens to
            // embed another rig's name (ownership follows the prefix).
            Ok(Identity::polecat(rig, rest)?)
        }
    }
}

/// True when `s` names a town-level (`hq-*`) session.
pub fn is_town_session(s: &str) -> bool {
    s == HQ_MAYOR || s == HQ_DEACON || s == HQ_BOOT || s.starts_with(HQ_DOG_PREFIX)
}

#[cfg(test)]
#[path = "names_tests.rs"]
mod tests;
