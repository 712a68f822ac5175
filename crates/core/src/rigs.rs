// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `mayor/rigs.json` model.
//!
//! Only the fields the core needs are typed; everything else a rig entry
//! carries is preserved through a read/rewrite cycle via the flattened
//! `extra` map.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Errors reading the rigs file.
#[derive(Debug, thiserror::Error)]
pub enum RigsError {
    #[error("reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Beads settings for one rig.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeadsSettings {
    #[serde(default)]
    pub prefix: String,
}

/// One registered rig.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RigEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beads: Option<BeadsSettings>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RigEntry {
    /// The rig's short beads prefix, if configured and non-empty.
    pub fn prefix(&self) -> Option<&str> {
        match &self.beads {
            Some(beads) if !beads.prefix.is_empty() => Some(&beads.prefix),
            _ => None,
        }
    }
}

/// The whole `mayor/rigs.json` file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RigsFile {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub rigs: BTreeMap<String, RigEntry>,
}

fn default_version() -> u32 {
    1
}

impl RigsFile {
    pub fn load(path: &Path) -> Result<Self, RigsError> {
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| RigsError::Io {
            path: display.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| RigsError::Parse {
            path: display,
            source,
        })
    }

    pub fn rig(&self, name: &str) -> Option<&RigEntry> {
        self.rigs.get(name)
    }

    pub fn rig_names(&self) -> impl Iterator<Item = &String> {
        self.rigs.keys()
    }
}

#[cfg(test)]
#[path = "rigs_tests.rs"]
mod tests;
