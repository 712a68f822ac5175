// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The prefix registry: short beads prefix ↔ rig name.
//!
//! Built once from `mayor/rigs.json` and shared by everything that encodes
//! or parses session names. Read-mostly; writes happen only while the
//! registry is being populated.

use crate::rigs::RigsFile;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Errors from registry population.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("empty prefix for rig {0:?}")]
    EmptyPrefix(String),
    #[error("prefix {prefix:?} already registered for rig {existing:?}")]
    DuplicatePrefix { prefix: String, existing: String },
    #[error("rig {rig:?} already registered with prefix {existing:?}")]
    DuplicateRig { rig: String, existing: String },
}

#[derive(Default, Debug)]
struct Inner {
    prefix_to_rig: HashMap<String, String>,
    rig_to_prefix: HashMap<String, String>,
}

/// Bidirectional prefix ↔ rig map behind a reader/writer lock.
#[derive(Default, Debug)]
pub struct PrefixRegistry {
    inner: RwLock<Inner>,
}

impl PrefixRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate a registry from the rigs model. Rigs without a beads prefix
    /// are skipped; the doctor has checks that surface them.
    pub fn from_rigs(rigs: &RigsFile) -> Result<Self, RegistryError> {
        let registry = Self::new();
        for (name, entry) in &rigs.rigs {
            let Some(prefix) = entry.prefix() else {
                continue;
            };
            registry.register(name, prefix)?;
        }
        Ok(registry)
    }

    pub fn register(&self, rig: &str, prefix: &str) -> Result<(), RegistryError> {
        if prefix.is_empty() {
            return Err(RegistryError::EmptyPrefix(rig.to_string()));
        }
        let mut inner = self.inner.write();
        if let Some(existing) = inner.prefix_to_rig.get(prefix) {
            return Err(RegistryError::DuplicatePrefix {
                prefix: prefix.to_string(),
                existing: existing.clone(),
            });
        }
        if let Some(existing) = inner.rig_to_prefix.get(rig) {
            return Err(RegistryError::DuplicateRig {
                rig: rig.to_string(),
                existing: existing.clone(),
            });
        }
        inner
            .prefix_to_rig
            .insert(prefix.to_string(), rig.to_string());
        inner
            .rig_to_prefix
            .insert(rig.to_string(), prefix.to_string());
        Ok(())
    }

    pub fn prefix_for_rig(&self, rig: &str) -> Option<String> {
        self.inner.read().rig_to_prefix.get(rig).cloned()
    }

    pub fn rig_for_prefix(&self, prefix: &str) -> Option<String> {
        self.inner.read().prefix_to_rig.get(prefix).cloned()
    }

    /// All registered rig names, sorted.
    pub fn rigs(&self) -> Vec<String> {
        let mut rigs: Vec<String> = self.inner.read().rig_to_prefix.keys().cloned().collect();
        rigs.sort();
        rigs
    }

    /// All registered prefixes, sorted.
    pub fn prefixes(&self) -> Vec<String> {
        let mut prefixes: Vec<String> = self.inner.read().prefix_to_rig.keys().cloned().collect();
        prefixes.sort();
        prefixes
    }

    /// Find the longest registered prefix `p` such that `s` starts with
    /// `p-`. Returns `(prefix, rig)`.
    ///
    /// Longest-match matters: with both `gt` and `gt2` registered, the
    /// session `gt2-witness` must resolve to `gt2`.
    pub fn longest_prefix_match(&self, s: &str) -> Option<(String, String)> {
        let inner = self.inner.read();
        let mut best: Option<(&String, &String)> = None;
        for (prefix, rig) in &inner.prefix_to_rig {
            let Some(rest) = s.strip_prefix(prefix.as_str()) else {
                continue;
            };
            let Some(rest) = rest.strip_prefix('-') else {
                continue;
            };
            if rest.is_empty() {
                continue;
            }
            if best.is_none_or(|(b, _)| prefix.len() > b.len()) {
                best = Some((prefix, rig));
            }
        }
        best.map(|(p, r)| (p.clone(), r.clone()))
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().prefix_to_rig.is_empty()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
