// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared read-only inputs for a doctor pass.

use gt_core::{Identity, PrefixRegistry, RigsFile, Town};
use std::sync::Arc;

/// What every check gets to look at. Adapters are injected into the
/// checks that need them, not carried here, so each check declares its
/// own external dependencies.
pub struct CheckContext {
    pub town: Town,
    pub registry: Arc<PrefixRegistry>,
    pub rigs: RigsFile,
    /// Restrict rig-scoped checks to one rig.
    pub rig_filter: Option<String>,
}

impl CheckContext {
    pub fn new(town: Town, registry: Arc<PrefixRegistry>, rigs: RigsFile) -> Self {
        Self {
            town,
            registry,
            rigs,
            rig_filter: None,
        }
    }

    pub fn with_rig_filter(mut self, rig: impl Into<String>) -> Self {
        self.rig_filter = Some(rig.into());
        self
    }

    /// Registered rig names, respecting the filter.
    pub fn rig_names(&self) -> Vec<String> {
        self.rigs
            .rig_names()
            .filter(|name| {
                self.rig_filter
                    .as_ref()
                    .is_none_or(|filter| filter == *name)
            })
            .cloned()
            .collect()
    }

    /// Every agent identity the on-disk town implies: the town singletons
    /// plus, per rig, the singletons and whatever polecat/crew directories
    /// exist.
    pub fn expected_identities(&self) -> Vec<Identity> {
        let mut identities = vec![Identity::mayor(), Identity::deacon()];

        for rig in self.rig_names() {
            identities.push(Identity::witness(&rig));
            identities.push(Identity::refinery(&rig));

            for (subdir, crew) in [("polecats", false), ("crew", true)] {
                let dir = self.town.rig_dir(&rig).join(subdir);
                let Ok(entries) = std::fs::read_dir(&dir) else {
                    continue;
                };
                for entry in entries.flatten() {
                    if !entry.path().is_dir() {
                        continue;
                    }
                    let Some(name) = entry.file_name().to_str().map(|s| s.to_string()) else {
                        continue;
                    };
                    let identity = if crew {
                        Identity::crew(&rig, &name)
                    } else {
                        Identity::polecat(&rig, &name)
                    };
                    if let Ok(identity) = identity {
                        identities.push(identity);
                    }
                }
            }
        }

        identities
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
