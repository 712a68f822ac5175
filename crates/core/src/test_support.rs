// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fixture builders shared by other crates' tests.
#![cfg_attr(coverage_nightly, coverage(off))]
#![allow(clippy::unwrap_used)]

use crate::registry::PrefixRegistry;
use crate::rigs::{BeadsSettings, RigEntry, RigsFile};
use std::path::Path;

/// Build a registry from `(rig, prefix)` pairs.
pub fn registry(pairs: &[(&str, &str)]) -> PrefixRegistry {
    let r = PrefixRegistry::new();
    for (rig, prefix) in pairs {
        r.register(rig, prefix).unwrap();
    }
    r
}

/// Build a rigs model from `(rig, prefix)` pairs.
pub fn rigs_file(pairs: &[(&str, &str)]) -> RigsFile {
    let mut rigs = RigsFile {
        version: 1,
        ..Default::default()
    };
    for (rig, prefix) in pairs {
        rigs.rigs.insert(
            rig.to_string(),
            RigEntry {
                beads: Some(BeadsSettings {
                    prefix: prefix.to_string(),
                }),
                ..Default::default()
            },
        );
    }
    rigs
}

/// Materialize a minimal town on disk: `mayor/rigs.json` plus each rig's
/// directory, and return the written JSON.
pub fn write_town(root: &Path, pairs: &[(&str, &str)]) -> String {
    let rigs = rigs_file(pairs);
    std::fs::create_dir_all(root.join("mayor")).unwrap();
    let mut json = serde_json::to_string_pretty(&rigs).unwrap();
    json.push('\n');
    std::fs::write(root.join("mayor/rigs.json"), &json).unwrap();
    for (rig, _) in pairs {
        std::fs::create_dir_all(root.join(rig)).unwrap();
    }
    json
}
