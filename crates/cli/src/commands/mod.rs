// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subcommand implementations.

pub mod deacon;
pub mod doctor;
pub mod down;
pub mod start;
pub mod stop;

use anyhow::{Context, Result};
use gt_core::{PrefixRegistry, RigsFile, Town};
use std::path::Path;
use std::sync::Arc;

/// Locate the town from an explicit flag or by walking up from the cwd.
pub fn resolve_town(explicit: Option<&Path>) -> Result<Town> {
    match explicit {
        Some(root) => {
            if !root.join("mayor").join("rigs.json").is_file() {
                anyhow::bail!("{} is not a town root (no mayor/rigs.json)", root.display());
            }
            Ok(Town::new(root))
        }
        None => {
            let cwd = std::env::current_dir().context("determining cwd")?;
            Ok(Town::discover(&cwd)?)
        }
    }
}

/// Load the rigs model and build the prefix registry. Everything that
/// parses session names depends on this happening first.
pub fn load_registry(town: &Town) -> Result<(RigsFile, Arc<PrefixRegistry>)> {
    let rigs = RigsFile::load(&town.rigs_path())?;
    let registry = PrefixRegistry::from_rigs(&rigs)?;
    Ok((rigs, Arc::new(registry)))
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
