// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent settings materialization.

use crate::error::EngineError;
use crate::runtime::AgentRuntime;
use std::path::{Path, PathBuf};

/// Where the runtime's settings file lives for a session rooted at
/// `work_dir`.
pub fn settings_path(work_dir: &Path, runtime: &AgentRuntime) -> PathBuf {
    work_dir.join(runtime.settings_dir).join(runtime.settings_file)
}

/// Write the runtime's default settings file if none exists.
///
/// An existing file always wins; user customization is never overwritten.
/// Returns whether a file was written.
pub fn materialize_settings(
    work_dir: &Path,
    runtime: &AgentRuntime,
) -> Result<bool, EngineError> {
    let path = settings_path(work_dir, runtime);
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| EngineError::io(format!("creating {}", parent.display()), e))?;
    }
    std::fs::write(&path, runtime.default_settings)
        .map_err(|e| EngineError::io(format!("writing {}", path.display()), e))?;
    Ok(true)
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
