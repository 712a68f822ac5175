// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Atomic file persistence.
//!
//! Every state file Gas Town owns is written via temp-file-then-rename so a
//! crash mid-write never leaves a torn file for the next reader. Reads are
//! strict: a missing file is a normal zero-value condition, but an empty or
//! malformed file is an error the caller must surface instead of treating
//! it as fresh state.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Errors from state-file persistence.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("reading {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("writing {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} is empty")]
    Empty { path: String },
    #[error("parsing {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("encoding {path}: {source}")]
    Encode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Load a JSON state file.
///
/// Returns `Ok(None)` when the file does not exist. An empty file or
/// unparseable content is an error, never silently a default.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StorageError> {
    let display = path.display().to_string();
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StorageError::Read {
                path: display,
                source,
            })
        }
    };
    if content.trim().is_empty() {
        return Err(StorageError::Empty { path: display });
    }
    let value = serde_json::from_str(&content).map_err(|source| StorageError::Parse {
        path: display,
        source,
    })?;
    Ok(Some(value))
}

/// Save a JSON state file atomically (write to `.tmp`, fsync, rename).
///
/// Output is pretty-printed with a trailing newline so the files remain
/// diffable and greppable.
pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let display = path.display().to_string();
    let mut content =
        serde_json::to_string_pretty(value).map_err(|source| StorageError::Encode {
            path: display,
            source,
        })?;
    content.push('\n');
    save_text(path, &content)
}

/// Save arbitrary text atomically with default permissions.
pub fn save_text(path: &Path, content: &str) -> Result<(), StorageError> {
    save_text_with_mode(path, content, None)
}

/// Save arbitrary text atomically, optionally with a unix mode.
pub fn save_text_with_mode(
    path: &Path,
    content: &str,
    mode: Option<u32>,
) -> Result<(), StorageError> {
    let display = path.display().to_string();
    let write_err = |source| StorageError::Write {
        path: display.clone(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let tmp_path = path.with_extension("tmp");
    {
        let mut file = File::create(&tmp_path).map_err(write_err)?;
        file.write_all(content.as_bytes()).map_err(write_err)?;
        file.sync_all().map_err(write_err)?;
    }
    #[cfg(unix)]
    if let Some(mode) = mode {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&tmp_path, fs::Permissions::from_mode(mode)).map_err(write_err)?;
    }
    #[cfg(not(unix))]
    let _ = mode;

    fs::rename(&tmp_path, path).map_err(write_err)?;
    Ok(())
}

#[cfg(test)]
#[path = "atomic_tests.rs"]
mod tests;
