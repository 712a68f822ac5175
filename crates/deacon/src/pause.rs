// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The patrol pause flag, `.runtime/deacon/paused.json`.
//!
//! Absence of the file means not paused. Presence alone does not: only
//! `paused: true` pauses. An unreadable or corrupt file is an error, and
//! callers must fail safe (treat the town as possibly paused) instead of
//! dispatching.

use chrono::{DateTime, Utc};
use gt_core::Town;
use gt_storage::atomic::{load_json, save_text_with_mode};
use serde::{Deserialize, Serialize};

use crate::error::DeaconError;

/// Contents of the pause file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseState {
    pub paused: bool,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub paused_by: String,
    #[serde(default)]
    pub paused_at: Option<DateTime<Utc>>,
}

/// Write the pause flag.
pub fn pause(
    town: &Town,
    reason: &str,
    paused_by: &str,
    now: DateTime<Utc>,
) -> Result<(), DeaconError> {
    let state = PauseState {
        paused: true,
        reason: reason.to_string(),
        paused_by: paused_by.to_string(),
        paused_at: Some(now),
    };
    let mut content = serde_json::to_string_pretty(&state).map_err(|source| {
        gt_storage::StorageError::Encode {
            path: town.paused_path().display().to_string(),
            source,
        }
    })?;
    content.push('\n');
    // The reason may name people or incidents; keep it owner-readable
    save_text_with_mode(&town.paused_path(), &content, Some(0o600))?;
    Ok(())
}

/// Remove the pause flag. Missing is fine.
pub fn resume(town: &Town) -> Result<(), DeaconError> {
    match std::fs::remove_file(town.paused_path()) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(gt_storage::StorageError::Write {
            path: town.paused_path().display().to_string(),
            source,
        }
        .into()),
    }
}

/// Read the pause flag.
///
/// Returns `(false, None)` when the file is absent, `(paused, state)` when
/// it parses, and an error otherwise. A corrupt file must never read as
/// "not paused".
pub fn is_paused(town: &Town) -> Result<(bool, Option<PauseState>), DeaconError> {
    match load_json::<PauseState>(&town.paused_path())? {
        None => Ok((false, None)),
        Some(state) => Ok((state.paused, Some(state))),
    }
}

/// Guard used by every patrol before dispatching.
pub(crate) fn ensure_not_paused(town: &Town) -> Result<(), DeaconError> {
    let (paused, state) = is_paused(town)?;
    if paused {
        let reason = state
            .map(|s| s.reason)
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| "no reason recorded".to_string());
        return Err(DeaconError::Paused(reason));
    }
    Ok(())
}

#[cfg(test)]
#[path = "pause_tests.rs"]
mod tests;
