// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deacon error taxonomy.

use thiserror::Error;

/// Errors from patrol operations.
#[derive(Debug, Error)]
pub enum DeaconError {
    /// State files must parse; a corrupt store aborts the patrol before
    /// anything is dispatched.
    #[error(transparent)]
    Storage(#[from] gt_storage::StorageError),

    #[error(transparent)]
    Convoy(#[from] gt_adapters::ConvoyError),

    #[error(transparent)]
    Beads(#[from] gt_adapters::BeadsError),

    #[error(transparent)]
    Mux(#[from] gt_adapters::MuxError),

    #[error("patrols are paused: {0}")]
    Paused(String),
}
