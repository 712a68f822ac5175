// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine error taxonomy.

use gt_adapters::MuxError;
use gt_storage::StorageError;
use thiserror::Error;

/// Errors from lifecycle operations.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid start spec: {0}")]
    InvalidSpec(String),

    /// The session exists and its agent is alive; never overwritten.
    #[error("already running: {0}")]
    AlreadyRunning(String),

    #[error("waiting for {session} to start: {source}")]
    StartTimeout {
        session: String,
        #[source]
        source: MuxError,
    },

    #[error("session {0} died during startup")]
    DiedDuringStartup(String),

    #[error("unknown agent runtime: {0}")]
    UnknownRuntime(String),

    #[error(transparent)]
    Mux(#[from] MuxError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl EngineError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}
