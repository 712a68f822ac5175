// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Beads database metadata, `<rig>/.beads/metadata.json`.
//!
//! The doctor rewrites the canonical fields in place; keys it does not
//! understand must survive the rewrite.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::atomic::{load_json, save_json, StorageError};

/// Metadata describing one rig's issue database.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BeadsMetadata {
    #[serde(default)]
    pub backend: String,
    /// `local` or `server`.
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub database: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_port: Option<u16>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl BeadsMetadata {
    pub fn load(path: &Path) -> Result<Option<Self>, StorageError> {
        load_json(path)
    }

    pub fn save(&self, path: &Path) -> Result<(), StorageError> {
        save_json(path, self)
    }

    pub fn is_server_mode(&self) -> bool {
        self.mode == "server"
    }

    /// `host:port` when this database runs in server mode.
    pub fn server_addr(&self) -> Option<String> {
        if !self.is_server_mode() {
            return None;
        }
        let host = self.server_host.as_deref()?;
        let port = self.server_port?;
        Some(format!("{host}:{port}"))
    }
}

#[cfg(test)]
#[path = "metadata_tests.rs"]
mod tests;
