// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The beads routing file, `.beads/routes.jsonl`.
//!
//! Newline-delimited JSON, one route per line, written byte-exactly as
//! `{"prefix":"<p>","path":"<path>"}` because the beads CLI greps these
//! lines. Malformed lines are skipped on read (other tools append here
//! too), never rewritten silently.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

use crate::atomic::{save_text, StorageError};

/// One routing entry: issue-id prefix → rig-relative beads path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub prefix: String,
    pub path: String,
}

impl Route {
    pub fn new(prefix: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            path: path.into(),
        }
    }
}

/// Read all well-formed routes. A missing file reads as no routes.
pub fn read_routes(path: &Path) -> Result<Vec<Route>, StorageError> {
    let path_display = path.display().to_string();
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(StorageError::Read {
                path: path_display,
                source,
            })
        }
    };

    let mut routes = Vec::new();
    for (lineno, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Route>(line) {
            Ok(route) => routes.push(route),
            Err(e) => {
                warn!(path = %path_display, line = lineno + 1, error = %e, "skipping malformed route");
            }
        }
    }
    Ok(routes)
}

/// Write the complete routes file atomically in the exact line format.
pub fn write_routes(path: &Path, routes: &[Route]) -> Result<(), StorageError> {
    let mut content = String::new();
    for route in routes {
        content.push_str(&format!(
            "{{\"prefix\":{},\"path\":{}}}\n",
            json_string(&route.prefix),
            json_string(&route.path)
        ));
    }
    save_text(path, &content)
}

fn json_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
