// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The check interface.

use crate::context::CheckContext;
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Errors from fix operations.
#[derive(Debug, Error)]
pub enum DoctorError {
    #[error("check {0} has no fix")]
    NotFixable(&'static str),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Storage(#[from] gt_storage::StorageError),

    #[error(transparent)]
    Mux(#[from] gt_adapters::MuxError),

    #[error(transparent)]
    Git(#[from] gt_adapters::GitError),

    #[error(transparent)]
    Beads(#[from] gt_adapters::BeadsError),

    /// Per-item failures from a multi-item fix, joined.
    #[error("{0}")]
    Partial(String),
}

impl DoctorError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Join per-item errors into one, or succeed when there are none.
    pub fn join(errors: Vec<String>) -> Result<(), DoctorError> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(DoctorError::Partial(errors.join("; ")))
        }
    }
}

/// Outcome severity of a check run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Status {
    Ok,
    Skipped,
    Warning,
    Error,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Ok => "ok",
            Status::Skipped => "skipped",
            Status::Warning => "warning",
            Status::Error => "error",
        };
        f.write_str(s)
    }
}

/// Broad grouping for report display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Routes,
    Worktrees,
    Sessions,
    Environment,
    Beads,
    Storage,
    Settings,
    Config,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Routes => "routes",
            Category::Worktrees => "worktrees",
            Category::Sessions => "sessions",
            Category::Environment => "environment",
            Category::Beads => "beads",
            Category::Storage => "storage",
            Category::Settings => "settings",
            Category::Config => "config",
        };
        f.write_str(s)
    }
}

/// One check's report.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: Status,
    pub message: String,
    pub details: Vec<String>,
    pub fix_hint: Option<String>,
    pub category: Category,
}

impl CheckResult {
    pub fn new(
        name: &str,
        category: Category,
        status: Status,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            details: Vec::new(),
            fix_hint: None,
            category,
        }
    }

    pub fn ok(name: &str, category: Category, message: impl Into<String>) -> Self {
        Self::new(name, category, Status::Ok, message)
    }

    pub fn warning(name: &str, category: Category, message: impl Into<String>) -> Self {
        Self::new(name, category, Status::Warning, message)
    }

    pub fn error(name: &str, category: Category, message: impl Into<String>) -> Self {
        Self::new(name, category, Status::Error, message)
    }

    pub fn skipped(name: &str, category: Category, message: impl Into<String>) -> Self {
        Self::new(name, category, Status::Skipped, message)
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }

    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }
}

/// One diagnostic over the town.
///
/// `run` must clear and repopulate any cached findings; `fix` consumes
/// them and must be idempotent (a second call after one `run` succeeds
/// without changing anything). Calling `fix` before `run` either
/// re-detects internally or is a no-op.
#[async_trait]
pub trait Check: Send {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn category(&self) -> Category;

    fn can_fix(&self) -> bool {
        false
    }

    async fn run(&mut self, ctx: &CheckContext) -> CheckResult;

    async fn fix(&mut self, ctx: &CheckContext) -> Result<(), DoctorError> {
        let _ = ctx;
        Err(DoctorError::NotFixable(self.name()))
    }
}
