// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sequential check execution.

use crate::context::CheckContext;
use crate::framework::{Check, CheckResult, Status};
use tracing::{info, warn};

/// What happened when a fix was attempted.
#[derive(Debug, Clone)]
pub struct FixOutcome {
    pub check: String,
    pub fixed: bool,
    pub error: Option<String>,
}

/// A complete doctor pass.
#[derive(Debug, Default)]
pub struct DoctorReport {
    pub results: Vec<CheckResult>,
    pub fixes: Vec<FixOutcome>,
}

impl DoctorReport {
    /// Errors remaining after the pass (post-fix re-runs included).
    pub fn error_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.status == Status::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.status == Status::Warning)
            .count()
    }
}

/// Run every check in order; with `fix`, attempt the fix for any
/// non-OK fixable finding and re-run the check to report the post-fix
/// state.
pub async fn run_checks(
    ctx: &CheckContext,
    checks: &mut [Box<dyn Check>],
    fix: bool,
) -> DoctorReport {
    let mut report = DoctorReport::default();

    for check in checks.iter_mut() {
        let mut result = check.run(ctx).await;
        info!(check = check.name(), status = %result.status, "check ran");

        let needs_fix = matches!(result.status, Status::Warning | Status::Error);
        if fix && needs_fix && check.can_fix() {
            match check.fix(ctx).await {
                Ok(()) => {
                    report.fixes.push(FixOutcome {
                        check: check.name().to_string(),
                        fixed: true,
                        error: None,
                    });
                    // Report the state the fix left behind
                    result = check.run(ctx).await;
                }
                Err(e) => {
                    warn!(check = check.name(), error = %e, "fix failed");
                    report.fixes.push(FixOutcome {
                        check: check.name().to_string(),
                        fixed: false,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        report.results.push(result);
    }

    report
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
