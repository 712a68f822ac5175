// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistent PID tracking.
//!
//! `kill_session_with_processes` cannot reach a child that reparented to
//! init before the kill cascade found it. As defense in depth, every
//! session's pane pid is recorded together with the process birth time;
//! the shutdown sweep re-verifies the birth time before signalling so a
//! recycled pid is never killed.
//!
//! Record format: one line, `<pid>` or `<pid>|<birth-time>`.

use crate::error::EngineError;
use gt_adapters::process::{self, ProcessError};
use gt_core::Town;
use gt_storage::atomic::save_text;
use tracing::{debug, warn};

/// A persisted pid record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedPid {
    pub pid: i32,
    /// Opaque platform token; absent when the platform lookup failed at
    /// track time.
    pub birth_time: Option<String>,
}

impl TrackedPid {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let (pid_part, birth) = match line.split_once('|') {
            Some((pid, birth)) if !birth.is_empty() => (pid, Some(birth.to_string())),
            Some((pid, _)) => (pid, None),
            None => (line, None),
        };
        let pid = pid_part.parse::<i32>().ok()?;
        if pid <= 0 {
            return None;
        }
        Some(Self {
            pid,
            birth_time: birth,
        })
    }

    pub fn to_line(&self) -> String {
        match &self.birth_time {
            Some(birth) => format!("{}|{}\n", self.pid, birth),
            None => format!("{}\n", self.pid),
        }
    }
}

/// Record a session's pane pid.
///
/// A failed birth-time lookup degrades to a pid-only record rather than
/// failing the start.
pub fn track_pid(town: &Town, session_id: &str, pid: i32) -> Result<(), EngineError> {
    let birth_time = match process::process_start_time(pid) {
        Ok(birth) => Some(birth),
        Err(ProcessError::Unsupported) => None,
        Err(e) => {
            debug!(pid, error = %e, "birth time unavailable, tracking pid only");
            None
        }
    };
    let record = TrackedPid { pid, birth_time };
    save_text(&town.pid_file(session_id), &record.to_line())?;
    Ok(())
}

/// Remove a session's pid record. Missing is fine.
pub fn untrack_pid(town: &Town, session_id: &str) -> Result<(), EngineError> {
    match std::fs::remove_file(town.pid_file(session_id)) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(EngineError::io(
            format!("removing pid record for {session_id}"),
            e,
        )),
    }
}

/// Result of a tracker sweep.
#[derive(Debug, Default)]
pub struct SweepReport {
    pub killed: u32,
    pub errors: Vec<String>,
}

/// Sweep every pid record in the town, terminating surviving processes.
///
/// Per record:
/// - unparseable → delete the file
/// - process gone → delete the file
/// - recorded birth time, current lookup fails → **preserve** the file and
///   record an error so a later sweep can retry
/// - birth time differs → pid was reused; delete without signalling
/// - otherwise → SIGTERM and delete
pub fn kill_tracked_pids(town: &Town) -> SweepReport {
    let mut report = SweepReport::default();
    let pids_dir = town.pids_dir();
    let entries = match std::fs::read_dir(&pids_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return report,
        Err(e) => {
            report
                .errors
                .push(format!("reading {}: {e}", pids_dir.display()));
            return report;
        }
    };

    for entry in entries {
        let Ok(entry) = entry else { continue };
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("pid") {
            continue;
        }

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                report.errors.push(format!("reading {}: {e}", path.display()));
                continue;
            }
        };

        let Some(record) = TrackedPid::parse(&content) else {
            debug!(path = %path.display(), "deleting unparseable pid record");
            remove_record(&path, &mut report);
            continue;
        };

        if !process::pid_alive(record.pid) {
            remove_record(&path, &mut report);
            continue;
        }

        if let Some(recorded_birth) = &record.birth_time {
            match process::process_start_time(record.pid) {
                Ok(current_birth) => {
                    if &current_birth != recorded_birth {
                        // Pid reuse: this is a different process
                        debug!(
                            pid = record.pid,
                            "pid reused since tracking, not signalling"
                        );
                        remove_record(&path, &mut report);
                        continue;
                    }
                }
                Err(ProcessError::NotFound(_)) => {
                    // Raced with process exit
                    remove_record(&path, &mut report);
                    continue;
                }
                Err(e) => {
                    // Identity unverifiable: keep the record for a retry
                    report.errors.push(format!(
                        "verifying pid {} for {}: {e}",
                        record.pid,
                        path.display()
                    ));
                    continue;
                }
            }
        }

        match process::terminate(record.pid) {
            Ok(()) => {
                report.killed += 1;
                remove_record(&path, &mut report);
            }
            Err(ProcessError::NotFound(_)) => {
                remove_record(&path, &mut report);
            }
            Err(e) => {
                warn!(pid = record.pid, error = %e, "failed to terminate tracked pid");
                report
                    .errors
                    .push(format!("terminating pid {}: {e}", record.pid));
            }
        }
    }

    report
}

fn remove_record(path: &std::path::Path, report: &mut SweepReport) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            report.errors.push(format!("removing {}: {e}", path.display()));
        }
    }
}

#[cfg(test)]
#[path = "pid_tracker_tests.rs"]
mod tests;
