// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process identity probes.
//!
//! A pid alone does not identify a process: pids are reused. Pairing the
//! pid with the kernel's per-process start time gives a stable incarnation
//! identity, which is what the PID tracker persists and re-verifies before
//! ever signalling anything.

use thiserror::Error;

/// Errors from process probes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessError {
    #[error("no process with pid {0}")]
    NotFound(i32),
    #[error("process start time is not available on this platform")]
    Unsupported,
    #[error("probing pid {pid}: {detail}")]
    Probe { pid: i32, detail: String },
}

/// Whether a process with this pid currently exists.
///
/// Uses `kill(pid, 0)`; a permission error still means the pid is live.
#[cfg(unix)]
pub fn pid_alive(pid: i32) -> bool {
    use nix::errno::Errno;
    use nix::sys::signal::kill;
    use nix::unistd::Pid;
    match kill(Pid::from_raw(pid), None) {
        Ok(()) => true,
        Err(Errno::EPERM) => true,
        Err(_) => false,
    }
}

#[cfg(not(unix))]
pub fn pid_alive(_pid: i32) -> bool {
    false
}

/// Send SIGTERM to a process.
#[cfg(unix)]
pub fn terminate(pid: i32) -> Result<(), ProcessError> {
    use nix::errno::Errno;
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;
    match kill(Pid::from_raw(pid), Signal::SIGTERM) {
        Ok(()) => Ok(()),
        Err(Errno::ESRCH) => Err(ProcessError::NotFound(pid)),
        Err(e) => Err(ProcessError::Probe {
            pid,
            detail: e.to_string(),
        }),
    }
}

#[cfg(not(unix))]
pub fn terminate(_pid: i32) -> Result<(), ProcessError> {
    Err(ProcessError::Unsupported)
}

/// The process's start time, as an opaque platform-specific token.
///
/// Two reads that return the same token refer to the same process
/// incarnation. Callers must distinguish "lookup failed" (this error) from
/// "changed" (a different token): a failed lookup preserves a PID record,
/// a changed token invalidates it.
pub fn process_start_time(pid: i32) -> Result<String, ProcessError> {
    platform::start_time(pid)
}

#[cfg(target_os = "linux")]
mod platform {
    use super::ProcessError;

    pub fn start_time(pid: i32) -> Result<String, ProcessError> {
        let stat = match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
            Ok(stat) => stat,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ProcessError::NotFound(pid))
            }
            Err(e) => {
                return Err(ProcessError::Probe {
                    pid,
                    detail: e.to_string(),
                })
            }
        };
        parse_starttime(&stat).ok_or_else(|| ProcessError::Probe {
            pid,
            detail: "malformed /proc stat line".to_string(),
        })
    }

    /// Field 22 of `/proc/<pid>/stat` is the start time in clock ticks.
    /// The comm field (2) may contain spaces and parens, so split after
    /// the *last* `)` before counting.
    pub(super) fn parse_starttime(stat: &str) -> Option<String> {
        let (_, after_comm) = stat.rsplit_once(')')?;
        // after_comm begins with field 3 (state); starttime is field 22
        after_comm
            .split_whitespace()
            .nth(19)
            .map(|s| s.to_string())
    }
}

#[cfg(target_os = "macos")]
mod platform {
    use super::ProcessError;

    pub fn start_time(pid: i32) -> Result<String, ProcessError> {
        let output = std::process::Command::new("ps")
            .args(["-p", &pid.to_string(), "-o", "lstart="])
            .output()
            .map_err(|e| ProcessError::Probe {
                pid,
                detail: e.to_string(),
            })?;
        if !output.status.success() {
            return Err(ProcessError::NotFound(pid));
        }
        let lstart = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if lstart.is_empty() {
            return Err(ProcessError::NotFound(pid));
        }
        Ok(lstart)
    }
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
mod platform {
    use super::ProcessError;

    // Windows and friends track pid-only records.
    pub fn start_time(_pid: i32) -> Result<String, ProcessError> {
        Err(ProcessError::Unsupported)
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
