// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake multiplexer for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{Multiplexer, MuxError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Recorded multiplexer call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MuxCall {
    HasSession(String),
    ListSessions,
    NewSession {
        name: String,
        workdir: PathBuf,
        cmd: String,
    },
    Kill(String),
    KillWithProcesses(String),
    SetRemainOnExit {
        name: String,
        on: bool,
    },
    SetAutoRespawnHook(String),
    SetEnvironment {
        name: String,
        key: String,
        value: String,
    },
    SendKeys {
        name: String,
        text: String,
    },
    SendRawKeys {
        name: String,
        keys: Vec<String>,
    },
    Rename {
        from: String,
        to: String,
    },
    SetOption {
        name: String,
        option: String,
        value: String,
    },
}

/// Scriptable session pane state
#[derive(Debug, Clone)]
pub struct FakePane {
    pub workdir: PathBuf,
    pub cmd: String,
    pub pane_command: String,
    pub pid: i32,
    pub env: Vec<(String, String)>,
    pub options: Vec<(String, String)>,
    pub remain_on_exit: bool,
    pub respawn_hook: bool,
    pub content: String,
}

struct FakeMuxState {
    sessions: BTreeMap<String, FakePane>,
    calls: Vec<MuxCall>,
    no_server: bool,
    spawn_command: String,
    next_pid: i32,
}

/// Fake multiplexer for testing.
///
/// Sessions spawn with their pane command set to `spawn_command`
/// (default "claude"); tests script zombies and shells via
/// [`FakeMux::set_pane_command`].
#[derive(Clone)]
pub struct FakeMux {
    inner: Arc<Mutex<FakeMuxState>>,
}

impl Default for FakeMux {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeMuxState {
                sessions: BTreeMap::new(),
                calls: Vec::new(),
                no_server: false,
                spawn_command: "claude".to_string(),
                next_pid: 10_000,
            })),
        }
    }
}

impl FakeMux {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<MuxCall> {
        self.inner.lock().calls.clone()
    }

    /// Session names killed, in order (either kill flavor).
    pub fn kill_order(&self) -> Vec<String> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                MuxCall::Kill(name) | MuxCall::KillWithProcesses(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn get_session(&self, name: &str) -> Option<FakePane> {
        self.inner.lock().sessions.get(name).cloned()
    }

    /// Add a pre-existing session with the given pane command.
    pub fn add_session(&self, name: &str, pane_command: &str) {
        let mut inner = self.inner.lock();
        let pid = inner.next_pid;
        inner.next_pid += 1;
        inner.sessions.insert(
            name.to_string(),
            FakePane {
                workdir: PathBuf::new(),
                cmd: String::new(),
                pane_command: pane_command.to_string(),
                pid,
                env: Vec::new(),
                options: Vec::new(),
                remain_on_exit: false,
                respawn_hook: false,
                content: String::new(),
            },
        );
    }

    /// Override what newly-spawned panes report as their command.
    pub fn set_spawn_command(&self, command: &str) {
        self.inner.lock().spawn_command = command.to_string();
    }

    pub fn set_pane_command(&self, name: &str, command: &str) {
        if let Some(pane) = self.inner.lock().sessions.get_mut(name) {
            pane.pane_command = command.to_string();
        }
    }

    pub fn set_pane_pid(&self, name: &str, pid: i32) {
        if let Some(pane) = self.inner.lock().sessions.get_mut(name) {
            pane.pid = pid;
        }
    }

    pub fn set_pane_content(&self, name: &str, content: &str) {
        if let Some(pane) = self.inner.lock().sessions.get_mut(name) {
            pane.content = content.to_string();
        }
    }

    /// Remove a session out from under the caller (simulates a crash).
    pub fn drop_session(&self, name: &str) {
        self.inner.lock().sessions.remove(name);
    }

    /// Simulate the multiplexer server being down.
    pub fn set_no_server(&self, down: bool) {
        self.inner.lock().no_server = down;
    }

    fn record(&self, call: MuxCall) {
        self.inner.lock().calls.push(call);
    }
}

#[async_trait]
impl Multiplexer for FakeMux {
    async fn has_session(&self, name: &str) -> Result<bool, MuxError> {
        self.record(MuxCall::HasSession(name.to_string()));
        let inner = self.inner.lock();
        if inner.no_server {
            return Ok(false);
        }
        Ok(inner.sessions.contains_key(name))
    }

    async fn list_sessions(&self) -> Result<Vec<String>, MuxError> {
        self.record(MuxCall::ListSessions);
        let inner = self.inner.lock();
        if inner.no_server {
            return Ok(Vec::new());
        }
        Ok(inner.sessions.keys().cloned().collect())
    }

    async fn new_session_with_command(
        &self,
        name: &str,
        workdir: &Path,
        cmd: &str,
    ) -> Result<(), MuxError> {
        self.record(MuxCall::NewSession {
            name: name.to_string(),
            workdir: workdir.to_path_buf(),
            cmd: cmd.to_string(),
        });
        let mut inner = self.inner.lock();
        if inner.sessions.contains_key(name) {
            return Err(MuxError::SessionExists(name.to_string()));
        }
        let pane_command = inner.spawn_command.clone();
        let pid = inner.next_pid;
        inner.next_pid += 1;
        inner.sessions.insert(
            name.to_string(),
            FakePane {
                workdir: workdir.to_path_buf(),
                cmd: cmd.to_string(),
                pane_command,
                pid,
                env: Vec::new(),
                options: Vec::new(),
                remain_on_exit: false,
                respawn_hook: false,
                content: String::new(),
            },
        );
        Ok(())
    }

    async fn kill_session(&self, name: &str) -> Result<(), MuxError> {
        self.record(MuxCall::Kill(name.to_string()));
        self.inner.lock().sessions.remove(name);
        Ok(())
    }

    async fn kill_session_with_processes(&self, name: &str) -> Result<(), MuxError> {
        self.record(MuxCall::KillWithProcesses(name.to_string()));
        self.inner.lock().sessions.remove(name);
        Ok(())
    }

    async fn set_remain_on_exit(&self, name: &str, on: bool) -> Result<(), MuxError> {
        self.record(MuxCall::SetRemainOnExit {
            name: name.to_string(),
            on,
        });
        let mut inner = self.inner.lock();
        match inner.sessions.get_mut(name) {
            Some(pane) => {
                pane.remain_on_exit = on;
                Ok(())
            }
            None => Err(MuxError::SessionNotFound(name.to_string())),
        }
    }

    async fn set_auto_respawn_hook(&self, name: &str) -> Result<(), MuxError> {
        self.record(MuxCall::SetAutoRespawnHook(name.to_string()));
        let mut inner = self.inner.lock();
        match inner.sessions.get_mut(name) {
            Some(pane) => {
                pane.respawn_hook = true;
                Ok(())
            }
            None => Err(MuxError::SessionNotFound(name.to_string())),
        }
    }

    async fn set_environment(&self, name: &str, key: &str, value: &str) -> Result<(), MuxError> {
        self.record(MuxCall::SetEnvironment {
            name: name.to_string(),
            key: key.to_string(),
            value: value.to_string(),
        });
        let mut inner = self.inner.lock();
        match inner.sessions.get_mut(name) {
            Some(pane) => {
                pane.env.retain(|(k, _)| k != key);
                pane.env.push((key.to_string(), value.to_string()));
                Ok(())
            }
            None => Err(MuxError::SessionNotFound(name.to_string())),
        }
    }

    async fn show_environment(&self, name: &str) -> Result<Vec<(String, String)>, MuxError> {
        let inner = self.inner.lock();
        match inner.sessions.get(name) {
            Some(pane) => Ok(pane.env.clone()),
            None => Err(MuxError::SessionNotFound(name.to_string())),
        }
    }

    async fn send_keys(&self, name: &str, text: &str) -> Result<(), MuxError> {
        self.record(MuxCall::SendKeys {
            name: name.to_string(),
            text: text.to_string(),
        });
        let inner = self.inner.lock();
        if !inner.sessions.contains_key(name) {
            return Err(MuxError::SessionNotFound(name.to_string()));
        }
        Ok(())
    }

    async fn send_raw_keys(&self, name: &str, keys: &[&str]) -> Result<(), MuxError> {
        self.record(MuxCall::SendRawKeys {
            name: name.to_string(),
            keys: keys.iter().map(|k| k.to_string()).collect(),
        });
        let inner = self.inner.lock();
        if !inner.sessions.contains_key(name) {
            return Err(MuxError::SessionNotFound(name.to_string()));
        }
        Ok(())
    }

    async fn pane_pid(&self, name: &str) -> Result<i32, MuxError> {
        let inner = self.inner.lock();
        match inner.sessions.get(name) {
            Some(pane) => Ok(pane.pid),
            None => Err(MuxError::SessionNotFound(name.to_string())),
        }
    }

    async fn pane_current_command(&self, name: &str) -> Result<String, MuxError> {
        let inner = self.inner.lock();
        match inner.sessions.get(name) {
            Some(pane) => Ok(pane.pane_command.clone()),
            None => Err(MuxError::SessionNotFound(name.to_string())),
        }
    }

    async fn capture_pane(&self, name: &str, _lines: u32) -> Result<String, MuxError> {
        let inner = self.inner.lock();
        match inner.sessions.get(name) {
            Some(pane) => Ok(pane.content.clone()),
            None => Err(MuxError::SessionNotFound(name.to_string())),
        }
    }

    async fn rename_session(&self, from: &str, to: &str) -> Result<(), MuxError> {
        self.record(MuxCall::Rename {
            from: from.to_string(),
            to: to.to_string(),
        });
        let mut inner = self.inner.lock();
        if inner.sessions.contains_key(to) {
            return Err(MuxError::SessionExists(to.to_string()));
        }
        match inner.sessions.remove(from) {
            Some(pane) => {
                inner.sessions.insert(to.to_string(), pane);
                Ok(())
            }
            None => Err(MuxError::SessionNotFound(from.to_string())),
        }
    }

    async fn set_option(&self, name: &str, option: &str, value: &str) -> Result<(), MuxError> {
        self.record(MuxCall::SetOption {
            name: name.to_string(),
            option: option.to_string(),
            value: value.to_string(),
        });
        let mut inner = self.inner.lock();
        match inner.sessions.get_mut(name) {
            Some(pane) => {
                pane.options.push((option.to_string(), value.to_string()));
                Ok(())
            }
            None => Err(MuxError::SessionNotFound(name.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
