// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The normalized session start pipeline.
//!
//! Every agent role starts through [`Lifecycle::start_session`]. The
//! pipeline either returns a fully verified session or no session at all:
//! any failure after pane creation kills the partial session before the
//! error propagates.

use crate::env::agent_env;
use crate::error::EngineError;
use crate::pid_tracker;
use crate::runtime::{runtime_for, AgentRuntime};
use crate::settings::materialize_settings;
use gt_adapters::mux::{
    accept_bypass_warning, wait_for_command, Multiplexer, KNOWN_SHELLS,
};
use gt_core::beacon::{build_startup_prompt, Beacon};
use gt_core::{Identity, Role, Town};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

/// How long `wait_for_agent` polls before giving up.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(30);

/// How long a graceful stop waits before escalating to a kill.
pub const GRACEFUL_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Session startup descriptor.
#[derive(Debug, Clone)]
pub struct StartSpec {
    pub session_id: String,
    pub work_dir: PathBuf,
    pub role: Role,
    pub rig_name: Option<String>,
    pub agent_name: Option<String>,
    /// Pre-built launch command; when empty the command is rendered from
    /// `beacon` + `instructions`.
    pub command: Option<String>,
    pub beacon: Option<Beacon>,
    pub instructions: Option<String>,
    /// Selects a non-default agent runtime.
    pub agent_override: Option<String>,
    pub extra_env: Vec<(String, String)>,
    /// Status-bar color, applied best-effort.
    pub theme: Option<String>,
    pub wait_for_agent: bool,
    /// When waiting fails, kill the session and propagate instead of
    /// logging and continuing.
    pub wait_fatal: bool,
    pub accept_bypass: bool,
    pub ready_delay: bool,
    pub auto_respawn: bool,
    pub remain_on_exit: bool,
    pub track_pid: bool,
    pub verify_survived: bool,
    pub wait_timeout: Duration,
}

impl StartSpec {
    pub fn new(session_id: impl Into<String>, work_dir: impl Into<PathBuf>, role: Role) -> Self {
        Self {
            session_id: session_id.into(),
            work_dir: work_dir.into(),
            role,
            rig_name: None,
            agent_name: None,
            command: None,
            beacon: None,
            instructions: None,
            agent_override: None,
            extra_env: Vec::new(),
            theme: None,
            wait_for_agent: false,
            wait_fatal: false,
            accept_bypass: false,
            ready_delay: false,
            auto_respawn: false,
            remain_on_exit: false,
            track_pid: true,
            verify_survived: false,
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
        }
    }

    /// The identity this spec starts.
    pub fn identity(&self) -> Result<Identity, EngineError> {
        let rig = || {
            self.rig_name
                .clone()
                .ok_or_else(|| EngineError::InvalidSpec(format!("{} requires a rig", self.role)))
        };
        let name = || {
            self.agent_name
                .clone()
                .ok_or_else(|| EngineError::InvalidSpec(format!("{} requires a name", self.role)))
        };
        let invalid = |e: gt_core::IdentityError| EngineError::InvalidSpec(e.to_string());
        match self.role {
            Role::Mayor => Ok(Identity::mayor()),
            Role::Deacon => Ok(Identity::deacon()),
            Role::Boot => Ok(Identity::boot()),
            Role::Dog => Identity::dog(name()?).map_err(invalid),
            Role::Witness => Ok(Identity::witness(rig()?)),
            Role::Refinery => Ok(Identity::refinery(rig()?)),
            Role::Polecat => Identity::polecat(rig()?, name()?).map_err(invalid),
            Role::Crew => Identity::crew(rig()?, name()?).map_err(invalid),
        }
    }
}

/// The session lifecycle engine.
#[derive(Clone)]
pub struct Lifecycle<M: Multiplexer> {
    pub(crate) mux: M,
    pub(crate) town: Town,
    pub(crate) graceful_timeout: Duration,
}

impl<M: Multiplexer> Lifecycle<M> {
    pub fn new(mux: M, town: Town) -> Self {
        Self {
            mux,
            town,
            graceful_timeout: GRACEFUL_SHUTDOWN_TIMEOUT,
        }
    }

    /// Shorten the graceful-stop window (tests).
    pub fn with_graceful_timeout(mut self, timeout: Duration) -> Self {
        self.graceful_timeout = timeout;
        self
    }

    pub fn town(&self) -> &Town {
        &self.town
    }

    pub fn mux(&self) -> &M {
        &self.mux
    }

    /// Start a session, replacing a zombie if one holds the name.
    pub async fn start_session(&self, spec: &StartSpec) -> Result<AgentRuntime, EngineError> {
        if spec.session_id.is_empty() {
            return Err(EngineError::InvalidSpec("empty session id".to_string()));
        }
        if spec.work_dir.as_os_str().is_empty() {
            return Err(EngineError::InvalidSpec("empty work dir".to_string()));
        }
        let identity = spec.identity()?;
        let runtime = runtime_for(spec.role, spec.agent_override.as_deref())?;

        // A dead agent holding the name is replaced; a live one is not.
        if self.kill_existing(&spec.session_id, true).await? {
            info!(session = %spec.session_id, "replaced zombie session");
        }

        if materialize_settings(&spec.work_dir, &runtime)? {
            debug!(session = %spec.session_id, "materialized default agent settings");
        }

        let command = self.build_command(spec, &runtime)?;

        self.mux
            .new_session_with_command(&spec.session_id, &spec.work_dir, &command)
            .await
            .map_err(|e| match e {
                gt_adapters::MuxError::SessionExists(_) => {
                    EngineError::AlreadyRunning(spec.session_id.clone())
                }
                e => e.into(),
            })?;

        match self.finish_start(spec, &identity, &runtime).await {
            Ok(()) => Ok(runtime),
            Err(e) => {
                // No partial sessions: the pane dies with the error
                if let Err(kill_err) = self
                    .mux
                    .kill_session_with_processes(&spec.session_id)
                    .await
                {
                    warn!(session = %spec.session_id, error = %kill_err,
                        "cleanup kill after failed start");
                }
                Err(e)
            }
        }
    }

    /// Steps after pane creation; failures here trigger cleanup.
    async fn finish_start(
        &self,
        spec: &StartSpec,
        identity: &Identity,
        runtime: &AgentRuntime,
    ) -> Result<(), EngineError> {
        let session = spec.session_id.as_str();

        // Set immediately so even a fast crash leaves the pane for autopsy
        if spec.remain_on_exit {
            self.mux.set_remain_on_exit(session, true).await?;
        }

        for (key, value) in self.session_env(spec, identity) {
            self.mux.set_environment(session, &key, &value).await?;
        }

        if let Some(color) = &spec.theme {
            let style = format!("bg={color},fg=black");
            if let Err(e) = self.mux.set_option(session, "status-style", &style).await {
                warn!(session, error = %e, "theming failed");
            }
        }

        if spec.wait_for_agent {
            match wait_for_command(&self.mux, session, KNOWN_SHELLS, spec.wait_timeout).await {
                Ok(command) => debug!(session, command, "agent process appeared"),
                Err(e) if spec.wait_fatal => {
                    return Err(EngineError::StartTimeout {
                        session: session.to_string(),
                        source: e,
                    });
                }
                Err(e) => warn!(session, error = %e, "agent did not appear, continuing"),
            }
        }

        if spec.auto_respawn {
            if let Err(e) = self.mux.set_auto_respawn_hook(session).await {
                warn!(session, error = %e, "respawn hook install failed");
            }
        }

        if spec.accept_bypass {
            if let Err(e) = accept_bypass_warning(&self.mux, session).await {
                warn!(session, error = %e, "bypass warning dismissal failed");
            }
        }

        if spec.ready_delay && !runtime.ready_delay.is_zero() {
            tokio::time::sleep(runtime.ready_delay).await;
        }

        if spec.verify_survived && !self.mux.has_session(session).await? {
            return Err(EngineError::DiedDuringStartup(session.to_string()));
        }

        if spec.track_pid {
            match self.mux.pane_pid(session).await {
                Ok(pid) => {
                    if let Err(e) = pid_tracker::track_pid(&self.town, session, pid) {
                        warn!(session, error = %e, "pid tracking failed");
                    }
                }
                Err(e) => warn!(session, error = %e, "pane pid lookup failed"),
            }
        }

        Ok(())
    }

    /// The startup command, with the inline environment prefix the very
    /// first subshell needs before `set_environment` lands.
    fn build_command(
        &self,
        spec: &StartSpec,
        runtime: &AgentRuntime,
    ) -> Result<String, EngineError> {
        let base = match (&spec.command, &spec.beacon) {
            (Some(command), _) if !command.is_empty() => command.clone(),
            (_, Some(beacon)) => {
                let prompt = build_startup_prompt(beacon, spec.instructions.as_deref());
                runtime.build_command(&prompt)
            }
            _ => {
                return Err(EngineError::InvalidSpec(
                    "neither command nor beacon provided".to_string(),
                ))
            }
        };

        let mut prefix = String::new();
        if let Some(config_env) = runtime.config_dir_env {
            let config_dir = spec.work_dir.join(runtime.settings_dir);
            prefix.push_str(&format!(
                "{config_env}={} ",
                shell_quote_path(&config_dir.display().to_string())
            ));
        }
        for (key, value) in &spec.extra_env {
            prefix.push_str(&format!("{key}={} ", shell_quote_path(value)));
        }

        Ok(format!("{prefix}{base}"))
    }

    /// Canonical environment plus the caller's extras, in application order.
    pub(crate) fn session_env(
        &self,
        spec: &StartSpec,
        identity: &Identity,
    ) -> Vec<(String, String)> {
        let mut env = agent_env(identity, &self.town, spec.agent_override.as_deref());
        env.extend(spec.extra_env.iter().cloned());
        env
    }
}

fn shell_quote_path(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
