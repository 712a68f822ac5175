// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session environment check.

use crate::context::CheckContext;
use crate::framework::{Category, Check, CheckResult};
use async_trait::async_trait;
use gt_adapters::mux::Multiplexer;
use gt_core::names;
use gt_engine::{agent_env, FORBIDDEN_ENV};

/// Each session's environment must match what the engine would set for
/// its identity, and `BEADS_DIR` must never be present (it short-circuits
/// prefix routing).
pub struct EnvVarsCheck<M: Multiplexer> {
    mux: M,
}

impl<M: Multiplexer> EnvVarsCheck<M> {
    pub fn new(mux: M) -> Self {
        Self { mux }
    }
}

#[async_trait]
impl<M: Multiplexer> Check for EnvVarsCheck<M> {
    fn name(&self) -> &'static str {
        "env-vars"
    }

    fn description(&self) -> &'static str {
        "session environments match the canonical agent environment"
    }

    fn category(&self) -> Category {
        Category::Environment
    }

    async fn run(&mut self, ctx: &CheckContext) -> CheckResult {
        let sessions = match self.mux.list_sessions().await {
            Ok(sessions) => sessions,
            Err(e) => {
                return CheckResult::warning(
                    self.name(),
                    Category::Environment,
                    format!("listing sessions: {e}"),
                )
            }
        };

        let mut details = Vec::new();
        for session in &sessions {
            let Ok(identity) = names::parse_session_name(&ctx.registry, session) else {
                continue;
            };
            let env = match self.mux.show_environment(session).await {
                Ok(env) => env,
                Err(e) => {
                    details.push(format!("{session}: environment unreadable: {e}"));
                    continue;
                }
            };
            let get = |key: &str| {
                env.iter()
                    .find(|(k, _)| k == key)
                    .map(|(_, v)| v.as_str())
            };

            if get(FORBIDDEN_ENV).is_some_and(|v| !v.is_empty()) {
                details.push(format!(
                    "{session}: {FORBIDDEN_ENV} is set and breaks prefix routing"
                ));
            }

            // The session's own GT_AGENT records any runtime override
            let expected = agent_env(&identity, &ctx.town, get("GT_AGENT"));
            for (key, want) in &expected {
                match get(key) {
                    Some(have) if have == want => {}
                    Some(have) => {
                        details.push(format!("{session}: {key}={have:?}, expected {want:?}"))
                    }
                    None => details.push(format!("{session}: {key} is unset")),
                }
            }
        }

        if details.is_empty() {
            CheckResult::ok(
                self.name(),
                Category::Environment,
                "session environments canonical",
            )
        } else {
            CheckResult::warning(
                self.name(),
                Category::Environment,
                format!("{} environment drift(s)", details.len()),
            )
            .with_details(details)
            .with_fix_hint("restart the affected sessions")
        }
    }
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
