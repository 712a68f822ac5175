// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup beacons: the opening prompt an agent sees.
//!
//! A beacon is rendered into the first turn of a freshly-started agent.
//! The footer depends on the topic: `start`/`restart` sessions have already
//! loaded their context, so they get neither a `gt prime` line nor the
//! hook/mail reminder.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Why a session is being (re)started or nudged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Topic {
    Start,
    Restart,
    Assigned,
    ColdStart,
    Handoff,
    Patrol,
    #[default]
    Ready,
    Attach,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Start => "start",
            Topic::Restart => "restart",
            Topic::Assigned => "assigned",
            Topic::ColdStart => "cold-start",
            Topic::Handoff => "handoff",
            Topic::Patrol => "patrol",
            Topic::Ready => "ready",
            Topic::Attach => "attach",
        }
    }

    /// `start` and `restart` sessions already carry loaded context; the
    /// beacon must not tell them to prime or re-check their hook.
    pub fn is_fresh_context(&self) -> bool {
        matches!(self, Topic::Start | Topic::Restart)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topic {
    type Err = UnknownTopic;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(Topic::Start),
            "restart" => Ok(Topic::Restart),
            "assigned" => Ok(Topic::Assigned),
            "cold-start" => Ok(Topic::ColdStart),
            "handoff" => Ok(Topic::Handoff),
            "patrol" => Ok(Topic::Patrol),
            // Empty means "you're up" with no further qualification
            "ready" | "" => Ok(Topic::Ready),
            "attach" => Ok(Topic::Attach),
            _ => Err(UnknownTopic(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown beacon topic: {0}")]
pub struct UnknownTopic(pub String);

/// A startup beacon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Beacon {
    /// Beacon address of the agent being started (never contains `/`).
    pub recipient: String,
    /// Beacon address of whoever initiated the start.
    pub sender: String,
    pub topic: Topic,
    /// Molecule (work item) id for `assigned` beacons.
    pub mol_id: Option<String>,
    /// Whether to add a `gt prime` instruction for agents whose runtime
    /// does not run a SessionStart hook.
    pub include_prime: bool,
}

impl Beacon {
    pub fn new(recipient: impl Into<String>, sender: impl Into<String>, topic: Topic) -> Self {
        Self {
            recipient: recipient.into(),
            sender: sender.into(),
            topic,
            mol_id: None,
            include_prime: false,
        }
    }

    pub fn with_mol(mut self, mol_id: impl Into<String>) -> Self {
        self.mol_id = Some(mol_id.into());
        self
    }

    pub fn with_prime_instruction(mut self) -> Self {
        self.include_prime = true;
        self
    }
}

/// Render the beacon block.
pub fn format_startup_beacon(beacon: &Beacon) -> String {
    let mut lines = vec!["[GAS TOWN]".to_string()];

    let topic = match &beacon.mol_id {
        Some(mol) => format!("{}:{}", beacon.topic, mol),
        None => beacon.topic.to_string(),
    };
    lines.push(format!("{} <- {} {}", beacon.recipient, beacon.sender, topic));

    if !beacon.topic.is_fresh_context() {
        match (beacon.topic, &beacon.mol_id) {
            (Topic::Assigned, Some(mol)) => {
                lines.push(format!("Begin work on {mol}."));
                if beacon.include_prime {
                    lines.push("Run `gt prime` to load your working context first.".to_string());
                }
            }
            _ => {
                lines.push(
                    "Check your hook and mail (`gt hook`, `gt mail inbox`).".to_string(),
                );
            }
        }
    }

    lines.join("\n")
}

/// Beacon plus optional extra instructions, separated by a blank line.
pub fn build_startup_prompt(beacon: &Beacon, instructions: Option<&str>) -> String {
    let rendered = format_startup_beacon(beacon);
    match instructions {
        Some(extra) if !extra.is_empty() => format!("{rendered}\n\n{extra}"),
        _ => rendered,
    }
}

#[cfg(test)]
#[path = "beacon_tests.rs"]
mod tests;
