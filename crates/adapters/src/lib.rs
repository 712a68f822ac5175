// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gt-adapters: typed wrappers over the external binaries Gas Town drives
//! (tmux, git, the beads CLI, and its own `gt` dispatcher).

pub mod beads;
pub mod convoy;
pub mod git;
pub mod mux;
pub mod process;
pub mod subprocess;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub mod fakes;

pub use beads::{AgentBead, BeadsCli, BeadsError, BdCli, HookedBead};
pub use convoy::{ConvoyCli, ConvoyError, GtConvoyCli, StrandedConvoy};
pub use git::{GitCli, GitError, SystemGitCli, WorktreeStatus};
pub use mux::{
    accept_bypass_warning, is_agent_alive, wait_for_command, wait_for_shell_ready, Multiplexer,
    MuxError, TmuxMux, KNOWN_SHELLS,
};
pub use process::{pid_alive, process_start_time, terminate, ProcessError};

#[cfg(any(test, feature = "test-support"))]
pub use fakes::{FakeBeads, FakeConvoys, FakeGit};
#[cfg(any(test, feature = "test-support"))]
pub use mux::{FakeMux, MuxCall};
