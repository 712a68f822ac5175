// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gt-deacon: the autonomous patrol subsystem.
//!
//! The deacon runs coarse-interval patrols over the town: feeding stranded
//! convoys, reclaiming hooks held by dead agents, and redispatching
//! recovered work. Each patrol is a single synchronous pass over
//! immutable inputs plus one mutable state store; there is no internal
//! concurrency, and a paused town dispatches nothing.

pub mod error;
pub mod feed;
pub mod pause;
pub mod prune;
pub mod redispatch;
pub mod stale;
pub mod state;

pub use error::DeaconError;
pub use feed::{feed_stranded, ConvoyAction, ConvoyOutcome, FeedOptions, FeedReport};
pub use pause::{is_paused, pause, resume, PauseState};
pub use prune::{prune_state, PruneReport};
pub use redispatch::{redispatch_recovered, RecoveredNotice, RedispatchOptions, RedispatchOutcome};
pub use stale::{scan_stale_hooks, StaleHookRow, StaleScanOptions, StaleScanReport};
pub use state::{
    cooldown_remaining, is_in_cooldown, ConvoyFeedRecord, FeedStrandedState, RedispatchRecord,
    RedispatchState,
};
