// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gt-storage: on-disk persistence for Gas Town state files

pub mod atomic;
pub mod metadata;
pub mod routes;

pub use atomic::{load_json, save_json, save_text, StorageError};
pub use metadata::BeadsMetadata;
pub use routes::{read_routes, write_routes, Route};
