// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for check tests.

use crate::context::CheckContext;
use gt_core::{test_support, Town};
use std::sync::Arc;

/// A town on disk plus a matching check context.
pub(crate) fn ctx_fixture(pairs: &[(&str, &str)]) -> (tempfile::TempDir, CheckContext) {
    let dir = tempfile::tempdir().unwrap();
    test_support::write_town(dir.path(), pairs);
    let town = Town::new(dir.path());
    let rigs = test_support::rigs_file(pairs);
    let registry = Arc::new(test_support::registry(pairs));
    (dir, CheckContext::new(town, registry, rigs))
}
