//! Shared fixtures for the behavioral specs.

use gt_core::{test_support, PrefixRegistry, RigsFile, Town};
use std::sync::Arc;

pub struct TownFixture {
    pub _dir: tempfile::TempDir,
    pub town: Town,
    pub rigs: RigsFile,
    pub registry: Arc<PrefixRegistry>,
}

/// A town on disk with the given `(rig, prefix)` pairs registered.
pub fn town_fixture(pairs: &[(&str, &str)]) -> TownFixture {
    let dir = tempfile::tempdir().unwrap();
    test_support::write_town(dir.path(), pairs);
    TownFixture {
        town: Town::new(dir.path()),
        rigs: test_support::rigs_file(pairs),
        registry: Arc::new(test_support::registry(pairs)),
        _dir: dir,
    }
}

pub fn clock_at(secs: i64) -> gt_core::FakeClock {
    gt_core::FakeClock::new(
        chrono::DateTime::<chrono::Utc>::from_timestamp(1_700_000_000 + secs, 0).unwrap(),
    )
}
