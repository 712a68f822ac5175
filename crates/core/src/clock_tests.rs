// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn fake_clock_advances() {
    let clock = FakeClock::default();
    let start = clock.now();
    clock.advance(Duration::minutes(5));
    assert_eq!(clock.now() - start, Duration::minutes(5));
}

#[test]
fn fake_clock_set_overrides() {
    let clock = FakeClock::default();
    let target = DateTime::from_timestamp(1_800_000_000, 0).unwrap();
    clock.set(target);
    assert_eq!(clock.now(), target);
}

#[test]
fn clones_share_time() {
    let clock = FakeClock::default();
    let other = clock.clone();
    clock.advance(Duration::seconds(30));
    assert_eq!(clock.now(), other.now());
}

#[test]
fn system_clock_is_monotonic_enough() {
    let clock = SystemClock;
    let a = clock.now();
    let b = clock.now();
    assert!(b >= a);
}
