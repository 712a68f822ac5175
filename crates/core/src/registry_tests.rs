// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::rigs::RigsFile;

fn registry() -> PrefixRegistry {
    let r = PrefixRegistry::new();
    r.register("gastown", "gt").unwrap();
    r.register("beads", "bd").unwrap();
    r.register("myrig", "mr").unwrap();
    r
}

#[test]
fn round_trips_prefix_and_rig() {
    let r = registry();
    for rig in r.rigs() {
        let prefix = r.prefix_for_rig(&rig).unwrap();
        assert_eq!(r.rig_for_prefix(&prefix).as_deref(), Some(rig.as_str()));
    }
}

#[test]
fn duplicate_prefix_is_rejected() {
    let r = registry();
    let err = r.register("other", "gt").unwrap_err();
    assert!(matches!(err, RegistryError::DuplicatePrefix { .. }));
}

#[test]
fn duplicate_rig_is_rejected() {
    let r = registry();
    let err = r.register("gastown", "g2").unwrap_err();
    assert!(matches!(err, RegistryError::DuplicateRig { .. }));
}

#[test]
fn empty_prefix_is_rejected() {
    let r = PrefixRegistry::new();
    assert!(matches!(
        r.register("gastown", ""),
        Err(RegistryError::EmptyPrefix(_))
    ));
}

#[test]
fn longest_prefix_wins() {
    let r = PrefixRegistry::new();
    r.register("gastown", "gt").unwrap();
    r.register("gastown-two", "gt2").unwrap();
    let (prefix, rig) = r.longest_prefix_match("gt2-witness").unwrap();
    assert_eq!(prefix, "gt2");
    assert_eq!(rig, "gastown-two");

    let (prefix, _) = r.longest_prefix_match("gt-witness").unwrap();
    assert_eq!(prefix, "gt");
}

#[test]
fn prefix_match_requires_dash_and_remainder() {
    let r = registry();
    assert!(r.longest_prefix_match("gt").is_none());
    assert!(r.longest_prefix_match("gt-").is_none());
    assert!(r.longest_prefix_match("gtwitness").is_none());
    assert!(r.longest_prefix_match("xx-witness").is_none());
}

#[test]
fn from_rigs_skips_rigs_without_prefix() {
    let json = serde_json::json!({
        "version": 1,
        "rigs": {
            "gastown": { "beads": { "prefix": "gt" } },
            "bare": {}
        }
    });
    let rigs: RigsFile = serde_json::from_value(json).unwrap();
    let r = PrefixRegistry::from_rigs(&rigs).unwrap();
    assert_eq!(r.rigs(), vec!["gastown".to_string()]);
}
