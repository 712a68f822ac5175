// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    mayor = { Role::Mayor, "mayor" },
    deacon = { Role::Deacon, "deacon" },
    boot = { Role::Boot, "boot" },
    witness = { Role::Witness, "witness" },
    refinery = { Role::Refinery, "refinery" },
    polecat = { Role::Polecat, "polecat" },
    crew = { Role::Crew, "crew" },
    dog = { Role::Dog, "dog" },
)]
fn round_trips_through_str(role: Role, s: &str) {
    assert_eq!(role.as_str(), s);
    assert_eq!(s.parse::<Role>().unwrap(), role);
    assert_eq!(role.to_string(), s);
}

#[test]
fn unknown_role_is_rejected() {
    let err = "warlord".parse::<Role>().unwrap_err();
    assert_eq!(err.to_string(), "unknown role: warlord");
}

#[test]
fn only_mayor_and_crew_are_interactive() {
    for role in Role::all() {
        let expect = matches!(role, Role::Mayor | Role::Crew);
        assert_eq!(role.is_interactive(), expect, "{role}");
    }
}

#[test]
fn town_level_roles_have_no_rig() {
    for role in [Role::Mayor, Role::Deacon, Role::Boot, Role::Dog] {
        assert!(role.is_town_level(), "{role}");
    }
    for role in [Role::Witness, Role::Refinery, Role::Polecat, Role::Crew] {
        assert!(!role.is_town_level(), "{role}");
    }
}

#[test]
fn serde_uses_lowercase_names() {
    let json = serde_json::to_string(&Role::Polecat).unwrap();
    assert_eq!(json, "\"polecat\"");
    let back: Role = serde_json::from_str("\"refinery\"").unwrap();
    assert_eq!(back, Role::Refinery);
}
