// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[test]
fn renders_header_and_route_line() {
    let beacon = Beacon::new("polecat Toast (rig: gastown)", "deacon", Topic::Ready);
    let out = format_startup_beacon(&beacon);
    let mut lines = out.lines();
    assert_eq!(lines.next(), Some("[GAS TOWN]"));
    assert_eq!(
        lines.next(),
        Some("polecat Toast (rig: gastown) <- deacon ready")
    );
}

#[parameterized(
    start = { Topic::Start },
    restart = { Topic::Restart },
)]
fn fresh_context_topics_render_bare(topic: Topic) {
    let beacon = Beacon::new("mayor", "boot", topic).with_prime_instruction();
    let out = format_startup_beacon(&beacon);
    assert_eq!(out.lines().count(), 2, "{out:?}");
    assert!(!out.contains("gt prime"));
    assert!(!out.contains("gt hook"));
    assert!(!out.contains("gt mail inbox"));
}

#[parameterized(
    cold_start = { Topic::ColdStart },
    handoff = { Topic::Handoff },
    patrol = { Topic::Patrol },
    ready = { Topic::Ready },
    attach = { Topic::Attach },
)]
fn other_topics_get_hook_and_mail_footer(topic: Topic) {
    let beacon = Beacon::new("witness (rig: gastown)", "deacon", topic);
    let out = format_startup_beacon(&beacon);
    assert!(out.contains("`gt hook`"), "{out:?}");
    assert!(out.contains("`gt mail inbox`"), "{out:?}");
}

#[test]
fn assigned_with_mol_names_the_work() {
    let beacon =
        Beacon::new("polecat Toast (rig: gastown)", "deacon", Topic::Assigned).with_mol("gt-42");
    let out = format_startup_beacon(&beacon);
    assert!(out.contains("assigned:gt-42"), "{out:?}");
    assert!(out.contains("Begin work on gt-42."), "{out:?}");
    assert!(!out.contains("gt prime"), "{out:?}");
}

#[test]
fn assigned_adds_prime_only_on_request() {
    let beacon = Beacon::new("polecat Toast (rig: gastown)", "deacon", Topic::Assigned)
        .with_mol("gt-42")
        .with_prime_instruction();
    let out = format_startup_beacon(&beacon);
    assert!(out.contains("Run `gt prime`"), "{out:?}");
}

#[test]
fn assigned_without_mol_falls_back_to_footer() {
    let beacon = Beacon::new("polecat Toast (rig: gastown)", "deacon", Topic::Assigned);
    let out = format_startup_beacon(&beacon);
    assert!(out.contains("`gt hook`"), "{out:?}");
}

#[test]
fn prompt_appends_instructions_after_blank_line() {
    let beacon = Beacon::new("mayor", "human", Topic::Start);
    let prompt = build_startup_prompt(&beacon, Some("Survey the rigs."));
    assert!(prompt.ends_with("\n\nSurvey the rigs."), "{prompt:?}");
}

#[test]
fn prompt_without_instructions_is_just_the_beacon() {
    let beacon = Beacon::new("mayor", "human", Topic::Start);
    assert_eq!(
        build_startup_prompt(&beacon, None),
        format_startup_beacon(&beacon)
    );
    assert_eq!(
        build_startup_prompt(&beacon, Some("")),
        format_startup_beacon(&beacon)
    );
}

#[test]
fn empty_topic_parses_as_ready() {
    assert_eq!("".parse::<Topic>().unwrap(), Topic::Ready);
    assert_eq!("cold-start".parse::<Topic>().unwrap(), Topic::ColdStart);
    assert!("sing".parse::<Topic>().is_err());
}
