// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `gt doctor` - run the check registry.

use crate::commands::load_registry;
use crate::exit::ExitCode;
use anyhow::Result;
use clap::Args;
use gt_adapters::{BdCli, SystemGitCli, TmuxMux};
use gt_core::Town;
use gt_doctor::{checks, run_checks, CheckContext, Status};

#[derive(Args)]
pub struct DoctorArgs {
    /// Restrict rig-scoped checks to one rig
    #[arg(long)]
    pub rig: Option<String>,

    /// Apply fixes for fixable findings
    #[arg(long)]
    pub fix: bool,

    /// List the registered checks and exit
    #[arg(long)]
    pub list: bool,
}

pub async fn run(town: &Town, args: DoctorArgs) -> Result<ExitCode> {
    let (rigs, registry) = load_registry(town)?;

    let mux = TmuxMux::new();
    let git = SystemGitCli::new();
    let beads = BdCli::new(town.root());
    let mut all_checks = checks::default_checks(mux, git, beads);

    if args.list {
        for check in &all_checks {
            println!("{:<22} [{}] {}", check.name(), check.category(), check.description());
        }
        return Ok(ExitCode::Success);
    }

    let mut ctx = CheckContext::new(town.clone(), registry, rigs);
    if let Some(rig) = args.rig {
        ctx = ctx.with_rig_filter(rig);
    }

    let report = run_checks(&ctx, &mut all_checks, args.fix).await;

    for result in &report.results {
        let marker = match result.status {
            Status::Ok => "ok  ",
            Status::Skipped => "skip",
            Status::Warning => "warn",
            Status::Error => "FAIL",
        };
        println!("{marker} {:<22} {}", result.name, result.message);
        for detail in &result.details {
            println!("       - {detail}");
        }
        if result.status != Status::Ok {
            if let Some(hint) = &result.fix_hint {
                println!("       hint: {hint}");
            }
        }
    }
    for fix in &report.fixes {
        match &fix.error {
            None => println!("fixed {}", fix.check),
            Some(error) => println!("fix of {} failed: {error}", fix.check),
        }
    }
    println!(
        "{} check(s), {} warning(s), {} error(s)",
        report.results.len(),
        report.warning_count(),
        report.error_count()
    );

    if report.error_count() > 0 {
        Ok(ExitCode::Transient)
    } else {
        Ok(ExitCode::Success)
    }
}
