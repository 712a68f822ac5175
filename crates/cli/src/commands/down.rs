// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `gt down` - ordered town shutdown.

use crate::exit::ExitCode;
use anyhow::Result;
use clap::Args;
use gt_adapters::{Multiplexer, TmuxMux};
use gt_core::Town;
use gt_engine::Lifecycle;

#[derive(Args)]
pub struct DownArgs {
    /// Skip graceful interrupts
    #[arg(long)]
    pub force: bool,
}

pub async fn run(town: &Town, args: DownArgs) -> Result<ExitCode> {
    let mux = TmuxMux::new();
    // One listing up front instead of three has-session probes
    let cache = mux.list_sessions().await?;
    let lifecycle = Lifecycle::new(mux, town.clone());

    let report = lifecycle.stop_town(args.force, Some(&cache)).await?;
    for session in &report.stopped {
        println!("stopped {session}");
    }
    println!(
        "swept {} tracked pid(s){}",
        report.sweep.killed,
        if report.sweep.errors.is_empty() {
            String::new()
        } else {
            format!(", {} error(s)", report.sweep.errors.len())
        }
    );
    for error in &report.sweep.errors {
        eprintln!("gt: sweep: {error}");
    }

    match report.first_error {
        None => Ok(ExitCode::Success),
        Some(error) => {
            eprintln!("gt: {error}");
            Ok(ExitCode::Transient)
        }
    }
}
