// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `gt stop` - stop an agent session.

use crate::commands::load_registry;
use crate::exit::ExitCode;
use anyhow::Result;
use clap::Args;
use gt_adapters::TmuxMux;
use gt_core::{names, Identity, Town};
use gt_engine::Lifecycle;

#[derive(Args)]
pub struct StopArgs {
    /// Agent address
    pub address: String,

    /// Skip the graceful interrupt and kill immediately
    #[arg(long)]
    pub force: bool,
}

pub async fn run(town: &Town, args: StopArgs) -> Result<ExitCode> {
    let (_rigs, registry) = load_registry(town)?;
    let identity = Identity::parse_address(&args.address)?;
    let session_id = names::session_name(&registry, &identity)?;

    let lifecycle = Lifecycle::new(TmuxMux::new(), town.clone());
    let stopped = lifecycle.stop_session(&session_id, !args.force).await?;
    if stopped {
        println!("stopped {session_id}");
    } else {
        println!("{session_id} was not running");
    }
    Ok(ExitCode::Success)
}
