// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gt - the Gas Town dispatcher

mod commands;
mod exit;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{deacon, doctor, down, start, stop};
use std::path::PathBuf;

use crate::exit::ExitCode;

#[derive(Parser)]
#[command(
    name = "gt",
    version,
    about = "Gas Town - an orchestration fabric for coding agents"
)]
struct Cli {
    /// Town root (defaults to discovery upward from the cwd)
    #[arg(long, global = true, value_name = "DIR")]
    town: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an agent session by address (mayor, gastown/witness, ...)
    Start(start::StartArgs),
    /// Stop an agent session by address
    Stop(stop::StopArgs),
    /// Stop the town-level sessions and sweep tracked pids
    Down(down::DownArgs),
    /// Diagnose (and optionally repair) the town
    Doctor(doctor::DoctorArgs),
    /// Deacon patrol operations
    Deacon(deacon::DeaconArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("gt: {e:#}");
            ExitCode::Transient
        }
    };
    std::process::exit(code as i32);
}

#[tokio::main]
async fn run(cli: Cli) -> Result<ExitCode> {
    let town = match commands::resolve_town(cli.town.as_deref()) {
        Ok(town) => town,
        Err(e) => {
            eprintln!("gt: {e}");
            return Ok(ExitCode::Precondition);
        }
    };

    match cli.command {
        Commands::Start(args) => start::run(&town, args).await,
        Commands::Stop(args) => stop::run(&town, args).await,
        Commands::Down(args) => down::run(&town, args).await,
        Commands::Doctor(args) => doctor::run(&town, args).await,
        Commands::Deacon(args) => deacon::run(&town, args).await,
    }
}
