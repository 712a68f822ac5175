// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `gt start` - start an agent session.

use crate::commands::load_registry;
use crate::exit::ExitCode;
use anyhow::Result;
use clap::Args;
use gt_adapters::TmuxMux;
use gt_core::beacon::{Beacon, Topic};
use gt_core::{names, Identity, Role, Town};
use gt_engine::{EngineError, Lifecycle, StartSpec};

#[derive(Args)]
pub struct StartArgs {
    /// Agent address (mayor, deacon, boot, gastown/witness,
    /// gastown/polecats/Toast, gastown/crew/max, deacon/dogs/Rex)
    pub address: String,

    /// Beacon topic for the opening prompt
    #[arg(long, default_value = "ready")]
    pub topic: String,

    /// Molecule id for assigned beacons
    #[arg(long)]
    pub mol: Option<String>,

    /// Extra instructions appended after the beacon
    #[arg(long)]
    pub instructions: Option<String>,

    /// Select a non-default agent runtime
    #[arg(long)]
    pub agent: Option<String>,

    /// Who the beacon says initiated the start
    #[arg(long, default_value = "human")]
    pub sender: String,
}

pub async fn run(town: &Town, args: StartArgs) -> Result<ExitCode> {
    let (_rigs, registry) = load_registry(town)?;
    let identity = Identity::parse_address(&args.address)?;
    let session_id = names::session_name(&registry, &identity)?;
    let topic: Topic = args.topic.parse()?;

    let mut beacon = Beacon::new(identity.beacon_address(), &args.sender, topic);
    if let Some(mol) = &args.mol {
        beacon = beacon.with_mol(mol);
    }

    let work_dir = town
        .worktree_for(&identity)
        .unwrap_or_else(|| town.root().to_path_buf());

    let mut spec = StartSpec::new(&session_id, work_dir, identity.role);
    spec.rig_name = identity.rig.clone();
    spec.agent_name = identity.name.clone();
    spec.beacon = Some(beacon);
    spec.instructions = args.instructions;
    spec.agent_override = args.agent;
    // Autonomous agents get the full supervision pipeline; interactive
    // ones keep their pane on exit for the human to read.
    let interactive = identity.role.is_interactive();
    spec.wait_for_agent = true;
    spec.wait_fatal = !interactive;
    spec.accept_bypass = !interactive;
    spec.ready_delay = !interactive;
    spec.auto_respawn = matches!(identity.role, Role::Deacon);
    spec.remain_on_exit = interactive || matches!(identity.role, Role::Deacon);
    spec.verify_survived = true;

    let lifecycle = Lifecycle::new(TmuxMux::new(), town.clone());
    match lifecycle.start_session(&spec).await {
        Ok(runtime) => {
            println!("started {session_id} ({})", runtime.id);
            Ok(ExitCode::Success)
        }
        Err(EngineError::AlreadyRunning(session)) => {
            eprintln!("gt: {session} is already running");
            Ok(ExitCode::Transient)
        }
        Err(e) => Err(e.into()),
    }
}
