// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `gt deacon` - patrol operations.

use crate::commands::load_registry;
use crate::exit::ExitCode;
use anyhow::Result;
use clap::{Args, Subcommand};
use gt_adapters::{BdCli, GtConvoyCli, SystemGitCli, TmuxMux};
use gt_core::{SystemClock, Town};
use gt_deacon::{
    feed_stranded, is_paused, pause, prune_state, redispatch_recovered, resume, scan_stale_hooks,
    ConvoyAction, FeedOptions, RecoveredNotice, RedispatchOptions, RedispatchOutcome,
    StaleScanOptions,
};

#[derive(Args)]
pub struct DeaconArgs {
    #[command(subcommand)]
    command: DeaconCommands,
}

#[derive(Subcommand)]
enum DeaconCommands {
    /// Feed stranded convoys (rate-limited)
    FeedStranded {
        /// Maximum convoys to feed this cycle
        #[arg(long, default_value_t = 3)]
        max_per_cycle: u32,
        /// Per-convoy cooldown in minutes
        #[arg(long, default_value_t = 10)]
        cooldown_mins: i64,
    },
    /// Scan for hooks held by dead agents and reclaim them
    ScanStaleHooks {
        /// Age threshold in minutes for unresolvable assignees
        #[arg(long, default_value_t = 30)]
        max_age_mins: i64,
        /// Report without unhooking
        #[arg(long)]
        dry_run: bool,
    },
    /// Redispatch a recovered bead from a RECOVERED_BEAD notification
    Redispatch {
        /// Notification subject (RECOVERED_BEAD <id>)
        #[arg(long)]
        subject: String,
        /// Notification body (Polecat: ... / Previous Status: hooked)
        #[arg(long)]
        body: String,
    },
    /// Prune state entries for vanished convoys and beads
    Prune,
    /// Pause all patrols
    Pause {
        /// Why the patrols are paused
        reason: String,
    },
    /// Resume patrols
    Resume,
    /// Show the pause flag
    Status,
}

pub async fn run(town: &Town, args: DeaconArgs) -> Result<ExitCode> {
    let clock = SystemClock;
    match args.command {
        DeaconCommands::FeedStranded {
            max_per_cycle,
            cooldown_mins,
        } => {
            let convoys = GtConvoyCli::new(town.root());
            let options = FeedOptions {
                max_per_cycle,
                cooldown: chrono::Duration::minutes(cooldown_mins),
            };
            let report = feed_stranded(town, &convoys, &clock, &options).await?;
            for row in &report.details {
                match row.action {
                    ConvoyAction::Fed => println!("fed {}", row.convoy_id),
                    ConvoyAction::Closed => println!("closed {}", row.convoy_id),
                    ConvoyAction::Cooldown => println!(
                        "skipped {} (cooldown, {}s left)",
                        row.convoy_id,
                        row.cooldown_remaining_secs.unwrap_or(0)
                    ),
                    ConvoyAction::Limit => {
                        println!("skipped {} (cycle limit)", row.convoy_id)
                    }
                    ConvoyAction::Error => println!(
                        "error on {}: {}",
                        row.convoy_id,
                        row.error.as_deref().unwrap_or("unknown")
                    ),
                }
            }
            println!(
                "fed {} closed {} skipped {} errors {}",
                report.fed, report.closed, report.skipped, report.errors
            );
            Ok(ExitCode::Success)
        }
        DeaconCommands::ScanStaleHooks {
            max_age_mins,
            dry_run,
        } => {
            let (_rigs, registry) = load_registry(town)?;
            let mux = TmuxMux::new();
            let beads = BdCli::new(town.root());
            let git = SystemGitCli::new();
            let options = StaleScanOptions {
                max_age: chrono::Duration::minutes(max_age_mins),
                dry_run,
            };
            let report =
                scan_stale_hooks(town, &registry, &mux, &beads, &git, &clock, &options).await?;
            for row in report.results.iter().filter(|r| r.stale) {
                let mut notes = Vec::new();
                if row.unhooked {
                    notes.push("unhooked".to_string());
                }
                if row.partial_work {
                    notes.push(format!(
                        "partial work (dirty={}, unpushed={})",
                        row.worktree_dirty,
                        row.unpushed_count.map_or("?".to_string(), |n| n.to_string())
                    ));
                }
                if let Some(error) = &row.worktree_error {
                    notes.push(format!("worktree probe failed: {error}"));
                }
                println!("{} <- {}: {}", row.bead_id, row.assignee, notes.join(", "));
            }
            println!(
                "scanned {} hooked, {} stale, {} unhooked",
                report.total_hooked, report.stale_count, report.unhooked
            );
            Ok(ExitCode::Success)
        }
        DeaconCommands::Redispatch { subject, body } => {
            let Some(notice) = RecoveredNotice::parse(&subject, &body) else {
                eprintln!("gt: not a recovery notification");
                return Ok(ExitCode::Precondition);
            };
            let gt = GtConvoyCli::new(town.root());
            let outcome = redispatch_recovered(
                town,
                &gt,
                &clock,
                &notice,
                &RedispatchOptions::default(),
            )
            .await?;
            match outcome {
                RedispatchOutcome::Redispatched { attempt } => {
                    println!("redispatched {} (attempt {attempt})", notice.bead_id)
                }
                RedispatchOutcome::Escalated { attempt } => println!(
                    "redispatched {} and escalated after {attempt} attempts",
                    notice.bead_id
                ),
                RedispatchOutcome::AlreadyEscalated => {
                    println!("{} is escalated, not redispatching", notice.bead_id)
                }
                RedispatchOutcome::Cooldown { remaining_secs } => println!(
                    "{} in cooldown, {remaining_secs}s left",
                    notice.bead_id
                ),
                RedispatchOutcome::Failed { error } => {
                    eprintln!("gt: redispatch failed: {error}");
                    return Ok(ExitCode::Transient);
                }
            }
            Ok(ExitCode::Success)
        }
        DeaconCommands::Prune => {
            let convoys = GtConvoyCli::new(town.root());
            use gt_adapters::ConvoyCli;
            use gt_core::Clock;
            // Stranded convoys are the live set the deacon knows about
            let live: Vec<String> = convoys
                .list_stranded()
                .await
                .map(|cs| cs.into_iter().map(|c| c.id).collect())
                .unwrap_or_default();
            let report = prune_state(
                town,
                clock.now(),
                gt_deacon::prune::default_retention(),
                Some(&live),
                None,
            )?;
            println!(
                "pruned {} feed entr(ies), {} redispatch entr(ies)",
                report.feed_entries_removed, report.redispatch_entries_removed
            );
            Ok(ExitCode::Success)
        }
        DeaconCommands::Pause { reason } => {
            use gt_core::Clock;
            let user = std::env::var("USER").unwrap_or_else(|_| "unknown".to_string());
            pause(town, &reason, &user, clock.now())?;
            println!("patrols paused: {reason}");
            Ok(ExitCode::Success)
        }
        DeaconCommands::Resume => {
            resume(town)?;
            println!("patrols resumed");
            Ok(ExitCode::Success)
        }
        DeaconCommands::Status => {
            let (paused, state) = is_paused(town)?;
            match (paused, state) {
                (true, Some(state)) => {
                    println!("paused: {} (by {})", state.reason, state.paused_by)
                }
                _ => println!("not paused"),
            }
            Ok(ExitCode::Success)
        }
    }
}
