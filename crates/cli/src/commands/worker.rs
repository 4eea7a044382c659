// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `mb worker` - act as a matchmaking worker by hand

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use mb_core::MatchProfile;

use crate::client::MatchClient;
use crate::output::{self, ClaimView, OutputFormat};

#[derive(Args)]
pub struct WorkerArgs {
    #[command(subcommand)]
    pub command: WorkerCommand,
}

#[derive(Subcommand)]
pub enum WorkerCommand {
    /// Take the oldest pending match request
    Claim,
    /// Publish the match for a claimed request
    Complete {
        /// Request key returned by `claim`
        key: String,
        /// The match as a profile JSON document
        profile: String,
    },
}

pub async fn handle(client: &MatchClient, args: WorkerArgs, format: OutputFormat) -> Result<()> {
    match args.command {
        WorkerCommand::Claim => match client.claim().await? {
            Some((key, profile)) => output::print(
                &ClaimView {
                    key: &key,
                    profile: &profile,
                },
                format,
            ),
            None => eprintln!("No pending requests"),
        },
        WorkerCommand::Complete { key, profile } => {
            let profile: MatchProfile =
                serde_json::from_str(&profile).context("invalid profile JSON")?;
            client.complete(&key, profile).await?;
            println!("Completed {}", key);
        }
    }
    Ok(())
}
