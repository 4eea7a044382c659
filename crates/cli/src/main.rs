// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mb - match backend CLI

mod client;
mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{assignment, matches, worker};

use crate::client::MatchClient;
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "mb", version, about = "Match backend client")]
struct Cli {
    /// Daemon address
    #[arg(long, global = true, env = "MB_ADDR", default_value = "127.0.0.1:50505")]
    addr: String,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "text")]
    output: OutputFormat,

    /// Log client activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the daemon is reachable
    Ping,
    /// Request one match and wait for it
    CreateMatch(matches::ProfileArgs),
    /// Stream matches for a profile until interrupted
    ListMatches(matches::ProfileArgs),
    /// Delete a stored match
    DeleteMatch {
        /// Match id
        id: String,
    },
    /// Assign players to a game server
    Assign(assignment::AssignArgs),
    /// Clear player assignments
    Unassign(assignment::UnassignArgs),
    /// Worker side of the request queue
    Worker(worker::WorkerArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let client = MatchClient::new(cli.addr);

    match cli.command {
        Commands::Ping => {
            client.ping().await?;
            println!("pong");
        }
        Commands::CreateMatch(args) => matches::create(&client, args, cli.output).await?,
        Commands::ListMatches(args) => matches::list(&client, args, cli.output).await?,
        Commands::DeleteMatch { id } => matches::delete(&client, &id).await?,
        Commands::Assign(args) => assignment::assign(&client, args).await?,
        Commands::Unassign(args) => assignment::unassign(&client, args).await?,
        Commands::Worker(args) => worker::handle(&client, args, cli.output).await?,
    }

    Ok(())
}
