// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `mb create-match`, `mb list-matches`, `mb delete-match`

use anyhow::{Context, Result};
use clap::Args;
use mb_core::MatchProfile;

use crate::client::MatchClient;
use crate::output::{self, MatchView, OutputFormat};

/// A match profile given on the command line
#[derive(Args)]
pub struct ProfileArgs {
    /// Profile id
    pub id: String,

    /// Properties JSON document
    #[arg(long, default_value = "{}")]
    pub properties: String,

    /// Player pools as a JSON array
    #[arg(long)]
    pub pools: Option<String>,

    /// Rosters as a JSON array
    #[arg(long)]
    pub rosters: Option<String>,
}

impl ProfileArgs {
    pub fn into_profile(self) -> Result<MatchProfile> {
        let mut profile = MatchProfile::new(self.id, self.properties);
        if let Some(pools) = self.pools {
            profile.pools = Some(serde_json::from_str(&pools).context("invalid --pools")?);
        }
        if let Some(rosters) = self.rosters {
            profile.rosters = Some(serde_json::from_str(&rosters).context("invalid --rosters")?);
        }
        Ok(profile)
    }
}

pub async fn create(client: &MatchClient, args: ProfileArgs, format: OutputFormat) -> Result<()> {
    let profile = client.create_match(args.into_profile()?).await?;
    output::print(&MatchView(&profile), format);
    Ok(())
}

/// Print matches as they arrive. Ctrl-C hangs up, which ends the stream.
pub async fn list(client: &MatchClient, args: ProfileArgs, format: OutputFormat) -> Result<()> {
    let template = args.into_profile()?;
    let stream = client.list_matches(template, |profile| {
        output::print(&MatchView(profile), format);
    });
    tokio::select! {
        result = stream => {
            let emitted = result?;
            eprintln!("Stream ended after {} matches", emitted);
        }
        _ = tokio::signal::ctrl_c() => {
            eprintln!("Interrupted");
        }
    }
    Ok(())
}

pub async fn delete(client: &MatchClient, id: &str) -> Result<()> {
    client.delete_match(id).await?;
    println!("Deleted match {}", id);
    Ok(())
}
