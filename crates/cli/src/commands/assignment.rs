// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `mb assign`, `mb unassign`

use anyhow::Result;
use clap::Args;
use mb_core::{Assignments, Player, Roster};

use crate::client::MatchClient;

#[derive(Args)]
pub struct AssignArgs {
    /// Default assignment for players without their own
    pub assignment: String,

    /// Roster as NAME=ID[@ASSIGNMENT],... (repeatable)
    #[arg(short, long = "roster", value_parser = parse_roster, required = true)]
    pub rosters: Vec<Roster>,
}

#[derive(Args)]
pub struct UnassignArgs {
    /// Player ids
    #[arg(required = true)]
    pub players: Vec<String>,
}

pub async fn assign(client: &MatchClient, args: AssignArgs) -> Result<()> {
    let players: usize = args.rosters.iter().map(|r| r.players.len()).sum();
    client
        .create_assignments(Assignments {
            assignment: args.assignment,
            rosters: args.rosters,
        })
        .await?;
    println!("Assigned {} players", players);
    Ok(())
}

pub async fn unassign(client: &MatchClient, args: UnassignArgs) -> Result<()> {
    let count = args.players.len();
    let roster = Roster::new("", args.players.into_iter().map(Player::new).collect());
    client.delete_assignments(roster).await?;
    println!("Cleared {} assignments", count);
    Ok(())
}

fn parse_roster(s: &str) -> Result<Roster, String> {
    let (name, players) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid roster: no `=` found in `{s}`"))?;
    let players = players
        .split(',')
        .filter(|p| !p.is_empty())
        .map(|p| match p.split_once('@') {
            Some((id, assignment)) => Player::new(id).with_assignment(assignment),
            None => Player::new(p),
        })
        .collect();
    Ok(Roster::new(name, players))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roster_players_take_optional_assignments() {
        let roster = parse_roster("red=p1,p2@srvB").unwrap();

        assert_eq!(roster.name, "red");
        assert_eq!(
            roster.players,
            vec![Player::new("p1"), Player::new("p2").with_assignment("srvB")]
        );
    }

    #[test]
    fn roster_without_name_separator_is_rejected() {
        assert!(parse_roster("p1,p2").is_err());
    }
}
