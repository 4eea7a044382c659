// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output formatting for CLI commands

use std::fmt;

use clap::ValueEnum;
use mb_core::MatchProfile;
use serde::Serialize;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Print output in the specified format
pub fn print<T: Serialize + fmt::Display>(value: &T, format: OutputFormat) {
    match format {
        OutputFormat::Text => println!("{}", value),
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string(value) {
                println!("{}", json);
            }
        }
    }
}

/// One-line text view of a match
#[derive(Serialize)]
#[serde(transparent)]
pub struct MatchView<'a>(pub &'a MatchProfile);

impl fmt::Display for MatchView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let profile = self.0;
        write!(f, "{:<24} {}", profile.id, profile.properties)?;
        for roster in profile.rosters.iter().flatten() {
            write!(f, " {}[{}]", roster.name, roster.player_ids().join(","))?;
        }
        if profile.is_error() {
            write!(f, " error: {}", profile.error)?;
        }
        Ok(())
    }
}

/// A request handed to a worker
#[derive(Serialize)]
pub struct ClaimView<'a> {
    pub key: &'a str,
    pub profile: &'a MatchProfile,
}

impl fmt::Display for ClaimView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<24} {}", self.key, MatchView(self.profile))
    }
}
