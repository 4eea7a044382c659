// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Match data model
//!
//! These are the values exchanged with backend callers and persisted in the
//! state store. Absence of an error is encoded as an empty string, and an
//! empty assignment means "unset".

use serde::{Deserialize, Serialize};

/// A request for a match, and later the match itself once a worker has
/// filled it in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchProfile {
    pub id: String,
    /// Opaque JSON document
    pub properties: String,
    /// `None` means "not supplied", which is what enables the legacy
    /// properties conversion. An empty list is a supplied value.
    pub pools: Option<Vec<PlayerPool>>,
    pub rosters: Option<Vec<Roster>>,
    pub error: String,
}

impl MatchProfile {
    pub fn new(id: impl Into<String>, properties: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            properties: properties.into(),
            ..Self::default()
        }
    }

    /// A profile carrying nothing but an error message
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            ..Self::default()
        }
    }

    pub fn is_error(&self) -> bool {
        !self.error.is_empty()
    }
}

/// A named filter set describing which players may be drawn into a match
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerPool {
    pub name: String,
    pub filters: Vec<Filter>,
}

/// Inclusive range filter over one player attribute
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Filter {
    pub name: String,
    pub attribute: String,
    pub minv: i64,
    pub maxv: i64,
}

/// A named, ordered group of players
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Roster {
    pub name: String,
    pub players: Vec<Player>,
}

impl Roster {
    pub fn new(name: impl Into<String>, players: Vec<Player>) -> Self {
        Self {
            name: name.into(),
            players,
        }
    }

    /// Ids of every player in the roster that has one, in roster order
    pub fn player_ids(&self) -> Vec<String> {
        self.players
            .iter()
            .filter(|p| !p.id.is_empty())
            .map(|p| p.id.clone())
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Player {
    pub id: String,
    pub properties: String,
    /// Connection string or server id; empty means unset
    pub assignment: String,
}

impl Player {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_assignment(mut self, assignment: impl Into<String>) -> Self {
        self.assignment = assignment.into();
        self
    }
}

/// A default assignment plus the rosters that should receive it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Assignments {
    pub assignment: String,
    pub rosters: Vec<Roster>,
}

/// Outcome of the non-streaming mutation calls
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpResult {
    pub success: bool,
    pub error: String,
}

impl OpResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: String::new(),
        }
    }

    pub fn failed(error: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            error: error.to_string(),
        }
    }

    pub fn from_outcome<E: std::fmt::Display>(outcome: &Result<(), E>) -> Self {
        match outcome {
            Ok(()) => Self::ok(),
            Err(e) => Self::failed(e),
        }
    }
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
