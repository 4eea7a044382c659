// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Record layout of stored match objects
//!
//! A match object is stored as a flat field map. Pools and rosters are JSON
//! encoded and left out entirely when the profile did not supply them, so
//! absence survives the round trip. Workers mark a finished match by writing
//! a non-empty [`fields::STATUS`].

use mb_core::MatchProfile;
use std::collections::BTreeMap;
use thiserror::Error;

/// A stored record: field name to value
pub type Record = BTreeMap<String, String>;

/// Field names
pub mod fields {
    pub const ID: &str = "id";
    pub const PROPERTIES: &str = "properties";
    pub const POOLS: &str = "pools";
    pub const ROSTERS: &str = "rosters";
    pub const ERROR: &str = "error";
    /// Set by a worker once the record holds its result
    pub const STATUS: &str = "status";
    /// Per-player assignment
    pub const ASSIGNMENT: &str = "assignment";
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("field {field} is not valid JSON: {source}")]
    Field {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Flatten a profile into a record
pub fn encode_profile(profile: &MatchProfile) -> Result<Record, RecordError> {
    let mut record = Record::new();
    record.insert(fields::ID.to_string(), profile.id.clone());
    record.insert(fields::PROPERTIES.to_string(), profile.properties.clone());
    record.insert(fields::ERROR.to_string(), profile.error.clone());
    if let Some(pools) = &profile.pools {
        let json = serde_json::to_string(pools).map_err(|source| RecordError::Field {
            field: fields::POOLS,
            source,
        })?;
        record.insert(fields::POOLS.to_string(), json);
    }
    if let Some(rosters) = &profile.rosters {
        let json = serde_json::to_string(rosters).map_err(|source| RecordError::Field {
            field: fields::ROSTERS,
            source,
        })?;
        record.insert(fields::ROSTERS.to_string(), json);
    }
    Ok(record)
}

/// Rebuild a profile from a record. Unknown fields are ignored.
pub fn decode_profile(record: &Record) -> Result<MatchProfile, RecordError> {
    let text = |field: &str| record.get(field).cloned().unwrap_or_default();

    let pools = match record.get(fields::POOLS) {
        Some(json) if !json.is_empty() => {
            Some(
                serde_json::from_str(json).map_err(|source| RecordError::Field {
                    field: fields::POOLS,
                    source,
                })?,
            )
        }
        _ => None,
    };
    let rosters = match record.get(fields::ROSTERS) {
        Some(json) if !json.is_empty() => {
            Some(
                serde_json::from_str(json).map_err(|source| RecordError::Field {
                    field: fields::ROSTERS,
                    source,
                })?,
            )
        }
        _ => None,
    };

    Ok(MatchProfile {
        id: text(fields::ID),
        properties: text(fields::PROPERTIES),
        pools,
        rosters,
        error: text(fields::ERROR),
    })
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
