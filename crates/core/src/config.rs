// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Backend service configuration
//!
//! Loaded from TOML. Every key is optional:
//!
//! ```toml
//! port = 50505
//! queue = "profileq"
//! match_object_ttl = "30m"
//! backoff = "[2s 32s] *1.5 ~0.33 <5m"
//! stream_interval = "2s"
//!
//! [lists]
//! proposed = "proposed"
//! claimed = "deindexed"
//!
//! [json_keys]
//! pools = "properties.pools"
//! rosters = "properties.rosters"
//! ```

use crate::backoff::BackoffPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {0}: {1}")]
    Read(PathBuf, #[source] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// TCP port the backend API listens on
    pub port: u16,
    /// Work queue that pending request keys are pushed onto
    pub queue: String,
    /// Time-to-live of match object records
    #[serde(with = "humantime_serde")]
    pub match_object_ttl: Duration,
    /// Watch backoff, see [`crate::backoff`] for the syntax
    pub backoff: String,
    /// Pause between two ListMatches iterations
    #[serde(with = "humantime_serde")]
    pub stream_interval: Duration,
    pub lists: ListNames,
    /// Legacy JSON paths inside `properties`; absent disables the conversion
    pub json_keys: JsonKeys,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            port: 50505,
            queue: "profileq".to_string(),
            match_object_ttl: Duration::from_secs(30 * 60),
            backoff: "[2s 32s] *1.5 ~0.33 <5m".to_string(),
            stream_interval: Duration::from_secs(2),
            lists: ListNames::default(),
            json_keys: JsonKeys::default(),
        }
    }
}

impl BackendConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(ConfigError::Read(path.to_path_buf(), e)),
        }
    }

    /// The watch backoff, or the default policy if the string is invalid
    pub fn backoff_policy(&self) -> BackoffPolicy {
        BackoffPolicy::parse_or_default(&self.backoff)
    }
}

/// Names of the player membership lists touched by assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListNames {
    pub proposed: String,
    pub claimed: String,
}

impl Default for ListNames {
    fn default() -> Self {
        Self {
            proposed: "proposed".to_string(),
            claimed: "deindexed".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonKeys {
    pub pools: Option<String>,
    pub rosters: Option<String>,
}

impl JsonKeys {
    pub fn is_empty(&self) -> bool {
        self.pools.is_none() && self.rosters.is_none()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
