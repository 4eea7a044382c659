// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Legacy properties conversion
//!
//! Older clients put pools and rosters inside the `properties` JSON document
//! instead of the dedicated fields. When a profile arrives without them and a
//! JSON path is configured, [`LegacyShim`] lifts them out.

use mb_core::{JsonKeys, MatchProfile, PlayerPool, Roster};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Errors decoding an extracted value
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("error unmarshalling {field} extracted from properties: {source}")]
    Decode {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Pulls a sub-document out of a properties string
pub trait PropertyConverter: Clone + Send + Sync + 'static {
    /// The value at `path`, or `None` when the document or the path is missing
    fn try_extract(&self, properties: &str, path: &str) -> Option<Value>;
}

/// Dotted path lookup: `a.b.0.c` walks objects by key and arrays by index
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPathConverter;

impl PropertyConverter for JsonPathConverter {
    fn try_extract(&self, properties: &str, path: &str) -> Option<Value> {
        let document: Value = serde_json::from_str(properties).ok()?;
        let mut current = &document;
        for segment in path.split('.').filter(|s| !s.is_empty()) {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current.clone())
    }
}

#[derive(serde::Deserialize)]
struct PoolsEnvelope {
    pools: Vec<PlayerPool>,
}

#[derive(serde::Deserialize)]
struct RostersEnvelope {
    rosters: Vec<Roster>,
}

/// Fills absent pools and rosters from configured properties paths
#[derive(Debug, Clone)]
pub struct LegacyShim<C> {
    converter: C,
    keys: JsonKeys,
}

impl<C: PropertyConverter> LegacyShim<C> {
    pub fn new(converter: C, keys: JsonKeys) -> Self {
        Self { converter, keys }
    }

    pub fn keys(&self) -> &JsonKeys {
        &self.keys
    }

    /// Pools found at the configured path, if any
    pub fn extract_pools(&self, properties: &str) -> Result<Option<Vec<PlayerPool>>, ConvertError> {
        let Some(path) = self.keys.pools.as_deref() else {
            return Ok(None);
        };
        self.extract(properties, path, "pools")
            .map(|env: Option<PoolsEnvelope>| env.map(|e| e.pools))
    }

    /// Rosters found at the configured path, if any
    pub fn extract_rosters(&self, properties: &str) -> Result<Option<Vec<Roster>>, ConvertError> {
        let Some(path) = self.keys.rosters.as_deref() else {
            return Ok(None);
        };
        self.extract(properties, path, "rosters")
            .map(|env: Option<RostersEnvelope>| env.map(|e| e.rosters))
    }

    fn extract<T: DeserializeOwned>(
        &self,
        properties: &str,
        path: &str,
        field: &'static str,
    ) -> Result<Option<T>, ConvertError> {
        let Some(value) = self.converter.try_extract(properties, path) else {
            return Ok(None);
        };
        let mut envelope = serde_json::Map::new();
        envelope.insert(field.to_string(), value);
        serde_json::from_value(Value::Object(envelope))
            .map(Some)
            .map_err(|source| ConvertError::Decode { field, source })
    }

    /// Fill `profile.pools` and `profile.rosters` when they are absent.
    ///
    /// Decode failures are logged and leave the field absent.
    pub fn apply(&self, profile: &mut MatchProfile) {
        if profile.pools.is_none() {
            match self.extract_pools(&profile.properties) {
                Ok(Some(pools)) => {
                    tracing::debug!(count = pools.len(), "pools lifted from properties");
                    profile.pools = Some(pools);
                }
                Ok(None) => {}
                Err(e) => tracing::error!(
                    jsonkey = self.keys.pools.as_deref().unwrap_or_default(),
                    error = %e,
                    "legacy pools conversion failed"
                ),
            }
        }

        if profile.rosters.is_none() {
            match self.extract_rosters(&profile.properties) {
                Ok(Some(rosters)) => {
                    tracing::debug!(count = rosters.len(), "rosters lifted from properties");
                    profile.rosters = Some(rosters);
                }
                Ok(None) => {}
                Err(e) => tracing::error!(
                    jsonkey = self.keys.rosters.as_deref().unwrap_or_default(),
                    error = %e,
                    "legacy rosters conversion failed"
                ),
            }
        }
    }
}

#[cfg(test)]
#[path = "convert_tests.rs"]
mod tests;
