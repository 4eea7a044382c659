// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exponential backoff for result watching
//!
//! A [`BackoffPolicy`] is the immutable description, usually parsed from the
//! `backoff` configuration string. A [`Backoff`] is one running schedule
//! built from it. The schedule does not read a clock: callers pass the
//! elapsed time, so it works the same under real and paused time.
//!
//! String form: `[<initial> <max>] *<multiplier> ~<randomization> <<max_elapsed>`,
//! for example `[2s 32s] *1.5 ~0.33 <5m`. Every part is optional. Durations
//! are humantime strings (`250ms`, `1m 30s`) or bare seconds (`2`, `0.5`).
//! A max elapsed time of zero never gives up.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Errors from parsing a backoff string
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackoffParseError {
    #[error("backoff string is empty")]
    Empty,
    #[error("interval range is missing its closing ']'")]
    UnclosedRange,
    #[error("interval range needs an initial interval")]
    MissingInterval,
    #[error("unexpected token in interval range: {0}")]
    ExtraInterval(String),
    #[error("unknown backoff token: {0}")]
    UnknownToken(String),
    #[error("invalid duration {value:?}: {reason}")]
    Duration { value: String, reason: String },
    #[error("invalid number: {0:?}")]
    Number(String),
    #[error("multiplier must be at least 1, got {0}")]
    Multiplier(f64),
    #[error("randomization factor must be within 0..=1, got {0}")]
    Randomization(f64),
    #[error("initial interval exceeds max interval")]
    IntervalOrder,
}

/// Parameters of an exponential backoff schedule
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffPolicy {
    pub initial_interval: Duration,
    pub max_interval: Duration,
    pub multiplier: f64,
    pub randomization_factor: f64,
    /// Total time after which the schedule stops; zero means never
    pub max_elapsed: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(60),
            multiplier: 1.5,
            randomization_factor: 0.5,
            max_elapsed: Duration::from_secs(15 * 60),
        }
    }
}

impl BackoffPolicy {
    /// Parse `s`, falling back to the defaults (with a warning) when it does
    /// not parse
    pub fn parse_or_default(s: &str) -> Self {
        match s.parse() {
            Ok(policy) => policy,
            Err(e) => {
                tracing::warn!(
                    backoff = s,
                    error = %e,
                    "could not parse backoff string, using default backoff parameters"
                );
                Self::default()
            }
        }
    }

    /// Start a new schedule
    pub fn start(&self) -> Backoff {
        Backoff {
            current: self.initial_interval,
            policy: self.clone(),
        }
    }
}

impl FromStr for BackoffPolicy {
    type Err = BackoffParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(BackoffParseError::Empty);
        }

        let mut policy = Self::default();
        let rest = match s.strip_prefix('[') {
            Some(open) => {
                let (range, rest) = open
                    .split_once(']')
                    .ok_or(BackoffParseError::UnclosedRange)?;
                let mut bounds = range.split_whitespace();
                let initial = bounds.next().ok_or(BackoffParseError::MissingInterval)?;
                policy.initial_interval = parse_duration(initial)?;
                if let Some(max) = bounds.next() {
                    policy.max_interval = parse_duration(max)?;
                }
                if let Some(extra) = bounds.next() {
                    return Err(BackoffParseError::ExtraInterval(extra.to_string()));
                }
                rest
            }
            None => s,
        };

        for token in rest.split_whitespace() {
            let mut chars = token.chars();
            let sigil = chars.next();
            let value = chars.as_str();
            match sigil {
                Some('*') => {
                    let multiplier = parse_number(value)?;
                    if multiplier < 1.0 {
                        return Err(BackoffParseError::Multiplier(multiplier));
                    }
                    policy.multiplier = multiplier;
                }
                Some('~') => {
                    let factor = parse_number(value)?;
                    if !(0.0..=1.0).contains(&factor) {
                        return Err(BackoffParseError::Randomization(factor));
                    }
                    policy.randomization_factor = factor;
                }
                Some('<') => policy.max_elapsed = parse_duration(value)?,
                _ => return Err(BackoffParseError::UnknownToken(token.to_string())),
            }
        }

        if policy.initial_interval > policy.max_interval {
            return Err(BackoffParseError::IntervalOrder);
        }
        Ok(policy)
    }
}

impl fmt::Display for BackoffPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Bare seconds keep every part a single token
        write!(
            f,
            "[{} {}] *{} ~{} <{}",
            self.initial_interval.as_secs_f64(),
            self.max_interval.as_secs_f64(),
            self.multiplier,
            self.randomization_factor,
            self.max_elapsed.as_secs_f64(),
        )
    }
}

fn parse_number(value: &str) -> Result<f64, BackoffParseError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| BackoffParseError::Number(value.to_string()))
}

fn parse_duration(value: &str) -> Result<Duration, BackoffParseError> {
    if let Ok(secs) = value.parse::<f64>() {
        return Duration::try_from_secs_f64(secs).map_err(|e| BackoffParseError::Duration {
            value: value.to_string(),
            reason: e.to_string(),
        });
    }
    humantime::parse_duration(value).map_err(|e| BackoffParseError::Duration {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// One running backoff schedule
#[derive(Debug, Clone)]
pub struct Backoff {
    policy: BackoffPolicy,
    current: Duration,
}

impl Backoff {
    /// Next wait, given how long the schedule has been running.
    ///
    /// Returns `None` once waiting again would cross the max elapsed time.
    pub fn next_delay(&mut self, elapsed: Duration) -> Option<Duration> {
        let delay = randomize(self.current, self.policy.randomization_factor);
        let max_elapsed = self.policy.max_elapsed;
        if !max_elapsed.is_zero() && elapsed.saturating_add(delay) > max_elapsed {
            return None;
        }

        self.current = scale(self.current, self.policy.multiplier).min(self.policy.max_interval);
        Some(delay)
    }

    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }
}

fn randomize(interval: Duration, factor: f64) -> Duration {
    if factor == 0.0 {
        return interval;
    }
    // Uniform over [interval * (1 - factor), interval * (1 + factor)]
    let spread = factor * (2.0 * rand::random::<f64>() - 1.0);
    scale(interval, 1.0 + spread)
}

/// `interval * factor`, saturating at `Duration::MAX` instead of panicking
fn scale(interval: Duration, factor: f64) -> Duration {
    Duration::try_from_secs_f64(interval.as_secs_f64() * factor).unwrap_or(Duration::MAX)
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod tests;
