//! Configuration management for the task list binary.
//!
//! Loads configuration from environment variables with sensible defaults.

#[cfg(test)]
use crate::reducer::DEFAULT_FEEDBACK_TTL;
use crate::reducer::DEFAULT_FEEDBACK_TTL_MS;
use crate::types::IdStrategy;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Variable selecting the id strategy
pub const ID_STRATEGY_VAR: &str = "TASKLIST_ID_STRATEGY";
/// Variable setting the feedback TTL in milliseconds
pub const FEEDBACK_TTL_VAR: &str = "TASKLIST_FEEDBACK_TTL_MS";
/// Variable selecting the renderer
pub const RENDER_VAR: &str = "TASKLIST_RENDER";
/// Variable setting the shutdown timeout in seconds
pub const SHUTDOWN_TIMEOUT_VAR: &str = "TASKLIST_SHUTDOWN_TIMEOUT_SECS";

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable held a value outside its allowed set
    #[error("Invalid value {value:?} for {var} (expected {expected})")]
    InvalidValue {
        /// Variable name
        var: &'static str,
        /// Value found
        value: String,
        /// Allowed values
        expected: &'static str,
    },
}

/// How snapshots are drawn
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Plain text for a terminal
    #[default]
    Text,
    /// One JSON document per snapshot
    Json,
}

impl FromStr for RenderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(other.to_string()),
        }
    }
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// How task ids are assigned
    pub id_strategy: IdStrategy,
    /// How long feedback stays up, in milliseconds (0 = until the next success)
    pub feedback_ttl_ms: u64,
    /// Renderer selection
    pub render: RenderMode,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            id_strategy: IdStrategy::default(),
            feedback_ttl_ms: DEFAULT_FEEDBACK_TTL_MS,
            render: RenderMode::default(),
            shutdown_timeout_secs: 5,
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an enumerated variable holds an unknown value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup`
    ///
    /// Unparseable numbers fall back to their defaults; unknown values for
    /// enumerated settings are errors.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an enumerated variable holds an unknown value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let id_strategy = match lookup(ID_STRATEGY_VAR) {
            Some(value) => value.parse().map_err(|value| ConfigError::InvalidValue {
                var: ID_STRATEGY_VAR,
                value,
                expected: "monotonic or legacy",
            })?,
            None => defaults.id_strategy,
        };

        let render = match lookup(RENDER_VAR) {
            Some(value) => value.parse().map_err(|value| ConfigError::InvalidValue {
                var: RENDER_VAR,
                value,
                expected: "text or json",
            })?,
            None => defaults.render,
        };

        Ok(Self {
            id_strategy,
            feedback_ttl_ms: lookup(FEEDBACK_TTL_VAR)
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.feedback_ttl_ms),
            render,
            shutdown_timeout_secs: lookup(SHUTDOWN_TIMEOUT_VAR)
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.shutdown_timeout_secs),
        })
    }

    /// Feedback TTL as a `Duration`
    #[must_use]
    pub const fn feedback_ttl(&self) -> Duration {
        Duration::from_millis(self.feedback_ttl_ms)
    }

    /// Shutdown timeout as a `Duration`
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}
