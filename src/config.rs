//! Configuration Module
//!
//! Handles loading cache configuration from environment variables.

use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// == Delete Mode ==
/// How a delete query removes a cached record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteMode {
    /// Keep the record and mark it deleted
    #[default]
    Tombstone,
    /// Drop the record from the store
    Remove,
}

impl FromStr for DeleteMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tombstone" => Ok(DeleteMode::Tombstone),
            "remove" => Ok(DeleteMode::Remove),
            other => Err(format!("unknown delete mode '{}'", other)),
        }
    }
}

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
/// Per-model cache durations are not configured here; they belong to each
/// [`Model`](crate::models::Model).
#[derive(Debug, Clone)]
pub struct Config {
    /// How delete queries remove records
    pub delete_mode: DeleteMode,
    /// Background sweep interval in seconds
    pub sweep_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DELETE_MODE` - `tombstone` or `remove` (default: tombstone)
    /// - `SWEEP_INTERVAL` - Expired-record sweep frequency in seconds (default: 60)
    pub fn from_env() -> Self {
        Self {
            delete_mode: env::var("DELETE_MODE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            sweep_interval: env::var("SWEEP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            delete_mode: DeleteMode::Tombstone,
            sweep_interval: 60,
        }
    }
}
