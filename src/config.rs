//! Runtime configuration.
//!
//! Values come from environment variables. Missing or unparsable values fall
//! back to their defaults.
//!
//! - `IGNIRA_PORT`: HTTP listen port (default 3000)
//! - `IGNIRA_ALERT_THRESHOLD`: risk strictly above this raises an automatic
//!   alert (default 70, clamped to `[0, 100]`)
//! - `IGNIRA_SENSOR_SEED`: seed for the simulated sensor (default: random)

use std::env;

use crate::risk::{DEFAULT_ALERT_THRESHOLD, MAX_RISK, MIN_RISK};

/// Default port if not specified via environment variable.
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
    pub alert_threshold: f64,
    pub sensor_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            alert_threshold: DEFAULT_ALERT_THRESHOLD,
            sensor_seed: None,
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = lookup("IGNIRA_PORT")
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(defaults.port);

        let alert_threshold = lookup("IGNIRA_ALERT_THRESHOLD")
            .and_then(|t| t.trim().parse::<f64>().ok())
            .filter(|t| t.is_finite())
            .map_or(defaults.alert_threshold, |t| t.clamp(MIN_RISK, MAX_RISK));

        let sensor_seed = lookup("IGNIRA_SENSOR_SEED").and_then(|s| s.trim().parse().ok());

        Self {
            port,
            alert_threshold,
            sensor_seed,
        }
    }
}
