//! Error types for Ignira.
//!
//! Every failure in the core is a local, synchronous validation failure. The
//! core signals it and never retries; the caller decides whether to prompt
//! again or abort. No list is mutated when an operation fails.

use thiserror::Error;

/// Unified error type for the crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    // ── Validation errors ────────────────────────────────────────────
    #[error(
        "Invalid reading: temperature={temperature}, humidity={humidity}, wind_speed={wind_speed}"
    )]
    InvalidReading {
        temperature: f64,
        humidity: f64,
        wind_speed: f64,
    },

    #[error("No weather data available for area {area_id}")]
    NoDataAvailable { area_id: u32 },

    #[error("Risk level {0} must be between 0 and 100")]
    InvalidRiskLevel(f64),

    #[error("An automatic alert requires a source weather sample")]
    MissingSample,

    #[error("A manual alert requires a creating user")]
    MissingUser,

    #[error("Wildfire severity {0} must be between 0 and 100")]
    InvalidSeverity(i32),

    #[error("Sensor quantity {requested} exceeds the maximum of {max}")]
    InvalidQuantity { requested: u32, max: u32 },

    // ── Registry errors ──────────────────────────────────────────────
    #[error("Area not found: {0}")]
    AreaNotFound(u32),

    #[error("Area {0} is already registered")]
    DuplicateArea(u32),

    #[error("User not found: {0}")]
    UserNotFound(u32),

    #[error("User {user_id} is not monitoring area {area_id}")]
    AreaNotMonitored { user_id: u32, area_id: u32 },
}

/// Result alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
