//! Ignira - Wildfire risk monitoring for geographic areas.
//!
//! # Overview
//!
//! Ignira tracks environmental fire risk for "monitored areas" from periodic
//! weather readings. Each area keeps its weather history, reported wildfires
//! and issued alerts. Risk is derived from the latest reading and alerts are
//! raised either automatically, when risk crosses a threshold, or manually by
//! a user with a written justification.
//!
//! Sensor readings are simulated. Alerts are in-memory records; nothing is
//! delivered anywhere.
//!
//! # Modules
//!
//! - [`model`]: Weather samples, wildfire events, alerts and HTTP types
//! - [`area`]: Monitored areas, risk queries and alert factories
//! - [`risk`]: The risk formula and threshold assessment
//! - [`user`]: Users and the areas they monitor
//! - [`sensor`]: Simulated weather sensor
//! - [`registry`]: Shared in-memory registry of areas and users
//! - [`config`]: Environment-based configuration
//! - [`api`]: HTTP API handlers
//! - [`error`]: Error taxonomy

pub mod api;
pub mod area;
pub mod config;
pub mod error;
pub mod model;
pub mod registry;
pub mod risk;
pub mod sensor;
pub mod user;

pub use error::{Error, Result};
