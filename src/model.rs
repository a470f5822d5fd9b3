//! Data models for Ignira.
//!
//! Weather samples, wildfire events and alerts are immutable once created.
//! Alerts are a single record with a tagged payload: automatic alerts carry
//! the sample they were derived from, manual alerts carry their creator and a
//! free-text justification.
//!
//! The request and response types used by the HTTP layer live at the bottom
//! of this module.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single weather reading for a monitored area.
///
/// All numeric fields are finite and non-negative, and humidity never exceeds
/// 100%. Construction through [`WeatherSample::new`] enforces this.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherSample {
    id: u32,
    /// Degrees Celsius.
    temperature: f64,
    /// Relative humidity, percent.
    humidity: f64,
    /// km/h.
    wind_speed: f64,
    date: NaiveDate,
}

impl WeatherSample {
    /// Create a validated sample.
    ///
    /// Fails with [`Error::InvalidReading`] if any reading is negative or not
    /// finite, or if humidity is above 100.
    pub fn new(
        id: u32,
        temperature: f64,
        humidity: f64,
        wind_speed: f64,
        date: NaiveDate,
    ) -> Result<Self> {
        let valid = |value: f64| value.is_finite() && value >= 0.0;

        if !(valid(temperature) && valid(humidity) && valid(wind_speed)) || humidity > 100.0 {
            return Err(Error::InvalidReading {
                temperature,
                humidity,
                wind_speed,
            });
        }

        Ok(Self {
            id,
            temperature,
            humidity,
            wind_speed,
            date,
        })
    }

    /// Build a sample from readings already known to satisfy the invariants.
    pub(crate) fn from_valid_parts(
        id: u32,
        temperature: f64,
        humidity: f64,
        wind_speed: f64,
        date: NaiveDate,
    ) -> Self {
        debug_assert!(temperature >= 0.0 && wind_speed >= 0.0);
        debug_assert!((0.0..=100.0).contains(&humidity));

        Self {
            id,
            temperature,
            humidity,
            wind_speed,
            date,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn humidity(&self) -> f64 {
        self.humidity
    }

    pub fn wind_speed(&self) -> f64 {
        self.wind_speed
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }
}

/// A reported wildfire incident.
///
/// Severity is checked against `[0, 100]` when the event is reported to an
/// area, not on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WildfireEvent {
    pub id: u32,
    pub date: NaiveDate,
    pub severity: i32,
}

impl WildfireEvent {
    pub fn new(id: u32, date: NaiveDate, severity: i32) -> Self {
        Self { id, date, severity }
    }
}

/// The user who raised a manual alert.
///
/// A copy of the user's identity at the time the alert was raised, so alerts
/// never hold a reference back into the user registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Creator {
    pub id: u32,
    pub name: String,
}

/// What produced an alert.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AlertKind {
    /// Derived from a weather sample.
    Automatic { source: WeatherSample },

    /// Raised by a user with a free-text justification.
    Manual {
        created_by: Creator,
        description: String,
    },
}

/// A risk alert issued for a monitored area.
///
/// Ids are sequential per area, starting at 1. They are not unique across
/// areas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    id: u32,
    risk_level: f64,
    issue_date: NaiveDate,
    kind: AlertKind,
}

impl Alert {
    /// Build an automatic alert dated with its source sample's date.
    pub fn automatic(id: u32, risk_level: f64, source: WeatherSample) -> Result<Self> {
        let risk_level = validate_risk_level(risk_level)?;

        Ok(Self {
            id,
            risk_level,
            issue_date: source.date(),
            kind: AlertKind::Automatic { source },
        })
    }

    /// Build a manual alert.
    pub fn manual(
        id: u32,
        risk_level: f64,
        issue_date: NaiveDate,
        created_by: Creator,
        description: impl Into<String>,
    ) -> Result<Self> {
        let risk_level = validate_risk_level(risk_level)?;

        Ok(Self {
            id,
            risk_level,
            issue_date,
            kind: AlertKind::Manual {
                created_by,
                description: description.into(),
            },
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn risk_level(&self) -> f64 {
        self.risk_level
    }

    pub fn issue_date(&self) -> NaiveDate {
        self.issue_date
    }

    pub fn kind(&self) -> &AlertKind {
        &self.kind
    }

    pub fn is_automatic(&self) -> bool {
        matches!(self.kind, AlertKind::Automatic { .. })
    }

    /// Project the alert into a display-ready summary.
    ///
    /// Risk and readings are formatted with two decimal places.
    pub fn describe(&self, area_name: &str) -> AlertSummary {
        let details = match &self.kind {
            AlertKind::Automatic { source } => AlertDetails::Automatic {
                sample_id: source.id(),
                temperature: format!("{:.2}", source.temperature()),
                humidity: format!("{:.2}", source.humidity()),
                wind_speed: format!("{:.2}", source.wind_speed()),
            },
            AlertKind::Manual {
                created_by,
                description,
            } => AlertDetails::Manual {
                creator_id: created_by.id,
                creator_name: created_by.name.clone(),
                description: description.clone(),
            },
        };

        AlertSummary {
            alert_id: self.id,
            area: area_name.to_string(),
            issue_date: self.issue_date,
            risk_level: format!("{:.2}", self.risk_level),
            details,
        }
    }
}

/// Reject risk levels outside `[0, 100]`, including NaN.
fn validate_risk_level(risk_level: f64) -> Result<f64> {
    if (0.0..=100.0).contains(&risk_level) {
        Ok(risk_level)
    } else {
        Err(Error::InvalidRiskLevel(risk_level))
    }
}

/// Display-ready projection of an [`Alert`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertSummary {
    pub alert_id: u32,
    pub area: String,
    pub issue_date: NaiveDate,
    /// Risk level with two decimal places, e.g. `"13.50"`.
    pub risk_level: String,
    pub details: AlertDetails,
}

/// Variant-specific part of an [`AlertSummary`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AlertDetails {
    Automatic {
        sample_id: u32,
        temperature: String,
        humidity: String,
        wind_speed: String,
    },
    Manual {
        creator_id: u32,
        creator_name: String,
        description: String,
    },
}

impl fmt::Display for AlertSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = match self.details {
            AlertDetails::Automatic { .. } => "ALERT",
            AlertDetails::Manual { .. } => "MANUAL ALERT",
        };

        writeln!(f, "===== {title} =====")?;
        writeln!(f, "Area: {}", self.area)?;
        writeln!(f, "Issued: {}", self.issue_date)?;
        writeln!(f, "Risk level: {}%", self.risk_level)?;

        match &self.details {
            AlertDetails::Automatic {
                sample_id,
                temperature,
                humidity,
                wind_speed,
            } => {
                writeln!(f, "Weather data used:")?;
                writeln!(f, "  Temperature: {temperature}°C")?;
                writeln!(f, "  Humidity: {humidity}%")?;
                writeln!(f, "  Wind: {wind_speed} km/h")?;
                write!(f, "Weather data ID: {sample_id}")
            }
            AlertDetails::Manual {
                creator_id,
                creator_name,
                description,
            } => {
                writeln!(f, "Created by: {creator_name} (ID: {creator_id})")?;
                write!(f, "Description: {description}")
            }
        }
    }
}

// ============================================================================
// HTTP request and response types
// ============================================================================

/// Request body for POST /areas.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAreaRequest {
    pub id: u32,
    pub name: String,
    pub location: String,
    pub vegetation_type: String,
}

/// Request body for POST /areas/:id/sensor.
#[derive(Debug, Clone, Deserialize)]
pub struct SensorRequest {
    /// Number of readings to collect (defaults to 1).
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

/// Request body for POST /areas/:id/weather.
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherRequest {
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
}

/// Request body for POST /areas/:id/wildfires.
#[derive(Debug, Clone, Deserialize)]
pub struct WildfireRequest {
    /// Date of the fire, `YYYY-MM-DD`.
    pub date: NaiveDate,
    pub severity: i32,
}

/// Request body for POST /users.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUserRequest {
    pub name: String,
    pub email: String,
}

/// Request body for POST /users/:id/monitor.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorRequest {
    pub area_id: u32,
}

/// Request body for POST /users/:id/alerts.
#[derive(Debug, Clone, Deserialize)]
pub struct ManualAlertRequest {
    pub area_id: u32,
    pub risk_level: f64,
    pub description: String,
}

/// One row of GET /areas.
#[derive(Debug, Clone, Serialize)]
pub struct AreaSummary {
    pub id: u32,
    pub name: String,
    pub location: String,
    pub vegetation_type: String,
    pub weather_samples: usize,
    pub wildfires: usize,
    pub alerts: usize,
}

/// Response for GET /areas/:id.
#[derive(Debug, Clone, Serialize)]
pub struct AreaDetail {
    pub id: u32,
    pub name: String,
    pub location: String,
    pub vegetation_type: String,
    pub weather: Vec<WeatherSample>,
    pub wildfires: Vec<WildfireEvent>,
    pub alerts: Vec<AlertSummary>,
}

/// Response for GET /areas/:id/risk.
#[derive(Debug, Clone, Serialize)]
pub struct RiskResponse {
    pub area_id: u32,
    pub risk_level: f64,
    pub sample: WeatherSample,
}

/// Response for the user endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: u32,
    pub name: String,
    pub email: String,
    pub monitored_areas: Vec<u32>,
}

/// Response for POST /users/:id/monitor.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentResponse {
    pub area_id: u32,
    /// False when the user was already monitoring the area.
    pub newly_monitored: bool,
    pub risk_level: f64,
    pub sample_id: u32,
    /// Present only when the risk crossed the alert threshold.
    pub alert: Option<AlertSummary>,
}

/// Body returned with every non-2xx response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 1).unwrap()
    }

    #[test]
    fn test_weather_sample_rejects_negative_readings() {
        for (t, h, w) in [(-1.0, 10.0, 5.0), (20.0, -0.1, 5.0), (20.0, 10.0, -3.0)] {
            let err = WeatherSample::new(1, t, h, w, date()).unwrap_err();
            assert!(matches!(err, Error::InvalidReading { .. }));
        }
    }

    #[test]
    fn test_weather_sample_rejects_humidity_over_100() {
        let err = WeatherSample::new(1, 20.0, 100.5, 5.0, date()).unwrap_err();
        assert!(matches!(err, Error::InvalidReading { .. }));

        assert!(WeatherSample::new(1, 20.0, 100.0, 5.0, date()).is_ok());
    }

    #[test]
    fn test_weather_sample_rejects_non_finite() {
        assert!(WeatherSample::new(1, f64::NAN, 10.0, 5.0, date()).is_err());
        assert!(WeatherSample::new(1, 20.0, 10.0, f64::INFINITY, date()).is_err());
    }

    #[test]
    fn test_alert_rejects_out_of_range_risk() {
        let sample = WeatherSample::new(1, 20.0, 10.0, 5.0, date()).unwrap();

        assert_eq!(
            Alert::automatic(1, 100.1, sample.clone()).unwrap_err(),
            Error::InvalidRiskLevel(100.1)
        );
        assert_eq!(
            Alert::automatic(1, -0.5, sample.clone()).unwrap_err(),
            Error::InvalidRiskLevel(-0.5)
        );
        assert!(Alert::automatic(1, f64::NAN, sample.clone()).is_err());
        assert!(Alert::automatic(1, 0.0, sample.clone()).is_ok());
        assert!(Alert::automatic(1, 100.0, sample).is_ok());
    }

    #[test]
    fn test_automatic_alert_uses_sample_date() {
        let sample = WeatherSample::new(7, 30.0, 20.0, 10.0, date()).unwrap();
        let alert = Alert::automatic(1, 50.0, sample).unwrap();

        assert_eq!(alert.issue_date(), date());
        assert!(alert.is_automatic());
    }

    #[test]
    fn test_describe_automatic() {
        let sample = WeatherSample::new(3, 35.0, 10.0, 15.0, date()).unwrap();
        let alert = Alert::automatic(1, 13.5, sample).unwrap();

        let summary = alert.describe("ForestA");

        assert_eq!(summary.area, "ForestA");
        assert_eq!(summary.risk_level, "13.50");
        assert_eq!(
            summary.details,
            AlertDetails::Automatic {
                sample_id: 3,
                temperature: "35.00".to_string(),
                humidity: "10.00".to_string(),
                wind_speed: "15.00".to_string(),
            }
        );

        let text = summary.to_string();
        assert!(text.contains("===== ALERT ====="));
        assert!(text.contains("Risk level: 13.50%"));
        assert!(text.contains("Weather data ID: 3"));
    }

    #[test]
    fn test_describe_manual() {
        let creator = Creator {
            id: 2,
            name: "Ana".to_string(),
        };
        let alert = Alert::manual(4, 88.127, date(), creator, "Smoke seen near the ridge").unwrap();

        let summary = alert.describe("ForestB");

        assert_eq!(summary.alert_id, 4);
        assert_eq!(summary.risk_level, "88.13");
        assert_eq!(summary.issue_date, date());

        let text = summary.to_string();
        assert!(text.contains("===== MANUAL ALERT ====="));
        assert!(text.contains("Created by: Ana (ID: 2)"));
        assert!(text.contains("Description: Smoke seen near the ridge"));
    }

    #[test]
    fn test_alert_kind_serializes_with_tag() {
        let creator = Creator {
            id: 1,
            name: "Rui".to_string(),
        };
        let alert = Alert::manual(1, 40.0, date(), creator, "dry").unwrap();

        let json = serde_json::to_value(&alert).unwrap();

        assert_eq!(json["kind"]["type"], "manual");
        assert_eq!(json["kind"]["created_by"]["name"], "Rui");
        assert_eq!(json["issue_date"], "2024-09-01");
    }
}
