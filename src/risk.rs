//! Risk evaluation for monitored areas.
//!
//! The fire risk of a reading is a weighted sum of temperature and wind speed
//! minus a humidity term, clamped to `[0, 100]`:
//!
//! ```text
//! risk = temperature * 0.4 + wind_speed * 0.3 - humidity * 0.5
//! ```
//!
//! Wildfire history is recorded per area but is not an input to the formula.

use tracing::info;

use crate::area::MonitoredArea;
use crate::error::{Error, Result};
use crate::model::{Alert, WeatherSample};

pub const TEMPERATURE_WEIGHT: f64 = 0.4;
pub const WIND_SPEED_WEIGHT: f64 = 0.3;
pub const HUMIDITY_WEIGHT: f64 = 0.5;

pub const MIN_RISK: f64 = 0.0;
pub const MAX_RISK: f64 = 100.0;

/// Risk strictly above this triggers an automatic alert unless configured
/// otherwise.
pub const DEFAULT_ALERT_THRESHOLD: f64 = 70.0;

/// Compute the fire risk for a single reading.
///
/// Fails with [`Error::InvalidReading`] if any input is negative or not
/// finite. The result always lies in `[0, 100]`.
pub fn calculate_risk(temperature: f64, humidity: f64, wind_speed: f64) -> Result<f64> {
    let valid = |value: f64| value.is_finite() && value >= 0.0;

    if !(valid(temperature) && valid(humidity) && valid(wind_speed)) {
        return Err(Error::InvalidReading {
            temperature,
            humidity,
            wind_speed,
        });
    }

    let raw = temperature * TEMPERATURE_WEIGHT + wind_speed * WIND_SPEED_WEIGHT
        - humidity * HUMIDITY_WEIGHT;

    Ok(raw.clamp(MIN_RISK, MAX_RISK))
}

/// Outcome of checking an area's current risk against the alert threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskAssessment {
    pub area_id: u32,
    pub risk_level: f64,
    /// The latest sample the risk was computed from.
    pub sample: WeatherSample,
    /// The automatic alert generated, if the threshold was crossed.
    pub alert: Option<Alert>,
}

/// Compute an area's current risk and raise an automatic alert when it is
/// strictly above `threshold`.
///
/// Fails with [`Error::NoDataAvailable`] if the area has no weather history.
/// Nothing is appended in that case.
pub fn assess_area(area: &mut MonitoredArea, threshold: f64) -> Result<RiskAssessment> {
    let sample = area
        .latest_weather_sample()
        .cloned()
        .ok_or(Error::NoDataAvailable { area_id: area.id() })?;

    let risk_level = area.calculate_risk_from_sample(&sample)?;

    let alert = if risk_level > threshold {
        Some(area.generate_automatic_alert(risk_level, Some(&sample))?.clone())
    } else {
        info!(
            area_id = area.id(),
            risk_level,
            threshold,
            "Risk within normal range"
        );
        None
    };

    Ok(RiskAssessment {
        area_id: area.id(),
        risk_level,
        sample,
        alert,
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, 20).unwrap()
    }

    #[test]
    fn test_reference_values() {
        assert_relative_eq!(calculate_risk(35.0, 10.0, 15.0).unwrap(), 13.5);
        assert_relative_eq!(calculate_risk(40.0, 0.0, 20.0).unwrap(), 22.0);
    }

    #[test]
    fn test_clamps_high() {
        assert_relative_eq!(calculate_risk(100.0, 0.0, 100.0).unwrap(), 70.0);
        assert_relative_eq!(calculate_risk(1000.0, 0.0, 0.0).unwrap(), 100.0);
        assert_relative_eq!(calculate_risk(200.0, 0.0, 100.0).unwrap(), 100.0);
    }

    #[test]
    fn test_clamps_low() {
        assert_relative_eq!(calculate_risk(0.0, 100.0, 0.0).unwrap(), 0.0);
        assert_relative_eq!(calculate_risk(0.0, 0.0, 0.0).unwrap(), 0.0);
    }

    #[test]
    fn test_result_always_in_range() {
        let readings = [0.0, 0.5, 12.0, 40.0, 99.9, 100.0, 250.0, 1e6];

        for &t in &readings {
            for &h in &readings {
                for &w in &readings {
                    let risk = calculate_risk(t, h, w).unwrap();
                    assert!((MIN_RISK..=MAX_RISK).contains(&risk), "{t} {h} {w} -> {risk}");
                }
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let first = calculate_risk(27.3, 41.0, 8.8).unwrap();
        for _ in 0..10 {
            assert_eq!(calculate_risk(27.3, 41.0, 8.8).unwrap(), first);
        }
    }

    #[test]
    fn test_negative_input_rejected_for_each_field() {
        for (t, h, w) in [(-1.0, 0.0, 0.0), (0.0, -1.0, 0.0), (0.0, 0.0, -1.0)] {
            assert!(matches!(
                calculate_risk(t, h, w),
                Err(Error::InvalidReading { .. })
            ));
        }
    }

    #[test]
    fn test_non_finite_input_rejected() {
        assert!(calculate_risk(f64::NAN, 10.0, 10.0).is_err());
        assert!(calculate_risk(10.0, f64::INFINITY, 10.0).is_err());
    }

    #[test]
    fn test_assess_empty_area() {
        let mut area = MonitoredArea::new(1, "ForestA", "North", "Cerrado");

        assert_eq!(
            assess_area(&mut area, DEFAULT_ALERT_THRESHOLD).unwrap_err(),
            Error::NoDataAvailable { area_id: 1 }
        );
        assert!(area.alert_history().is_empty());
    }

    #[test]
    fn test_assess_below_threshold_no_alert() {
        let mut area = MonitoredArea::new(1, "ForestA", "North", "Cerrado");
        area.add_weather_sample(WeatherSample::new(1, 35.0, 10.0, 15.0, date()).unwrap());

        let assessment = assess_area(&mut area, DEFAULT_ALERT_THRESHOLD).unwrap();

        assert_relative_eq!(assessment.risk_level, 13.5);
        assert!(assessment.alert.is_none());
        assert!(area.alert_history().is_empty());
    }

    #[test]
    fn test_assess_above_threshold_raises_alert() {
        let mut area = MonitoredArea::new(1, "ForestA", "North", "Cerrado");
        area.add_weather_sample(WeatherSample::new(1, 200.0, 0.0, 20.0, date()).unwrap());

        let assessment = assess_area(&mut area, DEFAULT_ALERT_THRESHOLD).unwrap();

        let alert = assessment.alert.unwrap();
        assert_eq!(alert.id(), 1);
        assert_relative_eq!(alert.risk_level(), 86.0);
        assert_eq!(alert.issue_date(), date());
        assert_eq!(area.alert_history().len(), 1);
    }

    #[test]
    fn test_threshold_is_strict() {
        let mut area = MonitoredArea::new(1, "ForestA", "North", "Cerrado");
        // 100 * 0.4 + 100 * 0.3 = 70
        area.add_weather_sample(WeatherSample::new(1, 100.0, 0.0, 100.0, date()).unwrap());

        let assessment = assess_area(&mut area, 70.0).unwrap();

        assert!(assessment.alert.is_none());
    }
}
