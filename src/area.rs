//! Monitored areas.
//!
//! A [`MonitoredArea`] owns the weather history, wildfire history and alert
//! history of one location. All three lists are append-only and keep insertion
//! order. Every mutating operation validates its input before touching a list,
//! so a failed call leaves the area unchanged.

use chrono::{NaiveDate, Utc};
use rand::Rng;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::model::{
    Alert, AlertSummary, AreaDetail, AreaSummary, Creator, WeatherSample, WildfireEvent,
};
use crate::risk;
use crate::sensor::{MAX_SENSOR_QUANTITY, SensorSimulator};
use crate::user::User;

/// Lowest and highest wildfire severity accepted.
pub const SEVERITY_RANGE: std::ops::RangeInclusive<i32> = 0..=100;

/// A geographic region tracked for fire risk.
#[derive(Debug, Clone)]
pub struct MonitoredArea {
    id: u32,
    name: String,
    location: String,
    vegetation_type: String,
    weather: Vec<WeatherSample>,
    wildfires: Vec<WildfireEvent>,
    alerts: Vec<Alert>,
}

impl MonitoredArea {
    pub fn new(
        id: u32,
        name: impl Into<String>,
        location: impl Into<String>,
        vegetation_type: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            location: location.into(),
            vegetation_type: vegetation_type.into(),
            weather: Vec::new(),
            wildfires: Vec::new(),
            alerts: Vec::new(),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn vegetation_type(&self) -> &str {
        &self.vegetation_type
    }

    pub fn weather_history(&self) -> &[WeatherSample] {
        &self.weather
    }

    pub fn wildfire_history(&self) -> &[WildfireEvent] {
        &self.wildfires
    }

    pub fn alert_history(&self) -> &[Alert] {
        &self.alerts
    }

    // ------------------------------------------------------------------
    // Weather history
    // ------------------------------------------------------------------

    /// Id for the next weather sample: history length plus one.
    pub fn next_sample_id(&self) -> u32 {
        next_id(self.weather.len())
    }

    /// Id for the next reported wildfire: history length plus one.
    pub fn next_wildfire_id(&self) -> u32 {
        next_id(self.wildfires.len())
    }

    pub fn add_weather_sample(&mut self, sample: WeatherSample) {
        self.weather.push(sample);
    }

    /// Record a manually entered reading under the next sample id.
    pub fn record_reading(
        &mut self,
        temperature: f64,
        humidity: f64,
        wind_speed: f64,
        date: NaiveDate,
    ) -> Result<&WeatherSample> {
        let sample =
            WeatherSample::new(self.next_sample_id(), temperature, humidity, wind_speed, date)?;

        let index = self.weather.len();
        self.weather.push(sample);
        Ok(&self.weather[index])
    }

    /// Collect `quantity` readings from `sensor` and append them.
    ///
    /// Each reading gets the next sample id at the time it is collected.
    /// Returns the collected samples in collection order. Fails with
    /// [`Error::InvalidQuantity`] above [`MAX_SENSOR_QUANTITY`], before any
    /// reading is taken.
    pub fn use_sensor<R: Rng>(
        &mut self,
        sensor: &mut SensorSimulator<R>,
        quantity: u32,
    ) -> Result<Vec<WeatherSample>> {
        if quantity > MAX_SENSOR_QUANTITY {
            return Err(Error::InvalidQuantity {
                requested: quantity,
                max: MAX_SENSOR_QUANTITY,
            });
        }

        let mut collected = Vec::with_capacity(quantity as usize);

        for _ in 0..quantity {
            let sample = sensor.collect(self.next_sample_id());
            self.weather.push(sample.clone());
            collected.push(sample);
        }

        debug!(area_id = self.id, quantity, "Sensor readings collected");

        Ok(collected)
    }

    /// The sample with the highest id, or `None` if there is no history.
    ///
    /// When several samples share the highest id, the one added last wins.
    pub fn latest_weather_sample(&self) -> Option<&WeatherSample> {
        self.weather.iter().max_by_key(|sample| sample.id())
    }

    // ------------------------------------------------------------------
    // Risk
    // ------------------------------------------------------------------

    /// Risk for an explicit reading. See [`risk::calculate_risk`].
    pub fn calculate_risk_from_reading(
        &self,
        temperature: f64,
        humidity: f64,
        wind_speed: f64,
    ) -> Result<f64> {
        risk::calculate_risk(temperature, humidity, wind_speed)
    }

    pub fn calculate_risk_from_sample(&self, sample: &WeatherSample) -> Result<f64> {
        self.calculate_risk_from_reading(
            sample.temperature(),
            sample.humidity(),
            sample.wind_speed(),
        )
    }

    /// Risk from the latest weather sample.
    ///
    /// Fails with [`Error::NoDataAvailable`] when the area has no samples.
    pub fn calculate_risk(&self) -> Result<f64> {
        let sample = self
            .latest_weather_sample()
            .ok_or(Error::NoDataAvailable { area_id: self.id })?;

        self.calculate_risk_from_sample(sample)
    }

    // ------------------------------------------------------------------
    // Alerts
    // ------------------------------------------------------------------

    /// Issue an automatic alert derived from `sample`, dated with the sample's
    /// date.
    ///
    /// Fails with [`Error::MissingSample`] when no sample is given and with
    /// [`Error::InvalidRiskLevel`] when `risk_level` is outside `[0, 100]`.
    pub fn generate_automatic_alert(
        &mut self,
        risk_level: f64,
        sample: Option<&WeatherSample>,
    ) -> Result<&Alert> {
        let sample = sample.ok_or(Error::MissingSample)?;
        let alert = Alert::automatic(self.next_alert_id(), risk_level, sample.clone())?;

        info!(
            area_id = self.id,
            alert_id = alert.id(),
            risk_level,
            sample_id = sample.id(),
            "Automatic alert generated"
        );

        Ok(self.push_alert(alert))
    }

    /// Issue a manual alert dated today (UTC).
    pub fn generate_manual_alert(
        &mut self,
        risk_level: f64,
        user: Option<&User>,
        description: &str,
    ) -> Result<&Alert> {
        self.generate_manual_alert_on(risk_level, user, description, Utc::now().date_naive())
    }

    /// Issue a manual alert raised by `user` with an explicit issue date.
    ///
    /// Fails with [`Error::MissingUser`] when no user is given and with
    /// [`Error::InvalidRiskLevel`] when `risk_level` is outside `[0, 100]`.
    pub fn generate_manual_alert_on(
        &mut self,
        risk_level: f64,
        user: Option<&User>,
        description: &str,
        issue_date: NaiveDate,
    ) -> Result<&Alert> {
        let user = user.ok_or(Error::MissingUser)?;
        let creator = Creator {
            id: user.id(),
            name: user.name().to_string(),
        };
        let alert = Alert::manual(
            self.next_alert_id(),
            risk_level,
            issue_date,
            creator,
            description,
        )?;

        info!(
            area_id = self.id,
            alert_id = alert.id(),
            risk_level,
            user_id = user.id(),
            "Manual alert generated"
        );

        Ok(self.push_alert(alert))
    }

    /// Describe every alert in issue order.
    pub fn describe_alerts(&self) -> Vec<AlertSummary> {
        self.alerts
            .iter()
            .map(|alert| alert.describe(&self.name))
            .collect()
    }

    fn next_alert_id(&self) -> u32 {
        next_id(self.alerts.len())
    }

    fn push_alert(&mut self, alert: Alert) -> &Alert {
        let index = self.alerts.len();
        self.alerts.push(alert);
        &self.alerts[index]
    }

    // ------------------------------------------------------------------
    // Wildfires
    // ------------------------------------------------------------------

    /// Append a wildfire report.
    ///
    /// Fails with [`Error::InvalidSeverity`] when severity is outside
    /// `[0, 100]`. Reports do not affect the computed risk.
    pub fn report_wildfire(&mut self, event: WildfireEvent) -> Result<&WildfireEvent> {
        if !SEVERITY_RANGE.contains(&event.severity) {
            return Err(Error::InvalidSeverity(event.severity));
        }

        info!(
            area_id = self.id,
            area = %self.name,
            date = %event.date,
            severity = event.severity,
            "Wildfire reported"
        );

        let index = self.wildfires.len();
        self.wildfires.push(event);
        Ok(&self.wildfires[index])
    }

    // ------------------------------------------------------------------
    // Projections
    // ------------------------------------------------------------------

    pub fn summary(&self) -> AreaSummary {
        AreaSummary {
            id: self.id,
            name: self.name.clone(),
            location: self.location.clone(),
            vegetation_type: self.vegetation_type.clone(),
            weather_samples: self.weather.len(),
            wildfires: self.wildfires.len(),
            alerts: self.alerts.len(),
        }
    }

    pub fn detail(&self) -> AreaDetail {
        AreaDetail {
            id: self.id,
            name: self.name.clone(),
            location: self.location.clone(),
            vegetation_type: self.vegetation_type.clone(),
            weather: self.weather.clone(),
            wildfires: self.wildfires.clone(),
            alerts: self.describe_alerts(),
        }
    }
}

fn next_id(len: usize) -> u32 {
    u32::try_from(len).map_or(u32::MAX, |n| n.saturating_add(1))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::model::AlertKind;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 4).unwrap()
    }

    fn sample(id: u32, t: f64, h: f64, w: f64) -> WeatherSample {
        WeatherSample::new(id, t, h, w, date()).unwrap()
    }

    fn forest() -> MonitoredArea {
        MonitoredArea::new(1, "ForestA", "Lat -15.8, Lon -47.9", "Cerrado")
    }

    #[test]
    fn test_end_to_end_scenario() {
        let mut area = forest();

        assert_eq!(
            area.calculate_risk().unwrap_err(),
            Error::NoDataAvailable { area_id: 1 }
        );

        area.add_weather_sample(sample(1, 35.0, 10.0, 15.0));
        assert_relative_eq!(area.calculate_risk().unwrap(), 13.5);

        area.add_weather_sample(sample(2, 40.0, 0.0, 20.0));
        assert_eq!(area.latest_weather_sample().unwrap().id(), 2);
        assert_relative_eq!(area.calculate_risk().unwrap(), 22.0);

        assert_relative_eq!(area.calculate_risk_from_reading(1000.0, 0.0, 0.0).unwrap(), 100.0);
    }

    #[test]
    fn test_latest_is_highest_id_not_last_added() {
        let mut area = forest();
        area.add_weather_sample(sample(1, 10.0, 50.0, 5.0));
        area.add_weather_sample(sample(3, 20.0, 50.0, 5.0));
        area.add_weather_sample(sample(2, 30.0, 50.0, 5.0));

        assert_eq!(area.latest_weather_sample().unwrap().id(), 3);
    }

    #[test]
    fn test_latest_on_empty_area() {
        assert!(forest().latest_weather_sample().is_none());
    }

    #[test]
    fn test_calculate_risk_from_sample() {
        let area = forest();

        assert_relative_eq!(
            area.calculate_risk_from_sample(&sample(1, 35.0, 10.0, 15.0))
                .unwrap(),
            13.5
        );
    }

    #[test]
    fn test_record_reading_assigns_sequential_ids() {
        let mut area = forest();

        assert_eq!(area.record_reading(20.0, 30.0, 5.0, date()).unwrap().id(), 1);
        assert_eq!(area.record_reading(25.0, 30.0, 5.0, date()).unwrap().id(), 2);
        assert_eq!(area.weather_history().len(), 2);
    }

    #[test]
    fn test_record_reading_rejects_invalid_without_appending() {
        let mut area = forest();

        assert!(area.record_reading(20.0, 130.0, 5.0, date()).is_err());
        assert!(area.record_reading(-2.0, 30.0, 5.0, date()).is_err());
        assert!(area.weather_history().is_empty());
    }

    #[test]
    fn test_use_sensor_appends_with_sequential_ids() {
        let mut area = forest();
        area.record_reading(20.0, 30.0, 5.0, date()).unwrap();
        let mut sensor = SensorSimulator::seeded(11);

        let collected = area.use_sensor(&mut sensor, 3).unwrap();

        let ids: Vec<u32> = collected.iter().map(WeatherSample::id).collect();
        assert_eq!(ids, vec![2, 3, 4]);
        assert_eq!(area.weather_history().len(), 4);
        assert_eq!(area.latest_weather_sample().unwrap().id(), 4);
    }

    #[test]
    fn test_use_sensor_zero_quantity() {
        let mut area = forest();
        let mut sensor = SensorSimulator::seeded(11);

        assert!(area.use_sensor(&mut sensor, 0).unwrap().is_empty());
        assert!(area.weather_history().is_empty());
    }

    #[test]
    fn test_use_sensor_quantity_limit() {
        let mut area = forest();
        let mut sensor = SensorSimulator::seeded(11);

        assert_eq!(
            area.use_sensor(&mut sensor, MAX_SENSOR_QUANTITY + 1)
                .unwrap_err(),
            Error::InvalidQuantity {
                requested: MAX_SENSOR_QUANTITY + 1,
                max: MAX_SENSOR_QUANTITY,
            }
        );
        assert!(area.weather_history().is_empty());

        let collected = area.use_sensor(&mut sensor, MAX_SENSOR_QUANTITY).unwrap();
        assert_eq!(collected.len(), MAX_SENSOR_QUANTITY as usize);
        assert_eq!(area.weather_history().len(), MAX_SENSOR_QUANTITY as usize);
    }

    #[test]
    fn test_automatic_alert_requires_sample() {
        let mut area = forest();

        assert_eq!(
            area.generate_automatic_alert(50.0, None).unwrap_err(),
            Error::MissingSample
        );
        assert!(area.alert_history().is_empty());
    }

    #[test]
    fn test_automatic_alert_rejects_invalid_risk() {
        let mut area = forest();
        let source = sample(1, 35.0, 10.0, 15.0);

        assert_eq!(
            area.generate_automatic_alert(101.0, Some(&source))
                .unwrap_err(),
            Error::InvalidRiskLevel(101.0)
        );
        assert!(area.alert_history().is_empty());
    }

    #[test]
    fn test_automatic_alert_fields() {
        let mut area = forest();
        let source = sample(5, 35.0, 10.0, 15.0);

        let alert = area.generate_automatic_alert(80.0, Some(&source)).unwrap();

        assert_eq!(alert.id(), 1);
        assert_eq!(alert.issue_date(), date());
        assert_eq!(
            alert.kind(),
            &AlertKind::Automatic {
                source: source.clone()
            }
        );
    }

    #[test]
    fn test_manual_alert_requires_user() {
        let mut area = forest();

        assert_eq!(
            area.generate_manual_alert(50.0, None, "smoke").unwrap_err(),
            Error::MissingUser
        );
        assert!(area.alert_history().is_empty());
    }

    #[test]
    fn test_manual_alert_fields() {
        let mut area = forest();
        let user = User::new(3, "Bia", "bia@example.org");

        let alert = area
            .generate_manual_alert_on(45.5, Some(&user), "Dry lightning reported", date())
            .unwrap();

        assert_eq!(alert.id(), 1);
        assert_eq!(alert.issue_date(), date());
        match alert.kind() {
            AlertKind::Manual {
                created_by,
                description,
            } => {
                assert_eq!(created_by.id, 3);
                assert_eq!(created_by.name, "Bia");
                assert_eq!(description, "Dry lightning reported");
            }
            AlertKind::Automatic { .. } => panic!("expected a manual alert"),
        }
    }

    #[test]
    fn test_alert_ids_sequential_per_area() {
        let mut a = forest();
        let mut b = MonitoredArea::new(2, "ForestB", "South", "Pampa");
        let user = User::new(1, "Ana", "ana@example.org");
        let source = sample(1, 35.0, 10.0, 15.0);

        a.generate_automatic_alert(10.0, Some(&source)).unwrap();
        a.generate_manual_alert(20.0, Some(&user), "x").unwrap();
        let third = a.generate_automatic_alert(30.0, Some(&source)).unwrap().id();
        let first_in_b = b.generate_manual_alert(40.0, Some(&user), "y").unwrap().id();

        assert_eq!(third, 3);
        assert_eq!(first_in_b, 1);

        let ids: Vec<u32> = a.alert_history().iter().map(Alert::id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_report_wildfire_validates_severity() {
        let mut area = forest();

        assert_eq!(
            area.report_wildfire(WildfireEvent::new(1, date(), 150))
                .unwrap_err(),
            Error::InvalidSeverity(150)
        );
        assert_eq!(
            area.report_wildfire(WildfireEvent::new(1, date(), -1))
                .unwrap_err(),
            Error::InvalidSeverity(-1)
        );
        assert!(area.wildfire_history().is_empty());

        area.report_wildfire(WildfireEvent::new(1, date(), 100))
            .unwrap();
        area.report_wildfire(WildfireEvent::new(2, date(), 0)).unwrap();

        assert_eq!(area.wildfire_history().len(), 2);
        assert_eq!(area.next_wildfire_id(), 3);
    }

    #[test]
    fn test_wildfires_do_not_change_risk() {
        let mut area = forest();
        area.add_weather_sample(sample(1, 35.0, 10.0, 15.0));
        let before = area.calculate_risk().unwrap();

        area.report_wildfire(WildfireEvent::new(1, date(), 95))
            .unwrap();

        assert_eq!(area.calculate_risk().unwrap(), before);
    }

    #[test]
    fn test_detail_projection() {
        let mut area = forest();
        let source = sample(1, 35.0, 10.0, 15.0);
        area.add_weather_sample(source.clone());
        area.generate_automatic_alert(13.5, Some(&source)).unwrap();

        let detail = area.detail();

        assert_eq!(detail.weather.len(), 1);
        assert_eq!(detail.alerts.len(), 1);
        assert_eq!(detail.alerts[0].area, "ForestA");
        assert_eq!(detail.alerts[0].risk_level, "13.50");

        let summary = area.summary();
        assert_eq!(summary.weather_samples, 1);
        assert_eq!(summary.alerts, 1);
        assert_eq!(summary.wildfires, 0);
    }
}
