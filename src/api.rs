//! HTTP API handlers for Ignira.
//!
//! The handlers are a thin layer over the [`Registry`]: they look up the
//! area or user named in the path, call into the domain model and render the
//! result as JSON. Domain errors map to status codes in [`status_for`]:
//!
//! - rejected input (bad readings, risk levels, severities) → `422`
//! - unknown area or user → `404`
//! - duplicate area, no weather data, area not monitored → `409`
//!
//! Every error response carries a `{"error": "..."}` body, including
//! malformed JSON or path parameters rejected by the extractors.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        FromRequest, FromRequestParts, Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument, warn};

use crate::area::MonitoredArea;
use crate::config::Config;
use crate::error::Error;
use crate::model::{
    AlertSummary, AreaDetail, AreaSummary, AssessmentResponse, ErrorResponse, ManualAlertRequest,
    MonitorRequest, NewAreaRequest, NewUserRequest, RiskResponse, SensorRequest, UserResponse,
    WeatherRequest, WeatherSample, WildfireEvent, WildfireRequest,
};
use crate::registry::Registry;
use crate::sensor::{MAX_SENSOR_QUANTITY, SensorSimulator};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Registry,
    pub sensor: Arc<Mutex<SensorSimulator>>,
    /// Risk strictly above this raises an automatic alert.
    pub alert_threshold: f64,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let sensor = match config.sensor_seed {
            Some(seed) => SensorSimulator::seeded(seed),
            None => SensorSimulator::new(),
        };

        Self {
            registry: Registry::new(),
            sensor: Arc::new(Mutex::new(sensor)),
            alert_threshold: config.alert_threshold,
        }
    }
}

/// Error half of every fallible handler.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

/// JSON request body; rejections render as [`ApiError`].
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// Path parameter; rejections render as [`ApiError`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(Path), rejection(ApiError))]
pub struct PathParam<T>(pub T);

/// HTTP status for a domain error.
pub fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::AreaNotFound(_) | Error::UserNotFound(_) => StatusCode::NOT_FOUND,
        Error::DuplicateArea(_) | Error::NoDataAvailable { .. } | Error::AreaNotMonitored { .. } => {
            StatusCode::CONFLICT
        }
        Error::InvalidReading { .. }
        | Error::InvalidRiskLevel(_)
        | Error::MissingSample
        | Error::MissingUser
        | Error::InvalidSeverity(_)
        | Error::InvalidQuantity { .. } => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn reject(err: &Error) -> ApiError {
    ApiError {
        status: status_for(err),
        message: err.to_string(),
    }
}

/// Build the router with all routes and request tracing.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/areas", post(post_area).get(list_areas))
        .route("/areas/:id", get(get_area))
        .route("/areas/:id/sensor", post(post_sensor))
        .route("/areas/:id/weather", post(post_weather))
        .route("/areas/:id/wildfires", post(post_wildfire))
        .route("/areas/:id/risk", get(get_risk))
        .route("/areas/:id/alerts", get(get_area_alerts))
        .route("/users", post(post_user).get(list_users))
        .route("/users/:id", get(get_user))
        .route("/users/:id/monitor", post(post_monitor))
        .route("/users/:id/alerts", post(post_manual_alert))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

/// GET /health - Simple health check endpoint.
pub async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

// ============================================================================
// Area handlers
// ============================================================================

/// POST /areas - Register a monitored area.
///
/// # Request Body
///
/// ```json
/// {
///     "id": 1,
///     "name": "ForestA",
///     "location": "Lat -15.8, Lon -47.9",
///     "vegetation_type": "Cerrado"
/// }
/// ```
///
/// Returns `201 Created` with the area summary, or `409` if the id is taken.
#[instrument(skip(state))]
pub async fn post_area(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<NewAreaRequest>,
) -> Result<(StatusCode, Json<AreaSummary>), ApiError> {
    let area = MonitoredArea::new(
        request.id,
        request.name,
        request.location,
        request.vegetation_type,
    );

    match state.registry.create_area(area).await {
        Ok(shared) => {
            let summary = shared.lock().await.summary();
            Ok((StatusCode::CREATED, Json(summary)))
        }
        Err(e) => {
            warn!(area_id = request.id, error = %e, "Failed to register area");
            Err(reject(&e))
        }
    }
}

/// GET /areas - List areas in registration order.
#[instrument(skip(state))]
pub async fn list_areas(State(state): State<AppState>) -> Json<Vec<AreaSummary>> {
    let mut summaries = Vec::new();
    for area in state.registry.list_areas().await {
        summaries.push(area.lock().await.summary());
    }

    info!(area_count = summaries.len(), "Areas listed");
    Json(summaries)
}

/// GET /areas/:id - Weather history, wildfire history and described alerts.
#[instrument(skip(state))]
pub async fn get_area(
    State(state): State<AppState>,
    PathParam(area_id): PathParam<u32>,
) -> Result<Json<AreaDetail>, ApiError> {
    let area = state.registry.find_area(area_id).await.map_err(|e| {
        warn!(area_id, error = %e, "Area lookup failed");
        reject(&e)
    })?;

    let detail = area.lock().await.detail();
    Ok(Json(detail))
}

/// POST /areas/:id/sensor - Collect simulated readings.
///
/// # Request Body
///
/// ```json
/// { "quantity": 5 }
/// ```
///
/// Quantity is optional and defaults to 1. Returns the collected samples, or
/// `422` when the quantity is above [`MAX_SENSOR_QUANTITY`].
#[instrument(skip(state))]
pub async fn post_sensor(
    State(state): State<AppState>,
    PathParam(area_id): PathParam<u32>,
    JsonBody(request): JsonBody<SensorRequest>,
) -> Result<Json<Vec<WeatherSample>>, ApiError> {
    let area = state.registry.find_area(area_id).await.map_err(|e| {
        warn!(area_id, error = %e, "Area lookup failed");
        reject(&e)
    })?;

    let mut area = area.lock().await;
    let mut sensor = state.sensor.lock().await;
    let collected = area
        .use_sensor(&mut *sensor, request.quantity)
        .map_err(|e| {
            warn!(area_id, error = %e, "Rejected sensor collection");
            reject(&e)
        })?;

    info!(
        area_id,
        quantity = collected.len(),
        "Sensor readings inserted"
    );
    Ok(Json(collected))
}

/// POST /areas/:id/weather - Record a manually entered reading.
///
/// # Request Body
///
/// ```json
/// { "temperature": 35.0, "humidity": 10.0, "wind_speed": 15.0 }
/// ```
///
/// The sample is dated today and gets the next sample id.
#[instrument(skip(state))]
pub async fn post_weather(
    State(state): State<AppState>,
    PathParam(area_id): PathParam<u32>,
    JsonBody(request): JsonBody<WeatherRequest>,
) -> Result<(StatusCode, Json<WeatherSample>), ApiError> {
    let area = state.registry.find_area(area_id).await.map_err(|e| {
        warn!(area_id, error = %e, "Area lookup failed");
        reject(&e)
    })?;

    let mut area = area.lock().await;
    match area.record_reading(
        request.temperature,
        request.humidity,
        request.wind_speed,
        Utc::now().date_naive(),
    ) {
        Ok(sample) => {
            info!(area_id, sample_id = sample.id(), "Weather data inserted");
            Ok((StatusCode::CREATED, Json(sample.clone())))
        }
        Err(e) => {
            warn!(area_id, error = %e, "Rejected weather reading");
            Err(reject(&e))
        }
    }
}

/// POST /areas/:id/wildfires - Report a wildfire.
///
/// # Request Body
///
/// ```json
/// { "date": "2024-08-20", "severity": 80 }
/// ```
///
/// Severity must be between 0 and 100.
#[instrument(skip(state))]
pub async fn post_wildfire(
    State(state): State<AppState>,
    PathParam(area_id): PathParam<u32>,
    JsonBody(request): JsonBody<WildfireRequest>,
) -> Result<(StatusCode, Json<WildfireEvent>), ApiError> {
    let area = state.registry.find_area(area_id).await.map_err(|e| {
        warn!(area_id, error = %e, "Area lookup failed");
        reject(&e)
    })?;

    let mut area = area.lock().await;
    let event = WildfireEvent::new(area.next_wildfire_id(), request.date, request.severity);

    match area.report_wildfire(event) {
        Ok(event) => Ok((StatusCode::CREATED, Json(*event))),
        Err(e) => {
            warn!(area_id, error = %e, "Rejected wildfire report");
            Err(reject(&e))
        }
    }
}

/// GET /areas/:id/risk - Current risk from the latest sample.
///
/// # Response
///
/// ```json
/// {
///     "area_id": 1,
///     "risk_level": 13.5,
///     "sample": { "id": 1, "temperature": 35.0, ... }
/// }
/// ```
///
/// Returns `409` when the area has no weather data.
#[instrument(skip(state))]
pub async fn get_risk(
    State(state): State<AppState>,
    PathParam(area_id): PathParam<u32>,
) -> Result<Json<RiskResponse>, ApiError> {
    let area = state.registry.find_area(area_id).await.map_err(|e| {
        warn!(area_id, error = %e, "Area lookup failed");
        reject(&e)
    })?;

    let area = area.lock().await;
    let Some(sample) = area.latest_weather_sample().cloned() else {
        let e = Error::NoDataAvailable { area_id };
        warn!(area_id, error = %e, "Failed to compute risk");
        return Err(reject(&e));
    };
    let risk = area.calculate_risk_from_sample(&sample).map_err(|e| {
        warn!(area_id, error = %e, "Failed to compute risk");
        reject(&e)
    })?;

    info!(area_id, risk_level = risk, "Risk queried");
    Ok(Json(RiskResponse {
        area_id,
        risk_level: risk,
        sample,
    }))
}

/// GET /areas/:id/alerts - Alert history, described.
#[instrument(skip(state))]
pub async fn get_area_alerts(
    State(state): State<AppState>,
    PathParam(area_id): PathParam<u32>,
) -> Result<Json<Vec<AlertSummary>>, ApiError> {
    let area = state.registry.find_area(area_id).await.map_err(|e| {
        warn!(area_id, error = %e, "Area lookup failed");
        reject(&e)
    })?;

    let alerts = area.lock().await.describe_alerts();
    Ok(Json(alerts))
}

// ============================================================================
// User handlers
// ============================================================================

/// POST /users - Register a user.
#[instrument(skip(state))]
pub async fn post_user(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<NewUserRequest>,
) -> (StatusCode, Json<UserResponse>) {
    let user = state
        .registry
        .register_user(request.name, request.email)
        .await;

    let response = user.lock().await.to_response();
    (StatusCode::CREATED, Json(response))
}

/// GET /users - List users in registration order.
#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Json<Vec<UserResponse>> {
    let mut users = Vec::new();
    for user in state.registry.list_users().await {
        users.push(user.lock().await.to_response());
    }

    Json(users)
}

/// GET /users/:id - Look up a user.
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    PathParam(user_id): PathParam<u32>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.registry.find_user(user_id).await.map_err(|e| {
        warn!(user_id, error = %e, "User lookup failed");
        reject(&e)
    })?;

    let response = user.lock().await.to_response();
    Ok(Json(response))
}

/// POST /users/:id/monitor - Monitor an area and check its risk.
///
/// # Request Body
///
/// ```json
/// { "area_id": 1 }
/// ```
///
/// The area is added to the user's monitored areas, then its current risk is
/// computed. When the risk is above the configured threshold an automatic
/// alert is generated and returned.
#[instrument(skip(state))]
pub async fn post_monitor(
    State(state): State<AppState>,
    PathParam(user_id): PathParam<u32>,
    JsonBody(request): JsonBody<MonitorRequest>,
) -> Result<Json<AssessmentResponse>, ApiError> {
    let area_id = request.area_id;

    let outcome = state
        .registry
        .monitor_area(user_id, area_id, state.alert_threshold)
        .await
        .map_err(|e| {
            warn!(user_id, area_id, error = %e, "Failed to monitor area");
            reject(&e)
        })?;

    let assessment = outcome.assessment;
    let alert = match &assessment.alert {
        Some(alert) => {
            let area = state.registry.find_area(area_id).await.map_err(|e| reject(&e))?;
            let name = area.lock().await.name().to_string();
            Some(alert.describe(&name))
        }
        None => None,
    };

    info!(
        user_id,
        area_id,
        risk_level = assessment.risk_level,
        alerted = alert.is_some(),
        "Area monitored"
    );

    Ok(Json(AssessmentResponse {
        area_id,
        newly_monitored: outcome.newly_monitored,
        risk_level: assessment.risk_level,
        sample_id: assessment.sample.id(),
        alert,
    }))
}

/// POST /users/:id/alerts - Raise a manual alert on a monitored area.
///
/// # Request Body
///
/// ```json
/// {
///     "area_id": 1,
///     "risk_level": 85.0,
///     "description": "Smoke column visible from the ridge"
/// }
/// ```
///
/// Returns `409` if the user does not monitor the area.
#[instrument(skip(state))]
pub async fn post_manual_alert(
    State(state): State<AppState>,
    PathParam(user_id): PathParam<u32>,
    JsonBody(request): JsonBody<ManualAlertRequest>,
) -> Result<(StatusCode, Json<AlertSummary>), ApiError> {
    let area_id = request.area_id;

    let alert = state
        .registry
        .raise_manual_alert(user_id, area_id, request.risk_level, &request.description)
        .await
        .map_err(|e| {
            warn!(user_id, area_id, error = %e, "Failed to raise manual alert");
            reject(&e)
        })?;

    let area = state.registry.find_area(area_id).await.map_err(|e| reject(&e))?;
    let name = area.lock().await.name().to_string();

    Ok((StatusCode::CREATED, Json(alert.describe(&name))))
}
