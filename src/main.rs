//! Ignira - Wildfire risk monitoring for geographic areas.
//!
//! # API Endpoints
//!
//! - `POST /areas`, `GET /areas`, `GET /areas/:id` - Register, list and view areas
//! - `POST /areas/:id/sensor` - Collect simulated weather readings
//! - `POST /areas/:id/weather` - Enter a weather reading manually
//! - `POST /areas/:id/wildfires` - Report a wildfire
//! - `GET /areas/:id/risk` - Current fire risk
//! - `GET /areas/:id/alerts` - Alert history
//! - `POST /users`, `GET /users`, `GET /users/:id` - Register and look up users
//! - `POST /users/:id/monitor` - Monitor an area and check its risk
//! - `POST /users/:id/alerts` - Raise a manual alert
//! - `GET /health` - Health check

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use ignira::api::{AppState, router};
use ignira::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("ignira=info".parse()?))
        .init();

    let config = Config::from_env();

    info!(
        port = config.port,
        alert_threshold = config.alert_threshold,
        seeded_sensor = config.sensor_seed.is_some(),
        "Starting Ignira server"
    );

    let app = router(AppState::new(&config));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;

    info!(%addr, "Ignira is listening");

    axum::serve(listener, app).await?;

    Ok(())
}
