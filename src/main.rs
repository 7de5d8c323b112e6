//! Geotargeting - geofence rings and region dwell tracking around a point of interest.
//!
//! Builds the geofence from configuration once at startup and serves the
//! callback surface for the platform location service.
//!
//! # API Endpoints
//!
//! - `GET /regions` - Region definitions to monitor
//! - `GET /regions/inside` - Regions currently inside
//! - `POST /regions/enter` - Report entry into a region
//! - `POST /regions/exit` - Report exit from a region
//! - `POST /location` - Report a location update
//! - `GET /location` - Last reported location
//! - `GET /notifications/recent` - Emitted notifications
//! - `GET /health` - Health check

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use geotargeting::api::{AppState, router};
use geotargeting::config::GeofenceConfig;
use geotargeting::monitor::Monitor;
use geotargeting::ring::build_geofence;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing with environment filter
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("geotargeting=info".parse()?))
        .init();

    // Load configuration from environment
    let config = GeofenceConfig::from_env()?;

    info!(
        port = config.port,
        origin = %config.ring.origin,
        spoke_distance_m = config.ring.spoke_distance_meters,
        bearings = ?config.ring.bearings,
        dwell_timeout_secs = config.dwell_timeout_secs,
        "Starting geotargeting server"
    );

    // Build the primary region and its kissing ring
    let geofence = build_geofence(&config.ring)?;
    for region in geofence.regions() {
        info!(
            identifier = %region.identifier(),
            center = %region.center(),
            radius_m = region.radius_meters(),
            "Region defined"
        );
    }

    // Create application state and router
    let monitor = Monitor::new(geofence.into_regions(), config.dwell_timeout())?;
    let app = router(AppState::new(monitor));

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;

    info!(%addr, "Geotargeting is listening");

    axum::serve(listener, app).await?;

    Ok(())
}
