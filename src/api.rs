//! HTTP API handlers for geotargeting.
//!
//! The monitoring collaborator (the device's platform location service, or a
//! relay in front of it) reports region transitions and location updates over
//! HTTP; the presentation collaborator reads the resulting notifications back.
//!
//! - **GET /regions**: Region definitions to register with the platform monitor.
//! - **POST /regions/enter**, **POST /regions/exit**: Region transitions.
//! - **POST /location**: Location updates, which drive dwell-timeout eviction.
//! - **GET /location**: Last reported location and the dwell timeout.
//! - **GET /notifications/recent**: Emitted notifications, newest first.
//!
//! All timestamps are assigned server-side.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument, warn};

use crate::model::{
    Coordinate, ExitResponse, InsideRegion, LocationRequest, LocationResponse, LocationStatus,
    Notification, NotificationsQuery, NotificationsResponse, RegionDefinition,
    RegionEventRequest,
};
use crate::monitor::Monitor;

/// Maximum number of unregistered identifiers that may be inside at once.
///
/// The tracker itself accepts any identifier; this bounds what HTTP clients
/// can add before a location update evicts them.
pub const MAX_UNREGISTERED_INSIDE: usize = 64;

/// Application state shared across handlers.
///
/// Callbacks may arrive on several tasks at once, so the monitor sits behind a
/// single lock. Each handler holds it for one complete operation, which keeps
/// events strictly ordered.
#[derive(Clone)]
pub struct AppState {
    pub monitor: Arc<Mutex<Monitor>>,
}

impl AppState {
    pub fn new(monitor: Monitor) -> Self {
        Self {
            monitor: Arc::new(Mutex::new(monitor)),
        }
    }
}

/// Build the service router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/regions", get(get_regions))
        .route("/regions/inside", get(get_inside))
        .route("/regions/enter", post(post_enter))
        .route("/regions/exit", post(post_exit))
        .route("/location", get(get_location).post(post_location))
        .route("/notifications/recent", get(get_notifications))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /regions - Region definitions, primary first.
///
/// # Response
///
/// ```json
/// [
///     {
///         "identifier": "kissing60",
///         "center": { "latitude": 37.71869, "longitude": -121.74838 },
///         "radius_meters": 500.0
///     }
/// ]
/// ```
#[instrument(skip(state))]
pub async fn get_regions(State(state): State<AppState>) -> Json<Vec<RegionDefinition>> {
    let monitor = state.monitor.lock().await;
    Json(monitor.regions().to_vec())
}

/// GET /regions/inside - Regions the device is currently inside.
#[instrument(skip(state))]
pub async fn get_inside(State(state): State<AppState>) -> Json<Vec<InsideRegion>> {
    let monitor = state.monitor.lock().await;
    Json(monitor.inside())
}

/// POST /regions/enter - Record entry into a region.
///
/// # Request Body
///
/// ```json
/// { "identifier": "kissing60" }
/// ```
///
/// # Response
///
/// `200 OK` with the `entered` notification. Identifiers outside the geofence
/// are accepted until [`MAX_UNREGISTERED_INSIDE`] of them are inside, after
/// which new ones get `422 Unprocessable Entity`.
#[instrument(skip(state, request), fields(identifier = %request.identifier))]
pub async fn post_enter(
    State(state): State<AppState>,
    Json(request): Json<RegionEventRequest>,
) -> Result<Json<Notification>, StatusCode> {
    let mut monitor = state.monitor.lock().await;

    if !monitor.is_registered(&request.identifier) {
        let unregistered = monitor.unregistered_inside();
        if unregistered >= MAX_UNREGISTERED_INSIDE && !monitor.is_inside(&request.identifier) {
            warn!(
                identifier = %request.identifier,
                unregistered,
                "Rejected enter for unregistered region, limit reached"
            );
            return Err(StatusCode::UNPROCESSABLE_ENTITY);
        }
        warn!(identifier = %request.identifier, "Enter for unregistered region");
    }

    Ok(Json(monitor.enter(&request.identifier, Utc::now())))
}

/// POST /regions/exit - Record exit from a region.
///
/// Exiting a region that is not being tracked (never entered, or already
/// dwell-expired) is not an error; the response carries a `null`
/// notification.
#[instrument(skip(state, request), fields(identifier = %request.identifier))]
pub async fn post_exit(
    State(state): State<AppState>,
    Json(request): Json<RegionEventRequest>,
) -> Json<ExitResponse> {
    let mut monitor = state.monitor.lock().await;
    let notification = monitor.exit(&request.identifier, Utc::now());
    Json(ExitResponse { notification })
}

/// POST /location - Report the device location.
///
/// # Request Body
///
/// ```json
/// { "latitude": 37.703026, "longitude": -121.759735 }
/// ```
///
/// # Response
///
/// `200 OK` with the regions evicted by this update, or
/// `422 Unprocessable Entity` if the coordinate is out of range.
#[instrument(skip(state))]
pub async fn post_location(
    State(state): State<AppState>,
    Json(request): Json<LocationRequest>,
) -> Result<Json<LocationResponse>, StatusCode> {
    let coordinate = Coordinate::new(request.latitude, request.longitude);
    let mut monitor = state.monitor.lock().await;

    match monitor.location_update(coordinate, Utc::now()) {
        Ok(expired) => {
            if !expired.is_empty() {
                info!(expired = expired.len(), "Dwell timeout evicted regions");
            }
            Ok(Json(LocationResponse { expired }))
        }
        Err(e) => {
            warn!(error = %e, "Rejected location update");
            Err(StatusCode::UNPROCESSABLE_ENTITY)
        }
    }
}

/// GET /location - Last reported location and the configured dwell timeout.
///
/// # Response
///
/// ```json
/// {
///     "location": { "latitude": 37.703026, "longitude": -121.759735 },
///     "updated_at": "2024-05-07T12:00:00Z",
///     "dwell_timeout_secs": 10
/// }
/// ```
#[instrument(skip(state))]
pub async fn get_location(State(state): State<AppState>) -> Json<LocationStatus> {
    let monitor = state.monitor.lock().await;
    let last = monitor.last_location();

    Json(LocationStatus {
        location: last.map(|(coordinate, _)| coordinate),
        updated_at: last.map(|(_, at)| at),
        dwell_timeout_secs: monitor.dwell_timeout().num_seconds(),
    })
}

/// GET /notifications/recent - Emitted notifications, newest first.
///
/// # Query Parameters
///
/// - `limit` (optional): Maximum number of notifications (default: 50)
#[instrument(skip(state))]
pub async fn get_notifications(
    State(state): State<AppState>,
    Query(query): Query<NotificationsQuery>,
) -> Json<NotificationsResponse> {
    let monitor = state.monitor.lock().await;
    Json(NotificationsResponse {
        notifications: monitor.recent_notifications(query.limit),
        limit: query.limit,
    })
}

/// GET /health - Simple health check endpoint.
pub async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}
