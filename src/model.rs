//! Data models for geotargeting.
//!
//! Core geometry types (`Coordinate`, `RegionDefinition`), the notifications
//! emitted on region transitions, and the request/response bodies used by the
//! HTTP adapter.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GeofenceError;

/// A geographic position in decimal degrees.
///
/// Ranges are not enforced on construction. Use [`Coordinate::validate`]
/// before feeding untrusted input to the projector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees, -90 to 90.
    pub latitude: f64,

    /// Longitude in degrees, -180 to 180.
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check that both components are finite and inside their degree ranges.
    pub fn validate(&self) -> Result<(), GeofenceError> {
        let lat_ok = self.latitude.is_finite() && (-90.0..=90.0).contains(&self.latitude);
        let lon_ok = self.longitude.is_finite() && (-180.0..=180.0).contains(&self.longitude);

        if lat_ok && lon_ok {
            Ok(())
        } else {
            Err(GeofenceError::InvalidCoordinate {
                latitude: self.latitude,
                longitude: self.longitude,
            })
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// A circular region handed to the monitoring collaborator.
///
/// Immutable once created. The identifier is the join key used by the
/// dwell tracker, so it must be unique among registered regions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionDefinition {
    identifier: String,
    center: Coordinate,
    radius_meters: f64,
}

impl RegionDefinition {
    /// Create a region, rejecting empty identifiers and non-positive radii.
    pub fn new(
        identifier: impl Into<String>,
        center: Coordinate,
        radius_meters: f64,
    ) -> Result<Self, GeofenceError> {
        let identifier = identifier.into();

        if identifier.is_empty() {
            return Err(GeofenceError::InvalidGeometry(
                "region identifier must not be empty".to_string(),
            ));
        }
        if !radius_meters.is_finite() || radius_meters <= 0.0 {
            return Err(GeofenceError::InvalidGeometry(format!(
                "region radius must be positive, got {radius_meters}"
            )));
        }

        Ok(Self {
            identifier,
            center,
            radius_meters,
        })
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn center(&self) -> Coordinate {
        self.center
    }

    pub fn radius_meters(&self) -> f64 {
        self.radius_meters
    }
}

/// The transition a notification reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// The device entered the region.
    Entered,

    /// The device left the region while it was being tracked.
    Exited,

    /// The device stayed inside longer than the dwell timeout.
    DwellExpired,
}

/// A single event for the presentation collaborator.
///
/// Exactly one notification is produced per state transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,

    /// Identifier of the region the transition applies to.
    pub identifier: String,

    /// Server-side time of the transition.
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    pub fn new(kind: NotificationKind, identifier: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            kind,
            identifier: identifier.to_string(),
            timestamp,
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            NotificationKind::Entered => write!(f, "entered region {}", self.identifier),
            NotificationKind::Exited => write!(f, "exited region {}", self.identifier),
            NotificationKind::DwellExpired => write!(f, "dwell-expired {}", self.identifier),
        }
    }
}

/// A region the device is currently inside, with its entry time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsideRegion {
    pub identifier: String,
    pub entered_at: DateTime<Utc>,
}

/// Request body for POST /regions/enter and POST /regions/exit.
#[derive(Debug, Clone, Deserialize)]
pub struct RegionEventRequest {
    /// Identifier of the region reported by the monitoring collaborator.
    pub identifier: String,
}

/// Response for POST /regions/exit.
///
/// `notification` is `null` when the region was not being tracked.
#[derive(Debug, Clone, Serialize)]
pub struct ExitResponse {
    pub notification: Option<Notification>,
}

/// Request body for POST /location.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationRequest {
    pub latitude: f64,
    pub longitude: f64,
}

/// Response for POST /location.
#[derive(Debug, Clone, Serialize)]
pub struct LocationResponse {
    /// Regions evicted by this update because their dwell timeout elapsed.
    pub expired: Vec<Notification>,
}

/// Response for GET /location.
#[derive(Debug, Clone, Serialize)]
pub struct LocationStatus {
    /// Last reported location, `null` before the first update.
    pub location: Option<Coordinate>,

    /// Server time of the last update.
    pub updated_at: Option<DateTime<Utc>>,

    /// Dwell timeout applied on each update.
    pub dwell_timeout_secs: i64,
}

/// Query parameters for GET /notifications/recent.
#[derive(Debug, Deserialize)]
pub struct NotificationsQuery {
    /// Maximum number of notifications to return (default: 50).
    #[serde(default = "default_notification_limit")]
    pub limit: usize,
}

fn default_notification_limit() -> usize {
    50
}

/// Response for GET /notifications/recent.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationsResponse {
    /// Notifications, newest first.
    pub notifications: Vec<Notification>,

    /// The limit that was applied.
    pub limit: usize,
}
