//! Error types for geofence construction and tracking.
//!
//! Nothing in this crate is fatal to the process. Every failure is a local,
//! recoverable value returned to the caller. Unknown region identifiers on
//! enter/exit are deliberately *not* represented here: they are tolerated
//! as no-ops by the tracker.

use thiserror::Error;

/// Errors raised while projecting coordinates, building rings, registering
/// regions or loading configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeofenceError {
    /// The requested geometry cannot be represented by the planar approximation
    /// (origin too close to a pole, negative distance, non-positive radius).
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Latitude/longitude outside their valid degree ranges or not finite.
    #[error("Invalid coordinate: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    /// Two regions share the same identifier.
    #[error("Duplicate region identifier: {0}")]
    DuplicateIdentifier(String),

    /// A configuration value was present but could not be parsed.
    #[error("Invalid configuration value for {key}: {value:?}")]
    InvalidConfig { key: String, value: String },
}
