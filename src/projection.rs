//! Planar destination projection.
//!
//! Computes the coordinate reached by moving a distance along a bearing from
//! an origin, using a flat local frame scaled by the meters-per-degree of
//! latitude and longitude at the origin. This is a small-angle approximation,
//! not a great-circle solution: it is only meaningful for short distances and
//! away from the poles, and no iterative correction is applied.
//!
//! Bearings are measured counter-clockwise from the positive x axis of the
//! local frame, so 0° points east and 90° points north. This differs from a
//! compass bearing (0° = north, clockwise).

use crate::error::GeofenceError;
use crate::model::Coordinate;

/// Meters per degree of longitude at the equator.
pub const METERS_PER_DEGREE_LONGITUDE: f64 = 111_320.0;

/// Meters per degree of latitude.
pub const METERS_PER_DEGREE_LATITUDE: f64 = 110_540.0;

/// Origins closer than this to either pole are rejected, since the longitude
/// scale `cos(latitude)` collapses to zero there.
pub const POLE_EPSILON_DEGREES: f64 = 0.01;

/// Project `distance_meters` along `bearing_degrees` from `origin`.
///
/// The resulting longitude is wrapped into [-180, 180], so destinations across
/// the antimeridian stay valid coordinates.
///
/// # Errors
///
/// - `InvalidCoordinate` if the origin is out of range or not finite
/// - `InvalidGeometry` if the origin is within [`POLE_EPSILON_DEGREES`] of a
///   pole, the distance is negative, the bearing/distance is not finite, or
///   the destination would lie beyond a pole
pub fn project(
    origin: Coordinate,
    distance_meters: f64,
    bearing_degrees: f64,
) -> Result<Coordinate, GeofenceError> {
    validate_origin(origin)?;
    validate_distance(distance_meters)?;

    if !bearing_degrees.is_finite() {
        return Err(GeofenceError::InvalidGeometry(format!(
            "bearing must be finite, got {bearing_degrees}"
        )));
    }

    let bearing = bearing_degrees.rem_euclid(360.0).to_radians();

    let dx = distance_meters * bearing.cos();
    let dy = distance_meters * bearing.sin();

    let delta_longitude = dx / (METERS_PER_DEGREE_LONGITUDE * origin.latitude.to_radians().cos());
    let delta_latitude = dy / METERS_PER_DEGREE_LATITUDE;

    let latitude = origin.latitude + delta_latitude;
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(GeofenceError::InvalidGeometry(format!(
            "projecting {distance_meters} m from {origin} passes a pole (latitude {latitude})"
        )));
    }

    Ok(Coordinate::new(
        latitude,
        wrap_longitude(origin.longitude + delta_longitude),
    ))
}

/// Check that `origin` is a valid coordinate far enough from the poles for
/// the planar approximation.
pub fn validate_origin(origin: Coordinate) -> Result<(), GeofenceError> {
    origin.validate()?;

    if 90.0 - origin.latitude.abs() < POLE_EPSILON_DEGREES {
        return Err(GeofenceError::InvalidGeometry(format!(
            "origin latitude {} is too close to a pole for planar projection",
            origin.latitude
        )));
    }
    Ok(())
}

/// Check that a projection distance is finite and non-negative.
pub fn validate_distance(distance_meters: f64) -> Result<(), GeofenceError> {
    if !distance_meters.is_finite() || distance_meters < 0.0 {
        return Err(GeofenceError::InvalidGeometry(format!(
            "distance must be a non-negative number of meters, got {distance_meters}"
        )));
    }
    Ok(())
}

/// Wrap a longitude into [-180, 180]. In-range values are returned unchanged.
fn wrap_longitude(longitude: f64) -> f64 {
    if (-180.0..=180.0).contains(&longitude) {
        longitude
    } else {
        (longitude + 180.0).rem_euclid(360.0) - 180.0
    }
}
