//! Kissing-ring construction.
//!
//! A kissing ring is a set of satellite regions placed at a fixed spoke
//! distance and a list of bearings around a point of interest. Building the
//! ring is pure: it returns region definitions and leaves registration with
//! a monitor to the caller.

use std::collections::HashSet;

use crate::error::GeofenceError;
use crate::model::{Coordinate, RegionDefinition};
use crate::projection::{project, validate_distance, validate_origin};

/// Prefix for satellite identifiers, followed by the bearing in degrees.
pub const SATELLITE_ID_PREFIX: &str = "kissing";

/// Parameters for a complete geofence: the primary region plus its ring.
#[derive(Debug, Clone, PartialEq)]
pub struct RingConfig {
    /// The point of interest.
    pub origin: Coordinate,

    /// Identifier of the region centered on the origin.
    pub primary_identifier: String,

    /// Radius of the region centered on the origin.
    pub primary_radius_meters: f64,

    /// Distance from the origin to each satellite center.
    pub spoke_distance_meters: f64,

    /// Satellite radius is half of this value.
    pub base_radius_meters: f64,

    /// Satellite bearings in degrees, in output order.
    pub bearings: Vec<f64>,
}

/// The primary region and its satellites.
#[derive(Debug, Clone, PartialEq)]
pub struct Geofence {
    pub primary: RegionDefinition,
    pub satellites: Vec<RegionDefinition>,
}

impl Geofence {
    /// All regions, primary first, then satellites in bearing order.
    pub fn regions(&self) -> impl Iterator<Item = &RegionDefinition> {
        std::iter::once(&self.primary).chain(self.satellites.iter())
    }

    /// Consume the geofence into an ordered list of regions.
    pub fn into_regions(self) -> Vec<RegionDefinition> {
        let mut regions = Vec::with_capacity(self.satellites.len() + 1);
        regions.push(self.primary);
        regions.extend(self.satellites);
        regions
    }
}

/// Identifier for the satellite at `bearing_degrees`, e.g. `kissing60`.
pub fn satellite_identifier(bearing_degrees: f64) -> String {
    format!("{SATELLITE_ID_PREFIX}{bearing_degrees}")
}

/// Build one satellite region per bearing, preserving input order.
///
/// Each satellite is centered `spoke_distance_meters` from `origin` along its
/// bearing and has a radius of `base_radius_meters / 2`.
///
/// # Errors
///
/// - Any projection error for the origin, distance or bearings, raised even
///   when `bearings` is empty
/// - `InvalidGeometry` for a non-positive base radius
/// - `DuplicateIdentifier` if two bearings format to the same identifier
pub fn build_ring(
    origin: Coordinate,
    spoke_distance_meters: f64,
    bearings: &[f64],
    base_radius_meters: f64,
) -> Result<Vec<RegionDefinition>, GeofenceError> {
    validate_origin(origin)?;
    validate_distance(spoke_distance_meters)?;
    if !base_radius_meters.is_finite() || base_radius_meters <= 0.0 {
        return Err(GeofenceError::InvalidGeometry(format!(
            "base radius must be positive, got {base_radius_meters}"
        )));
    }

    let radius = base_radius_meters / 2.0;
    let mut seen = HashSet::with_capacity(bearings.len());
    let mut ring = Vec::with_capacity(bearings.len());

    for &bearing in bearings {
        let identifier = satellite_identifier(bearing);
        if !seen.insert(identifier.clone()) {
            return Err(GeofenceError::DuplicateIdentifier(identifier));
        }

        let center = project(origin, spoke_distance_meters, bearing)?;
        ring.push(RegionDefinition::new(identifier, center, radius)?);
    }

    Ok(ring)
}

/// Build the primary region at the origin and its kissing ring.
pub fn build_geofence(config: &RingConfig) -> Result<Geofence, GeofenceError> {
    config.origin.validate()?;

    let primary = RegionDefinition::new(
        config.primary_identifier.clone(),
        config.origin,
        config.primary_radius_meters,
    )?;

    let satellites = build_ring(
        config.origin,
        config.spoke_distance_meters,
        &config.bearings,
        config.base_radius_meters,
    )?;

    if satellites
        .iter()
        .any(|s| s.identifier() == primary.identifier())
    {
        return Err(GeofenceError::DuplicateIdentifier(
            primary.identifier().to_string(),
        ));
    }

    Ok(Geofence {
        primary,
        satellites,
    })
}
