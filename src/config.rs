//! Configuration loaded from environment variables.
//!
//! Every value has a default, so an empty environment yields the reference
//! setup: a 1000 m primary region around (37.703026, -121.759735) with six
//! satellites 2000 m out and a 10 second dwell timeout.

use chrono::Duration;

use crate::error::GeofenceError;
use crate::model::Coordinate;
use crate::ring::RingConfig;

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 3000;

pub const DEFAULT_ORIGIN: Coordinate = Coordinate {
    latitude: 37.703026,
    longitude: -121.759735,
};

pub const DEFAULT_PRIMARY_ID: &str = "primary";
pub const DEFAULT_PRIMARY_RADIUS_METERS: f64 = 1000.0;
pub const DEFAULT_SPOKE_DISTANCE_METERS: f64 = 2000.0;
pub const DEFAULT_BASE_RADIUS_METERS: f64 = 1000.0;
pub const DEFAULT_BEARINGS: [f64; 6] = [60.0, 120.0, 180.0, 240.0, 300.0, 360.0];
pub const DEFAULT_DWELL_TIMEOUT_SECS: u64 = 10;

/// Full service configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct GeofenceConfig {
    pub port: u16,
    pub ring: RingConfig,
    pub dwell_timeout_secs: u64,
}

impl Default for GeofenceConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            ring: RingConfig {
                origin: DEFAULT_ORIGIN,
                primary_identifier: DEFAULT_PRIMARY_ID.to_string(),
                primary_radius_meters: DEFAULT_PRIMARY_RADIUS_METERS,
                spoke_distance_meters: DEFAULT_SPOKE_DISTANCE_METERS,
                base_radius_meters: DEFAULT_BASE_RADIUS_METERS,
                bearings: DEFAULT_BEARINGS.to_vec(),
            },
            dwell_timeout_secs: DEFAULT_DWELL_TIMEOUT_SECS,
        }
    }
}

impl GeofenceConfig {
    /// Load configuration from `GEOTARGETING_*` environment variables.
    pub fn from_env() -> Result<Self, GeofenceError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which returns the raw value for a
    /// variable name or `None` when unset.
    ///
    /// Unset variables fall back to defaults. Set but unparsable values are
    /// reported as `InvalidConfig`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, GeofenceError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = parse_or(&lookup, "GEOTARGETING_PORT", defaults.port)?;
        let latitude = parse_or(
            &lookup,
            "GEOTARGETING_ORIGIN_LAT",
            defaults.ring.origin.latitude,
        )?;
        let longitude = parse_or(
            &lookup,
            "GEOTARGETING_ORIGIN_LON",
            defaults.ring.origin.longitude,
        )?;
        let primary_identifier = lookup("GEOTARGETING_PRIMARY_ID")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.ring.primary_identifier);
        let primary_radius_meters = parse_or(
            &lookup,
            "GEOTARGETING_PRIMARY_RADIUS_M",
            defaults.ring.primary_radius_meters,
        )?;
        let spoke_distance_meters = parse_or(
            &lookup,
            "GEOTARGETING_SPOKE_DISTANCE_M",
            defaults.ring.spoke_distance_meters,
        )?;
        let base_radius_meters = parse_or(
            &lookup,
            "GEOTARGETING_BASE_RADIUS_M",
            defaults.ring.base_radius_meters,
        )?;
        let bearings = match lookup("GEOTARGETING_BEARINGS") {
            Some(raw) => parse_bearings(&raw)?,
            None => defaults.ring.bearings,
        };
        let dwell_timeout_secs = parse_or(
            &lookup,
            "GEOTARGETING_DWELL_TIMEOUT_SECS",
            defaults.dwell_timeout_secs,
        )?;

        Ok(Self {
            port,
            ring: RingConfig {
                origin: Coordinate::new(latitude, longitude),
                primary_identifier,
                primary_radius_meters,
                spoke_distance_meters,
                base_radius_meters,
                bearings,
            },
            dwell_timeout_secs,
        })
    }

    pub fn dwell_timeout(&self) -> Duration {
        let secs = i64::try_from(self.dwell_timeout_secs).unwrap_or(i64::MAX);
        Duration::seconds(secs.min(i64::MAX / 1000))
    }
}

/// Parse a comma-separated list of bearings in degrees, e.g. `"60, 120,180"`.
pub fn parse_bearings(raw: &str) -> Result<Vec<f64>, GeofenceError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<f64>()
                .ok()
                .filter(|b| b.is_finite())
                .ok_or_else(|| GeofenceError::InvalidConfig {
                    key: "GEOTARGETING_BEARINGS".to_string(),
                    value: raw.to_string(),
                })
        })
        .collect()
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, GeofenceError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| GeofenceError::InvalidConfig {
                key: key.to_string(),
                value: raw,
            }),
    }
}
