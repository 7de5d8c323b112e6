//! Geotargeting - geofence rings and region dwell tracking around a point of interest.
//!
//! # Overview
//!
//! A point of interest is surrounded by a "kissing ring" of satellite
//! geofences placed at a fixed distance and a list of bearings. The device's
//! platform location service monitors those regions and reports enter/exit
//! transitions and location updates. Each region the device is inside is
//! tracked with its entry time and evicted once it has been visited longer
//! than a dwell timeout.
//!
//! # Modules
//!
//! - [`projection`]: Planar destination projection (distance + bearing)
//! - [`ring`]: Kissing-ring and primary-region construction
//! - [`tracker`]: Region dwell state machine
//! - [`monitor`]: Runtime owner of the tracker and notification log
//! - [`model`]: Coordinates, region definitions, notifications, API bodies
//! - [`config`]: Environment configuration
//! - [`error`]: Error taxonomy
//! - [`api`]: HTTP API handlers

pub mod api;
pub mod config;
pub mod error;
pub mod model;
pub mod monitor;
pub mod projection;
pub mod ring;
pub mod tracker;
