//! Region dwell state machine.
//!
//! Each region identifier is either *unmonitored* (no entry) or *inside*
//! (entry timestamp recorded). Enter events record the time, exit events and
//! dwell-timeout eviction remove it. Eviction clears local bookkeeping only;
//! the region remains registered and the external monitor keeps watching it.
//!
//! The tracker is synchronous and mutated through `&mut self` only. Callers
//! that deliver events from several tasks must serialize access (see
//! [`crate::api::AppState`]).

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use crate::error::GeofenceError;
use crate::model::{InsideRegion, Notification, NotificationKind, RegionDefinition};

/// Tracks which regions the device is inside and since when.
#[derive(Debug, Default)]
pub struct DwellTracker {
    registered: HashSet<String>,
    entries: HashMap<String, DateTime<Utc>>,
}

impl DwellTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a region definition's identifier.
    ///
    /// Registration is only used for identifier bookkeeping; enter events for
    /// unregistered identifiers are still tracked.
    ///
    /// # Errors
    ///
    /// `DuplicateIdentifier` if a region with the same identifier is already
    /// registered. The existing registration is left untouched.
    pub fn register(&mut self, region: &RegionDefinition) -> Result<(), GeofenceError> {
        if !self.registered.insert(region.identifier().to_string()) {
            warn!(identifier = %region.identifier(), "Rejected duplicate region registration");
            return Err(GeofenceError::DuplicateIdentifier(
                region.identifier().to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_registered(&self, identifier: &str) -> bool {
        self.registered.contains(identifier)
    }

    /// Record entry into a region.
    ///
    /// Re-entering a region that is already inside overwrites the timestamp
    /// with `now`.
    pub fn on_enter(&mut self, identifier: &str, now: DateTime<Utc>) -> Notification {
        if !self.is_registered(identifier) {
            debug!(identifier, "Enter event for unregistered region");
        }

        self.entries.insert(identifier.to_string(), now);
        Notification::new(NotificationKind::Entered, identifier, now)
    }

    /// Record exit from a region.
    ///
    /// Returns `None` without error if the region was not inside.
    pub fn on_exit(&mut self, identifier: &str, now: DateTime<Utc>) -> Option<Notification> {
        self.entries
            .remove(identifier)
            .map(|_| Notification::new(NotificationKind::Exited, identifier, now))
    }

    /// Evict every region whose dwell exceeded `dwell_timeout`.
    ///
    /// A region is evicted when `now - entered_at > dwell_timeout`. Exactly one
    /// `DwellExpired` notification is returned per evicted region, sorted by
    /// identifier.
    pub fn on_location_tick(
        &mut self,
        now: DateTime<Utc>,
        dwell_timeout: Duration,
    ) -> Vec<Notification> {
        let mut expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entered_at)| now - **entered_at > dwell_timeout)
            .map(|(identifier, _)| identifier.clone())
            .collect();
        expired.sort();

        for identifier in &expired {
            self.entries.remove(identifier);
        }

        expired
            .iter()
            .map(|identifier| Notification::new(NotificationKind::DwellExpired, identifier, now))
            .collect()
    }

    pub fn is_inside(&self, identifier: &str) -> bool {
        self.entries.contains_key(identifier)
    }

    pub fn entered_at(&self, identifier: &str) -> Option<DateTime<Utc>> {
        self.entries.get(identifier).copied()
    }

    /// Number of inside entries whose identifier was never registered.
    pub fn unregistered_inside(&self) -> usize {
        self.entries
            .keys()
            .filter(|identifier| !self.registered.contains(identifier.as_str()))
            .count()
    }

    /// Regions currently inside, sorted by identifier.
    pub fn inside(&self) -> Vec<InsideRegion> {
        let mut inside: Vec<InsideRegion> = self
            .entries
            .iter()
            .map(|(identifier, entered_at)| InsideRegion {
                identifier: identifier.clone(),
                entered_at: *entered_at,
            })
            .collect();
        inside.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        inside
    }
}
