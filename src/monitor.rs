//! Runtime monitor driven by the location/region monitoring collaborator.
//!
//! The `Monitor` owns a [`DwellTracker`] seeded with the geofence regions, the
//! configured dwell timeout, the last reported location and a bounded log of
//! every notification it has emitted. It is an explicitly owned value: the
//! HTTP layer holds it behind a single lock, tests hold it directly.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use crate::error::GeofenceError;
use crate::model::{Coordinate, InsideRegion, Notification, RegionDefinition};
use crate::tracker::DwellTracker;

/// Maximum number of notifications retained for the presentation collaborator.
pub const NOTIFICATION_LOG_CAPACITY: usize = 256;

#[derive(Debug)]
pub struct Monitor {
    tracker: DwellTracker,
    regions: Vec<RegionDefinition>,
    dwell_timeout: Duration,
    last_location: Option<(Coordinate, DateTime<Utc>)>,
    log: VecDeque<Notification>,
}

impl Monitor {
    /// Create a monitor watching `regions`, evicting entries after `dwell_timeout`.
    ///
    /// # Errors
    ///
    /// `DuplicateIdentifier` if two regions share an identifier.
    pub fn new(
        regions: Vec<RegionDefinition>,
        dwell_timeout: Duration,
    ) -> Result<Self, GeofenceError> {
        let mut tracker = DwellTracker::new();
        for region in &regions {
            tracker.register(region)?;
        }

        info!(
            region_count = regions.len(),
            dwell_timeout_secs = dwell_timeout.num_seconds(),
            "Monitor initialized"
        );

        Ok(Self {
            tracker,
            regions,
            dwell_timeout,
            last_location: None,
            log: VecDeque::with_capacity(NOTIFICATION_LOG_CAPACITY),
        })
    }

    /// Handle an enter-region callback.
    pub fn enter(&mut self, identifier: &str, now: DateTime<Utc>) -> Notification {
        let notification = self.tracker.on_enter(identifier, now);
        self.record(&notification);
        notification
    }

    /// Handle an exit-region callback. Unknown or already-evicted regions are
    /// ignored.
    pub fn exit(&mut self, identifier: &str, now: DateTime<Utc>) -> Option<Notification> {
        match self.tracker.on_exit(identifier, now) {
            Some(notification) => {
                self.record(&notification);
                Some(notification)
            }
            None => {
                debug!(identifier, "Exit for region not being tracked, ignored");
                None
            }
        }
    }

    /// Handle a location update: remember the position and evict regions whose
    /// dwell timeout has elapsed.
    pub fn location_update(
        &mut self,
        coordinate: Coordinate,
        now: DateTime<Utc>,
    ) -> Result<Vec<Notification>, GeofenceError> {
        coordinate.validate()?;
        self.last_location = Some((coordinate, now));

        let expired = self.tracker.on_location_tick(now, self.dwell_timeout);
        for notification in &expired {
            self.record(notification);
        }

        debug!(
            location = %coordinate,
            expired = expired.len(),
            inside = self.tracker.inside().len(),
            "Location update processed"
        );

        Ok(expired)
    }

    /// Up to `limit` most recent notifications, newest first.
    pub fn recent_notifications(&self, limit: usize) -> Vec<Notification> {
        self.log.iter().rev().take(limit).cloned().collect()
    }

    /// Regions in registration order (primary first for a built geofence).
    pub fn regions(&self) -> &[RegionDefinition] {
        &self.regions
    }

    pub fn inside(&self) -> Vec<InsideRegion> {
        self.tracker.inside()
    }

    pub fn is_registered(&self, identifier: &str) -> bool {
        self.tracker.is_registered(identifier)
    }

    pub fn is_inside(&self, identifier: &str) -> bool {
        self.tracker.is_inside(identifier)
    }

    /// Inside entries for identifiers that are not part of the geofence.
    pub fn unregistered_inside(&self) -> usize {
        self.tracker.unregistered_inside()
    }

    pub fn last_location(&self) -> Option<(Coordinate, DateTime<Utc>)> {
        self.last_location
    }

    pub fn dwell_timeout(&self) -> Duration {
        self.dwell_timeout
    }

    fn record(&mut self, notification: &Notification) {
        info!(
            kind = ?notification.kind,
            identifier = %notification.identifier,
            "{}",
            notification
        );

        if self.log.len() == NOTIFICATION_LOG_CAPACITY {
            self.log.pop_front();
        }
        self.log.push_back(notification.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NotificationKind;
    use crate::ring::build_ring;

    fn origin() -> Coordinate {
        Coordinate::new(37.703026, -121.759735)
    }

    fn setup_monitor() -> Monitor {
        let ring = build_ring(origin(), 2000.0, &[60.0, 180.0, 300.0], 1000.0).unwrap();
        Monitor::new(ring, Duration::seconds(10)).unwrap()
    }

    #[test]
    fn test_new_rejects_duplicate_regions() {
        let region = RegionDefinition::new("dup", origin(), 100.0).unwrap();
        let result = Monitor::new(vec![region.clone(), region], Duration::seconds(10));

        assert!(matches!(
            result,
            Err(GeofenceError::DuplicateIdentifier(id)) if id == "dup"
        ));
    }

    #[test]
    fn test_full_visit_cycle() {
        let mut monitor = setup_monitor();
        let t0 = Utc::now();

        monitor.enter("kissing60", t0);
        monitor.enter("kissing180", t0 + Duration::seconds(5));

        let expired = monitor
            .location_update(origin(), t0 + Duration::seconds(11))
            .unwrap();
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].identifier, "kissing60");

        let exited = monitor.exit("kissing180", t0 + Duration::seconds(12));
        assert!(exited.is_some());

        // Dwell-expired region exiting later produces nothing.
        assert!(monitor.exit("kissing60", t0 + Duration::seconds(13)).is_none());

        let kinds: Vec<NotificationKind> = monitor
            .recent_notifications(10)
            .iter()
            .map(|n| n.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                NotificationKind::Exited,
                NotificationKind::DwellExpired,
                NotificationKind::Entered,
                NotificationKind::Entered,
            ]
        );
        assert!(monitor.inside().is_empty());
        assert_eq!(monitor.regions().len(), 3);
    }

    #[test]
    fn test_location_update_rejects_invalid_coordinate() {
        let mut monitor = setup_monitor();

        let result = monitor.location_update(Coordinate::new(123.0, 0.0), Utc::now());
        assert!(result.is_err());
        assert!(monitor.last_location().is_none());
    }

    #[test]
    fn test_location_update_records_last_location() {
        let mut monitor = setup_monitor();
        let now = Utc::now();

        monitor.location_update(origin(), now).unwrap();
        assert_eq!(monitor.last_location(), Some((origin(), now)));
        assert_eq!(monitor.dwell_timeout(), Duration::seconds(10));
    }

    #[test]
    fn test_notification_log_is_bounded() {
        let mut monitor = setup_monitor();
        let now = Utc::now();

        for i in 0..(NOTIFICATION_LOG_CAPACITY + 10) {
            monitor.enter(&format!("region-{i}"), now);
        }

        let all = monitor.recent_notifications(usize::MAX);
        assert_eq!(all.len(), NOTIFICATION_LOG_CAPACITY);
        assert_eq!(
            all[0].identifier,
            format!("region-{}", NOTIFICATION_LOG_CAPACITY + 9)
        );
        assert_eq!(monitor.recent_notifications(3).len(), 3);
    }
}
