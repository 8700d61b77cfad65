//! Cached device inventory and its refresh policy.

use crate::api::models::DeviceRecord;
use std::time::Duration;
use tokio::time::Instant;

/// Time after which the cached inventory is considered stale.
pub const INVENTORY_TTL: Duration = Duration::from_secs(30 * 60);

/// A sensor device with the display labels used on its metrics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub id: String,
    pub segment: String,
    pub location: String,
}

impl Device {
    pub fn new(
        id: impl Into<String>,
        segment: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            segment: segment.into(),
            location: location.into(),
        }
    }
}

impl From<DeviceRecord> for Device {
    fn from(record: DeviceRecord) -> Self {
        Self {
            id: record.id,
            segment: record.segment.name,
            location: record.location.name,
        }
    }
}

/// Last known device list plus the time of the last refresh attempt.
///
/// The timestamp advances on every attempt, failed ones included, so a broken
/// inventory endpoint is retried at most once per TTL. That cooldown is the
/// only backoff the exporter applies. It also means a failing endpoint looks
/// the same as an unchanged inventory until the warning in the logs is seen.
#[derive(Debug, Clone)]
pub struct DeviceInventory {
    last_refresh: Option<Instant>,
    devices: Vec<Device>,
    ttl: Duration,
}

impl Default for DeviceInventory {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceInventory {
    /// Create an empty, stale inventory.
    pub fn new() -> Self {
        Self::with_ttl(INVENTORY_TTL)
    }

    /// Create an empty inventory with a custom staleness interval.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            last_refresh: None,
            devices: Vec::new(),
            ttl,
        }
    }

    /// Whether a refresh should be attempted at `now`.
    pub fn needs_refresh(&self, now: Instant) -> bool {
        match self.last_refresh {
            None => true,
            Some(at) => now.saturating_duration_since(at) > self.ttl,
        }
    }

    /// Replace the whole device list.
    pub fn replace(&mut self, devices: Vec<Device>) {
        self.devices = devices;
    }

    /// Start the cooldown from `at`, whatever the attempt's outcome.
    pub fn record_attempt(&mut self, at: Instant) {
        self.last_refresh = Some(at);
    }

    pub fn last_refresh(&self) -> Option<Instant> {
        self.last_refresh
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
