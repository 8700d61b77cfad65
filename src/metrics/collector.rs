//! Scrape orchestration against the Airthings cloud.

use crate::api::{AccessToken, AirthingsApi, TokenSource};
use crate::error::Result;
use crate::metrics::{
    data::*,
    inventory::{Device, DeviceInventory},
    registry::{self, MetricDescriptor},
};
use futures_util::stream::{self, StreamExt};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Collects Airthings readings on demand.
///
/// Every call to [`AirthingsCollector::collect`] holds a single lock for its
/// whole duration, so concurrent scrapes run one after another and the
/// inventory is never read while it is being replaced.
pub struct AirthingsCollector<A, T> {
    api: A,
    tokens: T,
    inventory: Mutex<DeviceInventory>,
    fetch_concurrency: usize,
}

impl<A, T> AirthingsCollector<A, T>
where
    A: AirthingsApi,
    T: TokenSource,
{
    /// Create a collector with an empty inventory and sequential device fetches.
    pub fn new(api: A, tokens: T) -> Self {
        Self::with_inventory(api, tokens, DeviceInventory::new())
    }

    /// Create a collector around a prepared inventory.
    pub fn with_inventory(api: A, tokens: T, inventory: DeviceInventory) -> Self {
        Self {
            api,
            tokens,
            inventory: Mutex::new(inventory),
            fetch_concurrency: 1,
        }
    }

    /// Allow up to `concurrency` sample requests in flight within one scrape.
    pub fn with_fetch_concurrency(mut self, concurrency: usize) -> Self {
        self.fetch_concurrency = concurrency.max(1);
        self
    }

    /// Every metric this collector can ever emit.
    pub fn describe(&self) -> &'static [MetricDescriptor] {
        registry::descriptors()
    }

    /// Copy of the cached inventory, taken under the scrape lock.
    pub async fn inventory_snapshot(&self) -> DeviceInventory {
        self.inventory.lock().await.clone()
    }

    /// Run one scrape.
    ///
    /// Only a failure to obtain an access token is returned as an error, in
    /// which case nothing is emitted. Inventory and per-device failures are
    /// logged and skipped.
    pub async fn collect(&self) -> Result<Vec<MetricRecord>> {
        let mut inventory = self.inventory.lock().await;

        let token = match self.tokens.token().await {
            Ok(token) => token,
            Err(err) => {
                error!(
                    operation = "token",
                    error = %err,
                    "Failed to get access token, will try again later"
                );
                return Err(err);
            }
        };

        self.discover(&mut inventory, &token).await;
        Ok(self.retrieve_metrics(inventory.devices(), &token).await)
    }

    async fn discover(&self, inventory: &mut DeviceInventory, token: &AccessToken) {
        let now = Instant::now();
        if !inventory.needs_refresh(now) {
            return;
        }

        match self.api.fetch_inventory(token).await {
            Ok(records) => {
                let devices: Vec<Device> = records.into_iter().map(Device::from).collect();
                for device in &devices {
                    info!(
                        device = %device.id,
                        segment = %device.segment,
                        location = %device.location,
                        "Updating device"
                    );
                }
                inventory.replace(devices);
                debug!(
                    devices = inventory.len(),
                    ttl = ?inventory.ttl(),
                    "Device inventory refreshed"
                );
            }
            Err(err) => {
                warn!(
                    operation = "fetch_inventory",
                    error = %err,
                    cached_devices = inventory.len(),
                    "Failed to get devices, will try again later"
                );
            }
        }

        inventory.record_attempt(now);
    }

    async fn retrieve_metrics(&self, devices: &[Device], token: &AccessToken) -> Vec<MetricRecord> {
        let fetches: Vec<_> = devices
            .iter()
            .map(|device| self.device_metrics(device, token))
            .collect();
        let per_device: Vec<Vec<MetricRecord>> = stream::iter(fetches)
            .buffered(self.fetch_concurrency)
            .collect()
            .await;

        per_device.into_iter().flatten().collect()
    }

    async fn device_metrics(&self, device: &Device, token: &AccessToken) -> Vec<MetricRecord> {
        let data = match self.api.fetch_latest_samples(token, &device.id).await {
            Ok(data) => data,
            Err(err) => {
                warn!(
                    operation = "fetch_latest_samples",
                    device = %device.id,
                    error = %err,
                    "Failed to get metrics for device"
                );
                return Vec::new();
            }
        };
        debug!(device = %device.id, keys = data.len(), "Airthings samples received");

        let labels = DeviceLabels::from(device);
        registry::decode_readings(&data)
            .into_iter()
            .filter_map(|reading| {
                let descriptor = registry::descriptor_for(reading.kind)?;
                Some(MetricRecord {
                    descriptor,
                    value: reading.value,
                    labels: labels.clone(),
                })
            })
            .collect()
    }
}

impl<A, T> std::fmt::Debug for AirthingsCollector<A, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AirthingsCollector")
            .field("fetch_concurrency", &self.fetch_concurrency)
            .finish_non_exhaustive()
    }
}
