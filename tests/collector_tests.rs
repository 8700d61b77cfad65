use airthings_exporter::{
    api::models::{DeviceRecord, Location, SampleData, Segment},
    metrics::{Device, DeviceInventory},
    AccessToken, AirthingsApi, AirthingsCollector, ExporterError, Result, TokenSource,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_test::assert_ok;

/// Token source whose availability can be toggled mid-test
#[derive(Default)]
struct FakeTokens {
    fail: AtomicBool,
    issued: AtomicUsize,
}

impl TokenSource for FakeTokens {
    async fn token(&self) -> Result<AccessToken> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ExporterError::auth_error("invalid_client"));
        }
        self.issued.fetch_add(1, Ordering::SeqCst);
        Ok(AccessToken::new("fake-token"))
    }
}

/// In-memory Airthings cloud
#[derive(Default)]
struct FakeCloud {
    devices: Mutex<Vec<DeviceRecord>>,
    fail_inventory: AtomicBool,
    samples: Mutex<HashMap<String, SampleData>>,
    inventory_calls: AtomicUsize,
    sample_calls: AtomicUsize,
    latency: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeCloud {
    fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Default::default()
        }
    }

    fn add_device(&self, id: &str, segment: &str, location: &str) {
        self.devices.lock().unwrap().push(DeviceRecord {
            id: id.to_string(),
            device_type: "WAVE_PLUS".to_string(),
            sensors: vec!["co2".to_string()],
            segment: Segment {
                id: format!("{}-segment", id),
                name: segment.to_string(),
                active: true,
            },
            location: Location {
                id: format!("{}-location", id),
                name: location.to_string(),
            },
        });
    }

    fn set_samples(&self, id: &str, data: serde_json::Value) {
        self.samples
            .lock()
            .unwrap()
            .insert(id.to_string(), serde_json::from_value(data).unwrap());
    }

    async fn enter(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl AirthingsApi for FakeCloud {
    async fn fetch_inventory(&self, token: &AccessToken) -> Result<Vec<DeviceRecord>> {
        assert_eq!(token.secret(), "fake-token");
        self.inventory_calls.fetch_add(1, Ordering::SeqCst);
        self.enter().await;
        if self.fail_inventory.load(Ordering::SeqCst) {
            return Err(ExporterError::decode_error("inventory unavailable"));
        }
        Ok(self.devices.lock().unwrap().clone())
    }

    async fn fetch_latest_samples(&self, _token: &AccessToken, device_id: &str) -> Result<SampleData> {
        self.sample_calls.fetch_add(1, Ordering::SeqCst);
        self.enter().await;
        self.samples
            .lock()
            .unwrap()
            .get(device_id)
            .cloned()
            .ok_or_else(|| ExporterError::decode_error(format!("no samples for {}", device_id)))
    }
}

fn collector(cloud: FakeCloud) -> AirthingsCollector<Arc<FakeCloud>, Arc<FakeTokens>> {
    AirthingsCollector::new(Arc::new(cloud), Arc::new(FakeTokens::default()))
}

#[tokio::test]
async fn test_first_scrape_discovers_and_emits() {
    let cloud = FakeCloud::default();
    cloud.add_device("d1", "Office", "HQ");
    cloud.set_samples("d1", json!({"co2": 450.0, "relayDeviceType": "wave_plus"}));

    let collector = collector(cloud);
    let records = assert_ok!(collector.collect().await);

    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.name(), "airthings_cloud_co2");
    assert_eq!(record.value, 450.0);
    assert_eq!(record.labels.device, "d1");
    assert_eq!(record.labels.segment, "Office");
    assert_eq!(record.labels.location, "HQ");
}

#[tokio::test]
async fn test_auth_failure_aborts_scrape() {
    let cloud = Arc::new(FakeCloud::default());
    cloud.add_device("d1", "Office", "HQ");
    let tokens = Arc::new(FakeTokens::default());
    tokens.fail.store(true, Ordering::SeqCst);

    let collector = AirthingsCollector::new(cloud.clone(), tokens.clone());
    let err = collector.collect().await.unwrap_err();

    assert!(err.is_auth());
    assert_eq!(tokens.issued.load(Ordering::SeqCst), 0);
    assert_eq!(cloud.inventory_calls.load(Ordering::SeqCst), 0);
    assert_eq!(cloud.sample_calls.load(Ordering::SeqCst), 0);

    let inventory = collector.inventory_snapshot().await;
    assert!(inventory.is_empty());
    assert!(inventory.last_refresh().is_none());

    tokens.fail.store(false, Ordering::SeqCst);
    assert_ok!(collector.collect().await);
    assert_eq!(tokens.issued.load(Ordering::SeqCst), 1);
    assert_eq!(collector.inventory_snapshot().await.len(), 1);
}

#[tokio::test]
async fn test_failing_device_is_isolated() {
    let cloud = FakeCloud::default();
    cloud.add_device("a", "Office", "HQ");
    cloud.add_device("b", "Basement", "Home");
    cloud.set_samples("b", json!({"radonShortTermAvg": 42.0}));

    let collector = collector(cloud);
    let records = assert_ok!(collector.collect().await);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].labels.device, "b");
    assert_eq!(records[0].labels.segment, "Basement");
    assert_eq!(records[0].name(), "airthings_cloud_radon");
}

#[tokio::test]
async fn test_failed_refresh_keeps_previous_devices() {
    let cloud = Arc::new(FakeCloud::default());
    cloud.fail_inventory.store(true, Ordering::SeqCst);
    cloud.set_samples("old-1", json!({"temp": 20.5}));
    cloud.set_samples("old-2", json!({"humidity": 40}));

    let mut inventory = DeviceInventory::new();
    inventory.replace(vec![
        Device::new("old-1", "Office", "HQ"),
        Device::new("old-2", "Office", "HQ"),
    ]);
    let collector =
        AirthingsCollector::with_inventory(cloud.clone(), Arc::new(FakeTokens::default()), inventory);

    let records = assert_ok!(collector.collect().await);

    assert_eq!(cloud.inventory_calls.load(Ordering::SeqCst), 1);
    let inventory = collector.inventory_snapshot().await;
    assert_eq!(inventory.len(), 2);
    assert!(inventory.last_refresh().is_some());
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn test_refresh_replaces_inventory_atomically() {
    let cloud = Arc::new(FakeCloud::default());
    cloud.add_device("new", "Lab", "Campus");

    let mut inventory = DeviceInventory::with_ttl(Duration::ZERO);
    inventory.replace(vec![Device::new("gone", "Office", "HQ")]);
    let collector =
        AirthingsCollector::with_inventory(cloud.clone(), Arc::new(FakeTokens::default()), inventory);

    assert_ok!(collector.collect().await);

    let inventory = collector.inventory_snapshot().await;
    assert_eq!(inventory.devices(), &[Device::new("new", "Lab", "Campus")]);
    assert_eq!(cloud.sample_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_refresh_attempt_records_time() {
    let cloud = Arc::new(FakeCloud::default());
    cloud.add_device("d1", "Office", "HQ");
    let collector = AirthingsCollector::new(cloud.clone(), Arc::new(FakeTokens::default()));

    let first = tokio::time::Instant::now();
    assert_ok!(collector.collect().await);
    assert_eq!(collector.inventory_snapshot().await.last_refresh(), Some(first));

    tokio::time::advance(Duration::from_secs(10 * 60)).await;
    assert_ok!(collector.collect().await);
    assert_eq!(collector.inventory_snapshot().await.last_refresh(), Some(first));
    assert_eq!(cloud.inventory_calls.load(Ordering::SeqCst), 1);

    tokio::time::advance(Duration::from_secs(21 * 60)).await;
    let second = tokio::time::Instant::now();
    cloud.fail_inventory.store(true, Ordering::SeqCst);
    assert_ok!(collector.collect().await);

    let inventory = collector.inventory_snapshot().await;
    assert_eq!(inventory.last_refresh(), Some(second));
    assert_eq!(inventory.len(), 1);
    assert_eq!(cloud.inventory_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_unknown_and_non_numeric_readings_dropped() {
    let cloud = FakeCloud::default();
    cloud.add_device("d1", "Office", "HQ");
    cloud.set_samples(
        "d1",
        json!({
            "co2": "high",
            "voc": null,
            "temp": true,
            "lux": 300.0,
            "relayDeviceType": "hub",
            "pm25": 3
        }),
    );

    let records = assert_ok!(collector(cloud).collect().await);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name(), "airthings_cloud_pm25");
    assert_eq!(records[0].value, 3.0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_scrapes_are_serialized() {
    let cloud = Arc::new(FakeCloud::with_latency(Duration::from_millis(5)));
    for id in ["d1", "d2", "d3"] {
        cloud.add_device(id, "Office", "HQ");
        cloud.set_samples(id, json!({"co2": 500.0}));
    }
    let collector = Arc::new(AirthingsCollector::new(
        cloud.clone(),
        Arc::new(FakeTokens::default()),
    ));

    let scrapes: Vec<_> = (0..8)
        .map(|_| {
            let collector = collector.clone();
            tokio::spawn(async move { collector.collect().await })
        })
        .collect();

    for scrape in scrapes {
        let records = assert_ok!(scrape.await.unwrap());
        assert_eq!(records.len(), 3);
    }

    assert_eq!(cloud.max_in_flight.load(Ordering::SeqCst), 1);
    assert_eq!(cloud.inventory_calls.load(Ordering::SeqCst), 1);
    assert_eq!(cloud.sample_calls.load(Ordering::SeqCst), 24);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_fetches_keep_inventory_order() {
    let cloud = Arc::new(FakeCloud::with_latency(Duration::from_millis(5)));
    for (id, value) in [("d1", 1.0), ("d2", 2.0), ("d3", 3.0), ("d4", 4.0)] {
        cloud.add_device(id, "Office", "HQ");
        cloud.set_samples(id, json!({ "battery": value }));
    }
    let collector = Arc::new(
        AirthingsCollector::new(cloud.clone(), Arc::new(FakeTokens::default()))
            .with_fetch_concurrency(4),
    );

    let (first, second) = tokio::join!(collector.collect(), collector.collect());
    for records in [assert_ok!(first), assert_ok!(second)] {
        let devices: Vec<&str> = records.iter().map(|r| r.labels.device.as_str()).collect();
        assert_eq!(devices, vec!["d1", "d2", "d3", "d4"]);
    }

    // Parallelism stays within one scrape.
    assert!(cloud.max_in_flight.load(Ordering::SeqCst) <= 4);
}
