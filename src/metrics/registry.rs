//! Static table of exported Airthings metrics.

use crate::api::models::SampleData;
use crate::metrics::data::SampleReading;
use lazy_static::lazy_static;

/// Namespace every exported metric lives under.
pub const NAMESPACE: &str = "airthings";

/// Subsystem qualifier for metrics sourced from the cloud API.
pub const SUBSYSTEM: &str = "cloud";

/// Label schema shared by all reading metrics.
pub const LABEL_NAMES: [&str; 3] = ["device", "segment", "location"];

/// Sensor readings the exporter knows how to publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadingKind {
    Battery,
    Co2,
    Humidity,
    Pm1,
    Pm25,
    Pressure,
    Radon,
    Temperature,
    Voc,
}

impl ReadingKind {
    /// Every kind, in exposition order.
    pub const ALL: [ReadingKind; 9] = [
        ReadingKind::Battery,
        ReadingKind::Co2,
        ReadingKind::Humidity,
        ReadingKind::Pm1,
        ReadingKind::Pm25,
        ReadingKind::Pressure,
        ReadingKind::Radon,
        ReadingKind::Temperature,
        ReadingKind::Voc,
    ];

    /// Key used for this reading in the latest-samples `data` object.
    pub fn api_key(self) -> &'static str {
        match self {
            ReadingKind::Battery => "battery",
            ReadingKind::Co2 => "co2",
            ReadingKind::Humidity => "humidity",
            ReadingKind::Pm1 => "pm1",
            ReadingKind::Pm25 => "pm25",
            ReadingKind::Pressure => "pressure",
            ReadingKind::Radon => "radonShortTermAvg",
            ReadingKind::Temperature => "temp",
            ReadingKind::Voc => "voc",
        }
    }

    /// Exact-match lookup of a sample key.
    pub fn from_api_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.api_key() == key)
    }
}

/// How a metric's value behaves between scrapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Instantaneous, overwritable measurement
    Gauge,
}

/// Static metadata describing one exported metric.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricDescriptor {
    pub kind: ReadingKind,
    /// Fully-qualified name, e.g. `airthings_cloud_co2`
    pub exported_name: String,
    pub help: &'static str,
    pub value_kind: ValueKind,
    pub label_names: &'static [&'static str],
}

lazy_static! {
    static ref METRIC_REGISTRY: Vec<MetricDescriptor> = vec![
        new_metric(ReadingKind::Battery, "battery", "Battery charge capacity"),
        new_metric(ReadingKind::Co2, "co2", "CO2 levels"),
        new_metric(ReadingKind::Humidity, "humidity", "Humidity"),
        new_metric(
            ReadingKind::Pm1,
            "pm1",
            "Extremely fine particles, less than 1 microns",
        ),
        new_metric(
            ReadingKind::Pm25,
            "pm25",
            "Fine particles, less than 2.5 microns",
        ),
        new_metric(ReadingKind::Pressure, "air_pressure", "Pressure"),
        new_metric(ReadingKind::Radon, "radon", "Radon, short term average"),
        new_metric(ReadingKind::Temperature, "temperature", "Temperature"),
        new_metric(ReadingKind::Voc, "voc", "Volatile organic compounds"),
    ];
}

fn new_metric(kind: ReadingKind, name: &str, help: &'static str) -> MetricDescriptor {
    MetricDescriptor {
        kind,
        exported_name: build_fq_name(NAMESPACE, SUBSYSTEM, name),
        help,
        value_kind: ValueKind::Gauge,
        label_names: &LABEL_NAMES,
    }
}

/// Join non-empty name parts with underscores.
pub fn build_fq_name(namespace: &str, subsystem: &str, name: &str) -> String {
    [namespace, subsystem, name]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("_")
}

/// All descriptors, in exposition order.
pub fn descriptors() -> &'static [MetricDescriptor] {
    &METRIC_REGISTRY
}

/// Descriptor for a sample key, if the key is a known reading.
pub fn lookup(key: &str) -> Option<&'static MetricDescriptor> {
    let kind = ReadingKind::from_api_key(key)?;
    descriptor_for(kind)
}

/// Descriptor for a reading kind.
pub fn descriptor_for(kind: ReadingKind) -> Option<&'static MetricDescriptor> {
    METRIC_REGISTRY.iter().find(|descriptor| descriptor.kind == kind)
}

/// Pick the known, numeric readings out of one device's sample data.
///
/// Unknown keys and non-numeric values are dropped. The result follows
/// registry order regardless of the map's iteration order.
pub fn decode_readings(data: &SampleData) -> Vec<SampleReading> {
    descriptors()
        .iter()
        .filter_map(|descriptor| {
            let value = data.get(descriptor.kind.api_key())?.as_f64()?;
            Some(SampleReading {
                kind: descriptor.kind,
                value,
            })
        })
        .collect()
}
