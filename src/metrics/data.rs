//! Data structures produced by a scrape.

use crate::metrics::inventory::Device;
use crate::metrics::registry::{MetricDescriptor, ReadingKind};
use prometheus_client::encoding::EncodeLabelSet;

/// One known, numeric reading decoded from a device's latest samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleReading {
    pub kind: ReadingKind,
    pub value: f64,
}

/// Labels attached to every reading metric.
#[derive(Debug, Clone, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct DeviceLabels {
    /// Device serial number
    pub device: String,
    /// Segment display name
    pub segment: String,
    /// Location display name
    pub location: String,
}

impl From<&Device> for DeviceLabels {
    fn from(device: &Device) -> Self {
        Self {
            device: device.id.clone(),
            segment: device.segment.clone(),
            location: device.location.clone(),
        }
    }
}

/// A single gauge sample ready for exposition.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRecord {
    pub descriptor: &'static MetricDescriptor,
    pub value: f64,
    pub labels: DeviceLabels,
}

impl MetricRecord {
    /// Exported metric name of this record.
    pub fn name(&self) -> &str {
        &self.descriptor.exported_name
    }
}
