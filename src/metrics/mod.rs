//! Metric registry, device inventory and scrape collection.
//!
//! This module turns the Airthings cloud API into Prometheus samples: a static
//! registry describes the exported gauges, a cached inventory tracks which
//! devices exist, and the collector ties both together for each scrape.

pub mod collector;
pub mod data;
pub mod exposition;
pub mod inventory;
pub mod registry;

// Re-export commonly used items
pub use collector::AirthingsCollector;
pub use data::{DeviceLabels, MetricRecord, SampleReading};
pub use exposition::encode_records;
pub use inventory::{Device, DeviceInventory, INVENTORY_TTL};
pub use registry::{MetricDescriptor, ReadingKind, ValueKind};
