//! Rendering of scrape results in the OpenMetrics text format.

use crate::error::Result;
use crate::metrics::data::MetricRecord;
use crate::metrics::registry::{self, ValueKind};
use prometheus_client::collector::Collector;
use prometheus_client::encoding::{text::encode, DescriptorEncoder, EncodeLabelSet, EncodeMetric};
use prometheus_client::metrics::gauge::ConstGauge;
use prometheus_client::metrics::MetricType;
use prometheus_client::registry::Registry;

/// Content type of [`encode_records`] output.
pub const CONTENT_TYPE: &str = "application/openmetrics-text; version=1.0.0; charset=utf-8";

/// Name of the always-present build information gauge.
pub const BUILD_INFO_METRIC: &str = "airthings_exporter_build_info";

#[derive(Debug, Clone, Hash, PartialEq, Eq, EncodeLabelSet)]
struct BuildInfoLabels {
    version: String,
}

/// Const metrics for a single scrape, grouped per descriptor at encode time.
#[derive(Debug)]
struct ScrapeCollector {
    records: Vec<MetricRecord>,
}

impl Collector for ScrapeCollector {
    fn encode(&self, mut encoder: DescriptorEncoder) -> std::result::Result<(), std::fmt::Error> {
        for descriptor in registry::descriptors() {
            let mut samples = self
                .records
                .iter()
                .filter(|record| record.descriptor.kind == descriptor.kind)
                .peekable();
            if samples.peek().is_none() {
                continue;
            }

            let metric_type = match descriptor.value_kind {
                ValueKind::Gauge => MetricType::Gauge,
            };
            let mut metric_encoder = encoder.encode_descriptor(
                &descriptor.exported_name,
                descriptor.help,
                None,
                metric_type,
            )?;
            for record in samples {
                let family_encoder = metric_encoder.encode_family(&record.labels)?;
                ConstGauge::new(record.value).encode(family_encoder)?;
            }
        }

        let labels = BuildInfoLabels {
            version: env!("CARGO_PKG_VERSION").to_string(),
        };
        let mut metric_encoder = encoder.encode_descriptor(
            BUILD_INFO_METRIC,
            "A metric with a constant '1' value labeled by the exporter version",
            None,
            MetricType::Gauge,
        )?;
        let family_encoder = metric_encoder.encode_family(&labels)?;
        ConstGauge::new(1i64).encode(family_encoder)?;

        Ok(())
    }
}

/// Render one scrape's records, plus build info, as exposition text.
pub fn encode_records(records: &[MetricRecord]) -> Result<String> {
    let mut registry = Registry::default();
    registry.register_collector(Box::new(ScrapeCollector {
        records: records.to_vec(),
    }));

    let mut body = String::new();
    encode(&mut body, &registry)?;
    Ok(body)
}
