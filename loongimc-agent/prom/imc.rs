use prometheus::{Encoder, Gauge, Registry, TextEncoder};
use std::collections::HashMap;
use std::sync::Arc;

use crate::common::arch::LoongsonFamily;
use crate::counters::imc::ImcInfo;
use crate::error::{LoongImcError, Result};
use crate::metrics::imc::ImcMetric;

/// Publishes a probe result as Prometheus gauges
///
/// The probe is one-shot, so the registry is rendered once in text
/// exposition format (suitable for a node_exporter textfile collector).
pub struct ImcMetricExporter {
    registry: Arc<Registry>,
    gauges: HashMap<ImcMetric, Gauge>,
}

impl ImcMetricExporter {
    pub fn new(family: LoongsonFamily, channel: Option<u8>, instance_label: &str) -> Result<Self> {
        let registry = Arc::new(Registry::new());
        let channel_label = channel.map_or_else(|| "none".to_string(), |ch| ch.to_string());

        let mut gauges = HashMap::new();
        for metric in ImcMetric::all() {
            let opts = prometheus::Opts::new(metric.name(), metric.help())
                .const_label("family", family.name())
                .const_label("channel", channel_label.as_str())
                .const_label("instance", instance_label);

            let gauge = Gauge::with_opts(opts)?;
            registry.register(Box::new(gauge.clone()))?;
            gauges.insert(metric, gauge);
        }

        tracing::debug!("Registered {} IMC gauges", gauges.len());

        Ok(Self { registry, gauges })
    }

    pub fn update(&self, info: &ImcInfo) {
        for (metric, gauge) in &self.gauges {
            gauge.set(metric.value(info));
        }
    }

    pub fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.registry)
    }

    /// Render the registry in text exposition format
    pub fn encode(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;

        String::from_utf8(buffer)
            .map_err(|e| LoongImcError::ParseError(format!("Non UTF-8 metrics output: {e}")))
    }
}
