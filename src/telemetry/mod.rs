//! Telemetry module
//!
//! Metrics and logging

mod logging;
mod metrics;

pub use logging::init_logging;
pub use metrics::{increment, set_gauge, CounterMetric, GaugeMetric};

use crate::config::TelemetryConfig;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Guard that cleans up telemetry on drop
pub struct TelemetryGuard {
    _priv: (),
}

/// Initialize all telemetry subsystems
///
/// The Prometheus listener is best-effort: a busy port logs a warning
/// instead of aborting short-lived commands.
pub fn init_telemetry(config: &TelemetryConfig) -> anyhow::Result<TelemetryGuard> {
    init_logging(&config.log_level)?;

    if let Err(e) = PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], config.metrics_port))
        .install()
    {
        tracing::warn!(port = config.metrics_port, error = %e, "Metrics exporter not started");
    }

    Ok(TelemetryGuard { _priv: () })
}
