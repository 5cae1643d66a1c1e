//! Prometheus metrics

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Account balance
    Balance,
    /// Balance plus unrealized P&L of active trades
    Equity,
    /// Active trade count
    ActiveTrades,
    /// Symbols past the price-failure threshold
    DegradedFeeds,
}

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Trades registered
    TradesCreated,
    /// Trades activated by an order fill
    TradesActivated,
    /// Stop loss closures
    SlHits,
    /// Target closures
    TargetHits,
    /// Manual closures
    ManualCloses,
    /// Failed price fetches
    PriceFetchFailures,
}

impl GaugeMetric {
    fn name(self) -> &'static str {
        match self {
            GaugeMetric::Balance => "warden_balance",
            GaugeMetric::Equity => "warden_equity",
            GaugeMetric::ActiveTrades => "warden_active_trades",
            GaugeMetric::DegradedFeeds => "warden_degraded_feeds",
        }
    }
}

impl CounterMetric {
    fn name(self) -> &'static str {
        match self {
            CounterMetric::TradesCreated => "warden_trades_created_total",
            CounterMetric::TradesActivated => "warden_trades_activated_total",
            CounterMetric::SlHits => "warden_sl_hits_total",
            CounterMetric::TargetHits => "warden_target_hits_total",
            CounterMetric::ManualCloses => "warden_manual_closes_total",
            CounterMetric::PriceFetchFailures => "warden_price_fetch_failures_total",
        }
    }
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    metrics::gauge!(metric.name()).set(value);
}

/// Increment a counter
pub fn increment(metric: CounterMetric) {
    metrics::counter!(metric.name()).increment(1);
}
