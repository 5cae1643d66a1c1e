//! Price monitoring loop
//!
//! A recurring task that walks the active trades every tick, fetches the
//! current price per symbol and drives SL/target transitions through the
//! registry's single transition entry point. A failing price fetch skips
//! that trade for the tick and retries on the next one; the loop itself
//! never dies because of a feed or registry error.

use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::MonitorConfig;
use crate::feed::PriceSource;
use crate::journal::{TradeRecord, TradeSink};
use crate::registry::{TradeRegistry, TransitionOutcome};
use crate::telemetry::{self, CounterMetric, GaugeMetric};
use crate::trade::{CloseReason, ExitTrigger, Trade};

/// Handle to a running monitor task
pub struct MonitorHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    /// Request a cooperative stop and wait for the loop to drain
    ///
    /// The current tick's in-flight checks complete before the task exits.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}

/// Recurring price monitor over the active trades
pub struct Monitor<P: PriceSource> {
    registry: Arc<TradeRegistry>,
    prices: Arc<P>,
    sink: Option<Arc<dyn TradeSink>>,
    interval: Duration,
    failure_threshold: u32,
    /// Consecutive price failures per symbol
    failures: HashMap<String, u32>,
}

impl<P: PriceSource + 'static> Monitor<P> {
    /// Create a monitor from configuration
    pub fn new(registry: Arc<TradeRegistry>, prices: Arc<P>, config: &MonitorConfig) -> Self {
        Self {
            registry,
            prices,
            sink: None,
            interval: Duration::from_secs(config.interval_secs),
            failure_threshold: config.failure_threshold,
            failures: HashMap::new(),
        }
    }

    /// Attach a persistence sink for closed-trade records
    pub fn with_sink(mut self, sink: Arc<dyn TradeSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Spawn the polling loop
    pub fn spawn(self) -> MonitorHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(shutdown_rx));
        MonitorHandle {
            shutdown: shutdown_tx,
            task,
        }
    }

    async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(interval_secs = self.interval.as_secs(), "Monitor started");
        let mut interval = tokio::time::interval(self.interval);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.tick().await;
                }
                _ = shutdown.changed() => {
                    tracing::info!("Monitor stopping");
                    break;
                }
            }
        }
    }

    /// Run one evaluation pass over the active trades
    pub async fn tick(&mut self) {
        let actives = self.registry.list_active().await;
        telemetry::set_gauge(GaugeMetric::ActiveTrades, actives.len() as f64);

        for trade in actives {
            self.check_trade(&trade).await;
        }

        let stats = self.registry.statistics().await;
        telemetry::set_gauge(GaugeMetric::Balance, stats.balance.to_f64().unwrap_or(0.0));
        telemetry::set_gauge(GaugeMetric::Equity, stats.equity.to_f64().unwrap_or(0.0));
    }

    async fn check_trade(&mut self, trade: &Trade) {
        let price = match self.prices.current_price(&trade.symbol).await {
            Ok(price) => price,
            Err(e) => {
                self.record_failure(&trade.symbol, &e.to_string());
                return;
            }
        };
        self.record_success(&trade.symbol);

        match trade.evaluate(price) {
            Some(trigger) => self.close_trade(trade, trigger, price).await,
            None => {
                if let Err(e) = self.registry.mark_price(trade.id, price).await {
                    tracing::warn!(id = %trade.id, error = %e, "Mark-to-market failed");
                }
            }
        }
    }

    async fn close_trade(&self, trade: &Trade, trigger: ExitTrigger, price: Decimal) {
        let reason = CloseReason::from(trigger);
        match self
            .registry
            .apply_transition(trade.id, reason, price, Utc::now())
            .await
        {
            Ok(TransitionOutcome::Applied(closed)) => {
                match trigger {
                    ExitTrigger::StopLoss => {
                        telemetry::increment(CounterMetric::SlHits);
                        tracing::warn!(
                            id = %closed.id,
                            symbol = %closed.symbol,
                            price = %price,
                            realized_pnl = ?closed.realized_pnl,
                            "Stop loss hit"
                        );
                    }
                    ExitTrigger::Target => {
                        telemetry::increment(CounterMetric::TargetHits);
                        tracing::info!(
                            id = %closed.id,
                            symbol = %closed.symbol,
                            price = %price,
                            realized_pnl = ?closed.realized_pnl,
                            "Target hit"
                        );
                    }
                }
                self.persist(&closed).await;
            }
            Ok(TransitionOutcome::AlreadyClosed(_)) => {
                // Lost the race against a manual close; nothing to do
                tracing::debug!(id = %trade.id, "Trade closed concurrently");
            }
            Err(e) => {
                tracing::warn!(id = %trade.id, error = %e, "Transition failed");
            }
        }
    }

    async fn persist(&self, trade: &Trade) {
        if let Some(sink) = &self.sink {
            if let Err(e) = sink.append(TradeRecord::from(trade)).await {
                tracing::warn!(id = %trade.id, error = %e, "Journal append failed");
            }
        }
    }

    fn record_failure(&mut self, symbol: &str, error: &str) {
        telemetry::increment(CounterMetric::PriceFetchFailures);
        let count = self.failures.entry(symbol.to_string()).or_insert(0);
        *count += 1;

        if *count == self.failure_threshold {
            tracing::error!(
                symbol = %symbol,
                consecutive_failures = *count,
                "Price feed degraded"
            );
        } else {
            tracing::warn!(symbol = %symbol, error = %error, "Price fetch failed, will retry next tick");
        }
        let degraded = self
            .failures
            .values()
            .filter(|&&c| c >= self.failure_threshold)
            .count();
        telemetry::set_gauge(GaugeMetric::DegradedFeeds, degraded as f64);
    }

    fn record_success(&mut self, symbol: &str) {
        self.failures.remove(symbol);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::FeedError;
    use crate::trade::{Direction, ManualTrade, TradeFactory, TradeId, TradeStatus};
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use tokio::sync::RwLock;

    /// Scripted price source: fixed price per symbol, errors for the rest
    struct ScriptedPrices {
        prices: RwLock<HashMap<String, Decimal>>,
    }

    impl ScriptedPrices {
        fn new() -> Self {
            Self {
                prices: RwLock::new(HashMap::new()),
            }
        }

        async fn set(&self, symbol: &str, price: Decimal) {
            self.prices.write().await.insert(symbol.to_string(), price);
        }

        async fn fail(&self, symbol: &str) {
            self.prices.write().await.remove(symbol);
        }
    }

    #[async_trait]
    impl PriceSource for ScriptedPrices {
        async fn current_price(&self, symbol: &str) -> Result<Decimal, FeedError> {
            self.prices.read().await.get(symbol).copied().ok_or_else(|| {
                FeedError::MalformedPrice {
                    symbol: symbol.to_string(),
                    raw: "unavailable".to_string(),
                }
            })
        }
    }

    fn monitor_config() -> MonitorConfig {
        MonitorConfig {
            interval_secs: 1,
            failure_threshold: 3,
        }
    }

    async fn add_active_trade(
        registry: &TradeRegistry,
        symbol: &str,
        direction: Direction,
    ) -> TradeId {
        let (entry, sl, target) = match direction {
            Direction::Long => (dec!(45000), dec!(44500), dec!(46500)),
            Direction::Short => (dec!(2500), dec!(2550), dec!(2400)),
        };
        let trade = TradeFactory::new()
            .from_manual(ManualTrade {
                symbol: symbol.to_string(),
                direction,
                entry_price: entry,
                sl_price: sl,
                target_price: target,
                risk_percent: dec!(1),
                balance: dec!(10000),
                quantity: None,
                strategy_name: None,
            })
            .unwrap();
        let id = trade.id;
        registry.add(trade).await.unwrap();
        registry.activate(id, Utc::now()).await.unwrap();
        id
    }

    #[tokio::test]
    async fn test_tick_closes_on_sl() {
        let registry = Arc::new(TradeRegistry::new(dec!(10000)));
        let prices = Arc::new(ScriptedPrices::new());
        let id = add_active_trade(&registry, "BTCUSDT", Direction::Long).await;

        prices.set("BTCUSDT", dec!(44400)).await;
        let mut monitor = Monitor::new(registry.clone(), prices, &monitor_config());
        monitor.tick().await;

        let trade = registry.get(id).await.unwrap();
        assert_eq!(trade.status, TradeStatus::SlHit);
        assert_eq!(trade.exit_price, Some(dec!(44400)));
        // (44400 - 45000) * 0.2 = -120
        assert_eq!(trade.realized_pnl, Some(dec!(-120)));
    }

    #[tokio::test]
    async fn test_tick_closes_on_target_short() {
        let registry = Arc::new(TradeRegistry::new(dec!(10000)));
        let prices = Arc::new(ScriptedPrices::new());
        let id = add_active_trade(&registry, "ETHUSDT", Direction::Short).await;

        prices.set("ETHUSDT", dec!(2400)).await;
        let mut monitor = Monitor::new(registry.clone(), prices, &monitor_config());
        monitor.tick().await;

        let trade = registry.get(id).await.unwrap();
        assert_eq!(trade.status, TradeStatus::TargetHit);
        // (2500 - 2400) * 2 = 200
        assert_eq!(trade.realized_pnl, Some(dec!(200)));
    }

    #[tokio::test]
    async fn test_tick_marks_unrealized_when_no_trigger() {
        let registry = Arc::new(TradeRegistry::new(dec!(10000)));
        let prices = Arc::new(ScriptedPrices::new());
        let id = add_active_trade(&registry, "BTCUSDT", Direction::Long).await;

        prices.set("BTCUSDT", dec!(45500)).await;
        let mut monitor = Monitor::new(registry.clone(), prices, &monitor_config());
        monitor.tick().await;

        let trade = registry.get(id).await.unwrap();
        assert_eq!(trade.status, TradeStatus::Active);
        assert_eq!(trade.unrealized_pnl, dec!(100));
    }

    #[tokio::test]
    async fn test_failing_symbol_does_not_block_others() {
        let registry = Arc::new(TradeRegistry::new(dec!(10000)));
        let prices = Arc::new(ScriptedPrices::new());
        let failing = add_active_trade(&registry, "BTCUSDT", Direction::Long).await;
        let healthy = add_active_trade(&registry, "ETHUSDT", Direction::Short).await;

        // BTCUSDT has no price scripted and errors; ETHUSDT hits target
        prices.fail("BTCUSDT").await;
        prices.set("ETHUSDT", dec!(2400)).await;

        let mut monitor = Monitor::new(registry.clone(), prices.clone(), &monitor_config());
        monitor.tick().await;

        assert_eq!(
            registry.get(failing).await.unwrap().status,
            TradeStatus::Active
        );
        assert_eq!(
            registry.get(healthy).await.unwrap().status,
            TradeStatus::TargetHit
        );

        // The skipped trade is retried on the next tick
        prices.set("BTCUSDT", dec!(44400)).await;
        monitor.tick().await;
        assert_eq!(
            registry.get(failing).await.unwrap().status,
            TradeStatus::SlHit
        );
    }

    #[tokio::test]
    async fn test_failure_counter_resets_on_success() {
        let registry = Arc::new(TradeRegistry::new(dec!(10000)));
        let prices = Arc::new(ScriptedPrices::new());
        add_active_trade(&registry, "BTCUSDT", Direction::Long).await;

        let mut monitor = Monitor::new(registry.clone(), prices.clone(), &monitor_config());

        prices.fail("BTCUSDT").await;
        monitor.tick().await;
        monitor.tick().await;
        assert_eq!(monitor.failures.get("BTCUSDT"), Some(&2));

        prices.set("BTCUSDT", dec!(45500)).await;
        monitor.tick().await;
        assert_eq!(monitor.failures.get("BTCUSDT"), None);
    }

    #[tokio::test]
    async fn test_pending_trades_not_polled() {
        let registry = Arc::new(TradeRegistry::new(dec!(10000)));
        let prices = Arc::new(ScriptedPrices::new());

        // Registered but never activated
        let trade = TradeFactory::new()
            .from_manual(ManualTrade {
                symbol: "BTCUSDT".to_string(),
                direction: Direction::Long,
                entry_price: dec!(45000),
                sl_price: dec!(44500),
                target_price: dec!(46500),
                risk_percent: dec!(1),
                balance: dec!(10000),
                quantity: None,
                strategy_name: None,
            })
            .unwrap();
        let id = trade.id;
        registry.add(trade).await.unwrap();

        prices.set("BTCUSDT", dec!(44000)).await;
        let mut monitor = Monitor::new(registry.clone(), prices, &monitor_config());
        monitor.tick().await;

        assert_eq!(
            registry.get(id).await.unwrap().status,
            TradeStatus::Created
        );
    }

    #[tokio::test]
    async fn test_spawn_and_graceful_stop() {
        let registry = Arc::new(TradeRegistry::new(dec!(10000)));
        let prices = Arc::new(ScriptedPrices::new());
        let id = add_active_trade(&registry, "BTCUSDT", Direction::Long).await;
        prices.set("BTCUSDT", dec!(44400)).await;

        let monitor = Monitor::new(registry.clone(), prices, &monitor_config());
        let handle = monitor.spawn();

        // First tick fires immediately; give it a moment to run
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.stop().await;

        assert_eq!(registry.get(id).await.unwrap().status, TradeStatus::SlHit);
    }
}
