//! Trade management glue
//!
//! Wires the factory, registry, execution gateway and journal together
//! behind the request-level operations: create, execute, manual close,
//! statistics. The manager owns no trade state of its own; the registry
//! stays the single source of truth.

use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use thiserror::Error;

use crate::broker::{Broker, BrokerError, Fill, Order, OrderSide, OrderType};
use crate::journal::{TradeRecord, TradeSink};
use crate::registry::{RegistryError, Statistics, TradeRegistry, TransitionOutcome};
use crate::risk::RiskError;
use crate::telemetry::{self, CounterMetric};
use crate::trade::{
    CloseReason, Direction, ManualTrade, StrategyProposal, Trade, TradeFactory, TradeId,
};

/// Request-path errors
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error(transparent)]
    Risk(#[from] RiskError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Broker(#[from] BrokerError),
}

/// A trade creation request from a CLI or programmatic caller
#[derive(Debug, Clone)]
pub struct TradeRequest {
    pub symbol: String,
    pub direction: Direction,
    pub entry_price: Decimal,
    pub sl_price: Decimal,
    pub target_price: Decimal,
    /// Explicit position size; sized from risk when `None`
    pub quantity: Option<Decimal>,
    /// Risk percentage; the configured default when `None`
    pub risk_percent: Option<Decimal>,
}

/// Coordinates trade creation, execution and closure
pub struct TradeManager {
    registry: Arc<TradeRegistry>,
    broker: Arc<dyn Broker>,
    factory: TradeFactory,
    sink: Option<Arc<dyn TradeSink>>,
    default_risk_percent: Decimal,
}

impl TradeManager {
    /// Create a manager over a registry and execution gateway
    pub fn new(
        registry: Arc<TradeRegistry>,
        broker: Arc<dyn Broker>,
        factory: TradeFactory,
        default_risk_percent: Decimal,
    ) -> Self {
        Self {
            registry,
            broker,
            factory,
            sink: None,
            default_risk_percent,
        }
    }

    /// Attach a persistence sink
    pub fn with_sink(mut self, sink: Arc<dyn TradeSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Create and register a trade from explicit parameters
    ///
    /// The gateway's balance feeds position sizing; the trade is returned
    /// in `Created` status and is not executed.
    pub async fn create_manual(&self, request: TradeRequest) -> Result<Trade, ManagerError> {
        let balance = self.broker.balance().await?;
        let trade = self.factory.from_manual(ManualTrade {
            symbol: request.symbol,
            direction: request.direction,
            entry_price: request.entry_price,
            sl_price: request.sl_price,
            target_price: request.target_price,
            risk_percent: request.risk_percent.unwrap_or(self.default_risk_percent),
            balance,
            quantity: request.quantity,
            strategy_name: None,
        })?;

        let trade = self.registry.add(trade).await?;
        telemetry::increment(CounterMetric::TradesCreated);
        self.persist(&trade).await;
        Ok(trade)
    }

    /// Create and register a trade from a strategy proposal
    pub async fn create_from_strategy(
        &self,
        symbol: &str,
        proposal: &StrategyProposal,
    ) -> Result<Trade, ManagerError> {
        let balance = self.broker.balance().await?;
        let trade =
            self.factory
                .from_strategy(symbol, proposal, balance, self.default_risk_percent)?;

        let trade = self.registry.add(trade).await?;
        telemetry::increment(CounterMetric::TradesCreated);
        self.persist(&trade).await;
        Ok(trade)
    }

    /// Place the entry order for a `Created` trade and activate it
    ///
    /// On gateway rejection the trade stays `Created` and the error is
    /// surfaced; other trades are unaffected.
    pub async fn execute(&self, id: TradeId) -> Result<Fill, ManagerError> {
        let trade = self.registry.get(id).await?;

        let fill = self
            .broker
            .place_order(Order {
                symbol: trade.symbol.clone(),
                side: OrderSide::entry_for(trade.direction),
                price: trade.entry_price,
                quantity: trade.quantity,
                order_type: OrderType::Limit,
            })
            .await?;

        let activated = self.registry.activate(id, fill.timestamp).await?;
        telemetry::increment(CounterMetric::TradesActivated);
        self.persist(&activated).await;
        Ok(fill)
    }

    /// Close a trade at an explicit exit price
    ///
    /// Racing against a monitor-triggered transition is safe: if the trade
    /// is already terminal the existing record is returned unchanged.
    pub async fn close_manual(
        &self,
        id: TradeId,
        exit_price: Decimal,
    ) -> Result<Trade, ManagerError> {
        let outcome = self
            .registry
            .apply_transition(id, CloseReason::Manual, exit_price, Utc::now())
            .await?;

        match outcome {
            TransitionOutcome::Applied(trade) => {
                telemetry::increment(CounterMetric::ManualCloses);
                self.persist(&trade).await;
                Ok(trade)
            }
            TransitionOutcome::AlreadyClosed(trade) => Ok(trade),
        }
    }

    /// Aggregate statistics snapshot
    pub async fn statistics(&self) -> Statistics {
        self.registry.statistics().await
    }

    /// The registry backing this manager
    pub fn registry(&self) -> Arc<TradeRegistry> {
        Arc::clone(&self.registry)
    }

    async fn persist(&self, trade: &Trade) {
        if let Some(sink) = &self.sink {
            // The registry stays authoritative; journal failures are logged,
            // not propagated
            if let Err(e) = sink.append(TradeRecord::from(trade)).await {
                tracing::warn!(id = %trade.id, error = %e, "Journal append failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::PaperBroker;
    use crate::trade::TradeStatus;
    use rust_decimal_macros::dec;

    fn request() -> TradeRequest {
        TradeRequest {
            symbol: "BTCUSDT".to_string(),
            direction: Direction::Long,
            entry_price: dec!(45000),
            sl_price: dec!(44500),
            target_price: dec!(46500),
            quantity: None,
            risk_percent: None,
        }
    }

    fn manager(paper_balance: Decimal) -> TradeManager {
        TradeManager::new(
            Arc::new(TradeRegistry::new(paper_balance)),
            Arc::new(PaperBroker::new(paper_balance)),
            TradeFactory::new(),
            dec!(1),
        )
    }

    #[tokio::test]
    async fn test_create_manual_sizes_from_broker_balance() {
        let manager = manager(dec!(10000));
        let trade = manager.create_manual(request()).await.unwrap();

        assert_eq!(trade.status, TradeStatus::Created);
        assert_eq!(trade.quantity, dec!(0.2));
        assert_eq!(trade.risk_amount, dec!(100));

        let stats = manager.statistics().await;
        assert_eq!(stats.total_trades, 1);
        assert_eq!(stats.pending_trades, 1);
    }

    #[tokio::test]
    async fn test_create_manual_surfaces_validation_error() {
        let manager = manager(dec!(10000));
        let mut bad = request();
        bad.target_price = dec!(44000); // target below entry for a long
        let err = manager.create_manual(bad).await.unwrap_err();
        assert!(matches!(err, ManagerError::Risk(_)));

        let stats = manager.statistics().await;
        assert_eq!(stats.total_trades, 0);
    }

    #[tokio::test]
    async fn test_execute_activates() {
        let manager = manager(dec!(10000));
        let trade = manager.create_manual(request()).await.unwrap();
        let fill = manager.execute(trade.id).await.unwrap();

        assert_eq!(fill.quantity, trade.quantity);
        assert_eq!(fill.side, OrderSide::Buy);

        let activated = manager.registry().get(trade.id).await.unwrap();
        assert_eq!(activated.status, TradeStatus::Active);
        assert!(activated.activated_at.is_some());
    }

    #[tokio::test]
    async fn test_execute_rejection_leaves_created() {
        // Paper balance too small for the notional: margin rejection
        let registry = Arc::new(TradeRegistry::new(dec!(10000)));
        let manager = TradeManager::new(
            registry.clone(),
            Arc::new(PaperBroker::new(dec!(10000))),
            TradeFactory::new(),
            dec!(1),
        );
        let mut big = request();
        big.quantity = Some(dec!(1)); // notional 45000 > 10000
        let trade = manager.create_manual(big).await.unwrap();

        let err = manager.execute(trade.id).await.unwrap_err();
        assert!(matches!(
            err,
            ManagerError::Broker(BrokerError::InsufficientMargin { .. })
        ));
        assert_eq!(
            registry.get(trade.id).await.unwrap().status,
            TradeStatus::Created
        );
    }

    #[tokio::test]
    async fn test_execute_unknown_trade() {
        let manager = manager(dec!(10000));
        let err = manager.execute(uuid::Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(
            err,
            ManagerError::Registry(RegistryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_close_manual() {
        let manager = manager(dec!(10000));
        let trade = manager.create_manual(request()).await.unwrap();
        manager.execute(trade.id).await.unwrap();

        let closed = manager.close_manual(trade.id, dec!(45200)).await.unwrap();
        assert_eq!(closed.status, TradeStatus::ManuallyClosed);
        // (45200 - 45000) * 0.2 = 40
        assert_eq!(closed.realized_pnl, Some(dec!(40)));

        let stats = manager.statistics().await;
        assert_eq!(stats.balance, dec!(10040));
        assert_eq!(stats.winning_trades, 1);
    }

    #[tokio::test]
    async fn test_close_manual_twice_returns_same_record() {
        let manager = manager(dec!(10000));
        let trade = manager.create_manual(request()).await.unwrap();
        manager.execute(trade.id).await.unwrap();

        let first = manager.close_manual(trade.id, dec!(45200)).await.unwrap();
        let second = manager.close_manual(trade.id, dec!(40000)).await.unwrap();
        assert_eq!(second.realized_pnl, first.realized_pnl);
        assert_eq!(second.closed_at, first.closed_at);

        let stats = manager.statistics().await;
        assert_eq!(stats.balance, dec!(10040)); // settled once
    }

    #[tokio::test]
    async fn test_close_manual_unknown_trade() {
        let manager = manager(dec!(10000));
        let err = manager
            .close_manual(uuid::Uuid::new_v4(), dec!(100))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ManagerError::Registry(RegistryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_create_from_strategy_labels_trade() {
        let manager = manager(dec!(10000));
        let proposal = StrategyProposal {
            direction: Direction::Short,
            entry_price: dec!(2500),
            stop_loss: dec!(2550),
            target: dec!(2400),
            strategy: "RSI Momentum".to_string(),
            confidence: Some(dec!(0.7)),
        };
        let trade = manager
            .create_from_strategy("ETHUSDT", &proposal)
            .await
            .unwrap();
        assert_eq!(trade.strategy_name.as_deref(), Some("RSI Momentum"));
        assert_eq!(trade.quantity, dec!(2));
    }
}
