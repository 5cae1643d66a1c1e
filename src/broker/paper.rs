//! Paper execution gateway

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{Broker, BrokerError, Fill, Order, OrderId};

/// Paper gateway with simulated immediate fills
///
/// Fills every order at its own price. Orders whose notional exceeds the
/// paper balance are rejected the way a real gateway would reject for
/// insufficient margin.
pub struct PaperBroker {
    paper_balance: Decimal,
    fee_rate: Decimal,
    fills: Arc<RwLock<Vec<Fill>>>,
}

impl PaperBroker {
    /// Create a paper gateway with a starting balance
    pub fn new(paper_balance: Decimal) -> Self {
        Self {
            paper_balance,
            fee_rate: dec!(0),
            fills: Arc::new(RwLock::new(vec![])),
        }
    }

    /// Set the simulated fee rate
    pub fn with_fee_rate(mut self, fee_rate: Decimal) -> Self {
        self.fee_rate = fee_rate;
        self
    }

    /// All fills recorded so far
    pub async fn fills(&self) -> Vec<Fill> {
        self.fills.read().await.clone()
    }
}

#[async_trait]
impl Broker for PaperBroker {
    async fn place_order(&self, order: Order) -> Result<Fill, BrokerError> {
        if order.quantity <= dec!(0) {
            return Err(BrokerError::Rejected(format!(
                "non-positive quantity {}",
                order.quantity
            )));
        }

        let notional = order.quantity * order.price;
        if notional > self.paper_balance {
            return Err(BrokerError::InsufficientMargin {
                required: notional,
                available: self.paper_balance,
            });
        }

        let fill = Fill {
            order_id: OrderId::new_v4(),
            symbol: order.symbol,
            side: order.side,
            price: order.price,
            quantity: order.quantity,
            timestamp: Utc::now(),
            fees: notional * self.fee_rate,
        };

        let mut fills = self.fills.write().await;
        fills.push(fill.clone());

        tracing::info!(order_id = %fill.order_id, symbol = %fill.symbol, "Paper order filled");
        Ok(fill)
    }

    async fn cancel_order(&self, id: OrderId) -> Result<(), BrokerError> {
        tracing::info!(order_id = %id, "Paper order cancelled");
        Ok(())
    }

    async fn balance(&self) -> Result<Decimal, BrokerError> {
        Ok(self.paper_balance)
    }
}
