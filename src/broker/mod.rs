//! Execution gateway module
//!
//! Order placement against a broker. Only the paper gateway ships here;
//! live gateways are external collaborators behind the same trait.

mod paper;
mod types;

pub use paper::PaperBroker;
pub use types::{BrokerError, Fill, Order, OrderId, OrderSide, OrderType};

use async_trait::async_trait;
use rust_decimal::Decimal;

/// Trait for execution gateway implementations
#[async_trait]
pub trait Broker: Send + Sync {
    /// Submit an order, returning the fill confirmation
    async fn place_order(&self, order: Order) -> Result<Fill, BrokerError>;
    /// Cancel a resting order
    async fn cancel_order(&self, id: OrderId) -> Result<(), BrokerError>;
    /// Current account balance
    async fn balance(&self) -> Result<Decimal, BrokerError>;
}
