//! Order and fill types

use crate::trade::Direction;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Order identifier
pub type OrderId = Uuid;

/// Order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Side that opens a position in the given direction
    pub fn entry_for(direction: Direction) -> Self {
        match direction {
            Direction::Long => OrderSide::Buy,
            Direction::Short => OrderSide::Sell,
        }
    }

    /// Side that closes a position in the given direction
    pub fn exit_for(direction: Direction) -> Self {
        match direction {
            Direction::Long => OrderSide::Sell,
            Direction::Short => OrderSide::Buy,
        }
    }
}

/// Order type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    /// Immediate execution at market
    Market,
    /// Execution at the specified price
    Limit,
}

/// An order submitted to the execution gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub symbol: String,
    pub side: OrderSide,
    pub price: Decimal,
    pub quantity: Decimal,
    pub order_type: OrderType,
}

/// An executed order
///
/// `quantity` is the filled amount; a live gateway may fill less than the
/// order asked for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fill {
    pub order_id: OrderId,
    pub symbol: String,
    pub side: OrderSide,
    pub price: Decimal,
    pub quantity: Decimal,
    pub timestamp: DateTime<Utc>,
    pub fees: Decimal,
}

/// Execution gateway failures
#[derive(Debug, Error)]
pub enum BrokerError {
    /// Order notional exceeds available balance
    #[error("insufficient margin: required {required}, available {available}")]
    InsufficientMargin {
        required: Decimal,
        available: Decimal,
    },
    /// Gateway does not know the symbol
    #[error("unknown symbol {0}")]
    InvalidSymbol(String),
    /// Gateway rejected the order
    #[error("order rejected: {0}")]
    Rejected(String),
    /// Connectivity failure
    #[error("broker request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_exit_sides() {
        assert_eq!(OrderSide::entry_for(Direction::Long), OrderSide::Buy);
        assert_eq!(OrderSide::entry_for(Direction::Short), OrderSide::Sell);
        assert_eq!(OrderSide::exit_for(Direction::Long), OrderSide::Sell);
        assert_eq!(OrderSide::exit_for(Direction::Short), OrderSide::Buy);
    }

    #[test]
    fn test_order_serde() {
        let order = Order {
            symbol: "BTCUSDT".to_string(),
            side: OrderSide::Buy,
            price: Decimal::new(45000, 0),
            quantity: Decimal::new(2, 1),
            order_type: OrderType::Limit,
        };
        let json = serde_json::to_string(&order).unwrap();
        assert!(json.contains("\"BUY\""));
        assert!(json.contains("\"limit\""));
    }
}
