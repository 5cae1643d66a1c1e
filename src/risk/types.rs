//! Risk validation types

use crate::trade::Direction;
use rust_decimal::Decimal;
use thiserror::Error;

/// Validation errors raised by sizing and trade construction
#[derive(Debug, Error)]
pub enum RiskError {
    /// An input that must be strictly positive was not
    #[error("{field} must be positive, got {value}")]
    NonPositive {
        field: &'static str,
        value: Decimal,
    },
    /// Entry and stop loss coincide, so risk per unit is zero
    #[error("entry and stop loss are both {0}: risk per unit is zero")]
    ZeroRiskDistance(Decimal),
    /// Entry/SL/target ordering does not match the direction
    #[error("{direction} requires {expected}, got entry={entry} sl={sl} target={target}")]
    BadOrdering {
        direction: Direction,
        expected: &'static str,
        entry: Decimal,
        sl: Decimal,
        target: Decimal,
    },
    /// Strategy proposal is missing or malformed
    #[error("strategy proposal rejected: {0}")]
    BadProposal(String),
}

/// Risk and reward amounts derived from a sized trade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskReward {
    /// Capital lost if the stop loss is hit
    pub risk_amount: Decimal,
    /// Capital gained if the target is hit
    pub reward_amount: Decimal,
    /// reward_amount / risk_amount
    pub ratio: Decimal,
}
