//! Position sizing and risk/reward arithmetic
//!
//! Pure functions, no state: position size is the capital risked per trade
//! divided by the per-unit distance between entry and stop loss.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::types::{RiskError, RiskReward};
use crate::trade::Direction;

/// Calculate position size from account balance and risk percentage
///
/// `quantity = (balance * risk_percent / 100) / |entry - sl|`
///
/// Fails if any input is non-positive or entry equals stop loss.
pub fn position_size(
    balance: Decimal,
    risk_percent: Decimal,
    entry: Decimal,
    sl: Decimal,
) -> Result<Decimal, RiskError> {
    require_positive("balance", balance)?;
    require_positive("risk_percent", risk_percent)?;
    require_positive("entry_price", entry)?;
    require_positive("sl_price", sl)?;

    let per_unit = (entry - sl).abs();
    if per_unit == dec!(0) {
        return Err(RiskError::ZeroRiskDistance(entry));
    }

    let risk_amount = balance * risk_percent / dec!(100);
    Ok(risk_amount / per_unit)
}

/// Calculate risk amount, reward amount and their ratio for a sized trade
pub fn risk_reward(
    entry: Decimal,
    sl: Decimal,
    target: Decimal,
    quantity: Decimal,
) -> Result<RiskReward, RiskError> {
    require_positive("quantity", quantity)?;

    let risk_amount = (entry - sl).abs() * quantity;
    if risk_amount == dec!(0) {
        return Err(RiskError::ZeroRiskDistance(entry));
    }
    let reward_amount = (target - entry).abs() * quantity;

    Ok(RiskReward {
        risk_amount,
        reward_amount,
        ratio: reward_amount / risk_amount,
    })
}

/// Enforce the entry/SL/target ordering invariant for a direction
///
/// LONG: `sl < entry < target`. SHORT: `sl > entry > target`.
pub fn validate_direction(
    direction: Direction,
    entry: Decimal,
    sl: Decimal,
    target: Decimal,
) -> Result<(), RiskError> {
    require_positive("entry_price", entry)?;
    require_positive("sl_price", sl)?;
    require_positive("target_price", target)?;

    let ok = match direction {
        Direction::Long => sl < entry && entry < target,
        Direction::Short => sl > entry && entry > target,
    };

    if ok {
        Ok(())
    } else {
        Err(RiskError::BadOrdering {
            direction,
            expected: match direction {
                Direction::Long => "sl < entry < target",
                Direction::Short => "sl > entry > target",
            },
            entry,
            sl,
            target,
        })
    }
}

fn require_positive(field: &'static str, value: Decimal) -> Result<(), RiskError> {
    if value > dec!(0) {
        Ok(())
    } else {
        Err(RiskError::NonPositive { field, value })
    }
}
