//! Trade construction
//!
//! Validates invariants and delegates sizing to the risk engine. Both the
//! manual path and the strategy path funnel through the same build step so
//! a trade can only exist with a consistent direction/SL/target geometry.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{Direction, Trade};
use crate::risk::{self, RiskError};

/// Parameters for a manually specified trade
#[derive(Debug, Clone)]
pub struct ManualTrade {
    pub symbol: String,
    pub direction: Direction,
    pub entry_price: Decimal,
    pub sl_price: Decimal,
    pub target_price: Decimal,
    /// Percentage of balance risked if SL is hit
    pub risk_percent: Decimal,
    /// Balance used for sizing
    pub balance: Decimal,
    /// Explicit position size; sized from risk when `None`
    pub quantity: Option<Decimal>,
    pub strategy_name: Option<String>,
}

/// Entry/exit proposal produced by an external signal generator
///
/// The engine never computes indicators; it only consumes the proposal's
/// price levels and label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyProposal {
    pub direction: Direction,
    pub entry_price: Decimal,
    pub stop_loss: Decimal,
    pub target: Decimal,
    /// Name of the producing strategy
    pub strategy: String,
    /// Signal confidence, informational only
    pub confidence: Option<Decimal>,
}

/// Builds validated `Created` trades
#[derive(Debug, Clone, Default)]
pub struct TradeFactory {
    /// Hard cap on computed position size; sized quantities above the cap
    /// are clamped, never rejected
    pub max_quantity: Option<Decimal>,
}

impl TradeFactory {
    /// Create a factory without a position size cap
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the position size cap
    pub fn with_max_quantity(mut self, max_quantity: Decimal) -> Self {
        self.max_quantity = Some(max_quantity);
        self
    }

    /// Build a trade from explicit manual parameters
    pub fn from_manual(&self, params: ManualTrade) -> Result<Trade, RiskError> {
        risk::validate_direction(
            params.direction,
            params.entry_price,
            params.sl_price,
            params.target_price,
        )?;

        let quantity = match params.quantity {
            Some(q) if q <= dec!(0) => {
                return Err(RiskError::NonPositive {
                    field: "quantity",
                    value: q,
                })
            }
            Some(q) => q,
            None => {
                let sized = risk::position_size(
                    params.balance,
                    params.risk_percent,
                    params.entry_price,
                    params.sl_price,
                )?;
                match self.max_quantity {
                    Some(cap) => sized.min(cap),
                    None => sized,
                }
            }
        };

        let rr = risk::risk_reward(
            params.entry_price,
            params.sl_price,
            params.target_price,
            quantity,
        )?;

        let trade = Trade::new(
            params.symbol,
            params.direction,
            params.entry_price,
            params.sl_price,
            params.target_price,
            quantity,
            rr,
            params.strategy_name,
        );

        tracing::info!(
            id = %trade.id,
            symbol = %trade.symbol,
            direction = %trade.direction,
            quantity = %trade.quantity,
            ratio = %trade.risk_reward_ratio,
            "Trade created"
        );

        Ok(trade)
    }

    /// Build a trade from a strategy proposal and the current balance
    pub fn from_strategy(
        &self,
        symbol: &str,
        proposal: &StrategyProposal,
        balance: Decimal,
        risk_percent: Decimal,
    ) -> Result<Trade, RiskError> {
        if proposal.strategy.trim().is_empty() {
            return Err(RiskError::BadProposal(
                "strategy label is empty".to_string(),
            ));
        }
        if proposal.entry_price <= dec!(0)
            || proposal.stop_loss <= dec!(0)
            || proposal.target <= dec!(0)
        {
            return Err(RiskError::BadProposal(format!(
                "non-positive price level in proposal: entry={} sl={} target={}",
                proposal.entry_price, proposal.stop_loss, proposal.target
            )));
        }

        self.from_manual(ManualTrade {
            symbol: symbol.to_string(),
            direction: proposal.direction,
            entry_price: proposal.entry_price,
            sl_price: proposal.stop_loss,
            target_price: proposal.target,
            risk_percent,
            balance,
            quantity: None,
            strategy_name: Some(proposal.strategy.clone()),
        })
    }
}
