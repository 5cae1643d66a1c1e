//! Trade entity and state machine
//!
//! A trade moves `Created -> Active -> {SlHit, TargetHit, ManuallyClosed}`.
//! Entry, stop loss and target are immutable after creation; the derived
//! risk/reward numbers are computed once by the factory and never touched
//! again. All terminal transitions are idempotent.

mod factory;
mod types;

pub use factory::{ManualTrade, StrategyProposal, TradeFactory};
pub use types::{CloseReason, Direction, ExitTrigger, TradeError, TradeStatus};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::risk::RiskReward;

/// Trade identifier
pub type TradeId = Uuid;

/// Outcome of a terminal transition attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// The transition was applied by this caller
    Applied,
    /// The trade was already terminal; nothing changed
    AlreadyClosed,
}

/// A risk-sized trade tracked through its lifecycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    /// Unique identifier, assigned at creation
    pub id: TradeId,
    /// Instrument symbol
    pub symbol: String,
    /// Position direction, immutable after creation
    pub direction: Direction,
    /// Entry price
    pub entry_price: Decimal,
    /// Stop loss price
    pub sl_price: Decimal,
    /// Target price
    pub target_price: Decimal,
    /// Position size in units
    pub quantity: Decimal,
    /// Capital lost if SL is hit
    pub risk_amount: Decimal,
    /// Capital gained if target is hit
    pub reward_amount: Decimal,
    /// reward_amount / risk_amount
    pub risk_reward_ratio: Decimal,
    /// Lifecycle status
    pub status: TradeStatus,
    /// Label of the strategy that proposed the trade, informational only
    pub strategy_name: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Activation timestamp, set on order fill
    pub activated_at: Option<DateTime<Utc>>,
    /// Closure timestamp, set by the terminal transition
    pub closed_at: Option<DateTime<Utc>>,
    /// Exit price, set by the terminal transition
    pub exit_price: Option<Decimal>,
    /// Profit or loss locked in at closure, set exactly once
    pub realized_pnl: Option<Decimal>,
    /// Mark-to-market P&L while active, zero otherwise
    pub unrealized_pnl: Decimal,
}

impl Trade {
    /// Build a new `Created` trade from validated parameters
    pub fn new(
        symbol: impl Into<String>,
        direction: Direction,
        entry_price: Decimal,
        sl_price: Decimal,
        target_price: Decimal,
        quantity: Decimal,
        risk_reward: RiskReward,
        strategy_name: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            symbol: symbol.into(),
            direction,
            entry_price,
            sl_price,
            target_price,
            quantity,
            risk_amount: risk_reward.risk_amount,
            reward_amount: risk_reward.reward_amount,
            risk_reward_ratio: risk_reward.ratio,
            status: TradeStatus::Created,
            strategy_name,
            created_at: Utc::now(),
            activated_at: None,
            closed_at: None,
            exit_price: None,
            realized_pnl: None,
            unrealized_pnl: dec!(0),
        }
    }

    /// Mark the trade active after a successful order placement
    pub fn activate(&mut self, at: DateTime<Utc>) -> Result<(), TradeError> {
        if self.status != TradeStatus::Created {
            return Err(TradeError::InvalidTransition {
                action: "activate",
                status: self.status,
            });
        }
        self.status = TradeStatus::Active;
        self.activated_at = Some(at);
        Ok(())
    }

    /// Apply a terminal transition
    ///
    /// Idempotent: closing an already-terminal trade reports
    /// [`CloseOutcome::AlreadyClosed`] and mutates nothing. Closing a
    /// `Created` trade is rejected; trades that never activated stay in
    /// the abandoned bucket.
    pub fn close(
        &mut self,
        reason: CloseReason,
        exit_price: Decimal,
        at: DateTime<Utc>,
    ) -> Result<CloseOutcome, TradeError> {
        if self.status.is_terminal() {
            return Ok(CloseOutcome::AlreadyClosed);
        }
        if self.status == TradeStatus::Created {
            return Err(TradeError::InvalidTransition {
                action: "close",
                status: self.status,
            });
        }

        self.status = reason.into();
        self.closed_at = Some(at);
        self.exit_price = Some(exit_price);
        self.realized_pnl = Some(self.pnl_at(exit_price));
        self.unrealized_pnl = dec!(0);
        Ok(CloseOutcome::Applied)
    }

    /// Check whether a price observation fires an exit condition
    ///
    /// Stop loss takes precedence when a single observation satisfies both
    /// thresholds (gapped or stale tick): capital preservation over profit
    /// capture.
    pub fn evaluate(&self, price: Decimal) -> Option<ExitTrigger> {
        if self.status != TradeStatus::Active {
            return None;
        }
        let (sl_hit, target_hit) = match self.direction {
            Direction::Long => (price <= self.sl_price, price >= self.target_price),
            Direction::Short => (price >= self.sl_price, price <= self.target_price),
        };
        if sl_hit {
            Some(ExitTrigger::StopLoss)
        } else if target_hit {
            Some(ExitTrigger::Target)
        } else {
            None
        }
    }

    /// Signed P&L of the position at the given price
    pub fn pnl_at(&self, price: Decimal) -> Decimal {
        match self.direction {
            Direction::Long => (price - self.entry_price) * self.quantity,
            Direction::Short => (self.entry_price - price) * self.quantity,
        }
    }

    /// Distance of the stop loss from entry, as a percentage of entry
    pub fn sl_distance_pct(&self) -> Decimal {
        ((self.sl_price - self.entry_price) / self.entry_price).abs() * dec!(100)
    }

    /// Distance of the target from entry, as a percentage of entry
    pub fn target_distance_pct(&self) -> Decimal {
        ((self.target_price - self.entry_price) / self.entry_price).abs() * dec!(100)
    }

    /// Whether the trade is currently monitored
    pub fn is_active(&self) -> bool {
        self.status == TradeStatus::Active
    }

    /// Whether the trade has reached a terminal status
    pub fn is_closed(&self) -> bool {
        self.status.is_terminal()
    }
}
