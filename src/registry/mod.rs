//! Trade registry
//!
//! Concurrency-safe store of every trade, indexed by id, direction and
//! status. `apply_transition` is the single serialization point for
//! terminal transitions: the monitor loop and manual close requests race
//! here and the loser observes a no-op, never a second mutation. Account
//! state is mutated only inside that same write window.

mod account;

pub use account::AccountState;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::trade::{CloseOutcome, CloseReason, Direction, Trade, TradeError, TradeId, TradeStatus};

/// Registry errors
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A trade with this id is already registered
    #[error("trade {0} already registered")]
    DuplicateId(TradeId),
    /// No trade with this id
    #[error("trade {0} not found")]
    NotFound(TradeId),
    /// The underlying state machine rejected the transition
    #[error(transparent)]
    Trade(#[from] TradeError),
}

/// Result of a terminal transition request
#[derive(Debug, Clone)]
pub enum TransitionOutcome {
    /// This caller closed the trade
    Applied(Trade),
    /// The trade was already terminal; the existing record is returned
    AlreadyClosed(Trade),
}

impl TransitionOutcome {
    /// The trade record after the request, applied or not
    pub fn trade(&self) -> &Trade {
        match self {
            TransitionOutcome::Applied(trade) | TransitionOutcome::AlreadyClosed(trade) => trade,
        }
    }
}

/// Aggregate snapshot of the registry and account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statistics {
    pub initial_balance: Decimal,
    pub balance: Decimal,
    /// balance + sum of active trades' unrealized P&L
    pub equity: Decimal,
    pub total_pnl: Decimal,
    pub total_trades: usize,
    pub active_trades: usize,
    pub closed_trades: usize,
    /// Created trades that never activated
    pub pending_trades: usize,
    pub long_positions: usize,
    pub short_positions: usize,
    pub winning_trades: u32,
    pub losing_trades: u32,
    /// winning / (winning + losing), in [0, 1]
    pub win_rate: Decimal,
}

struct RegistryInner {
    trades: HashMap<TradeId, Trade>,
    // Index buckets are caches over `trades`, rebuilt on every transition
    active: HashSet<TradeId>,
    closed: HashSet<TradeId>,
    longs: HashSet<TradeId>,
    shorts: HashSet<TradeId>,
    account: AccountState,
}

/// Concurrency-safe trade store and statistics aggregator
pub struct TradeRegistry {
    inner: RwLock<RegistryInner>,
}

impl TradeRegistry {
    /// Create an empty registry with a starting balance
    pub fn new(initial_balance: Decimal) -> Self {
        Self {
            inner: RwLock::new(RegistryInner {
                trades: HashMap::new(),
                active: HashSet::new(),
                closed: HashSet::new(),
                longs: HashSet::new(),
                shorts: HashSet::new(),
                account: AccountState::new(initial_balance),
            }),
        }
    }

    /// Register a new trade
    pub async fn add(&self, trade: Trade) -> Result<Trade, RegistryError> {
        let mut inner = self.inner.write().await;
        if inner.trades.contains_key(&trade.id) {
            return Err(RegistryError::DuplicateId(trade.id));
        }
        inner.trades.insert(trade.id, trade.clone());
        tracing::debug!(id = %trade.id, symbol = %trade.symbol, "Trade registered");
        Ok(trade)
    }

    /// Fetch a snapshot of a trade
    pub async fn get(&self, id: TradeId) -> Result<Trade, RegistryError> {
        let inner = self.inner.read().await;
        inner
            .trades
            .get(&id)
            .cloned()
            .ok_or(RegistryError::NotFound(id))
    }

    /// Activate a `Created` trade and index it for monitoring
    pub async fn activate(
        &self,
        id: TradeId,
        at: DateTime<Utc>,
    ) -> Result<Trade, RegistryError> {
        let mut inner = self.inner.write().await;
        let trade = inner
            .trades
            .get_mut(&id)
            .ok_or(RegistryError::NotFound(id))?;
        trade.activate(at)?;
        let direction = trade.direction;
        let snapshot = trade.clone();

        inner.active.insert(id);
        match direction {
            Direction::Long => inner.longs.insert(id),
            Direction::Short => inner.shorts.insert(id),
        };
        tracing::info!(id = %id, "Trade activated");
        Ok(snapshot)
    }

    /// Update the mark-to-market P&L of an active trade
    ///
    /// A no-op (`Ok(None)`) if the trade closed between the caller's
    /// snapshot and this call.
    pub async fn mark_price(
        &self,
        id: TradeId,
        price: Decimal,
    ) -> Result<Option<Decimal>, RegistryError> {
        let mut inner = self.inner.write().await;
        let trade = inner
            .trades
            .get_mut(&id)
            .ok_or(RegistryError::NotFound(id))?;
        if !trade.is_active() {
            return Ok(None);
        }
        trade.unrealized_pnl = trade.pnl_at(price);
        Ok(Some(trade.unrealized_pnl))
    }

    /// Apply a terminal transition: the only path that closes trades
    ///
    /// Atomically updates the trade, moves it between index buckets and
    /// settles the account. Idempotent on terminal state: concurrent
    /// callers never both mutate.
    pub async fn apply_transition(
        &self,
        id: TradeId,
        reason: CloseReason,
        exit_price: Decimal,
        at: DateTime<Utc>,
    ) -> Result<TransitionOutcome, RegistryError> {
        let mut inner = self.inner.write().await;
        let trade = inner
            .trades
            .get_mut(&id)
            .ok_or(RegistryError::NotFound(id))?;

        match trade.close(reason, exit_price, at)? {
            CloseOutcome::AlreadyClosed => {
                let snapshot = trade.clone();
                tracing::debug!(id = %id, status = ?snapshot.status, "Transition no-op, already closed");
                Ok(TransitionOutcome::AlreadyClosed(snapshot))
            }
            CloseOutcome::Applied => {
                let snapshot = trade.clone();
                let realized = snapshot.realized_pnl.unwrap_or(dec!(0));

                inner.active.remove(&id);
                inner.longs.remove(&id);
                inner.shorts.remove(&id);
                inner.closed.insert(id);
                inner.account.settle(realized);

                tracing::info!(
                    id = %id,
                    status = ?snapshot.status,
                    exit_price = %exit_price,
                    realized_pnl = %realized,
                    balance = %inner.account.balance,
                    "Trade closed"
                );
                Ok(TransitionOutcome::Applied(snapshot))
            }
        }
    }

    /// Snapshot of all active trades
    pub async fn list_active(&self) -> Vec<Trade> {
        let inner = self.inner.read().await;
        inner
            .active
            .iter()
            .filter_map(|id| inner.trades.get(id))
            .cloned()
            .collect()
    }

    /// Snapshot of all closed trades
    pub async fn list_closed(&self) -> Vec<Trade> {
        let inner = self.inner.read().await;
        inner
            .closed
            .iter()
            .filter_map(|id| inner.trades.get(id))
            .cloned()
            .collect()
    }

    /// Snapshot of created trades that never activated (abandoned bucket)
    pub async fn list_pending(&self) -> Vec<Trade> {
        let inner = self.inner.read().await;
        inner
            .trades
            .values()
            .filter(|t| t.status == TradeStatus::Created)
            .cloned()
            .collect()
    }

    /// Snapshot of active trades in one direction
    pub async fn list_by_direction(&self, direction: Direction) -> Vec<Trade> {
        let inner = self.inner.read().await;
        let bucket = match direction {
            Direction::Long => &inner.longs,
            Direction::Short => &inner.shorts,
        };
        bucket
            .iter()
            .filter_map(|id| inner.trades.get(id))
            .cloned()
            .collect()
    }

    /// Aggregate statistics snapshot
    pub async fn statistics(&self) -> Statistics {
        let inner = self.inner.read().await;
        let unrealized: Decimal = inner
            .active
            .iter()
            .filter_map(|id| inner.trades.get(id))
            .map(|t| t.unrealized_pnl)
            .sum();
        let pending = inner
            .trades
            .values()
            .filter(|t| t.status == TradeStatus::Created)
            .count();

        Statistics {
            initial_balance: inner.account.initial_balance,
            balance: inner.account.balance,
            equity: inner.account.balance + unrealized,
            total_pnl: inner.account.total_pnl,
            total_trades: inner.trades.len(),
            active_trades: inner.active.len(),
            closed_trades: inner.closed.len(),
            pending_trades: pending,
            long_positions: inner.longs.len(),
            short_positions: inner.shorts.len(),
            winning_trades: inner.account.winning_count,
            losing_trades: inner.account.losing_count,
            win_rate: inner.account.win_rate(),
        }
    }
}
