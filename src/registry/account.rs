//! Account balance and cumulative statistics

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Mutable account cache, owned by the registry
///
/// Only the registry's closing transaction writes here; equity is derived
/// at read time from the active trades' marks and never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountState {
    /// Balance at registry creation
    pub initial_balance: Decimal,
    /// Current balance, updated by realized P&L on every closure
    pub balance: Decimal,
    /// Sum of all realized P&L
    pub total_pnl: Decimal,
    /// Closures with positive realized P&L
    pub winning_count: u32,
    /// Closures with negative realized P&L
    pub losing_count: u32,
}

impl AccountState {
    /// Create account state with a starting balance
    pub fn new(initial_balance: Decimal) -> Self {
        Self {
            initial_balance,
            balance: initial_balance,
            total_pnl: dec!(0),
            winning_count: 0,
            losing_count: 0,
        }
    }

    /// Book a closed trade's realized P&L
    ///
    /// A flat closure (realized exactly zero) counts as neither win nor
    /// loss.
    pub(crate) fn settle(&mut self, realized_pnl: Decimal) {
        self.balance += realized_pnl;
        self.total_pnl += realized_pnl;
        if realized_pnl > dec!(0) {
            self.winning_count += 1;
        } else if realized_pnl < dec!(0) {
            self.losing_count += 1;
        }
    }

    /// Win rate over decided closures, in [0, 1]
    pub fn win_rate(&self) -> Decimal {
        let decided = self.winning_count + self.losing_count;
        if decided == 0 {
            return dec!(0);
        }
        Decimal::from(self.winning_count) / Decimal::from(decided)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settle_updates_balance_and_counters() {
        let mut account = AccountState::new(dec!(10000));
        account.settle(dec!(300));
        account.settle(dec!(-100));
        account.settle(dec!(-100));

        assert_eq!(account.balance, dec!(10100));
        assert_eq!(account.total_pnl, dec!(100));
        assert_eq!(account.winning_count, 1);
        assert_eq!(account.losing_count, 2);
    }

    #[test]
    fn test_flat_closure_counts_neither() {
        let mut account = AccountState::new(dec!(10000));
        account.settle(dec!(0));
        assert_eq!(account.winning_count, 0);
        assert_eq!(account.losing_count, 0);
        assert_eq!(account.balance, dec!(10000));
    }

    #[test]
    fn test_win_rate() {
        let mut account = AccountState::new(dec!(1000));
        assert_eq!(account.win_rate(), dec!(0));

        account.settle(dec!(10));
        account.settle(dec!(10));
        account.settle(dec!(10));
        account.settle(dec!(-5));
        assert_eq!(account.win_rate(), dec!(0.75));
    }
}
