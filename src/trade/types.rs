//! Trade enums and transition errors

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Position direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// Profits when price rises
    Long,
    /// Profits when price falls
    Short,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
        }
    }
}

/// Trade lifecycle status
///
/// `SlHit`, `TargetHit` and `ManuallyClosed` are terminal; together they
/// form the "closed" classification, each recording why the trade ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeStatus {
    /// Built and registered, order not yet placed
    Created,
    /// Order filled, monitored against SL/target
    Active,
    /// Closed by stop loss
    SlHit,
    /// Closed by target
    TargetHit,
    /// Closed by explicit request
    ManuallyClosed,
}

impl TradeStatus {
    /// Whether this status ends the trade's lifecycle
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TradeStatus::SlHit | TradeStatus::TargetHit | TradeStatus::ManuallyClosed
        )
    }
}

/// Why a trade is being closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    /// Price crossed the stop loss against the position
    StopLoss,
    /// Price crossed the target favorably
    Target,
    /// External close request
    Manual,
}

impl From<CloseReason> for TradeStatus {
    fn from(reason: CloseReason) -> Self {
        match reason {
            CloseReason::StopLoss => TradeStatus::SlHit,
            CloseReason::Target => TradeStatus::TargetHit,
            CloseReason::Manual => TradeStatus::ManuallyClosed,
        }
    }
}

/// Exit condition fired by a price observation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitTrigger {
    /// Stop loss threshold crossed
    StopLoss,
    /// Target threshold crossed
    Target,
}

impl From<ExitTrigger> for CloseReason {
    fn from(trigger: ExitTrigger) -> Self {
        match trigger {
            ExitTrigger::StopLoss => CloseReason::StopLoss,
            ExitTrigger::Target => CloseReason::Target,
        }
    }
}

/// Invalid state machine transitions
#[derive(Debug, Error)]
pub enum TradeError {
    /// The requested transition is not allowed from the current status
    #[error("cannot {action} a {status:?} trade")]
    InvalidTransition {
        action: &'static str,
        status: TradeStatus,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(!TradeStatus::Created.is_terminal());
        assert!(!TradeStatus::Active.is_terminal());
        assert!(TradeStatus::SlHit.is_terminal());
        assert!(TradeStatus::TargetHit.is_terminal());
        assert!(TradeStatus::ManuallyClosed.is_terminal());
    }

    #[test]
    fn test_close_reason_to_status() {
        assert_eq!(TradeStatus::from(CloseReason::StopLoss), TradeStatus::SlHit);
        assert_eq!(TradeStatus::from(CloseReason::Target), TradeStatus::TargetHit);
        assert_eq!(
            TradeStatus::from(CloseReason::Manual),
            TradeStatus::ManuallyClosed
        );
    }

    #[test]
    fn test_status_serde_format() {
        let json = serde_json::to_string(&TradeStatus::SlHit).unwrap();
        assert_eq!(json, "\"SL_HIT\"");
        let json = serde_json::to_string(&Direction::Long).unwrap();
        assert_eq!(json, "\"LONG\"");
    }
}
