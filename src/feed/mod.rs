//! Market data module
//!
//! Supplies current prices for monitored symbols. The feed is an external
//! collaborator: it may be slow, rate-limited or temporarily unavailable,
//! and the monitor is expected to ride through its failures.

mod rest;

pub use rest::{RestConfig, RestPriceSource};

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

/// Transient price feed failures
#[derive(Debug, Error)]
pub enum FeedError {
    /// Transport-level failure
    #[error("price request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Feed answered with a non-success status
    #[error("price feed returned status {status} for {symbol}")]
    Status {
        symbol: String,
        status: reqwest::StatusCode,
    },
    /// Feed answered but the price could not be parsed
    #[error("malformed price for {symbol}: {raw}")]
    MalformedPrice { symbol: String, raw: String },
}

/// Trait for price source implementations
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Current price for a symbol
    async fn current_price(&self, symbol: &str) -> Result<Decimal, FeedError>;
}
