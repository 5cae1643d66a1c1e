//! REST price source
//!
//! Polls a Binance-compatible spot ticker endpoint. One request per symbol
//! per monitor tick keeps this well under public rate limits.

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

use super::{FeedError, PriceSource};

/// Default ticker endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";

/// Configuration for the REST price source
#[derive(Debug, Clone)]
pub struct RestConfig {
    /// Base URL of the exchange REST API
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TickerResponse {
    #[allow(dead_code)]
    symbol: String,
    price: String,
}

/// Price source backed by a spot ticker REST endpoint
pub struct RestPriceSource {
    config: RestConfig,
    client: Client,
}

impl RestPriceSource {
    /// Create a price source with default configuration
    pub fn new() -> Self {
        Self::with_config(RestConfig::default())
    }

    /// Create a price source with custom configuration
    pub fn with_config(config: RestConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }
}

impl Default for RestPriceSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceSource for RestPriceSource {
    async fn current_price(&self, symbol: &str) -> Result<Decimal, FeedError> {
        let url = format!("{}/api/v3/ticker/price", self.config.base_url);

        tracing::debug!(url = %url, symbol = %symbol, "Fetching ticker price");

        let response = self
            .client
            .get(&url)
            .query(&[("symbol", symbol)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FeedError::Status {
                symbol: symbol.to_string(),
                status: response.status(),
            });
        }

        let ticker: TickerResponse = response.json().await?;
        Decimal::from_str(&ticker.price).map_err(|_| FeedError::MalformedPrice {
            symbol: symbol.to_string(),
            raw: ticker.price,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RestConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_ticker_parse() {
        let body = r#"{"symbol":"BTCUSDT","price":"45123.45000000"}"#;
        let ticker: TickerResponse = serde_json::from_str(body).unwrap();
        assert_eq!(ticker.price, "45123.45000000");
        assert_eq!(
            Decimal::from_str(&ticker.price).unwrap(),
            Decimal::from_str("45123.45").unwrap()
        );
    }
}
