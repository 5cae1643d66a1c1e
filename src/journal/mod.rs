//! Trade record journal
//!
//! The engine is the producer side of persistence: it emits a flat record
//! on every creation and every transition and hands it to a sink. Durable
//! storage is an external collaborator; the JSON-lines journal here is the
//! reference sink.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::trade::{Direction, Trade, TradeId, TradeStatus};

/// Flat, serializable snapshot of a trade at a point in its lifecycle
///
/// `id` is the natural key; a trade appears once per lifecycle event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    pub id: TradeId,
    pub symbol: String,
    pub direction: Direction,
    pub entry_price: Decimal,
    pub sl_price: Decimal,
    pub target_price: Decimal,
    pub quantity: Decimal,
    pub risk_amount: Decimal,
    pub reward_amount: Decimal,
    pub risk_reward_ratio: Decimal,
    pub status: TradeStatus,
    pub strategy_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub activated_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub exit_price: Option<Decimal>,
    pub realized_pnl: Option<Decimal>,
    pub unrealized_pnl: Decimal,
    /// When the record was handed to the sink
    pub recorded_at: DateTime<Utc>,
}

impl From<&Trade> for TradeRecord {
    fn from(trade: &Trade) -> Self {
        Self {
            id: trade.id,
            symbol: trade.symbol.clone(),
            direction: trade.direction,
            entry_price: trade.entry_price,
            sl_price: trade.sl_price,
            target_price: trade.target_price,
            quantity: trade.quantity,
            risk_amount: trade.risk_amount,
            reward_amount: trade.reward_amount,
            risk_reward_ratio: trade.risk_reward_ratio,
            status: trade.status,
            strategy_name: trade.strategy_name.clone(),
            created_at: trade.created_at,
            activated_at: trade.activated_at,
            closed_at: trade.closed_at,
            exit_price: trade.exit_price,
            realized_pnl: trade.realized_pnl,
            unrealized_pnl: trade.unrealized_pnl,
            recorded_at: Utc::now(),
        }
    }
}

/// Trait for persistence sink implementations
#[async_trait]
pub trait TradeSink: Send + Sync {
    /// Hand one record to the sink
    async fn append(&self, record: TradeRecord) -> anyhow::Result<()>;
}

/// Append-only JSON-lines journal
pub struct JsonlJournal {
    file: Mutex<File>,
}

impl JsonlJournal {
    /// Open or create the journal file in append mode
    pub async fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())
            .await?;
        tracing::debug!(path = %path.as_ref().display(), "Journal opened");
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Read all records back from a journal file
    pub async fn read_all(path: impl AsRef<Path>) -> anyhow::Result<Vec<TradeRecord>> {
        let content = tokio::fs::read_to_string(path.as_ref()).await?;
        let mut records = Vec::new();
        for line in content.lines().filter(|l| !l.trim().is_empty()) {
            records.push(serde_json::from_str(line)?);
        }
        Ok(records)
    }
}

#[async_trait]
impl TradeSink for JsonlJournal {
    async fn append(&self, record: TradeRecord) -> anyhow::Result<()> {
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let mut file = self.file.lock().await;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
