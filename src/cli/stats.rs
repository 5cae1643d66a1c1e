//! Stats command implementation
//!
//! The journal is the read-side of the engine: every creation and
//! transition appended one record, so the last record per trade id is the
//! trade's latest state.

use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::config::Config;
use crate::journal::{JsonlJournal, TradeRecord};
use crate::trade::{Direction, TradeId};

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Journal file to summarize (overrides configuration)
    #[arg(long)]
    pub journal: Option<PathBuf>,
}

impl StatsArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let path = self.journal.as_ref().unwrap_or(&config.journal.path);
        let records = JsonlJournal::read_all(path).await?;
        if records.is_empty() {
            println!("No trades journaled at {}", path.display());
            return Ok(());
        }

        let latest = latest_per_trade(records);

        let mut realized = dec!(0);
        let mut wins = 0u32;
        let mut losses = 0u32;
        let mut active = 0usize;
        let mut closed = 0usize;
        let mut pending = 0usize;
        let mut longs = 0usize;
        let mut shorts = 0usize;

        for record in latest.values() {
            match record.direction {
                Direction::Long => longs += 1,
                Direction::Short => shorts += 1,
            }
            if record.status.is_terminal() {
                closed += 1;
                if let Some(pnl) = record.realized_pnl {
                    realized += pnl;
                    if pnl > dec!(0) {
                        wins += 1;
                    } else if pnl < dec!(0) {
                        losses += 1;
                    }
                }
            } else if record.activated_at.is_some() {
                active += 1;
            } else {
                pending += 1;
            }
        }

        println!("Journal: {}", path.display());
        println!("  Trades:   {} ({} long / {} short)", latest.len(), longs, shorts);
        println!(
            "  Status:   {} active, {} closed, {} pending",
            active, closed, pending
        );
        println!("  Realized: {}", realized);
        if wins + losses > 0 {
            let win_rate = Decimal::from(wins) / Decimal::from(wins + losses);
            println!(
                "  Outcomes: {} wins / {} losses (win rate {:.2})",
                wins, losses, win_rate
            );
        }
        Ok(())
    }
}

fn latest_per_trade(records: Vec<TradeRecord>) -> HashMap<TradeId, TradeRecord> {
    let mut latest: HashMap<TradeId, TradeRecord> = HashMap::new();
    for record in records {
        match latest.get(&record.id) {
            Some(existing) if existing.recorded_at > record.recorded_at => {}
            _ => {
                latest.insert(record.id, record);
            }
        }
    }
    latest
}
