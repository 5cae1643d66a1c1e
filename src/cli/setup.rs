//! Setup command implementation

use clap::Args;
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::broker::{Broker, PaperBroker};
use crate::config::Config;
use crate::feed::{RestConfig, RestPriceSource};
use crate::journal::{JsonlJournal, TradeSink};
use crate::manager::{TradeManager, TradeRequest};
use crate::monitor::Monitor;
use crate::registry::TradeRegistry;
use crate::trade::{Direction, Trade, TradeFactory};

#[derive(Args, Debug)]
pub struct SetupArgs {
    /// Trading symbol
    #[arg(long)]
    pub symbol: String,

    /// Position direction
    #[arg(long, value_enum)]
    pub direction: Direction,

    /// Entry price
    #[arg(long)]
    pub entry: Decimal,

    /// Stop loss price
    #[arg(long)]
    pub sl: Decimal,

    /// Target price
    #[arg(long)]
    pub target: Decimal,

    /// Position size (sized from risk if not provided)
    #[arg(long)]
    pub quantity: Option<Decimal>,

    /// Risk percentage per trade
    #[arg(long)]
    pub risk: Option<Decimal>,

    /// Execution gateway (overrides configuration)
    #[arg(long)]
    pub broker: Option<String>,

    /// Place the entry order immediately
    #[arg(long)]
    pub execute: bool,

    /// Monitor the trade until SL/target or Ctrl-C
    #[arg(long)]
    pub monitor: bool,
}

impl SetupArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let broker = build_broker(config, self.broker.as_deref())?;
        let balance = broker.balance().await?;
        let registry = Arc::new(TradeRegistry::new(balance));

        let mut factory = TradeFactory::new();
        if let Some(cap) = config.risk.max_position_size {
            factory = factory.with_max_quantity(cap);
        }

        let sink: Option<Arc<dyn TradeSink>> = if config.journal.enabled {
            Some(Arc::new(JsonlJournal::open(&config.journal.path).await?))
        } else {
            None
        };

        let mut manager = TradeManager::new(
            Arc::clone(&registry),
            broker,
            factory,
            config.risk.default_risk_percent,
        );
        if let Some(sink) = &sink {
            manager = manager.with_sink(Arc::clone(sink));
        }

        let trade = manager
            .create_manual(TradeRequest {
                symbol: self.symbol.clone(),
                direction: self.direction,
                entry_price: self.entry,
                sl_price: self.sl,
                target_price: self.target,
                quantity: self.quantity,
                risk_percent: self.risk,
            })
            .await?;
        print_trade(&trade);

        if self.execute {
            let fill = manager.execute(trade.id).await?;
            println!(
                "Executed: order {} filled {} @ {}",
                fill.order_id, fill.quantity, fill.price
            );
        }

        if self.monitor {
            let prices = Arc::new(RestPriceSource::with_config(RestConfig {
                base_url: config.broker.feed_url.clone(),
                ..RestConfig::default()
            }));
            let mut monitor = Monitor::new(Arc::clone(&registry), prices, &config.monitor);
            if let Some(sink) = &sink {
                monitor = monitor.with_sink(Arc::clone(sink));
            }
            let handle = monitor.spawn();

            println!("Monitoring... press Ctrl-C to stop");
            tokio::signal::ctrl_c().await?;
            handle.stop().await;

            print_statistics(&manager).await;
        }

        Ok(())
    }
}

fn build_broker(config: &Config, override_name: Option<&str>) -> anyhow::Result<Arc<dyn Broker>> {
    let name = override_name.unwrap_or(&config.broker.name);
    match name {
        "paper" => Ok(Arc::new(
            PaperBroker::new(config.broker.paper_balance).with_fee_rate(config.broker.fee_rate),
        )),
        other => anyhow::bail!("unsupported broker '{other}' (available: paper)"),
    }
}

fn print_trade(trade: &Trade) {
    println!("Trade created: {}", trade.id);
    println!("  Symbol:      {}", trade.symbol);
    println!("  Direction:   {}", trade.direction);
    println!("  Entry:       {}", trade.entry_price);
    println!(
        "  Stop loss:   {} ({:.2}%)",
        trade.sl_price,
        trade.sl_distance_pct()
    );
    println!(
        "  Target:      {} ({:.2}%)",
        trade.target_price,
        trade.target_distance_pct()
    );
    println!("  Quantity:    {}", trade.quantity);
    println!("  Risk:        {}", trade.risk_amount);
    println!("  Reward:      {}", trade.reward_amount);
    println!("  Risk/Reward: {:.2}", trade.risk_reward_ratio);
}

async fn print_statistics(manager: &TradeManager) {
    let stats = manager.statistics().await;
    println!("Session summary:");
    println!("  Balance:   {}", stats.balance);
    println!("  Equity:    {}", stats.equity);
    println!("  Total PnL: {}", stats.total_pnl);
    println!(
        "  Trades:    {} total, {} active, {} closed",
        stats.total_trades, stats.active_trades, stats.closed_trades
    );
    println!(
        "  Outcomes:  {} wins / {} losses (win rate {:.2})",
        stats.winning_trades, stats.losing_trades, stats.win_rate
    );
}
