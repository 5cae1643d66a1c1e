use clap::Parser;
use trade_warden::cli::{Cli, Commands};
use trade_warden::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        Config::default()
    });

    // Initialize telemetry
    let _guard = trade_warden::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Setup(args) => {
            tracing::info!(symbol = %args.symbol, "Setting up trade");
            args.execute(&config).await?;
        }
        Commands::Stats(args) => {
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("  Broker:  {} (paper balance {})", config.broker.name, config.broker.paper_balance);
            println!("  Feed:    {}", config.broker.feed_url);
            println!(
                "  Risk:    {}% per trade, max position {:?}",
                config.risk.default_risk_percent, config.risk.max_position_size
            );
            println!(
                "  Monitor: every {}s, degraded after {} failures",
                config.monitor.interval_secs, config.monitor.failure_threshold
            );
            println!(
                "  Journal: {} ({})",
                config.journal.path.display(),
                if config.journal.enabled { "enabled" } else { "disabled" }
            );
        }
    }

    Ok(())
}
