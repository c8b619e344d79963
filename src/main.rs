use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use lunobot::api::LunoClient;
use lunobot::config::ExecutionMode;
use lunobot::execution::{ExchangeGateway, Executor, PaperGateway};
use lunobot::indicators::IndicatorSnapshot;
use lunobot::persistence::{CsvSeriesStore, JsonStateStore, SeriesStore, StateStore};
use lunobot::{BotConfig, BotError, CycleScheduler, PositionState};

#[derive(Parser)]
#[command(name = "lunobot", version, about = "Indicator-driven ETH/ZAR trading loop for Luno")]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the trading loop
    Run {
        /// Override the configured iteration budget
        #[arg(long)]
        max_iterations: Option<u32>,

        /// Simulate fills locally instead of placing real orders
        #[arg(long)]
        paper: bool,
    },
    /// Print the persisted position and current indicators
    Status,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = match BotConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let _guard = match lunobot::logging::init_logging(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Command::Run {
            max_iterations,
            paper,
        } => {
            if let Some(max) = max_iterations {
                config.scheduler.max_iterations = max;
            }
            if paper {
                config.execution.mode = ExecutionMode::Paper;
            }
            run(config).await
        }
        Command::Status => status(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: BotConfig) -> anyhow::Result<()> {
    let mut client = LunoClient::new(
        config.exchange.base_url.clone(),
        config.exchange.requests_per_minute,
    );
    if let Some((key_id, key_secret)) = config.credentials() {
        client = client.with_credentials(key_id, key_secret);
    }

    let gateway: Arc<dyn ExchangeGateway> = match config.execution.mode {
        ExecutionMode::Live => {
            if !client.has_credentials() {
                return Err(BotError::MissingCredentials.into());
            }
            tracing::info!("Live trading on {}", config.exchange.pair);
            Arc::new(client)
        }
        ExecutionMode::Paper => {
            tracing::info!(
                "Paper trading on {} with {:.2} {} and {:.6} {}",
                config.exchange.pair,
                config.execution.paper_quote_balance,
                config.exchange.quote_asset,
                config.execution.paper_base_balance,
                config.exchange.base_asset
            );
            Arc::new(PaperGateway::new(
                Arc::new(client),
                config.exchange.base_asset.clone(),
                config.exchange.quote_asset.clone(),
                config.execution.paper_quote_balance,
                config.execution.paper_base_balance,
            ))
        }
    };

    let executor = Executor::new(
        gateway,
        config.exchange.pair.clone(),
        config.exchange.base_asset.clone(),
    );
    let state_store = JsonStateStore::new(
        config.storage.state_path.clone(),
        config.account.initial_balance,
    );
    let series_store = CsvSeriesStore::new(config.storage.price_path.clone());

    let mut scheduler = CycleScheduler::new(
        &config,
        executor,
        Box::new(state_store),
        Box::new(series_store),
    );

    let summary = scheduler.run().await.context("trading loop aborted")?;
    tracing::info!(
        iterations = summary.iterations,
        "Trading loop finished: {:?}",
        summary.stop_reason
    );

    Ok(())
}

fn status(config: &BotConfig) -> anyhow::Result<()> {
    let state_store = JsonStateStore::new(
        config.storage.state_path.clone(),
        config.account.initial_balance,
    );
    let state = state_store
        .load()?
        .unwrap_or_else(|| PositionState::new(config.account.initial_balance));
    let series = CsvSeriesStore::new(config.storage.price_path.clone()).load();

    println!("Pair:            {}", config.exchange.pair);
    println!("Phase:           {:?}", state.phase());
    println!("Balance:         {:.2} {}", state.balance, config.exchange.quote_asset);
    println!("Volume:          {:.6} {}", state.volume, config.exchange.base_asset);
    println!("Bought price:    {:.2}", state.bought_price);
    println!("Daily profit:    {:.2}", state.daily_profit);
    println!("Trades today:    {}", state.trades_today);
    println!("Bootstrapped:    {}", state.initial_purchase_made);
    println!("Prices recorded: {}", series.len());

    if let Some(latest) = series.latest() {
        println!("Latest price:    {:.2}", latest);
    }

    match IndicatorSnapshot::compute(series.values(), &config.strategy) {
        Some(s) => {
            println!(
                "Bollinger:       {:.2} / {:.2}",
                s.lower_band, s.upper_band
            );
            println!("RSI:             {:.2}", s.rsi);
            println!("MACD / signal:   {:.4} / {:.4}", s.macd_line, s.signal_line);
            println!("MA short / long: {:.2} / {:.2}", s.short_ma, s.long_ma);
        }
        None => println!("Indicators:      not enough history"),
    }

    Ok(())
}
