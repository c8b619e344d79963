//! Configuration for lunobot
//!
//! Layers, lowest precedence first: compiled defaults, an optional TOML file,
//! then `LUNOBOT__SECTION__KEY` environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::risk::TradingLimits;
use crate::strategy::signals::SignalConfig;
use crate::Result;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub exchange: ExchangeConfig,
    pub account: AccountConfig,
    pub strategy: SignalConfig,
    pub limits: TradingLimits,
    pub scheduler: SchedulerConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub execution: ExecutionConfig,
}

/// Exchange connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    pub pair: String,
    pub base_asset: String,
    pub quote_asset: String,
    pub base_url: String,
    pub api_key_id: Option<String>,
    pub api_key_secret: Option<String>,
    pub requests_per_minute: u32,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            pair: "ETHZAR".to_string(),
            base_asset: "ETH".to_string(),
            quote_asset: "ZAR".to_string(),
            base_url: "https://api.luno.com".to_string(),
            api_key_id: None,
            api_key_secret: None,
            requests_per_minute: 60,
        }
    }
}

/// Strategy capital settings (quote currency)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    pub initial_balance: f64,
    pub bootstrap_amount: f64,
    pub min_order_volume: f64,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            initial_balance: 100.0,
            bootstrap_amount: 100.0,
            min_order_volume: 0.001,
        }
    }
}

/// Cycle scheduler settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub max_iterations: u32,
    pub poll_interval_secs: u64,
    /// Series length at which indicators are first requested
    pub min_history: usize,
}

impl SchedulerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            poll_interval_secs: 5,
            min_history: 26,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub state_path: PathBuf,
    pub price_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_path: PathBuf::from("state.json"),
            price_path: PathBuf::from("price_data.csv"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub directory: PathBuf,
    pub file_prefix: String,
    pub level: String,
    pub max_log_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("logs"),
            file_prefix: "trading_bot.log".to_string(),
            level: "lunobot=info".to_string(),
            max_log_files: 10,
        }
    }
}

/// Execution mode: paper trading or live
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    Paper,
    Live,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    pub mode: ExecutionMode,
    pub paper_quote_balance: f64,
    pub paper_base_balance: f64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::Live,
            paper_quote_balance: 100.0,
            paper_base_balance: 0.0,
        }
    }
}

impl BotConfig {
    /// Load configuration from defaults, an optional file and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&BotConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix("LUNOBOT")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// API credentials, if both halves are configured
    pub fn credentials(&self) -> Option<(String, String)> {
        match (&self.exchange.api_key_id, &self.exchange.api_key_secret) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => {
                Some((id.clone(), secret.clone()))
            }
            _ => None,
        }
    }
}
