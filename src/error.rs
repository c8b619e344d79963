use std::path::PathBuf;

use thiserror::Error;

/// Conditions that abort a trading cycle.
///
/// Expected business outcomes (not enough cash, nothing to sell) never show up
/// here; they are reported through `BootstrapOutcome` and `Decision`.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("ticker for {pair} has no last traded price")]
    MissingPrice { pair: String },

    #[error("asset {0} not found in balance listing")]
    AssetNotFound(String),

    #[error("invalid number {value:?} in field {field}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("state file {} is empty", .0.display())]
    EmptyState(PathBuf),

    #[error("state file {} is corrupt: {source}", .path.display())]
    CorruptState {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("exchange API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("order rejected: {0}")]
    OrderRejected(String),

    #[error("live trading requires exchange API credentials")]
    MissingCredentials,

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, BotError>;

/// Parse a decimal string field from an exchange payload
///
/// `NaN` and infinities parse as `f64` but are never valid amounts.
pub(crate) fn parse_amount(field: &'static str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| BotError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}
