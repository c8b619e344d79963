use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::{write_atomic, StateStore};
use crate::models::PositionState;
use crate::{BotError, Result};

/// On-disk shape; every key is optional and falls back to its default
#[derive(Debug, Deserialize)]
struct StoredState {
    balance: Option<f64>,
    volume: Option<f64>,
    bought_price: Option<f64>,
    daily_profit: Option<f64>,
    trades_today: Option<u32>,
    initial_purchase_made: Option<bool>,
}

/// Position state kept in a JSON file
///
/// A missing file means "start fresh". An empty file (or `{}`) and
/// unparsable JSON are errors: the state is never silently reset.
pub struct JsonStateStore {
    path: PathBuf,
    initial_balance: f64,
}

impl JsonStateStore {
    pub fn new(path: impl Into<PathBuf>, initial_balance: f64) -> Self {
        Self {
            path: path.into(),
            initial_balance,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for JsonStateStore {
    fn load(&self) -> Result<Option<PositionState>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if contents.trim().is_empty() {
            return Err(BotError::EmptyState(self.path.clone()));
        }

        let corrupt = |source| BotError::CorruptState {
            path: self.path.clone(),
            source,
        };

        let value: serde_json::Value = serde_json::from_str(&contents).map_err(corrupt)?;
        match &value {
            serde_json::Value::Null => return Err(BotError::EmptyState(self.path.clone())),
            serde_json::Value::Object(map) if map.is_empty() => {
                return Err(BotError::EmptyState(self.path.clone()))
            }
            _ => {}
        }

        let stored: StoredState = serde_json::from_value(value).map_err(corrupt)?;
        let defaults = PositionState::new(self.initial_balance);

        Ok(Some(PositionState {
            balance: stored.balance.unwrap_or(defaults.balance),
            volume: stored.volume.unwrap_or(defaults.volume),
            bought_price: stored.bought_price.unwrap_or(defaults.bought_price),
            daily_profit: stored.daily_profit.unwrap_or(defaults.daily_profit),
            trades_today: stored.trades_today.unwrap_or(defaults.trades_today),
            initial_purchase_made: stored
                .initial_purchase_made
                .unwrap_or(defaults.initial_purchase_made),
        }))
    }

    fn save(&self, state: &PositionState) -> Result<()> {
        let json = serde_json::to_vec(state)?;
        write_atomic(&self.path, &json)?;

        tracing::debug!("Saved position state to {}", self.path.display());
        Ok(())
    }
}
