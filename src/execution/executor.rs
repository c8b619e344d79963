use std::sync::Arc;

use crate::execution::ExchangeGateway;
use crate::models::OrderAck;
use crate::{BotError, Result};

/// Places orders for one pair and answers "how much do we really hold?"
#[derive(Clone)]
pub struct Executor {
    gateway: Arc<dyn ExchangeGateway>,
    pair: String,
    base_asset: String,
}

impl Executor {
    pub fn new(
        gateway: Arc<dyn ExchangeGateway>,
        pair: impl Into<String>,
        base_asset: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            pair: pair.into(),
            base_asset: base_asset.into(),
        }
    }

    pub fn pair(&self) -> &str {
        &self.pair
    }

    pub fn base_asset(&self) -> &str {
        &self.base_asset
    }

    /// Latest price; anything but a finite positive number is an upstream data error
    pub async fn current_price(&self) -> Result<f64> {
        let price = self.gateway.get_price(&self.pair).await?;
        if !price.is_finite() || price <= 0.0 {
            return Err(BotError::InvalidNumber {
                field: "price",
                value: price.to_string(),
            });
        }
        Ok(price)
    }

    /// Authoritative base-asset balance from the exchange
    pub async fn holdings(&self) -> Result<f64> {
        self.gateway.get_balance(&self.base_asset).await
    }

    /// Market buy for `quote_amount` of the quote currency
    pub async fn buy(&self, quote_amount: f64) -> Result<OrderAck> {
        tracing::info!(
            "Placing order: Buy {} for {:.2} at market price",
            self.base_asset,
            quote_amount
        );
        self.gateway.place_buy(&self.pair, quote_amount).await
    }

    /// Market sell of `volume`, skipped when `available` cannot cover it
    ///
    /// Returns `Ok(None)` without calling the exchange if the volume is not there.
    pub async fn sell_checked(&self, volume: f64, available: f64) -> Result<Option<OrderAck>> {
        if available < volume {
            tracing::warn!(
                "Insufficient funds to sell {:.6} {}. Current balance: {:.6} {}",
                volume,
                self.base_asset,
                available,
                self.base_asset
            );
            return Ok(None);
        }

        tracing::info!(
            "Placing order: Sell {:.6} {} at market price",
            volume,
            self.base_asset
        );
        let ack = self.gateway.place_sell(&self.pair, volume).await?;
        Ok(Some(ack))
    }
}
