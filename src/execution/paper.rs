use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::ExchangeGateway;
use crate::models::{OrderAck, OrderSide};
use crate::{BotError, Result};

#[derive(Debug, Clone, Copy)]
struct PaperBook {
    base: f64,
    quote: f64,
    last_price: Option<f64>,
}

/// Paper trading gateway
///
/// Prices come from a real feed; balances and fills are simulated locally at
/// the last fetched price.
pub struct PaperGateway {
    feed: Arc<dyn ExchangeGateway>,
    base_asset: String,
    quote_asset: String,
    book: Mutex<PaperBook>,
}

impl PaperGateway {
    pub fn new(
        feed: Arc<dyn ExchangeGateway>,
        base_asset: impl Into<String>,
        quote_asset: impl Into<String>,
        quote_balance: f64,
        base_balance: f64,
    ) -> Self {
        Self {
            feed,
            base_asset: base_asset.into(),
            quote_asset: quote_asset.into(),
            book: Mutex::new(PaperBook {
                base: base_balance,
                quote: quote_balance,
                last_price: None,
            }),
        }
    }

    /// Simulated (base, quote) balances
    pub fn balances(&self) -> (f64, f64) {
        let book = self.lock();
        (book.base, book.quote)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PaperBook> {
        self.book.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn fill(side: OrderSide, amount: f64) -> OrderAck {
        OrderAck {
            order_id: format!("paper-{}", Uuid::new_v4()),
            side,
            amount,
            timestamp: Utc::now(),
        }
    }
}

#[async_trait]
impl ExchangeGateway for PaperGateway {
    async fn get_price(&self, pair: &str) -> Result<f64> {
        let price = self.feed.get_price(pair).await?;
        self.lock().last_price = Some(price);
        Ok(price)
    }

    async fn get_balance(&self, asset: &str) -> Result<f64> {
        let book = self.lock();
        if asset == self.base_asset {
            Ok(book.base)
        } else if asset == self.quote_asset {
            Ok(book.quote)
        } else {
            Err(BotError::AssetNotFound(asset.to_string()))
        }
    }

    async fn place_buy(&self, pair: &str, quote_amount: f64) -> Result<OrderAck> {
        let mut book = self.lock();
        let price = book
            .last_price
            .ok_or_else(|| BotError::OrderRejected("no price seen yet".to_string()))?;

        if quote_amount <= 0.0 || quote_amount > book.quote {
            return Err(BotError::OrderRejected(format!(
                "paper buy of {:.2} {} exceeds balance {:.2}",
                quote_amount, self.quote_asset, book.quote
            )));
        }

        book.quote -= quote_amount;
        book.base += quote_amount / price;

        tracing::info!(
            "[PAPER] Bought {:.6} {} for {:.2} {} on {}",
            quote_amount / price,
            self.base_asset,
            quote_amount,
            self.quote_asset,
            pair
        );
        Ok(Self::fill(OrderSide::Buy, quote_amount))
    }

    async fn place_sell(&self, pair: &str, base_amount: f64) -> Result<OrderAck> {
        let mut book = self.lock();
        let price = book
            .last_price
            .ok_or_else(|| BotError::OrderRejected("no price seen yet".to_string()))?;

        if base_amount <= 0.0 || base_amount > book.base {
            return Err(BotError::OrderRejected(format!(
                "paper sell of {:.6} {} exceeds balance {:.6}",
                base_amount, self.base_asset, book.base
            )));
        }

        book.base -= base_amount;
        book.quote += base_amount * price;

        tracing::info!(
            "[PAPER] Sold {:.6} {} for {:.2} {} on {}",
            base_amount,
            self.base_asset,
            base_amount * price,
            self.quote_asset,
            pair
        );
        Ok(Self::fill(OrderSide::Sell, base_amount))
    }
}
