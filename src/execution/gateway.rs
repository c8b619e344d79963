use async_trait::async_trait;

use crate::api::LunoClient;
use crate::models::{OrderAck, OrderSide};
use crate::Result;

/// Exchange operations the trading loop depends on
#[async_trait]
pub trait ExchangeGateway: Send + Sync {
    /// Last traded price for `pair`
    async fn get_price(&self, pair: &str) -> Result<f64>;

    /// Available balance of `asset`; fails if the asset is not listed
    async fn get_balance(&self, asset: &str) -> Result<f64>;

    /// Market buy spending `quote_amount` of the quote currency
    async fn place_buy(&self, pair: &str, quote_amount: f64) -> Result<OrderAck>;

    /// Market sell of `base_amount` of the base asset
    async fn place_sell(&self, pair: &str, base_amount: f64) -> Result<OrderAck>;
}

#[async_trait]
impl ExchangeGateway for LunoClient {
    async fn get_price(&self, pair: &str) -> Result<f64> {
        self.last_trade_price(pair).await
    }

    async fn get_balance(&self, asset: &str) -> Result<f64> {
        self.asset_balance(asset).await
    }

    async fn place_buy(&self, pair: &str, quote_amount: f64) -> Result<OrderAck> {
        self.post_market_order(pair, OrderSide::Buy, quote_amount).await
    }

    async fn place_sell(&self, pair: &str, base_amount: f64) -> Result<OrderAck> {
        self.post_market_order(pair, OrderSide::Sell, base_amount).await
    }
}
