use std::num::NonZeroU32;
use std::sync::Arc;

use chrono::Utc;
use governor::{Quota, RateLimiter};
use reqwest::{Client, RequestBuilder, Response};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;
use tokio::time::{sleep, Duration};

use crate::error::parse_amount;
use crate::models::{OrderAck, OrderSide};
use crate::{BotError, Result};

// Docs: https://www.luno.com/en/developers/api
pub const LUNO_API_BASE: &str = "https://api.luno.com";
const MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Decimal places Luno accepts for quote (counter) and base volumes
const QUOTE_DECIMALS: u32 = 2;
const BASE_DECIMALS: u32 = 6;

type LunoRateLimiter = RateLimiter<
    governor::state::direct::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

#[derive(Clone)]
struct Credentials {
    key_id: String,
    key_secret: String,
}

/// Client for the Luno REST API
///
/// Reads are rate limited and retried with exponential backoff.
/// Orders are sent exactly once.
#[derive(Clone)]
pub struct LunoClient {
    client: Client,
    base_url: String,
    credentials: Option<Credentials>,
    rate_limiter: Arc<LunoRateLimiter>,
}

#[derive(Debug, Deserialize)]
struct TickerResponse {
    #[allow(dead_code)]
    pair: String,
    #[serde(default)]
    last_trade: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BalanceResponse {
    #[serde(default)]
    balance: Vec<AccountBalance>,
}

/// One account from the balance listing
#[derive(Debug, Clone, Deserialize)]
pub struct AccountBalance {
    #[serde(default)]
    pub account_id: Option<String>,
    pub asset: String,
    pub balance: String,
    #[serde(default)]
    pub reserved: Option<String>,
    #[serde(default)]
    pub unconfirmed: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MarketOrderResponse {
    order_id: String,
}

/// Render an amount as an exact decimal string, truncated to `decimals` places
pub fn format_amount(amount: f64, decimals: u32) -> String {
    Decimal::from_f64_retain(amount)
        .unwrap_or_default()
        .round_dp_with_strategy(decimals, RoundingStrategy::ToZero)
        .normalize()
        .to_string()
}

impl LunoClient {
    pub fn new(base_url: impl Into<String>, requests_per_minute: u32) -> Self {
        let quota =
            Quota::per_minute(NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::MIN));

        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials: None,
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    pub fn with_credentials(mut self, key_id: String, key_secret: String) -> Self {
        self.credentials = Some(Credentials { key_id, key_secret });
        self
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    fn authed(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        let creds = self
            .credentials
            .as_ref()
            .ok_or(BotError::MissingCredentials)?;
        Ok(request.basic_auth(&creds.key_id, Some(&creds.key_secret)))
    }

    /// Rate-limited GET with retry on transport errors, 429 and 5xx
    async fn get(&self, path: &str, query: &[(&str, &str)], auth: bool) -> Result<Response> {
        let url = format!("{}{}", self.base_url, path);
        let mut backoff = Duration::from_millis(INITIAL_BACKOFF_MS);

        for attempt in 1..=MAX_RETRIES {
            self.rate_limiter.until_ready().await;

            let mut request = self.client.get(&url).query(query);
            if auth {
                request = self.authed(request)?;
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }

                    let retryable = status.as_u16() == 429 || status.is_server_error();
                    if !retryable || attempt == MAX_RETRIES {
                        let body = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "Unknown error".to_string());
                        return Err(BotError::Api {
                            status: status.as_u16(),
                            body,
                        });
                    }

                    tracing::warn!(
                        "Luno returned {} for {}, retrying in {:?} (attempt {}/{})",
                        status,
                        path,
                        backoff,
                        attempt,
                        MAX_RETRIES
                    );
                }
                Err(e) if attempt < MAX_RETRIES => {
                    tracing::warn!(
                        "Network error on {}: {}, retrying in {:?} (attempt {}/{})",
                        path,
                        e,
                        backoff,
                        attempt,
                        MAX_RETRIES
                    );
                }
                Err(e) => return Err(e.into()),
            }

            sleep(backoff).await;
            backoff *= 2;
        }

        Err(BotError::Api {
            status: 0,
            body: format!("GET {} failed after {} attempts", path, MAX_RETRIES),
        })
    }

    /// Last traded price for a pair
    pub async fn last_trade_price(&self, pair: &str) -> Result<f64> {
        let ticker: TickerResponse = self
            .get("/api/1/ticker", &[("pair", pair)], false)
            .await?
            .json()
            .await?;

        let last_trade = ticker
            .last_trade
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| BotError::MissingPrice {
                pair: pair.to_string(),
            })?;
        let price = parse_amount("last_trade", &last_trade)?;
        if price <= 0.0 {
            return Err(BotError::InvalidNumber {
                field: "last_trade",
                value: last_trade,
            });
        }

        tracing::info!(pair = %pair, price = %price, "Current price");
        Ok(price)
    }

    /// Full balance listing for the account
    pub async fn balances(&self) -> Result<Vec<AccountBalance>> {
        let response: BalanceResponse = self.get("/api/1/balance", &[], true).await?.json().await?;
        Ok(response.balance)
    }

    /// Balance of a single asset; fails if the asset is not listed
    pub async fn asset_balance(&self, asset: &str) -> Result<f64> {
        let balances = self.balances().await?;
        let account = balances
            .iter()
            .find(|b| b.asset == asset)
            .ok_or_else(|| BotError::AssetNotFound(asset.to_string()))?;
        let balance = parse_amount("balance", &account.balance)?;

        tracing::info!(asset = %asset, balance = %balance, "Current balance");
        Ok(balance)
    }

    /// Place a market order
    ///
    /// Buys spend `amount` of the quote currency, sells sell `amount` of the base asset.
    pub async fn post_market_order(
        &self,
        pair: &str,
        side: OrderSide,
        amount: f64,
    ) -> Result<OrderAck> {
        let (order_type, volume_field, volume) = match side {
            OrderSide::Buy => ("BUY", "counter_volume", format_amount(amount, QUOTE_DECIMALS)),
            OrderSide::Sell => ("SELL", "base_volume", format_amount(amount, BASE_DECIMALS)),
        };

        self.rate_limiter.until_ready().await;

        let url = format!("{}/api/1/marketorder", self.base_url);
        let request = self.authed(self.client.post(&url))?.form(&[
            ("pair", pair),
            ("type", order_type),
            (volume_field, volume.as_str()),
        ]);

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(BotError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let order: MarketOrderResponse = response.json().await?;
        tracing::info!(
            order_id = %order.order_id,
            "Order placed: {} {} {} on {}",
            order_type,
            volume_field,
            volume,
            pair
        );

        Ok(OrderAck {
            order_id: order.order_id,
            side,
            amount,
            timestamp: Utc::now(),
        })
    }
}

impl Default for LunoClient {
    fn default() -> Self {
        Self::new(LUNO_API_BASE, 60)
    }
}
