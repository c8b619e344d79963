use serde::{Deserialize, Serialize};

use crate::indicators::IndicatorSnapshot;

/// Configuration for signal generation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    pub bollinger_window: usize,
    pub bollinger_num_std: f64,
    pub rsi_period: usize,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    pub macd_fast_period: usize,
    pub macd_slow_period: usize,
    pub macd_signal_period: usize,
    pub short_ma_period: usize,
    pub long_ma_period: usize,
    /// Exit above `bought_price * profit_target`
    pub profit_target: f64,
    /// Exit below `bought_price * trailing_stop_loss`
    pub trailing_stop_loss: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            bollinger_window: 20,
            bollinger_num_std: 2.0,
            rsi_period: 14,
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            macd_fast_period: 12,
            macd_slow_period: 26,
            macd_signal_period: 9,
            short_ma_period: 12,
            long_ma_period: 26,
            profit_target: 1.01,       // 1% above the bought price
            trailing_stop_loss: 0.99,  // 1% below the bought price
        }
    }
}

impl SignalConfig {
    pub fn take_profit_price(&self, bought_price: f64) -> f64 {
        bought_price * self.profit_target
    }

    pub fn stop_loss_price(&self, bought_price: f64) -> f64 {
        bought_price * self.trailing_stop_loss
    }
}

/// Oversold, bullish MACD cross, bullish MA trend and price under the lower band
pub fn entry_signal(snapshot: &IndicatorSnapshot, price: f64, config: &SignalConfig) -> bool {
    snapshot.rsi < config.rsi_oversold
        && snapshot.macd_bullish()
        && snapshot.trend_bullish()
        && price < snapshot.lower_band
}

/// Overbought, bearish MACD and MA, and price beyond the take-profit or stop-loss level
pub fn exit_signal(
    snapshot: &IndicatorSnapshot,
    price: f64,
    bought_price: f64,
    config: &SignalConfig,
) -> bool {
    let beyond_target = price > config.take_profit_price(bought_price)
        || price < config.stop_loss_price(bought_price);

    snapshot.rsi > config.rsi_overbought
        && !snapshot.macd_bullish()
        && !snapshot.trend_bullish()
        && beyond_target
}
