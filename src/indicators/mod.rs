// Technical indicators module
// Bollinger Bands, RSI, MACD and dual moving averages over a price series

pub mod bollinger;
pub mod macd;
pub mod moving_average;
pub mod rsi;

pub use bollinger::{bollinger_bands, Bands};
pub use macd::{macd, MacdSeries};
pub use moving_average::{ema_series, sma_series};
pub use rsi::rsi_series;

use crate::strategy::signals::SignalConfig;

/// Indicator values at the latest index of the series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorSnapshot {
    pub lower_band: f64,
    pub upper_band: f64,
    pub rsi: f64,
    pub macd_line: f64,
    pub signal_line: f64,
    pub short_ma: f64,
    pub long_ma: f64,
}

impl IndicatorSnapshot {
    /// Compute every indicator over `prices` and keep the last value of each
    ///
    /// Returns `None` while any indicator is still undefined at the last index.
    pub fn compute(prices: &[f64], config: &SignalConfig) -> Option<Self> {
        let bands = *bollinger_bands(prices, config.bollinger_window, config.bollinger_num_std)
            .last()?;
        let rsi = *rsi_series(prices, config.rsi_period).last()?;
        let macd = macd(
            prices,
            config.macd_fast_period,
            config.macd_slow_period,
            config.macd_signal_period,
        );
        let short_ma = *sma_series(prices, config.short_ma_period).last()?;
        let long_ma = *sma_series(prices, config.long_ma_period).last()?;

        let bands = bands?;
        Some(Self {
            lower_band: bands.lower,
            upper_band: bands.upper,
            rsi: rsi?,
            macd_line: (*macd.macd_line.last()?)?,
            signal_line: (*macd.signal_line.last()?)?,
            short_ma: short_ma?,
            long_ma: long_ma?,
        })
    }

    pub fn macd_bullish(&self) -> bool {
        self.macd_line > self.signal_line
    }

    pub fn trend_bullish(&self) -> bool {
        self.short_ma > self.long_ma
    }
}
