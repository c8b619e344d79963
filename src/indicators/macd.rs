use super::moving_average::{ema_of_defined, ema_series};

/// MACD line and its signal line, aligned with the input prices
#[derive(Debug, Clone)]
pub struct MacdSeries {
    pub macd_line: Vec<Option<f64>>,
    pub signal_line: Vec<Option<f64>>,
}

/// MACD = EMA(fast) - EMA(slow); signal = EMA(signal) of the MACD line.
///
/// With 12/26/9 the line is defined from index 25 and the signal from 33.
pub fn macd(prices: &[f64], fast: usize, slow: usize, signal: usize) -> MacdSeries {
    let fast_ema = ema_series(prices, fast);
    let slow_ema = ema_series(prices, slow);

    let macd_line: Vec<Option<f64>> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();
    let signal_line = ema_of_defined(&macd_line, signal);

    MacdSeries {
        macd_line,
        signal_line,
    }
}
