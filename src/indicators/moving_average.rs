/// Simple Moving Average over a sliding window, aligned with `prices`
///
/// The first `period - 1` entries are `None`.
pub fn sma_series(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; prices.len()];
    if period == 0 || prices.len() < period {
        return out;
    }

    let mut sum: f64 = prices[..period].iter().sum();
    out[period - 1] = Some(sum / period as f64);

    for i in period..prices.len() {
        sum += prices[i] - prices[i - period];
        out[i] = Some(sum / period as f64);
    }

    out
}

/// Exponential Moving Average, seeded with the SMA of the first window
pub fn ema_series(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; prices.len()];
    if period == 0 || prices.len() < period {
        return out;
    }

    let multiplier = 2.0 / (period as f64 + 1.0);

    let mut ema = prices[..period].iter().sum::<f64>() / period as f64;
    out[period - 1] = Some(ema);

    for i in period..prices.len() {
        ema = (prices[i] - ema) * multiplier + ema;
        out[i] = Some(ema);
    }

    out
}

/// EMA over a series with a leading undefined run (e.g. the MACD line)
pub(crate) fn ema_of_defined(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];

    let Some(start) = values.iter().position(|v| v.is_some()) else {
        return out;
    };
    let defined: Vec<f64> = values[start..].iter().map_while(|v| *v).collect();

    for (offset, value) in ema_series(&defined, period).into_iter().enumerate() {
        out[start + offset] = value;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma() {
        let prices = vec![100.0, 102.0, 104.0, 106.0, 108.0];
        let sma = sma_series(&prices, 5);
        assert_eq!(sma[4], Some(104.0));
        assert!(sma[..4].iter().all(|v| v.is_none()));
    }

    #[test]
    fn test_sma_rolls() {
        let prices = vec![1.0, 2.0, 3.0, 4.0];
        let sma = sma_series(&prices, 2);
        assert_eq!(sma, vec![None, Some(1.5), Some(2.5), Some(3.5)]);
    }

    #[test]
    fn test_sma_insufficient_data() {
        let prices = vec![100.0, 102.0];
        let sma = sma_series(&prices, 5);
        assert!(sma.iter().all(|v| v.is_none()));
    }

    #[test]
    fn test_ema() {
        let prices = vec![100.0, 102.0, 104.0, 106.0, 108.0, 110.0];
        let ema = ema_series(&prices, 5);
        assert_eq!(ema[4], Some(104.0)); // Seeded with SMA
        assert!(ema[5].unwrap() > 104.0);
    }

    #[test]
    fn test_ema_of_defined_skips_leading_none() {
        let values = vec![None, None, Some(1.0), Some(2.0), Some(3.0)];
        let ema = ema_of_defined(&values, 2);
        assert_eq!(ema[..3], [None, None, None]);
        assert_eq!(ema[3], Some(1.5));
        assert!(ema[4].unwrap() > 2.0);
    }
}
