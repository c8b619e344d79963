/// Bollinger Bands at one index
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bands {
    pub lower: f64,
    pub middle: f64,
    pub upper: f64,
}

/// Rolling mean +/- `num_std` sample standard deviations (ddof = 1)
///
/// Entries before the first full window are `None`.
pub fn bollinger_bands(prices: &[f64], window: usize, num_std: f64) -> Vec<Option<Bands>> {
    let mut out = vec![None; prices.len()];
    if window < 2 || prices.len() < window {
        return out;
    }

    for end in window..=prices.len() {
        let slice = &prices[end - window..end];
        let mean = slice.iter().sum::<f64>() / window as f64;
        let variance =
            slice.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / (window - 1) as f64;
        let std = variance.sqrt();

        out[end - 1] = Some(Bands {
            lower: mean - num_std * std,
            middle: mean,
            upper: mean + num_std * std,
        });
    }

    out
}
