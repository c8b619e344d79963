use crate::models::PricePoint;

/// Append-only price history
///
/// Consecutive duplicate prices are dropped at append time, so no two
/// neighbouring points share a price. Each point's index is its position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    prices: Vec<f64>,
}

impl PriceSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from stored points, re-applying the dedup rule
    pub fn from_points(points: impl IntoIterator<Item = PricePoint>) -> Self {
        let mut series = Self::new();
        for point in points {
            series.append(point.price);
        }
        series
    }

    /// Append a price; returns `false` if it repeats the last one
    pub fn append(&mut self, price: f64) -> bool {
        if self.latest() == Some(price) {
            return false;
        }

        self.prices.push(price);
        true
    }

    pub fn latest(&self) -> Option<f64> {
        self.prices.last().copied()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.prices
    }

    pub fn points(&self) -> impl Iterator<Item = PricePoint> + '_ {
        self.prices
            .iter()
            .enumerate()
            .map(|(index, &price)| PricePoint { index, price })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_series() {
        let series = PriceSeries::new();
        assert!(series.is_empty());
        assert_eq!(series.latest(), None);
    }

    #[test]
    fn test_append_dedups_consecutive() {
        let mut series = PriceSeries::new();

        assert!(series.append(100.0));
        assert!(!series.append(100.0));
        assert_eq!(series.len(), 1);

        assert!(series.append(101.0));
        assert!(series.append(100.0)); // Not consecutive, kept
        assert_eq!(series.values(), &[100.0, 101.0, 100.0]);
        assert_eq!(series.latest(), Some(100.0));
    }

    #[test]
    fn test_points_are_indexed_by_position() {
        let mut series = PriceSeries::new();
        series.append(5.0);
        series.append(6.0);

        let points: Vec<PricePoint> = series.points().collect();
        assert_eq!(points[0], PricePoint { index: 0, price: 5.0 });
        assert_eq!(points[1], PricePoint { index: 1, price: 6.0 });
    }

    #[test]
    fn test_from_points_reapplies_dedup() {
        let stored = vec![
            PricePoint { index: 0, price: 1.0 },
            PricePoint { index: 1, price: 1.0 },
            PricePoint { index: 2, price: 2.0 },
        ];

        let series = PriceSeries::from_points(stored);
        assert_eq!(series.values(), &[1.0, 2.0]);
    }
}
