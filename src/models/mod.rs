use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One observed price in the series
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PricePoint {
    pub index: usize,
    pub price: f64,
}

/// Position phase, derived from held volume
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Flat,
    Long,
}

/// The strategy's book: cash, held volume and running counters.
///
/// Invariants: `volume == 0` iff `bought_price == 0`, and `balance >= 0`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PositionState {
    pub balance: f64,
    pub volume: f64,
    pub bought_price: f64,
    pub daily_profit: f64,
    pub trades_today: u32,
    pub initial_purchase_made: bool,
}

impl PositionState {
    pub fn new(initial_balance: f64) -> Self {
        Self {
            balance: initial_balance,
            volume: 0.0,
            bought_price: 0.0,
            daily_profit: 0.0,
            trades_today: 0,
            initial_purchase_made: false,
        }
    }

    pub fn phase(&self) -> Phase {
        if self.volume > 0.0 {
            Phase::Long
        } else {
            Phase::Flat
        }
    }

    pub fn is_flat(&self) -> bool {
        self.phase() == Phase::Flat
    }

    /// Record a fill that converts `cost` of balance into `volume` at `price`
    pub fn open(&mut self, cost: f64, volume: f64, price: f64) {
        self.balance = (self.balance - cost).max(0.0);
        self.volume = volume;
        self.bought_price = price;
        self.initial_purchase_made = true;
    }

    /// Record a sale of `volume` at `price`; returns the realized profit
    pub fn close(&mut self, volume: f64, price: f64) -> f64 {
        let proceeds = volume * price;
        let profit = proceeds - self.bought_price * volume;

        self.balance += proceeds;
        self.daily_profit += profit;
        self.volume = 0.0;
        self.bought_price = 0.0;

        profit
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OrderSide {
    Buy,
    Sell,
}

/// Acknowledgement returned by the exchange for a market order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderAck {
    pub order_id: String,
    pub side: OrderSide,
    /// Quote amount for buys, base amount for sells
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_flat() {
        let state = PositionState::new(100.0);

        assert_eq!(state.phase(), Phase::Flat);
        assert_eq!(state.balance, 100.0);
        assert_eq!(state.bought_price, 0.0);
        assert!(!state.initial_purchase_made);
    }

    #[test]
    fn test_open_and_close() {
        let mut state = PositionState::new(100.0);

        state.open(100.0, 0.005, 20000.0);
        assert_eq!(state.phase(), Phase::Long);
        assert_eq!(state.balance, 0.0);
        assert!(state.initial_purchase_made);

        let profit = state.close(0.005, 21000.0);
        assert!((profit - 5.0).abs() < 1e-9);
        assert!((state.balance - 105.0).abs() < 1e-9);
        assert!((state.daily_profit - 5.0).abs() < 1e-9);
        assert_eq!(state.volume, 0.0);
        assert_eq!(state.bought_price, 0.0);
        assert!(state.is_flat());
    }

    #[test]
    fn test_close_keeps_cash_left_over_from_a_partial_buy() {
        // 150 on hand, only 100 goes into the position
        let mut state = PositionState::new(150.0);
        state.open(100.0, 0.005, 20000.0);
        assert_eq!(state.balance, 50.0);

        let profit = state.close(0.005, 21000.0);
        assert!((profit - 5.0).abs() < 1e-9);
        // Proceeds are added to the remaining cash, not assigned over it
        assert!((state.balance - 155.0).abs() < 1e-9);
        assert!(state.is_flat());
    }
}
