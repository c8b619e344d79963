use serde::{Deserialize, Serialize};

use crate::models::PositionState;

/// Per-run trading limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TradingLimits {
    pub max_trades_per_day: u32,
    /// Realized profit (quote currency) at which the run stops
    pub daily_profit_target: f64,
}

impl Default for TradingLimits {
    fn default() -> Self {
        Self {
            max_trades_per_day: 10,
            daily_profit_target: 1640.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LimitTrip {
    DailyTradeLimit,
    ProfitTargetReached,
}

impl TradingLimits {
    /// Check whether a new entry is allowed
    pub fn check_entry(&self, state: &PositionState) -> Result<(), LimitTrip> {
        if state.trades_today >= self.max_trades_per_day {
            return Err(LimitTrip::DailyTradeLimit);
        }

        if self.target_reached(state) {
            return Err(LimitTrip::ProfitTargetReached);
        }

        Ok(())
    }

    pub fn target_reached(&self, state: &PositionState) -> bool {
        state.daily_profit >= self.daily_profit_target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_allowed_on_fresh_state() {
        let limits = TradingLimits::default();
        let state = PositionState::new(100.0);

        assert!(limits.check_entry(&state).is_ok());
    }

    #[test]
    fn test_daily_trade_limit() {
        let limits = TradingLimits::default();
        let mut state = PositionState::new(100.0);

        state.trades_today = 9;
        assert!(limits.check_entry(&state).is_ok());

        state.trades_today = 10;
        assert_eq!(limits.check_entry(&state), Err(LimitTrip::DailyTradeLimit));
    }

    #[test]
    fn test_profit_target() {
        let limits = TradingLimits {
            daily_profit_target: 50.0,
            ..Default::default()
        };
        let mut state = PositionState::new(100.0);

        state.daily_profit = 49.99;
        assert!(!limits.target_reached(&state));

        state.daily_profit = 50.0;
        assert!(limits.target_reached(&state));
        assert_eq!(
            limits.check_entry(&state),
            Err(LimitTrip::ProfitTargetReached)
        );
    }
}
