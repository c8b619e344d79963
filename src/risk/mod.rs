// Risk management module
pub mod limits;

pub use limits::{LimitTrip, TradingLimits};
