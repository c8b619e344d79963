// Order execution and market data module
pub mod executor;
pub mod gateway;
pub mod paper;
pub mod price_series;

pub use executor::Executor;
pub use gateway::ExchangeGateway;
pub use paper::PaperGateway;
pub use price_series::PriceSeries;
