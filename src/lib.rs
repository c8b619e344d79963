// Core modules
pub mod api;
pub mod config;
pub mod error;
pub mod execution;
pub mod indicators;
pub mod logging;
pub mod models;
pub mod persistence;
pub mod risk;
pub mod scheduler;
pub mod strategy;

// Re-export commonly used types
pub use config::BotConfig;
pub use error::{BotError, Result};
pub use models::*;
pub use scheduler::{CycleScheduler, RunSummary, StopReason};
