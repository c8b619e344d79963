// Trading strategy module
pub mod engine;
pub mod signals;

pub use engine::{BootstrapOutcome, Decision, DecisionEngine, SkipReason};
pub use signals::{entry_signal, exit_signal, SignalConfig};
