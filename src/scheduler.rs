use chrono::{DateTime, Local, Timelike};

use crate::config::{BotConfig, SchedulerConfig};
use crate::execution::{Executor, PriceSeries};
use crate::indicators::IndicatorSnapshot;
use crate::models::PositionState;
use crate::persistence::{SeriesStore, StateStore};
use crate::strategy::{BootstrapOutcome, Decision, DecisionEngine};
use crate::Result;

/// Why a run ended without error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    MaxIterations,
    ProfitTarget,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Cycles actually executed, including those before an iteration reset
    pub iterations: u32,
    pub stop_reason: StopReason,
}

/// What a single cycle did
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub price: f64,
    pub series_len: usize,
    pub bootstrap: BootstrapOutcome,
    /// `None` when the indicator block did not run
    pub decision: Option<Decision>,
    /// Amount moved from profit back into the balance
    pub rebalanced: Option<f64>,
    pub target_reached: bool,
    pub reset_iterations: bool,
    /// Set only on the cycle that emitted the insufficient-funds warning
    pub funds_warning_logged: bool,
}

/// Drives fetch -> append -> bootstrap -> decide -> persist, once per tick
pub struct CycleScheduler {
    config: SchedulerConfig,
    initial_balance: f64,
    engine: DecisionEngine,
    executor: Executor,
    state_store: Box<dyn StateStore>,
    series_store: Box<dyn SeriesStore>,
    series: PriceSeries,
    insufficient_funds_logged: bool,
    clock: fn() -> DateTime<Local>,
}

impl CycleScheduler {
    pub fn new(
        config: &BotConfig,
        executor: Executor,
        state_store: Box<dyn StateStore>,
        series_store: Box<dyn SeriesStore>,
    ) -> Self {
        let series = series_store.load();

        Self {
            config: config.scheduler.clone(),
            initial_balance: config.account.initial_balance,
            engine: DecisionEngine::new(
                config.strategy.clone(),
                config.limits.clone(),
                config.account.clone(),
            ),
            executor,
            state_store,
            series_store,
            series,
            insufficient_funds_logged: false,
            clock: Local::now,
        }
    }

    /// Replace the wall clock used for the midnight reset
    pub fn with_clock(mut self, clock: fn() -> DateTime<Local>) -> Self {
        self.clock = clock;
        self
    }

    pub fn series(&self) -> &PriceSeries {
        &self.series
    }

    /// Run cycles until the iteration budget is spent or the profit target is hit
    ///
    /// Any cycle error ends the run immediately and is returned.
    pub async fn run(&mut self) -> Result<RunSummary> {
        let max_iterations = self.config.max_iterations;
        let mut iteration = 0;
        let mut executed = 0;

        tracing::info!(
            pair = self.executor.pair(),
            max_iterations,
            poll_interval_secs = self.config.poll_interval_secs,
            "Trading loop started"
        );

        while iteration < max_iterations {
            iteration += 1;
            executed += 1;

            let report = match self.run_cycle_at((self.clock)()).await {
                Ok(report) => report,
                Err(e) => {
                    tracing::error!(error = ?e, iteration, "An error occurred: {}", e);
                    return Err(e);
                }
            };

            if report.target_reached {
                return Ok(RunSummary {
                    iterations: executed,
                    stop_reason: StopReason::ProfitTarget,
                });
            }

            if report.reset_iterations {
                iteration = 0;
            }

            tokio::time::sleep(self.config.poll_interval()).await;
        }

        tracing::info!(iterations = executed, "Maximum iterations reached");
        Ok(RunSummary {
            iterations: executed,
            stop_reason: StopReason::MaxIterations,
        })
    }

    /// Run one cycle as if the wall clock read `now`
    pub async fn run_cycle_at(&mut self, now: DateTime<Local>) -> Result<CycleReport> {
        let mut state = self
            .state_store
            .load()?
            .unwrap_or_else(|| PositionState::new(self.initial_balance));

        let price = self.executor.current_price().await?;
        if !self.series.append(price) {
            tracing::debug!("Price {:.2} unchanged, series not extended", price);
        }
        self.series_store.save(&self.series)?;

        let held = self.executor.holdings().await?;
        let bootstrap = self
            .engine
            .bootstrap(&mut state, price, held, &self.executor)
            .await?;

        let mut report = CycleReport {
            price,
            series_len: self.series.len(),
            bootstrap,
            decision: None,
            rebalanced: None,
            target_reached: false,
            reset_iterations: false,
            funds_warning_logged: false,
        };

        if let BootstrapOutcome::InsufficientFunds { available } = report.bootstrap {
            if !self.insufficient_funds_logged {
                tracing::warn!(
                    "Insufficient funds to buy {}. Available balance: {:.2}",
                    self.executor.base_asset(),
                    available
                );
                self.insufficient_funds_logged = true;
                report.funds_warning_logged = true;
            }
            self.state_store.save(&state)?;
            return Ok(report);
        }

        let history_ready = self.series.len() >= self.config.min_history;
        if history_ready {
            match IndicatorSnapshot::compute(self.series.values(), self.engine.signals()) {
                Some(snapshot) => {
                    let decision = self
                        .engine
                        .decide(&mut state, price, &snapshot, &self.executor)
                        .await?;
                    report.decision = Some(decision);

                    if self.engine.limits().target_reached(&state) {
                        tracing::info!(
                            "Daily profit target of {:.2} reached. Total profit: {:.2}",
                            self.engine.limits().daily_profit_target,
                            state.daily_profit
                        );
                        report.target_reached = true;
                    } else {
                        report.rebalanced = self.engine.rebalance(&mut state);
                    }
                }
                None => tracing::debug!(
                    "Indicators warming up ({} prices recorded)",
                    self.series.len()
                ),
            }
        }

        self.state_store.save(&state)?;

        // Checked only once the history gate is open
        if history_ready && !report.target_reached && now.hour() == 0 && state.daily_profit <= 0.0
        {
            tracing::info!("No profit made for the day, resetting iteration count.");
            report.reset_iterations = true;
        }

        Ok(report)
    }
}
