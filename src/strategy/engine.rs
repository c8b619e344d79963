use crate::config::AccountConfig;
use crate::execution::Executor;
use crate::indicators::IndicatorSnapshot;
use crate::models::PositionState;
use crate::risk::{LimitTrip, TradingLimits};
use crate::strategy::signals::{entry_signal, exit_signal, SignalConfig};
use crate::Result;

/// Result of the first-entry bootstrap step
#[derive(Debug, Clone, PartialEq)]
pub enum BootstrapOutcome {
    /// Initial purchase placed and recorded
    Purchased { volume: f64, order_id: String },
    /// Already bootstrapped, already holding enough, or not flat
    NotNeeded,
    /// The bootstrap amount buys less than the exchange minimum
    BelowMinimumOrder { volume: f64 },
    /// Not enough balance; trading is skipped for this cycle
    InsufficientFunds { available: f64 },
}

/// Why a firing gate did not trade
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    InsufficientBalance,
    NoHoldings,
    Limit(LimitTrip),
}

/// Verdict of one indicator-gated decision
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Entered {
        volume: f64,
        price: f64,
        order_id: String,
    },
    Exited {
        volume: f64,
        price: f64,
        profit: f64,
        order_id: String,
    },
    Hold,
    Skipped(SkipReason),
}

/// Flat/Long state machine over [`PositionState`]
///
/// Orders are placed before the state is touched, so an exchange error
/// leaves the position exactly as it was.
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    signals: SignalConfig,
    limits: TradingLimits,
    account: AccountConfig,
}

impl DecisionEngine {
    pub fn new(signals: SignalConfig, limits: TradingLimits, account: AccountConfig) -> Self {
        Self {
            signals,
            limits,
            account,
        }
    }

    pub fn signals(&self) -> &SignalConfig {
        &self.signals
    }

    pub fn limits(&self) -> &TradingLimits {
        &self.limits
    }

    /// One-off initial purchase of `bootstrap_amount` while nothing is held
    pub async fn bootstrap(
        &self,
        state: &mut PositionState,
        price: f64,
        held_base: f64,
        executor: &Executor,
    ) -> Result<BootstrapOutcome> {
        let amount = self.account.bootstrap_amount;

        if state.initial_purchase_made || !state.is_flat() || held_base * price >= amount {
            return Ok(BootstrapOutcome::NotNeeded);
        }

        if state.balance < amount {
            return Ok(BootstrapOutcome::InsufficientFunds {
                available: state.balance,
            });
        }

        let volume = amount / price;
        if volume < self.account.min_order_volume {
            tracing::info!(
                "Volume {:.6} {} is less than the minimum order size. Initial purchase not made.",
                volume,
                executor.base_asset()
            );
            return Ok(BootstrapOutcome::BelowMinimumOrder { volume });
        }

        let ack = executor.buy(amount).await?;
        state.open(amount, volume, price);

        tracing::info!(
            order_id = %ack.order_id,
            "Initial purchase of {:.6} {} at {:.2} made",
            volume,
            executor.base_asset(),
            price
        );

        Ok(BootstrapOutcome::Purchased {
            volume,
            order_id: ack.order_id,
        })
    }

    /// Evaluate the entry/exit gates against `snapshot` and apply at most one transition
    pub async fn decide(
        &self,
        state: &mut PositionState,
        price: f64,
        snapshot: &IndicatorSnapshot,
        executor: &Executor,
    ) -> Result<Decision> {
        let buy = state.is_flat() && entry_signal(snapshot, price, &self.signals);
        let sell =
            !state.is_flat() && exit_signal(snapshot, price, state.bought_price, &self.signals);

        tracing::info!(
            "Current volume value {:.6}, Buy Condition: {}, Sell Condition: {}",
            state.volume,
            buy,
            sell
        );

        if buy {
            return self.enter(state, price, executor).await;
        }
        if sell {
            return self.exit(state, price, executor).await;
        }

        tracing::info!(
            "No trade executed. Current price: {:.2}, Lower band: {:.2}, Upper band: {:.2}, Bought price: {:.2}, Profit target: {:.2}, Trailing stop loss: {:.2}",
            price,
            snapshot.lower_band,
            snapshot.upper_band,
            state.bought_price,
            self.signals.take_profit_price(state.bought_price),
            self.signals.stop_loss_price(state.bought_price)
        );
        Ok(Decision::Hold)
    }

    async fn enter(
        &self,
        state: &mut PositionState,
        price: f64,
        executor: &Executor,
    ) -> Result<Decision> {
        if let Err(trip) = self.limits.check_entry(state) {
            tracing::info!("Entry signal ignored: {:?}", trip);
            return Ok(Decision::Skipped(SkipReason::Limit(trip)));
        }

        let spend = state.balance;
        if spend <= 0.0 {
            tracing::info!("Entry signal ignored: no balance to spend");
            return Ok(Decision::Skipped(SkipReason::InsufficientBalance));
        }

        let ack = executor.buy(spend).await?;
        let volume = spend / price;
        state.open(spend, volume, price);
        state.trades_today += 1;

        tracing::info!(
            order_id = %ack.order_id,
            trades_today = state.trades_today,
            "Bought {} at {:.2}, total {}: {:.6}",
            executor.base_asset(),
            price,
            executor.base_asset(),
            volume
        );

        Ok(Decision::Entered {
            volume,
            price,
            order_id: ack.order_id,
        })
    }

    async fn exit(
        &self,
        state: &mut PositionState,
        price: f64,
        executor: &Executor,
    ) -> Result<Decision> {
        let held = executor.holdings().await?;
        if held <= 0.0 {
            tracing::warn!("Insufficient {} balance to sell.", executor.base_asset());
            return Ok(Decision::Skipped(SkipReason::NoHoldings));
        }

        let Some(ack) = executor.sell_checked(held, held).await? else {
            return Ok(Decision::Skipped(SkipReason::NoHoldings));
        };
        let profit = state.close(held, price);

        tracing::info!(
            order_id = %ack.order_id,
            profit = profit,
            "Sold {} at {:.2}, total balance: {:.2}",
            executor.base_asset(),
            price,
            state.balance
        );

        Ok(Decision::Exited {
            volume: held,
            price,
            profit,
            order_id: ack.order_id,
        })
    }

    /// Top the balance back up to `initial_balance` out of realized profit
    ///
    /// Returns the amount moved, if any.
    pub fn rebalance(&self, state: &mut PositionState) -> Option<f64> {
        let initial = self.account.initial_balance;
        if state.balance >= initial || state.daily_profit <= 0.0 {
            return None;
        }

        let amount = state.daily_profit.min(initial - state.balance);
        state.balance += amount;
        state.daily_profit -= amount;

        tracing::info!(
            "Added {:.2} from profits to balance. New balance: {:.2}, Remaining profit: {:.2}",
            amount,
            state.balance,
            state.daily_profit
        );
        Some(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::{ExchangeGateway, PaperGateway};
    use crate::models::OrderAck;
    use crate::BotError;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct FixedPrice(f64);

    #[async_trait]
    impl ExchangeGateway for FixedPrice {
        async fn get_price(&self, _pair: &str) -> Result<f64> {
            Ok(self.0)
        }
        async fn get_balance(&self, asset: &str) -> Result<f64> {
            Err(BotError::AssetNotFound(asset.to_string()))
        }
        async fn place_buy(&self, _pair: &str, _quote_amount: f64) -> Result<OrderAck> {
            Err(BotError::OrderRejected("read-only feed".to_string()))
        }
        async fn place_sell(&self, _pair: &str, _base_amount: f64) -> Result<OrderAck> {
            Err(BotError::OrderRejected("read-only feed".to_string()))
        }
    }

    async fn paper_executor(price: f64, quote: f64, base: f64) -> Executor {
        let paper = PaperGateway::new(Arc::new(FixedPrice(price)), "ETH", "ZAR", quote, base);
        let executor = Executor::new(Arc::new(paper), "ETHZAR", "ETH");
        executor.current_price().await.unwrap();
        executor
    }

    fn engine() -> DecisionEngine {
        DecisionEngine::new(
            SignalConfig::default(),
            TradingLimits::default(),
            AccountConfig::default(),
        )
    }

    fn oversold() -> IndicatorSnapshot {
        IndicatorSnapshot {
            lower_band: 18000.0,
            upper_band: 19000.0,
            rsi: 25.0,
            macd_line: 1.5,
            signal_line: 1.0,
            short_ma: 18600.0,
            long_ma: 18500.0,
        }
    }

    fn overbought() -> IndicatorSnapshot {
        IndicatorSnapshot {
            lower_band: 17000.0,
            upper_band: 18200.0,
            rsi: 75.0,
            macd_line: 0.8,
            signal_line: 1.0,
            short_ma: 18100.0,
            long_ma: 18200.0,
        }
    }

    fn long_state(volume: f64, bought_price: f64) -> PositionState {
        PositionState {
            balance: 0.0,
            volume,
            bought_price,
            daily_profit: 0.0,
            trades_today: 1,
            initial_purchase_made: true,
        }
    }

    #[tokio::test]
    async fn test_bootstrap_buys_initial_position() {
        let executor = paper_executor(18000.0, 100.0, 0.0).await;
        let mut state = PositionState::new(100.0);

        let outcome = engine()
            .bootstrap(&mut state, 18000.0, 0.0, &executor)
            .await
            .unwrap();

        match outcome {
            BootstrapOutcome::Purchased { volume, .. } => {
                assert!((volume - 100.0 / 18000.0).abs() < 1e-12)
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(state.initial_purchase_made);
        assert_eq!(state.balance, 0.0);
        assert_eq!(state.bought_price, 18000.0);
        assert!(executor.holdings().await.unwrap() > 0.0055);
    }

    #[tokio::test]
    async fn test_bootstrap_insufficient_funds() {
        let executor = paper_executor(18000.0, 50.0, 0.0).await;
        let mut state = PositionState::new(50.0);

        let outcome = engine()
            .bootstrap(&mut state, 18000.0, 0.0, &executor)
            .await
            .unwrap();

        assert_eq!(outcome, BootstrapOutcome::InsufficientFunds { available: 50.0 });
        assert_eq!(state, PositionState::new(50.0));
    }

    #[tokio::test]
    async fn test_bootstrap_below_minimum_order() {
        let executor = paper_executor(200_000.0, 100.0, 0.0).await;
        let mut state = PositionState::new(100.0);

        let outcome = engine()
            .bootstrap(&mut state, 200_000.0, 0.0, &executor)
            .await
            .unwrap();

        assert!(matches!(outcome, BootstrapOutcome::BelowMinimumOrder { .. }));
        assert!(!state.initial_purchase_made);
        assert_eq!(executor.holdings().await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn test_bootstrap_not_needed_when_holding_enough() {
        let executor = paper_executor(18000.0, 100.0, 0.01).await;
        let mut state = PositionState::new(100.0);

        let outcome = engine()
            .bootstrap(&mut state, 18000.0, 0.01, &executor)
            .await
            .unwrap();

        assert_eq!(outcome, BootstrapOutcome::NotNeeded);
        assert_eq!(state.balance, 100.0);
    }

    #[tokio::test]
    async fn test_entry_spends_whole_balance() {
        let executor = paper_executor(17900.0, 100.0, 0.0).await;
        let mut state = PositionState::new(100.0);

        let decision = engine()
            .decide(&mut state, 17900.0, &oversold(), &executor)
            .await
            .unwrap();

        assert!(matches!(decision, Decision::Entered { .. }));
        assert_eq!(state.balance, 0.0);
        assert!((state.volume - 100.0 / 17900.0).abs() < 1e-12);
        assert_eq!(state.bought_price, 17900.0);
        assert_eq!(state.trades_today, 1);
        assert!(state.initial_purchase_made);
    }

    #[tokio::test]
    async fn test_entry_respects_trade_limit() {
        let executor = paper_executor(17900.0, 100.0, 0.0).await;
        let mut state = PositionState::new(100.0);
        state.trades_today = 10;

        let decision = engine()
            .decide(&mut state, 17900.0, &oversold(), &executor)
            .await
            .unwrap();

        assert_eq!(
            decision,
            Decision::Skipped(SkipReason::Limit(LimitTrip::DailyTradeLimit))
        );
        assert!(state.is_flat());
        assert_eq!(state.balance, 100.0);
    }

    #[tokio::test]
    async fn test_entry_without_balance_is_skipped() {
        let executor = paper_executor(17900.0, 0.0, 0.0).await;
        let mut state = PositionState::new(0.0);

        let decision = engine()
            .decide(&mut state, 17900.0, &oversold(), &executor)
            .await
            .unwrap();

        assert_eq!(decision, Decision::Skipped(SkipReason::InsufficientBalance));
        assert!(state.is_flat());
        assert_eq!(state.bought_price, 0.0);
    }

    #[tokio::test]
    async fn test_rejected_order_leaves_state_untouched() {
        // Exchange holds less than the local book believes
        let executor = paper_executor(17900.0, 50.0, 0.0).await;
        let mut state = PositionState::new(100.0);

        let result = engine()
            .decide(&mut state, 17900.0, &oversold(), &executor)
            .await;

        assert!(matches!(result, Err(BotError::OrderRejected(_))));
        assert_eq!(state, PositionState::new(100.0));
    }

    #[tokio::test]
    async fn test_exit_books_profit() {
        let executor = paper_executor(18360.0, 0.0, 0.005).await;
        let mut state = long_state(0.005, 18000.0);

        let decision = engine()
            .decide(&mut state, 18360.0, &overbought(), &executor)
            .await
            .unwrap();

        match decision {
            Decision::Exited { profit, volume, .. } => {
                assert!((profit - 1.8).abs() < 1e-9);
                assert_eq!(volume, 0.005);
            }
            other => panic!("unexpected decision {:?}", other),
        }
        assert!((state.daily_profit - 1.8).abs() < 1e-9);
        assert!((state.balance - 91.8).abs() < 1e-9);
        assert!(state.is_flat());
        assert_eq!(state.bought_price, 0.0);
        assert_eq!(executor.holdings().await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn test_exit_skipped_without_holdings() {
        let executor = paper_executor(18360.0, 0.0, 0.0).await;
        let mut state = long_state(0.005, 18000.0);
        let before = state.clone();

        let decision = engine()
            .decide(&mut state, 18360.0, &overbought(), &executor)
            .await
            .unwrap();

        assert_eq!(decision, Decision::Skipped(SkipReason::NoHoldings));
        assert_eq!(state, before);
    }

    #[tokio::test]
    async fn test_hold_inside_band() {
        let executor = paper_executor(18090.0, 0.0, 0.005).await;
        let mut state = long_state(0.005, 18000.0);
        let before = state.clone();

        let decision = engine()
            .decide(&mut state, 18090.0, &overbought(), &executor)
            .await
            .unwrap();

        assert_eq!(decision, Decision::Hold);
        assert_eq!(state, before);
    }

    #[tokio::test]
    async fn test_exit_after_partial_bootstrap_keeps_spare_cash() {
        let engine = DecisionEngine::new(
            SignalConfig::default(),
            TradingLimits::default(),
            AccountConfig {
                initial_balance: 150.0,
                ..AccountConfig::default()
            },
        );
        let executor = paper_executor(18000.0, 150.0, 0.0).await;
        let mut state = PositionState::new(150.0);

        engine
            .bootstrap(&mut state, 18000.0, 0.0, &executor)
            .await
            .unwrap();
        assert_eq!(state.balance, 50.0);

        // 100 / 18000 ETH sold at +2%
        let decision = engine
            .decide(&mut state, 18360.0, &overbought(), &executor)
            .await
            .unwrap();

        assert!(matches!(decision, Decision::Exited { .. }));
        assert!((state.balance - 152.0).abs() < 1e-9);
        assert!((state.daily_profit - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_rebalance_is_bounded() {
        let engine = engine();

        let mut state = PositionState::new(40.0);
        state.daily_profit = 25.0;
        assert_eq!(engine.rebalance(&mut state), Some(25.0));
        assert_eq!(state.balance, 65.0);
        assert_eq!(state.daily_profit, 0.0);

        let mut state = PositionState::new(90.0);
        state.daily_profit = 25.0;
        assert_eq!(engine.rebalance(&mut state), Some(10.0));
        assert_eq!(state.balance, 100.0);
        assert_eq!(state.daily_profit, 15.0);

        let mut state = PositionState::new(100.0);
        state.daily_profit = 25.0;
        assert_eq!(engine.rebalance(&mut state), None);

        let mut state = PositionState::new(10.0);
        state.daily_profit = -5.0;
        assert_eq!(engine.rebalance(&mut state), None);
        assert_eq!(state.balance, 10.0);
    }
}
