use std::sync::{Arc, Mutex, MutexGuard};

use super::{SeriesStore, StateStore};
use crate::execution::PriceSeries;
use crate::models::PositionState;
use crate::Result;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// In-memory state store; clones share the same slot
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    slot: Arc<Mutex<Option<PositionState>>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: PositionState) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(state))),
        }
    }

    pub fn snapshot(&self) -> Option<PositionState> {
        lock(&self.slot).clone()
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> Result<Option<PositionState>> {
        Ok(self.snapshot())
    }

    fn save(&self, state: &PositionState) -> Result<()> {
        *lock(&self.slot) = Some(state.clone());
        Ok(())
    }
}

/// In-memory series store; clones share the same series
#[derive(Debug, Clone, Default)]
pub struct MemorySeriesStore {
    series: Arc<Mutex<PriceSeries>>,
}

impl MemorySeriesStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prices(prices: &[f64]) -> Self {
        let mut series = PriceSeries::new();
        for &price in prices {
            series.append(price);
        }
        Self {
            series: Arc::new(Mutex::new(series)),
        }
    }
}

impl SeriesStore for MemorySeriesStore {
    fn load(&self) -> PriceSeries {
        lock(&self.series).clone()
    }

    fn save(&self, series: &PriceSeries) -> Result<()> {
        *lock(&self.series) = series.clone();
        Ok(())
    }
}
