use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{anyhow, Result};
use rand::Rng;
use shared::domain::{Algo, AlgoState, ProductId, ProductState};

mod seed;

pub use seed::{demo_algos, load_seed_file, parse_seed, SeedError};

pub const DEFAULT_ORDER_PROBABILITY: f64 = 0.3;
pub const DEFAULT_TRADE_PROBABILITY: f64 = 0.2;

/// Per-tick probabilities of simulated activity on a running product.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivityOdds {
    order_probability: f64,
    trade_probability: f64,
}

impl ActivityOdds {
    /// Both probabilities are clamped to `[0, 1]`; NaN becomes 0.
    pub fn new(order_probability: f64, trade_probability: f64) -> Self {
        Self {
            order_probability: clamp_probability(order_probability),
            trade_probability: clamp_probability(trade_probability),
        }
    }

    pub fn order_probability(&self) -> f64 {
        self.order_probability
    }

    pub fn trade_probability(&self) -> f64 {
        self.trade_probability
    }
}

impl Default for ActivityOdds {
    fn default() -> Self {
        Self::new(DEFAULT_ORDER_PROBABILITY, DEFAULT_TRADE_PROBABILITY)
    }
}

fn clamp_probability(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub orders_added: u64,
    pub trades_added: u64,
}

/// Ordered, in-memory collection of algorithms and their products.
///
/// Every mutation is a raw overwrite: no transition is ever rejected, and
/// unknown targets are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgoStore {
    algos: Vec<Algo>,
}

impl AlgoStore {
    /// Builds a store, rejecting duplicate algorithm names and duplicate
    /// product ids within one algorithm.
    pub fn new(algos: Vec<Algo>) -> Result<Self, SeedError> {
        seed::validate(&algos)?;
        Ok(Self { algos })
    }

    pub fn demo() -> Self {
        Self {
            algos: demo_algos(),
        }
    }

    pub fn snapshot(&self) -> &[Algo] {
        &self.algos
    }

    /// Returns whether an algorithm with `name` existed.
    pub fn set_algo_state(&mut self, name: &str, new_state: AlgoState) -> bool {
        match self.algos.iter_mut().find(|algo| algo.name == name) {
            Some(algo) => {
                algo.state = new_state;
                true
            }
            None => false,
        }
    }

    /// Returns whether the product was found under the named algorithm.
    pub fn set_product_state(
        &mut self,
        algo_name: &str,
        product_id: ProductId,
        new_state: ProductState,
    ) -> bool {
        let Some(algo) = self.algos.iter_mut().find(|algo| algo.name == algo_name) else {
            return false;
        };
        match algo
            .products
            .iter_mut()
            .find(|product| product.id == product_id)
        {
            Some(product) => {
                product.state = new_state;
                true
            }
            None => false,
        }
    }

    /// One round of simulated activity. Only running products of running
    /// algorithms are touched; the order and trade draws are independent.
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R, odds: &ActivityOdds) -> TickSummary {
        let mut summary = TickSummary::default();
        for algo in self
            .algos
            .iter_mut()
            .filter(|algo| algo.state == AlgoState::Running)
        {
            for product in algo
                .products
                .iter_mut()
                .filter(|product| product.state == ProductState::Running)
            {
                if rng.gen_bool(odds.order_probability) {
                    product.orders = product.orders.saturating_add(1);
                    summary.orders_added += 1;
                }
                if rng.gen_bool(odds.trade_probability) {
                    product.trades = product.trades.saturating_add(1);
                    summary.trades_added += 1;
                }
            }
        }
        summary
    }
}

/// Cloneable handle serializing every store operation behind one mutex.
#[derive(Clone)]
pub struct SharedStore {
    inner: Arc<Mutex<AlgoStore>>,
}

impl SharedStore {
    pub fn new(store: AlgoStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    pub fn snapshot(&self) -> Result<Vec<Algo>> {
        Ok(self.lock()?.snapshot().to_vec())
    }

    pub fn set_algo_state(&self, name: &str, new_state: AlgoState) -> Result<bool> {
        Ok(self.lock()?.set_algo_state(name, new_state))
    }

    pub fn set_product_state(
        &self,
        algo_name: &str,
        product_id: ProductId,
        new_state: ProductState,
    ) -> Result<bool> {
        Ok(self
            .lock()?
            .set_product_state(algo_name, product_id, new_state))
    }

    pub fn tick<R: Rng + ?Sized>(&self, rng: &mut R, odds: &ActivityOdds) -> Result<TickSummary> {
        Ok(self.lock()?.tick(rng, odds))
    }

    fn lock(&self) -> Result<MutexGuard<'_, AlgoStore>> {
        self.inner
            .lock()
            .map_err(|_| anyhow!("algo store lock poisoned"))
    }
}

impl Default for SharedStore {
    fn default() -> Self {
        Self::new(AlgoStore::demo())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
