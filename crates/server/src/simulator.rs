use std::time::Duration;

use algo_store::{ActivityOdds, SharedStore};
use rand::{rngs::StdRng, SeedableRng};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, error, info};

#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    pub tick_interval: Duration,
    pub odds: ActivityOdds,
    pub rng_seed: Option<u64>,
}

/// Ticks the store on a fixed interval until `shutdown` flips to `true` or
/// its sender is dropped. The first tick happens one interval after start.
pub fn spawn(
    store: SharedStore,
    config: SimulatorConfig,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut interval = time::interval_at(
            time::Instant::now() + config.tick_interval,
            config.tick_interval,
        );
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            interval_ms = config.tick_interval.as_millis() as u64,
            order_probability = config.odds.order_probability(),
            trade_probability = config.odds.trade_probability(),
            "activity simulator started"
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match store.tick(&mut rng, &config.odds) {
                        Ok(summary) => debug!(
                            orders_added = summary.orders_added,
                            trades_added = summary.trades_added,
                            "activity tick"
                        ),
                        Err(error) => {
                            error!(%error, "activity tick failed; stopping simulator");
                            break;
                        }
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("activity simulator stopped");
    })
}
