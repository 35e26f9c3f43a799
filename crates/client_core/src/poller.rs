use std::time::Duration;

use chrono::{DateTime, Utc};
use shared::domain::Algo;
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, warn};

use crate::AlgoClient;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
pub struct PolledSnapshot {
    pub algos: Vec<Algo>,
    pub fetched_at: DateTime<Utc>,
}

/// Background task refreshing the algo snapshot. Aborted on drop.
pub struct AlgoPoller {
    updates: watch::Receiver<Option<PolledSnapshot>>,
    handle: JoinHandle<()>,
}

impl AlgoPoller {
    pub fn subscribe(&self) -> watch::Receiver<Option<PolledSnapshot>> {
        self.updates.clone()
    }

    pub fn latest(&self) -> Option<PolledSnapshot> {
        self.updates.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for AlgoPoller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Fetches once immediately, then every `interval`. A failed fetch is logged
/// and the previous snapshot stays published.
pub fn spawn_poller(client: AlgoClient, interval: Duration) -> AlgoPoller {
    let (tx, updates) = watch::channel(None);
    let handle = tokio::spawn(async move {
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            debug!("fetching algos");
            match client.fetch_algos().await {
                Ok(algos) => {
                    tx.send_replace(Some(PolledSnapshot {
                        algos,
                        fetched_at: Utc::now(),
                    }));
                }
                Err(error) => warn!(%error, "failed to fetch algos"),
            }
            if tx.is_closed() {
                break;
            }
        }
    });
    AlgoPoller { updates, handle }
}
