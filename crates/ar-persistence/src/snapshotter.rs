use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use ar_core::Player;
use ar_simulation::SharedWorld;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::error::{PersistError, PersistResult};
use crate::store::PlayerStore;

/// Held for the duration of one save. Dropping it reopens the gate.
struct WriteGate<'a>(&'a AtomicBool);

impl<'a> WriteGate<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for WriteGate<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Periodically copies every player out of the shared world and writes
/// them to a [`PlayerStore`].
///
/// Only the copy happens under the world's read lock; serialization and
/// file I/O run on the blocking pool. Failures are logged and the next
/// interval simply tries again.
#[derive(Debug, Clone)]
pub struct Snapshotter {
    world: SharedWorld,
    store: Arc<PlayerStore>,
    writing: Arc<AtomicBool>,
    interval: Duration,
}

impl Snapshotter {
    /// A snapshotter saving `world` through `store` every `interval`.
    pub fn new(world: SharedWorld, store: PlayerStore, interval: Duration) -> Self {
        Self {
            world,
            store: Arc::new(store),
            writing: Arc::new(AtomicBool::new(false)),
            interval,
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &PlayerStore {
        &self.store
    }

    /// Whether a save is currently writing.
    pub fn is_saving(&self) -> bool {
        self.writing.load(Ordering::Acquire)
    }

    /// Save immediately. Fails with [`PersistError::SaveInProgress`] if
    /// another save holds the gate.
    pub async fn save_now(&self) -> PersistResult<usize> {
        let _gate = WriteGate::acquire(&self.writing).ok_or(PersistError::SaveInProgress)?;
        let players: Vec<Player> = self.world.read().await.players().cloned().collect();

        let store = Arc::clone(&self.store);
        let saved = tokio::task::spawn_blocking(move || store.save(&players))
            .await
            .map_err(|err| PersistError::Task(err.to_string()))??;
        debug!(players = saved, "snapshot written");
        Ok(saved)
    }

    /// Save every interval until `shutdown` flips to `true`, then write one
    /// final snapshot.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(interval_secs = self.interval.as_secs_f64(), "snapshotter started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(err) = self.save_now().await {
                        error!(error = %err, "periodic save failed, retrying next interval");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        match self.save_now().await {
            Ok(saved) => info!(players = saved, "final snapshot written"),
            Err(err) => error!(error = %err, "final save failed"),
        }
    }
}
