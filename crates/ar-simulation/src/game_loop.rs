//! The async driver around [`Simulation`].

use std::sync::Arc;

use ar_core::World;
use chrono::{DateTime, Utc};
use tokio::sync::{RwLock, watch};
use tracing::info;

use crate::broadcast::Broadcaster;
use crate::simulation::Simulation;

/// The world as shared between the tick loop, command handlers and the
/// snapshotter.
pub type SharedWorld = Arc<RwLock<World>>;

/// Wrap a world for sharing.
pub fn shared(world: World) -> SharedWorld {
    Arc::new(RwLock::new(world))
}

/// Lifecycle of a [`GameLoop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Created, not yet started.
    NotRunning,
    /// Ticking.
    Running,
    /// Shut down.
    Stopped,
}

/// Runs [`Simulation::tick`] on a fixed sleep interval and hands each
/// tick's messages to the broadcaster.
///
/// The world's write lock is held for exactly one tick, so a tick never
/// observes a half-applied command. Broadcasting happens after the lock
/// is released.
pub struct GameLoop {
    world: SharedWorld,
    simulation: Simulation,
    broadcaster: Arc<dyn Broadcaster>,
    state: LoopState,
}

impl GameLoop {
    /// A loop that ticks `simulation` against `world`.
    pub fn new(world: SharedWorld, simulation: Simulation, broadcaster: Arc<dyn Broadcaster>) -> Self {
        Self {
            world,
            simulation,
            broadcaster,
            state: LoopState::NotRunning,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// The wrapped simulation.
    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    /// Run one tick at `now`. Returns the number of messages broadcast.
    pub async fn tick_at(&mut self, now: DateTime<Utc>) -> usize {
        let messages = {
            let mut world = self.world.write().await;
            self.simulation.tick(&mut world, now)
        };
        let count = messages.len();
        for message in messages {
            self.broadcaster.broadcast(message);
        }
        count
    }

    /// Run one tick at the current wall-clock time.
    pub async fn tick_once(&mut self) -> usize {
        self.tick_at(Utc::now()).await
    }

    /// Tick until `shutdown` flips to `true` or its sender is dropped.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        let interval = self.simulation.config().tick_interval;
        self.state = LoopState::Running;
        info!(interval_ms = interval.as_millis() as u64, "game loop started");

        loop {
            let stop = *shutdown.borrow();
            if stop {
                break;
            }
            self.tick_once().await;
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        self.state = LoopState::Stopped;
        info!(ticks = self.simulation.current_tick(), "game loop stopped");
    }
}

impl std::fmt::Debug for GameLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameLoop")
            .field("state", &self.state)
            .field("simulation", &self.simulation)
            .finish()
    }
}
