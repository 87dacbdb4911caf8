use ar_core::World;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;

use crate::clock::TickClock;
use crate::config::SimConfig;
use crate::delta::{EntityDelta, Outbox};
use crate::message::ServerMessage;

/// Mutable context passed to each system during a tick.
pub struct TickContext<'a> {
    /// The world, locked for the whole tick.
    pub world: &'a mut World,
    /// Clock for the current tick.
    pub clock: &'a TickClock,
    /// Loop configuration.
    pub config: &'a SimConfig,
    /// Seeded RNG shared by every system.
    pub rng: &'a mut StdRng,
    /// Messages and deltas collected during the tick.
    pub outbox: &'a mut Outbox,
}

impl TickContext<'_> {
    /// Queue a message for broadcast at the end of the tick.
    pub fn emit(&mut self, message: ServerMessage) {
        self.outbox.push(message);
    }

    /// Record an entity delta for the tick's batch update.
    pub fn push_delta(&mut self, delta: EntityDelta) {
        self.outbox.push_delta(delta);
    }

    /// Current tick number.
    pub fn tick(&self) -> u64 {
        self.clock.tick()
    }

    /// Timestamp of the current tick.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Clamped seconds since the previous tick.
    pub fn dt(&self) -> f64 {
        self.clock.dt()
    }
}
