use ar_core::World;
use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, warn};

use crate::ai::MonsterAiSystem;
use crate::clock::TickClock;
use crate::combat::PlayerCombatSystem;
use crate::config::SimConfig;
use crate::context::TickContext;
use crate::delta::Outbox;
use crate::message::ServerMessage;
use crate::movement::MovementSystem;
use crate::respawn::RespawnSystem;
use crate::system::System;

/// The per-tick orchestrator.
///
/// Owns the clock, RNG and registered systems; the world is borrowed for
/// each tick so the async layer decides how it is shared.
pub struct Simulation {
    clock: TickClock,
    rng: StdRng,
    config: SimConfig,
    systems: Vec<Box<dyn System>>,
    initialized: bool,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("tick", &self.clock.tick())
            .field("systems", &self.systems.len())
            .finish()
    }
}

impl Simulation {
    /// A simulation with the standard systems: player combat, player
    /// movement, monster AI, respawns.
    pub fn new(config: SimConfig) -> Self {
        let mut sim = Self::empty(config);
        sim.add_system(PlayerCombatSystem::new());
        sim.add_system(MovementSystem::new());
        sim.add_system(MonsterAiSystem::new());
        sim.add_system(RespawnSystem::new());
        sim
    }

    /// A simulation with no systems registered.
    pub fn empty(config: SimConfig) -> Self {
        Self {
            clock: TickClock::new(config.max_dt),
            rng: StdRng::seed_from_u64(config.seed),
            config,
            systems: Vec::new(),
            initialized: false,
        }
    }

    /// Register a system. Systems are ticked in registration order.
    pub fn add_system<S: System + 'static>(&mut self, system: S) {
        self.systems.push(Box::new(system));
    }

    /// Names of the registered systems, in tick order.
    pub fn system_names(&self) -> Vec<&str> {
        self.systems.iter().map(|s| s.name()).collect()
    }

    /// Loop configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Ticks run so far.
    pub fn current_tick(&self) -> u64 {
        self.clock.tick()
    }

    fn init(&mut self, world: &mut World) {
        let mut outbox = Outbox::new();
        for system in &mut self.systems {
            let mut ctx = TickContext {
                world: &mut *world,
                clock: &self.clock,
                config: &self.config,
                rng: &mut self.rng,
                outbox: &mut outbox,
            };
            if let Err(err) = system.init(&mut ctx) {
                warn!(system = system.name(), error = %err, "system init failed");
            }
        }
        self.initialized = true;
    }

    /// Advance the world by one tick at `now` and return what should be
    /// broadcast: individual messages first, then one `batch_update`.
    pub fn tick(&mut self, world: &mut World, now: DateTime<Utc>) -> Vec<ServerMessage> {
        if !self.initialized {
            self.init(world);
        }
        let dt = self.clock.advance(now);

        let mut outbox = Outbox::new();
        for system in &mut self.systems {
            let mut ctx = TickContext {
                world: &mut *world,
                clock: &self.clock,
                config: &self.config,
                rng: &mut self.rng,
                outbox: &mut outbox,
            };
            if let Err(err) = system.tick(&mut ctx) {
                warn!(system = system.name(), tick = self.clock.tick(), error = %err, "system tick failed");
            }
        }

        let interval = self.config.perf_log_interval;
        if interval > 0 && self.clock.tick() % interval == 0 {
            let fps = if dt > 0.0 { (100.0 / dt).round() / 100.0 } else { 0.0 };
            info!(
                tick = self.clock.tick(),
                fps,
                players = world.player_count(),
                monsters = world.monster_count(),
                respawn_queue = world.respawn_queue().len(),
                "tick stats"
            );
        }

        outbox.into_messages()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{SimError, SimResult};
    use ar_core::Content;
    use chrono::Duration;

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[derive(Debug)]
    struct Failing;

    impl System for Failing {
        fn name(&self) -> &str {
            "failing"
        }
        fn tick(&mut self, _ctx: &mut TickContext<'_>) -> SimResult<()> {
            Err(SimError::SystemError("boom".into()))
        }
    }

    #[derive(Debug)]
    struct Announcer;

    impl System for Announcer {
        fn name(&self) -> &str {
            "announcer"
        }
        fn tick(&mut self, ctx: &mut TickContext<'_>) -> SimResult<()> {
            ctx.emit(ServerMessage::ServerUpdate {
                message: format!("tick {}", ctx.tick()),
            });
            Ok(())
        }
    }

    #[test]
    fn default_systems_run_in_order() {
        let sim = Simulation::new(SimConfig::default());
        assert_eq!(
            sim.system_names(),
            vec!["player_combat", "movement", "monster_ai", "respawn"]
        );
    }

    #[test]
    fn failing_system_does_not_stop_the_tick() {
        let mut world = World::new(Content::new());
        let mut sim = Simulation::empty(SimConfig::default());
        sim.add_system(Failing);
        sim.add_system(Announcer);

        let messages = sim.tick(&mut world, t0());
        assert_eq!(messages.len(), 1);
        assert_eq!(
            messages[0],
            ServerMessage::ServerUpdate {
                message: "tick 1".into()
            }
        );
    }

    #[test]
    fn tick_counter_advances() {
        let mut world = World::new(Content::new());
        let mut sim = Simulation::new(SimConfig::default().with_perf_log_interval(1));
        for i in 0..5 {
            assert!(sim.tick(&mut world, t0() + Duration::milliseconds(50 * i)).is_empty());
        }
        assert_eq!(sim.current_tick(), 5);
    }
}
