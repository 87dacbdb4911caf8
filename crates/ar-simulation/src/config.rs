use std::time::Duration;

use ar_mechanics::Rules;

/// Tuning for the tick loop and the monster AI.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// RNG seed for deterministic simulation.
    pub seed: u64,
    /// Sleep between ticks. Elapsed time is measured separately, so the
    /// effective rate self-corrects under load.
    pub tick_interval: Duration,
    /// Upper bound on a single tick's dt, in seconds.
    pub max_dt: f64,
    /// Distance within which a player in combat lands hits.
    pub player_attack_range: f64,
    /// Distance at which a chasing monster starts attacking.
    pub melee_range: f64,
    /// Distance at which an attacking monster falls back to chasing.
    pub disengage_range: f64,
    /// Seconds between a monster's scheduled hits.
    pub monster_attack_interval: f64,
    /// Per-tick chance that an idle monster starts wandering.
    pub wander_chance: f64,
    /// Largest distance from spawn a wander leg may target.
    pub wander_radius: f64,
    /// Speed multiplier while wandering.
    pub wander_speed_factor: f64,
    /// Distance at which a wander or return leg counts as arrived.
    pub wander_arrival: f64,
    /// Speed multiplier while returning to spawn.
    pub return_speed_factor: f64,
    /// Ticks between performance log lines. 0 disables them.
    pub perf_log_interval: u64,
    /// Per-observer outbound queue depth.
    pub channel_capacity: usize,
    /// Map new players start on.
    pub start_map_id: String,
    /// Rule tunables handed to the resolvers.
    pub rules: Rules,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            tick_interval: Duration::from_millis(50),
            max_dt: 0.5,
            player_attack_range: 2.5,
            melee_range: 1.5,
            disengage_range: 2.0,
            monster_attack_interval: 2.0,
            wander_chance: 0.02,
            wander_radius: 4.0,
            wander_speed_factor: 0.3,
            wander_arrival: 0.5,
            return_speed_factor: 1.5,
            perf_log_interval: 100,
            channel_capacity: 256,
            start_map_id: "map_castle_1".to_string(),
            rules: Rules::default(),
        }
    }
}

impl SimConfig {
    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the sleep between ticks.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Set the dt clamp in seconds.
    pub fn with_max_dt(mut self, max_dt: f64) -> Self {
        self.max_dt = max_dt;
        self
    }

    /// Set the per-tick wander chance (0.0 disables wandering).
    pub fn with_wander_chance(mut self, chance: f64) -> Self {
        self.wander_chance = chance;
        self
    }

    /// Set the seconds between monster hits.
    pub fn with_monster_attack_interval(mut self, secs: f64) -> Self {
        self.monster_attack_interval = secs;
        self
    }

    /// Set the ticks between performance log lines (0 disables them).
    pub fn with_perf_log_interval(mut self, ticks: u64) -> Self {
        self.perf_log_interval = ticks;
        self
    }

    /// Set the per-observer queue depth.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Set the map new players start on.
    pub fn with_start_map(mut self, map_id: impl Into<String>) -> Self {
        self.start_map_id = map_id.into();
        self
    }

    /// Replace the rule tunables.
    pub fn with_rules(mut self, rules: Rules) -> Self {
        self.rules = rules;
        self
    }
}
