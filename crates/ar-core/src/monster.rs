use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::MonsterTemplate;
use crate::geometry::Position;
use crate::id::{MonsterId, PlayerId};
use crate::stats::Stats;

/// How a monster reacts to nearby players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonsterBehavior {
    /// Attacks players inside its aggro range.
    #[default]
    Aggressive,
    /// Fights back only when attacked.
    Passive,
    /// Aggressive, with boss-sized stats.
    Boss,
}

impl MonsterBehavior {
    /// Whether this monster picks fights on its own. Bosses do.
    pub fn is_aggressive(&self) -> bool {
        matches!(self, Self::Aggressive | Self::Boss)
    }
}

/// Monster AI state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiState {
    /// Standing at or near its spawn.
    #[default]
    Idle,
    /// Walking to a random point near its spawn.
    Wandering,
    /// Closing in on its target.
    Chasing,
    /// In range and swinging.
    Attacking,
    /// Walking back to its spawn after losing the target.
    Returning,
}

/// A live monster instance. Removed from the world the moment it dies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monster {
    /// Instance id.
    pub id: MonsterId,
    /// Template the monster was spawned from.
    pub template_id: String,
    /// Display name.
    pub name: String,
    /// Level, copied from the template.
    pub level: u32,
    /// Copied from the template.
    pub behavior: MonsterBehavior,
    /// Live combat stats.
    pub stats: Stats,
    /// Map the monster lives on.
    pub map_id: String,
    /// Current position.
    pub position: Position,
    /// Anchor the monster wanders around, leashes to, and respawns at.
    pub spawn: Position,
    /// Current AI state.
    pub ai_state: AiState,
    /// Player being chased or attacked.
    pub target: Option<PlayerId>,
    /// Distance at which players are noticed.
    pub aggro_range: f64,
    /// Distance from spawn at which a chase is dropped.
    pub leash_range: f64,
    /// When the monster last swung.
    pub last_attack_at: Option<DateTime<Utc>>,
    /// Destination while wandering.
    pub wander_target: Option<Position>,
    /// XP granted on death.
    pub xp_reward: u64,
}

impl Monster {
    /// Materialize a fresh, full-health instance of `template` at `anchor`.
    pub fn spawn(template: &MonsterTemplate, map_id: impl Into<String>, anchor: Position) -> Self {
        let base = template.stats;
        Self {
            id: MonsterId::new(),
            template_id: template.id.clone(),
            name: template.name.clone(),
            level: template.level,
            behavior: template.behavior,
            stats: Stats::new(base.hp, base.atk, base.def, base.speed),
            map_id: map_id.into(),
            position: anchor,
            spawn: anchor,
            ai_state: AiState::Idle,
            target: None,
            aggro_range: template.aggro_range,
            leash_range: template.leash_range,
            last_attack_at: None,
            wander_target: None,
            xp_reward: template.xp_reward,
        }
    }

    /// Whether HP is above zero.
    pub fn is_alive(&self) -> bool {
        self.stats.is_alive()
    }

    /// How far the monster has strayed from its anchor.
    pub fn distance_from_spawn(&self) -> f64 {
        self.position.distance_to(self.spawn)
    }
}
