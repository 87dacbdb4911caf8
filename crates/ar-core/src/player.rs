use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geometry::Position;
use crate::id::{MonsterId, PlayerId};
use crate::item::{EquipSlot, ItemInstance};
use crate::stats::{Attributes, Stats};

/// Experience needed to advance from `level` to `level + 1`.
pub fn next_level_xp(level: u32) -> u64 {
    let level = u64::from(level);
    100 * level * level
}

/// Character class picked at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerClass {
    /// Melee.
    #[default]
    Warrior,
    /// Caster.
    Mage,
    /// Ranged.
    Archer,
}

/// What the tick loop is currently doing with a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerState {
    /// Nothing queued.
    #[default]
    Idle,
    /// Walking towards `move_target`.
    Moving,
    /// Fighting `combat_target`.
    Combat,
}

/// Active mission, its counter, and every mission already claimed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MissionProgress {
    /// Mission currently being worked on.
    pub active: Option<String>,
    /// Kills or pickups counted towards the active mission.
    pub progress: u32,
    /// Missions already claimed. Each can be claimed once.
    pub completed: BTreeSet<String>,
}

/// A registered player. Never removed from the world; disconnecting only
/// clears the transient fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Player id.
    pub id: PlayerId,
    /// Unique display name.
    pub name: String,
    /// Character class.
    #[serde(default)]
    pub class: PlayerClass,
    /// Character level, starting at 1.
    pub level: u32,
    /// XP into the current level.
    pub xp: u64,
    /// Allocated attributes.
    #[serde(default)]
    pub attributes: Attributes,
    /// Unspent points earned from level-ups.
    #[serde(default)]
    pub attribute_points: u32,
    /// Derived stats, including current HP.
    pub stats: Stats,
    /// Map the player is on.
    pub current_map_id: String,
    /// Map to revive on, if different from the current one.
    #[serde(default)]
    pub respawn_map_id: Option<String>,
    /// Position on the current map.
    pub position: Position,
    /// What the tick loop is doing with the player.
    #[serde(default)]
    pub state: PlayerState,
    /// Destination while moving.
    #[serde(default)]
    pub move_target: Option<Position>,
    /// Monster being fought.
    #[serde(default)]
    pub combat_target: Option<MonsterId>,
    /// Items carried but not worn.
    #[serde(default)]
    pub inventory: Vec<ItemInstance>,
    /// Items worn, one per slot.
    #[serde(default)]
    pub equipment: BTreeMap<EquipSlot, ItemInstance>,
    /// Gold balance.
    #[serde(default)]
    pub gold: u64,
    /// Premium currency balance.
    #[serde(default)]
    pub diamonds: u64,
    /// Mission log.
    #[serde(default)]
    pub missions: MissionProgress,
    /// Whether a session is attached.
    #[serde(default)]
    pub online: bool,
    /// When the player died. `None` while alive.
    #[serde(default)]
    pub death_time: Option<DateTime<Utc>>,
    /// When the player last attacked. Not persisted.
    #[serde(default, skip_serializing)]
    pub last_attack_at: Option<DateTime<Utc>>,
}

impl Player {
    /// A fresh level 1 player with default attributes, at full health.
    pub fn new(
        name: impl Into<String>,
        class: PlayerClass,
        map_id: impl Into<String>,
        position: Position,
    ) -> Self {
        let attributes = Attributes::default();
        Self {
            id: PlayerId::new(),
            name: name.into(),
            class,
            level: 1,
            xp: 0,
            stats: Stats::from_attributes(&attributes),
            attributes,
            attribute_points: 0,
            current_map_id: map_id.into(),
            respawn_map_id: None,
            position,
            state: PlayerState::Idle,
            move_target: None,
            combat_target: None,
            inventory: Vec::new(),
            equipment: BTreeMap::new(),
            gold: 0,
            diamonds: 0,
            missions: MissionProgress::default(),
            online: false,
            death_time: None,
            last_attack_at: None,
        }
    }

    /// Whether HP is above zero.
    pub fn is_alive(&self) -> bool {
        self.stats.is_alive()
    }

    /// XP needed to reach the next level.
    pub fn next_level_xp(&self) -> u64 {
        next_level_xp(self.level)
    }

    /// Drop everything that only makes sense while the tick loop is driving
    /// this player: state, targets, attack timer.
    pub fn reset_transient(&mut self) {
        self.state = PlayerState::Idle;
        self.move_target = None;
        self.combat_target = None;
        self.last_attack_at = None;
    }

    /// Leave combat and forget the current target.
    pub fn disengage(&mut self) {
        self.state = PlayerState::Idle;
        self.combat_target = None;
    }

    /// Coarse combat power summary shown to clients.
    pub fn combat_power(&self) -> i64 {
        self.stats.atk + self.stats.def + self.stats.max_hp / 10
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Player {
        Player::new("Aria", PlayerClass::Mage, "map_castle_1", Position::new(50.0, 50.0))
    }

    #[test]
    fn next_level_xp_is_quadratic() {
        assert_eq!(next_level_xp(1), 100);
        assert_eq!(next_level_xp(2), 400);
        assert_eq!(next_level_xp(10), 10_000);
    }

    #[test]
    fn new_player_starts_at_full_health() {
        let p = sample();
        assert_eq!(p.level, 1);
        assert_eq!(p.stats.hp, p.stats.max_hp);
        assert_eq!(p.state, PlayerState::Idle);
        assert!(!p.online);
    }

    #[test]
    fn reset_transient_clears_targets() {
        let mut p = sample();
        p.state = PlayerState::Combat;
        p.combat_target = Some(MonsterId::new());
        p.move_target = Some(Position::new(1.0, 1.0));
        p.reset_transient();
        assert_eq!(p.state, PlayerState::Idle);
        assert!(p.combat_target.is_none());
        assert!(p.move_target.is_none());
    }

    #[test]
    fn equipment_serializes_with_slot_keys() {
        let p = sample();
        let json = serde_json::to_value(&p).unwrap();
        assert!(json["equipment"].is_object());
        assert!(json.get("last_attack_at").is_none());
        let back: Player = serde_json::from_value(json).unwrap();
        assert_eq!(back.id, p.id);
        assert_eq!(back.name, "Aria");
    }
}
