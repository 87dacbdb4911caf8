use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::geometry::Position;
use crate::id::ItemId;
use crate::item::{EquipSlot, ItemInstance, ItemStats, ItemType, Rarity};
use crate::monster::MonsterBehavior;

/// Designer-authored item archetype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemTemplate {
    /// Stable template id, e.g. `item_sword_01`.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Broad category.
    pub item_type: ItemType,
    /// Slot the item occupies when equipped, if any.
    #[serde(default)]
    pub slot: Option<EquipSlot>,
    /// Rarity tier.
    pub rarity: Rarity,
    /// Flat bonuses granted while equipped or on use.
    #[serde(default)]
    pub stats: ItemStats,
    /// Rough strength rating used to compare gear.
    #[serde(default)]
    pub power_score: i64,
    /// Whether instances merge into one stack.
    #[serde(default)]
    pub stackable: bool,
}

impl ItemTemplate {
    /// Create a new owned instance of this template.
    pub fn instantiate(&self, quantity: u32) -> ItemInstance {
        ItemInstance {
            id: ItemId::new(),
            template_id: self.id.clone(),
            name: self.name.clone(),
            item_type: self.item_type,
            slot: self.slot,
            rarity: self.rarity,
            stats: self.stats,
            power_score: self.power_score,
            stackable: self.stackable,
            quantity: quantity.max(1),
            enhancement_level: 0,
            awakenings: Vec::new(),
        }
    }
}

/// One row of a drop table. `chance` is in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropEntry {
    /// Template id of the dropped item.
    pub item_id: String,
    /// Probability of the entry dropping.
    pub chance: f64,
    /// Smallest quantity dropped.
    #[serde(default = "one")]
    pub min: u32,
    /// Largest quantity dropped.
    #[serde(default = "one")]
    pub max: u32,
}

fn one() -> u32 {
    1
}

/// Base combat numbers for a monster archetype.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombatStats {
    /// Maximum hit points.
    pub hp: i64,
    /// Attack.
    pub atk: i64,
    /// Defense.
    pub def: i64,
    /// Movement speed in units per second.
    pub speed: f64,
}

/// Designer-authored monster archetype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterTemplate {
    /// Template id, e.g. `mob_wolf_01`.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Level shown to players and used for XP scaling.
    pub level: u32,
    /// How the monster reacts to players.
    #[serde(default)]
    pub behavior: MonsterBehavior,
    /// Base combat numbers.
    pub stats: CombatStats,
    /// XP granted to the killer.
    pub xp_reward: u64,
    /// Seconds between death and respawn.
    #[serde(default = "default_respawn_secs")]
    pub respawn_secs: f64,
    /// Distance at which an aggressive monster notices a player.
    #[serde(default = "default_aggro_range")]
    pub aggro_range: f64,
    /// Distance from spawn after which the monster gives up a chase.
    #[serde(default = "default_leash_range")]
    pub leash_range: f64,
    /// Loot table rolled on death.
    #[serde(default)]
    pub drops: Vec<DropEntry>,
}

/// Respawn delay used when a template does not set one.
pub const DEFAULT_RESPAWN_SECS: f64 = 10.0;

fn default_respawn_secs() -> f64 {
    DEFAULT_RESPAWN_SECS
}

fn default_aggro_range() -> f64 {
    5.0
}

fn default_leash_range() -> f64 {
    15.0
}

/// Kind of map, which decides what players may do there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapKind {
    /// Open field with monsters and resources.
    #[default]
    Field,
    /// Castle grounds.
    Castle,
    /// Instanced-style dungeon.
    Dungeon,
    /// Town or other area without combat.
    Safe,
}

/// A point that moves a player to another map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portal {
    /// Portal id, unique within its map.
    pub id: String,
    /// Where the portal stands.
    pub position: Position,
    /// Map the portal leads to.
    pub target_map_id: String,
    /// Arrival point on the target map.
    pub target_position: Position,
    /// Optional display label.
    #[serde(default)]
    pub label: String,
}

/// Where the initial population of a map is placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnDirective {
    /// Monster template to spawn.
    pub template_id: String,
    /// Spawn x.
    pub x: f64,
    /// Spawn y.
    pub y: f64,
}

/// A gatherable node. Its drop table works like a monster's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceNode {
    /// Node id, unique within its map.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Node x.
    pub x: f64,
    /// Node y.
    pub y: f64,
    /// What a successful gather yields.
    #[serde(default)]
    pub drops: Vec<DropEntry>,
    /// Cooldown after gathering, per player.
    #[serde(default = "default_resource_respawn")]
    pub respawn_secs: f64,
}

fn default_resource_respawn() -> f64 {
    30.0
}

impl ResourceNode {
    /// The node's location.
    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

/// Designer-authored map layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapTemplate {
    /// Map id, e.g. `map_forest_1`.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Map kind.
    #[serde(default)]
    pub kind: MapKind,
    /// Minimum player level to enter.
    #[serde(default)]
    pub level_requirement: u32,
    /// Width in world units.
    #[serde(default = "default_extent")]
    pub width: f64,
    /// Height in world units.
    #[serde(default = "default_extent")]
    pub height: f64,
    /// Where players revive on this map.
    #[serde(default = "default_respawn_point")]
    pub respawn_point: Position,
    /// Exits to other maps.
    #[serde(default)]
    pub portals: Vec<Portal>,
    /// Initial monster population.
    #[serde(default)]
    pub spawns: Vec<SpawnDirective>,
    /// Gatherable nodes.
    #[serde(default)]
    pub resources: Vec<ResourceNode>,
}

fn default_extent() -> f64 {
    100.0
}

fn default_respawn_point() -> Position {
    Position::new(50.0, 50.0)
}

impl MapTemplate {
    /// An empty field map with default bounds.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: MapKind::Field,
            level_requirement: 0,
            width: default_extent(),
            height: default_extent(),
            respawn_point: default_respawn_point(),
            portals: Vec::new(),
            spawns: Vec::new(),
            resources: Vec::new(),
        }
    }

    /// Clamp a point into this map's bounds.
    pub fn clamp(&self, position: Position) -> Position {
        position.clamped(0.0, self.width, self.height)
    }

    /// Look up a resource node by id.
    pub fn resource(&self, id: &str) -> Option<&ResourceNode> {
        self.resources.iter().find(|r| r.id == id)
    }
}

/// What a mission asks the player to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionKind {
    /// Defeat a number of monsters of one template.
    Kill,
    /// Pick up a number of items of one template.
    Collect,
}

/// Designer-authored mission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionTemplate {
    /// Mission id.
    pub id: String,
    /// Title shown in the log.
    pub title: String,
    /// Flavor text.
    #[serde(default)]
    pub description: String,
    /// Kill or collect.
    pub kind: MissionKind,
    /// Monster template id for kill missions, item template id for collect missions.
    pub target_id: String,
    /// How many kills or items complete the mission.
    pub target_count: u32,
    /// XP paid on claim.
    #[serde(default)]
    pub reward_xp: u64,
    /// Gold paid on claim.
    #[serde(default)]
    pub reward_gold: u64,
    /// Minimum player level to start.
    #[serde(default)]
    pub level_requirement: u32,
    /// Restrict progress to one map, if set.
    #[serde(default)]
    pub map_id: Option<String>,
}

/// Every static table the engine reads. Swapped wholesale on reload.
#[derive(Debug, Clone, Default)]
pub struct Content {
    /// Item templates by id.
    pub items: HashMap<String, ItemTemplate>,
    /// Monster templates by id.
    pub monsters: HashMap<String, MonsterTemplate>,
    /// Map templates by id.
    pub maps: HashMap<String, MapTemplate>,
    /// Mission templates by id.
    pub missions: HashMap<String, MissionTemplate>,
}

impl Content {
    /// An empty content set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item template, replacing one with the same id.
    pub fn with_item(mut self, item: ItemTemplate) -> Self {
        self.items.insert(item.id.clone(), item);
        self
    }

    /// Add a monster template.
    pub fn with_monster(mut self, monster: MonsterTemplate) -> Self {
        self.monsters.insert(monster.id.clone(), monster);
        self
    }

    /// Add a map template.
    pub fn with_map(mut self, map: MapTemplate) -> Self {
        self.maps.insert(map.id.clone(), map);
        self
    }

    /// Add a mission template.
    pub fn with_mission(mut self, mission: MissionTemplate) -> Self {
        self.missions.insert(mission.id.clone(), mission);
        self
    }

    /// Item template by id.
    pub fn item(&self, id: &str) -> Option<&ItemTemplate> {
        self.items.get(id)
    }

    /// Monster template by id.
    pub fn monster(&self, id: &str) -> Option<&MonsterTemplate> {
        self.monsters.get(id)
    }

    /// Map template by id.
    pub fn map(&self, id: &str) -> Option<&MapTemplate> {
        self.maps.get(id)
    }

    /// Mission template by id.
    pub fn mission(&self, id: &str) -> Option<&MissionTemplate> {
        self.missions.get(id)
    }
}
