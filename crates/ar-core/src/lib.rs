//! Core types for AutoRealm: entities, static content, and the world state store.
//!
//! This crate owns the data model the simulation operates on. Rules that
//! change the model (combat, movement, enhancement) live in `ar-mechanics`;
//! the tick loop that drives them lives in `ar-simulation`.

/// Static, designer-authored templates (items, monsters, maps, missions).
pub mod content;
/// Error types used throughout the crate.
pub mod error;
/// Positions and distances on a 2D map.
pub mod geometry;
/// Runtime identifiers for players, monsters, and item instances.
pub mod id;
/// Item instances, rarities, slots, and awakenings.
pub mod item;
/// Spawned monster instances and their AI state.
pub mod monster;
/// Player records.
pub mod player;
/// Time-ordered respawn queue and resource cooldown table.
pub mod respawn;
/// Attribute points and derived combat stats.
pub mod stats;
/// The world state store that owns every entity collection.
pub mod world;

/// Re-exports of the content template types.
pub use content::{
    CombatStats, Content, DropEntry, ItemTemplate, MapKind, MapTemplate, MissionKind,
    MissionTemplate, MonsterTemplate, Portal, ResourceNode, SpawnDirective,
};
/// Re-exports of [`error::CoreError`] and [`error::CoreResult`].
pub use error::{CoreError, CoreResult};
/// Re-export of [`geometry::Position`].
pub use geometry::Position;
/// Re-exports of the runtime id types.
pub use id::{ItemId, MonsterId, PlayerId};
/// Re-exports of the item types.
pub use item::{Awakening, AwakeningKind, EquipSlot, ItemInstance, ItemStats, ItemType, Rarity};
/// Re-exports of the monster types.
pub use monster::{AiState, Monster, MonsterBehavior};
/// Re-exports of the player types.
pub use player::{MissionProgress, Player, PlayerClass, PlayerState};
/// Re-exports of the respawn and cooldown types.
pub use respawn::{CooldownTable, RespawnQueue, RespawnRecord};
/// Re-exports of [`stats::Attributes`] and [`stats::Stats`].
pub use stats::{Attributes, Stats};
/// Re-export of [`world::World`].
pub use world::World;
