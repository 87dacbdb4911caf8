//! Outbound payloads handed to the broadcast boundary.

use ar_core::{Monster, MonsterId, PlayerId};
use ar_mechanics::CombatLog;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::delta::EntityDelta;

/// The closed set of messages the core publishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Every entity that moved or changed state during one tick.
    BatchUpdate {
        /// One delta per changed entity.
        entities: Vec<EntityDelta>,
    },
    /// One combat round between a player and a monster.
    CombatUpdate {
        /// Attacking player.
        player_id: PlayerId,
        /// Monster fought.
        monster_id: MonsterId,
        /// Monster display name.
        monster_name: String,
        /// What happened in the round.
        log: CombatLog,
        /// Player HP after the round.
        player_hp: i64,
        /// Monster HP after the round.
        monster_hp: i64,
        /// Monster max HP, for health bars.
        monster_max_hp: i64,
    },
    /// A monster came back from the respawn queue.
    MonsterRespawn {
        /// The fresh instance.
        monster: Monster,
    },
    /// A resource node went on cooldown or became available.
    ResourceUpdate {
        /// Node id.
        resource_id: String,
        /// Map the node is on.
        map_id: String,
        /// When the node is ready again.
        ready_at: DateTime<Utc>,
        /// Whether it can be gathered right now.
        available: bool,
    },
    /// A player disconnected or moved to another map.
    PlayerLeftMap {
        /// Player who left.
        player_id: PlayerId,
        /// Map they left.
        map_id: String,
    },
    /// A player gained a level.
    LevelUp {
        /// Player who levelled.
        player_id: PlayerId,
        /// New level.
        level: u32,
    },
    /// A chat line. System announcements carry no player id.
    Chat {
        /// Speaker, if a player.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player_id: Option<PlayerId>,
        /// Speaker name.
        name: String,
        /// Text.
        message: String,
        /// Map the line is scoped to, or `None` for everyone.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        map_id: Option<String>,
    },
    /// Server-wide notice, e.g. a content reload.
    ServerUpdate {
        /// Notice text.
        message: String,
    },
}

impl ServerMessage {
    /// Wire tag, matching the serialized `type` field.
    pub fn kind(&self) -> &'static str {
        match self {
            ServerMessage::BatchUpdate { .. } => "batch_update",
            ServerMessage::CombatUpdate { .. } => "combat_update",
            ServerMessage::MonsterRespawn { .. } => "monster_respawn",
            ServerMessage::ResourceUpdate { .. } => "resource_update",
            ServerMessage::PlayerLeftMap { .. } => "player_left_map",
            ServerMessage::LevelUp { .. } => "level_up",
            ServerMessage::Chat { .. } => "chat",
            ServerMessage::ServerUpdate { .. } => "server_update",
        }
    }

    /// Serialize to the JSON wire form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
