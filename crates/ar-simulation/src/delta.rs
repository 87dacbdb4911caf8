//! Per-tick entity deltas and the outbox that batches them.

use ar_core::{AiState, Monster, MonsterId, Player, PlayerId, PlayerState};
use serde::{Deserialize, Serialize};

use crate::message::ServerMessage;

/// Position and state snapshot of one entity after a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntityDelta {
    /// A player's position and state.
    Player {
        /// Player id.
        id: PlayerId,
        /// Map the player is on.
        map_id: String,
        /// Player x.
        x: f64,
        /// Player y.
        y: f64,
        /// Player state.
        state: PlayerState,
        /// Monster being fought, if any.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target_id: Option<MonsterId>,
        /// Current HP.
        hp: i64,
    },
    /// A monster's position and AI state.
    Monster {
        /// Monster id.
        id: MonsterId,
        /// Map the monster is on.
        map_id: String,
        /// Monster x.
        x: f64,
        /// Monster y.
        y: f64,
        /// AI state.
        state: AiState,
        /// Current HP.
        hp: i64,
    },
}

impl EntityDelta {
    /// Snapshot a player.
    pub fn player(player: &Player) -> Self {
        EntityDelta::Player {
            id: player.id,
            map_id: player.current_map_id.clone(),
            x: player.position.x,
            y: player.position.y,
            state: player.state,
            target_id: player.combat_target,
            hp: player.stats.hp,
        }
    }

    /// Snapshot a monster.
    pub fn monster(monster: &Monster) -> Self {
        EntityDelta::Monster {
            id: monster.id,
            map_id: monster.map_id.clone(),
            x: monster.position.x,
            y: monster.position.y,
            state: monster.ai_state,
            hp: monster.stats.hp,
        }
    }
}

/// Everything one tick wants to publish. Deltas are folded into a single
/// `batch_update`; other messages go out individually ahead of it.
#[derive(Debug, Default)]
pub struct Outbox {
    deltas: Vec<EntityDelta>,
    messages: Vec<ServerMessage>,
}

impl Outbox {
    /// An empty outbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity delta.
    pub fn push_delta(&mut self, delta: EntityDelta) {
        self.deltas.push(delta);
    }

    /// Add a standalone message.
    pub fn push(&mut self, message: ServerMessage) {
        self.messages.push(message);
    }

    /// Deltas collected so far.
    pub fn deltas(&self) -> &[EntityDelta] {
        &self.deltas
    }

    /// Standalone messages collected so far.
    pub fn messages(&self) -> &[ServerMessage] {
        &self.messages
    }

    /// Whether nothing was collected.
    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty() && self.messages.is_empty()
    }

    /// Messages in publish order, with the deltas folded into a trailing
    /// `batch_update`.
    pub fn into_messages(self) -> Vec<ServerMessage> {
        let mut out = self.messages;
        if !self.deltas.is_empty() {
            out.push(ServerMessage::BatchUpdate {
                entities: self.deltas,
            });
        }
        out
    }
}
