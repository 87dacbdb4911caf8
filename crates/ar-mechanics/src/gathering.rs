//! Resource node gathering.

use ar_core::{CoreError, ItemInstance, PlayerId, World};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{MechError, MechResult};
use crate::inventory;
use crate::loot::roll_drops;
use crate::rules::Rules;

/// Outcome of a successful harvest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatherReport {
    /// Node that was harvested.
    pub resource_id: String,
    /// Map the node is on.
    pub map_id: String,
    /// Items that went into the inventory.
    pub items: Vec<ItemInstance>,
    /// When the node can be harvested again.
    pub ready_at: DateTime<Utc>,
}

/// Harvest a node on the player's map. Rejected while the node is on
/// cooldown; a successful harvest rolls the node's drops into the
/// inventory and re-arms its cooldown.
pub fn gather(
    world: &mut World,
    player_id: PlayerId,
    resource_id: &str,
    rules: &Rules,
    rng: &mut impl Rng,
    now: DateTime<Utc>,
) -> MechResult<GatherReport> {
    let content = world.content_arc();
    let player = world.require_player(player_id)?;
    if !player.is_alive() {
        return Err(MechError::PlayerDead);
    }
    let map_id = player.current_map_id.clone();
    let map = content
        .map(&map_id)
        .ok_or_else(|| CoreError::MapNotFound(map_id.clone()))?;
    let node = map
        .resource(resource_id)
        .ok_or_else(|| CoreError::ResourceNotFound(resource_id.to_string()))?;

    let distance = player.position.distance_to(node.position());
    if distance > rules.gather_range {
        return Err(MechError::OutOfRange {
            distance,
            range: rules.gather_range,
        });
    }
    if !world.is_resource_ready(resource_id, now) {
        return Err(MechError::ResourceOnCooldown {
            id: resource_id.to_string(),
            remaining_secs: world.resource_cooldown_remaining(resource_id, now),
        });
    }

    let items = roll_drops(&content, &node.drops, rng);
    let player = world.require_player_mut(player_id)?;
    for item in &items {
        inventory::add_item(player, item.clone(), &content, &rules.enhancement);
    }
    world.set_resource_cooldown(resource_id, node.respawn_secs, now);

    Ok(GatherReport {
        resource_id: resource_id.to_string(),
        map_id,
        items,
        ready_at: now + ar_core::respawn::secs(node.respawn_secs),
    })
}
