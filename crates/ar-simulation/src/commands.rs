//! Out-of-tick mutations requested by the API boundary.
//!
//! Each operation validates before it mutates, so a rejected command
//! leaves the world untouched. Messages the operation wants published are
//! collected in an [`Outbox`] and broadcast by [`CommandHandler`] once the
//! world lock is released.

use std::sync::{Arc, Mutex};

use ar_core::{
    Content, EquipSlot, ItemId, MapKind, MonsterId, Player, PlayerClass, PlayerId, PlayerState,
    Position, World,
};
use ar_mechanics::missions::{self, MissionReward};
use ar_mechanics::progression::{AttributeAllocation, allocate_attributes};
use ar_mechanics::{GatherReport, MechError, Rules, UpgradeReport, inventory};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::broadcast::Broadcaster;
use crate::config::SimConfig;
use crate::delta::{EntityDelta, Outbox};
use crate::error::{SimError, SimResult};
use crate::game_loop::SharedWorld;
use crate::message::ServerMessage;

/// Where a player asked to go. A `map_id` different from the current map
/// is a map switch; otherwise the player walks to `(x, y)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveRequest {
    /// Destination x.
    pub x: f64,
    /// Destination y.
    pub y: f64,
    /// Target map for a map switch.
    #[serde(default)]
    pub map_id: Option<String>,
}

/// What a move request did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum MoveOutcome {
    /// The player is walking on the current map.
    Walking,
    /// The player switched maps.
    Teleported {
        /// Map the player left.
        from_map: String,
    },
}

fn living_player(world: &mut World, player_id: PlayerId) -> SimResult<&mut Player> {
    let player = world.require_player_mut(player_id)?;
    if !player.is_alive() {
        return Err(MechError::PlayerDead.into());
    }
    Ok(player)
}

/// Create an offline level 1 player at the start map's respawn point.
pub fn register_player(
    world: &mut World,
    name: &str,
    class: PlayerClass,
    config: &SimConfig,
) -> SimResult<PlayerId> {
    let name = name.trim();
    if name.is_empty() {
        return Err(SimError::InvalidCommand("player name is empty".into()));
    }
    if world.find_player_by_name(name).is_some() {
        return Err(ar_core::CoreError::NameTaken(name.to_string()).into());
    }
    let map = world.require_map(&config.start_map_id)?;
    let (map_id, spawn) = (map.id.clone(), map.respawn_point);

    let mut player = Player::new(name, class, map_id.clone(), spawn);
    player.respawn_map_id = Some(map_id);
    let id = world.add_player(player);
    info!(player = %id, name, "player registered");
    Ok(id)
}

/// Mark a player online and announce it.
pub fn connect(world: &mut World, player_id: PlayerId, out: &mut Outbox) -> SimResult<()> {
    let player = world.require_player_mut(player_id)?;
    player.online = true;
    out.push_delta(EntityDelta::player(player));
    Ok(())
}

/// Soft-deactivate: the player stays in the world, offline and idle.
pub fn disconnect(world: &mut World, player_id: PlayerId, out: &mut Outbox) -> SimResult<()> {
    let player = world.require_player_mut(player_id)?;
    player.online = false;
    player.reset_transient();
    out.push(ServerMessage::PlayerLeftMap {
        player_id,
        map_id: player.current_map_id.clone(),
    });
    Ok(())
}

/// Walk on the current map, or switch maps when `map_id` differs.
/// Switching checks the level requirement and, for castle maps, moves the
/// player's respawn point there.
pub fn move_player(
    world: &mut World,
    player_id: PlayerId,
    request: &MoveRequest,
    out: &mut Outbox,
) -> SimResult<MoveOutcome> {
    let content = world.content_arc();
    let player = living_player(world, player_id)?;
    let goal = Position::new(request.x, request.y);

    let switching = request
        .map_id
        .as_deref()
        .filter(|id| *id != player.current_map_id);
    let Some(target_map_id) = switching else {
        let map = content
            .map(&player.current_map_id)
            .ok_or_else(|| ar_core::CoreError::MapNotFound(player.current_map_id.clone()))?;
        player.move_target = Some(map.clamp(goal));
        player.state = PlayerState::Moving;
        player.combat_target = None;
        return Ok(MoveOutcome::Walking);
    };

    let map = content
        .map(target_map_id)
        .ok_or_else(|| ar_core::CoreError::MapNotFound(target_map_id.to_string()))?;
    if player.level < map.level_requirement {
        return Err(MechError::LevelTooLow {
            required: map.level_requirement,
            actual: player.level,
        }
        .into());
    }
    if map.kind == MapKind::Castle {
        player.respawn_map_id = Some(map.id.clone());
    }
    let from_map = std::mem::replace(&mut player.current_map_id, map.id.clone());
    player.position = map.clamp(goal);
    player.reset_transient();

    out.push(ServerMessage::PlayerLeftMap {
        player_id,
        map_id: from_map.clone(),
    });
    out.push_delta(EntityDelta::player(player));
    Ok(MoveOutcome::Teleported { from_map })
}

/// Engage a monster. The tick loop resolves the rounds.
pub fn attack(world: &mut World, player_id: PlayerId, monster_id: MonsterId) -> SimResult<()> {
    let monster_map = world.require_monster(monster_id)?.map_id.clone();
    let player = living_player(world, player_id)?;
    if player.current_map_id != monster_map {
        return Err(MechError::DifferentMap {
            player: player.current_map_id.clone(),
            target: monster_map,
        }
        .into());
    }
    player.state = PlayerState::Combat;
    player.combat_target = Some(monster_id);
    player.move_target = None;
    Ok(())
}

/// Spend unallocated attribute points.
pub fn allocate(
    world: &mut World,
    player_id: PlayerId,
    allocation: AttributeAllocation,
    rules: &Rules,
) -> SimResult<()> {
    let player = world.require_player_mut(player_id)?;
    allocate_attributes(player, allocation, &rules.enhancement)?;
    Ok(())
}

/// Equip an inventory item. Returns the slot it went into.
pub fn equip(
    world: &mut World,
    player_id: PlayerId,
    item_id: ItemId,
    rules: &Rules,
) -> SimResult<EquipSlot> {
    let player = world.require_player_mut(player_id)?;
    Ok(inventory::equip_item(player, item_id, &rules.enhancement)?)
}

/// Move an equipped item back to the inventory.
pub fn unequip(
    world: &mut World,
    player_id: PlayerId,
    slot: EquipSlot,
    rules: &Rules,
) -> SimResult<ItemId> {
    let player = world.require_player_mut(player_id)?;
    Ok(inventory::unequip_item(player, slot, &rules.enhancement)?)
}

/// Returns the HP restored.
pub fn use_item(world: &mut World, player_id: PlayerId, item_id: ItemId) -> SimResult<i64> {
    let player = world.require_player_mut(player_id)?;
    Ok(inventory::use_item(player, item_id)?)
}

/// Attempt one enhancement of an owned item.
pub fn upgrade(
    world: &mut World,
    player_id: PlayerId,
    item_id: ItemId,
    rules: &Rules,
    rng: &mut impl Rng,
) -> SimResult<UpgradeReport> {
    let player = world.require_player_mut(player_id)?;
    let report = ar_mechanics::upgrade_item(player, item_id, &rules.enhancement, rng)?;
    info!(
        player = %player_id,
        item = %item_id,
        rate = report.rate,
        roll = report.roll,
        success = report.succeeded(),
        "enhancement attempted"
    );
    Ok(report)
}

/// Harvest a resource node and announce its cooldown.
pub fn gather(
    world: &mut World,
    player_id: PlayerId,
    resource_id: &str,
    rules: &Rules,
    rng: &mut impl Rng,
    now: DateTime<Utc>,
    out: &mut Outbox,
) -> SimResult<GatherReport> {
    let report = ar_mechanics::gather(world, player_id, resource_id, rules, rng, now)?;
    out.push(ServerMessage::ResourceUpdate {
        resource_id: report.resource_id.clone(),
        map_id: report.map_id.clone(),
        ready_at: report.ready_at,
        available: false,
    });
    Ok(report)
}

/// Make `mission_id` the player's active mission.
pub fn start_mission(world: &mut World, player_id: PlayerId, mission_id: &str) -> SimResult<()> {
    let content = world.content_arc();
    let player = world.require_player_mut(player_id)?;
    missions::start_mission(player, mission_id, &content)?;
    Ok(())
}

/// Claim the active mission's reward.
pub fn claim_mission(
    world: &mut World,
    player_id: PlayerId,
    rules: &Rules,
    out: &mut Outbox,
) -> SimResult<MissionReward> {
    let content = world.content_arc();
    let player = world.require_player_mut(player_id)?;
    let reward = missions::claim_mission(player, &content, &rules.enhancement)?;
    if reward.levels_gained > 0 {
        out.push(ServerMessage::LevelUp {
            player_id,
            level: player.level,
        });
    }
    Ok(reward)
}

/// Paid revival in place.
pub fn revive(
    world: &mut World,
    player_id: PlayerId,
    rules: &Rules,
    out: &mut Outbox,
) -> SimResult<()> {
    let player = world.require_player_mut(player_id)?;
    ar_mechanics::revive_player(player, &rules.revival)?;
    out.push_delta(EntityDelta::player(player));
    Ok(())
}

/// Free respawn at the respawn map once the delay has passed.
pub fn respawn(
    world: &mut World,
    player_id: PlayerId,
    rules: &Rules,
    now: DateTime<Utc>,
    out: &mut Outbox,
) -> SimResult<()> {
    let content = world.content_arc();
    let player = world.require_player_mut(player_id)?;
    if let Some(map_id) = ar_mechanics::respawn_player(player, &content, &rules.revival, now)? {
        out.push(ServerMessage::PlayerLeftMap { player_id, map_id });
    }
    out.push_delta(EntityDelta::player(player));
    Ok(())
}

/// Broadcast a chat line to the player's map. Blank messages are rejected.
pub fn chat(
    world: &World,
    player_id: PlayerId,
    message: &str,
    out: &mut Outbox,
) -> SimResult<()> {
    let message = message.trim();
    if message.is_empty() {
        return Err(SimError::InvalidCommand("chat message is empty".into()));
    }
    let player = world.require_player(player_id)?;
    out.push(ServerMessage::Chat {
        player_id: Some(player_id),
        name: player.name.clone(),
        message: message.to_string(),
        map_id: Some(player.current_map_id.clone()),
    });
    Ok(())
}

/// Swap in freshly loaded content. Returns how many monsters spawned.
pub fn reload_world(world: &mut World, content: Content, out: &mut Outbox) -> usize {
    let spawned = world.reload(content);
    info!(spawned, "world reloaded");
    out.push(ServerMessage::ServerUpdate {
        message: "world reloaded".into(),
    });
    spawned
}

/// Async front for the command functions: takes the world lock for the
/// duration of one command, then broadcasts what the command produced.
pub struct CommandHandler {
    world: SharedWorld,
    broadcaster: Arc<dyn Broadcaster>,
    config: Arc<SimConfig>,
    rng: Mutex<StdRng>,
}

impl CommandHandler {
    /// A handler over `world` that publishes through `broadcaster`.
    pub fn new(world: SharedWorld, broadcaster: Arc<dyn Broadcaster>, config: Arc<SimConfig>) -> Self {
        let rng = StdRng::seed_from_u64(config.seed.wrapping_add(1));
        Self {
            world,
            broadcaster,
            config,
            rng: Mutex::new(rng),
        }
    }

    /// The shared world.
    pub fn world(&self) -> &SharedWorld {
        &self.world
    }

    fn rules(&self) -> &Rules {
        &self.config.rules
    }

    fn publish(&self, out: Outbox) {
        for message in out.into_messages() {
            self.broadcaster.broadcast(message);
        }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut rng)
    }

    /// See [`register_player`].
    pub async fn register_player(&self, name: &str, class: PlayerClass) -> SimResult<PlayerId> {
        let mut world = self.world.write().await;
        register_player(&mut world, name, class, &self.config)
    }

    /// See [`connect`].
    pub async fn connect(&self, player_id: PlayerId) -> SimResult<()> {
        let mut out = Outbox::new();
        connect(&mut *self.world.write().await, player_id, &mut out)?;
        self.publish(out);
        Ok(())
    }

    /// See [`disconnect`].
    pub async fn disconnect(&self, player_id: PlayerId) -> SimResult<()> {
        let mut out = Outbox::new();
        disconnect(&mut *self.world.write().await, player_id, &mut out)?;
        self.publish(out);
        Ok(())
    }

    /// See [`move_player`].
    pub async fn move_player(&self, player_id: PlayerId, request: &MoveRequest) -> SimResult<MoveOutcome> {
        let mut out = Outbox::new();
        let outcome = move_player(&mut *self.world.write().await, player_id, request, &mut out)?;
        self.publish(out);
        Ok(outcome)
    }

    /// See [`attack`].
    pub async fn attack(&self, player_id: PlayerId, monster_id: MonsterId) -> SimResult<()> {
        attack(&mut *self.world.write().await, player_id, monster_id)
    }

    /// See [`allocate`].
    pub async fn allocate(&self, player_id: PlayerId, allocation: AttributeAllocation) -> SimResult<()> {
        allocate(&mut *self.world.write().await, player_id, allocation, self.rules())
    }

    /// See [`equip`].
    pub async fn equip(&self, player_id: PlayerId, item_id: ItemId) -> SimResult<EquipSlot> {
        equip(&mut *self.world.write().await, player_id, item_id, self.rules())
    }

    /// See [`unequip`].
    pub async fn unequip(&self, player_id: PlayerId, slot: EquipSlot) -> SimResult<ItemId> {
        unequip(&mut *self.world.write().await, player_id, slot, self.rules())
    }

    /// See [`use_item`].
    pub async fn use_item(&self, player_id: PlayerId, item_id: ItemId) -> SimResult<i64> {
        use_item(&mut *self.world.write().await, player_id, item_id)
    }

    /// Roll an enhancement using the handler's seeded RNG.
    pub async fn upgrade(&self, player_id: PlayerId, item_id: ItemId) -> SimResult<UpgradeReport> {
        let mut world = self.world.write().await;
        self.with_rng(|rng| upgrade(&mut world, player_id, item_id, self.rules(), rng))
    }

    /// Harvest a node at the current wall-clock time.
    pub async fn gather(&self, player_id: PlayerId, resource_id: &str) -> SimResult<GatherReport> {
        let mut out = Outbox::new();
        let report = {
            let mut world = self.world.write().await;
            self.with_rng(|rng| {
                gather(&mut world, player_id, resource_id, self.rules(), rng, Utc::now(), &mut out)
            })?
        };
        self.publish(out);
        Ok(report)
    }

    /// See [`start_mission`].
    pub async fn start_mission(&self, player_id: PlayerId, mission_id: &str) -> SimResult<()> {
        start_mission(&mut *self.world.write().await, player_id, mission_id)
    }

    /// See [`claim_mission`].
    pub async fn claim_mission(&self, player_id: PlayerId) -> SimResult<MissionReward> {
        let mut out = Outbox::new();
        let reward = claim_mission(&mut *self.world.write().await, player_id, self.rules(), &mut out)?;
        self.publish(out);
        Ok(reward)
    }

    /// See [`revive`].
    pub async fn revive(&self, player_id: PlayerId) -> SimResult<()> {
        let mut out = Outbox::new();
        revive(&mut *self.world.write().await, player_id, self.rules(), &mut out)?;
        self.publish(out);
        Ok(())
    }

    /// Free respawn, checked against the current wall-clock time.
    pub async fn respawn(&self, player_id: PlayerId) -> SimResult<()> {
        let mut out = Outbox::new();
        respawn(&mut *self.world.write().await, player_id, self.rules(), Utc::now(), &mut out)?;
        self.publish(out);
        Ok(())
    }

    /// See [`chat`].
    pub async fn chat(&self, player_id: PlayerId, message: &str) -> SimResult<()> {
        let mut out = Outbox::new();
        chat(&*self.world.read().await, player_id, message, &mut out)?;
        self.publish(out);
        Ok(())
    }

    /// See [`reload_world`].
    pub async fn reload_world(&self, content: Content) -> usize {
        let mut out = Outbox::new();
        let spawned = reload_world(&mut *self.world.write().await, content, &mut out);
        self.publish(out);
        spawned
    }
}

impl std::fmt::Debug for CommandHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandHandler")
            .field("config", &self.config)
            .finish()
    }
}
