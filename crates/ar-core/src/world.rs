use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::content::{Content, MapTemplate, MissionTemplate};
use crate::error::{CoreError, CoreResult};
use crate::geometry::Position;
use crate::id::{MonsterId, PlayerId};
use crate::monster::Monster;
use crate::player::Player;
use crate::respawn::{CooldownTable, RespawnQueue, RespawnRecord};

/// The single authoritative owner of every runtime entity collection.
///
/// Players are never removed. Monsters are removed the moment they die and
/// come back through the respawn queue. Static content is shared behind an
/// [`Arc`] and replaced wholesale by [`World::reload`].
#[derive(Debug, Clone, Default)]
pub struct World {
    content: Arc<Content>,
    players: HashMap<PlayerId, Player>,
    monsters: HashMap<MonsterId, Monster>,
    map_monsters: HashMap<String, Vec<MonsterId>>,
    resource_cooldowns: CooldownTable,
    respawn_queue: RespawnQueue,
}

impl World {
    /// An empty world over `content`. No monsters are spawned.
    pub fn new(content: Content) -> Self {
        Self {
            content: Arc::new(content),
            ..Self::default()
        }
    }

    /// A world with every map's initial spawn directives materialized.
    pub fn from_content(content: Content) -> Self {
        let mut world = Self::new(content);
        world.spawn_initial_monsters();
        world
    }

    /// Current content tables.
    pub fn content(&self) -> &Content {
        &self.content
    }

    /// Shared handle to the current content tables.
    pub fn content_arc(&self) -> Arc<Content> {
        Arc::clone(&self.content)
    }

    // -- Players --

    /// Insert or replace a player record.
    pub fn add_player(&mut self, player: Player) -> PlayerId {
        let id = player.id;
        self.players.insert(id, player);
        id
    }

    /// Player by id.
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    /// Mutable player by id.
    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    /// Player by id, or `PlayerNotFound`.
    pub fn require_player(&self, id: PlayerId) -> CoreResult<&Player> {
        self.players.get(&id).ok_or(CoreError::PlayerNotFound(id))
    }

    /// Mutable player by id, or `PlayerNotFound`.
    pub fn require_player_mut(&mut self, id: PlayerId) -> CoreResult<&mut Player> {
        self.players
            .get_mut(&id)
            .ok_or(CoreError::PlayerNotFound(id))
    }

    /// Player with exactly this name, online or not.
    pub fn find_player_by_name(&self, name: &str) -> Option<&Player> {
        self.players.values().find(|p| p.name == name)
    }

    /// Every registered player, in no particular order.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    /// Every registered player, mutably.
    pub fn players_mut(&mut self) -> impl Iterator<Item = &mut Player> {
        self.players.values_mut()
    }

    /// Snapshot of player ids, for loops that need to mutate the world.
    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.players.keys().copied().collect()
    }

    /// Number of registered players.
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    // -- Monsters --

    /// Insert a monster and index it under its map.
    pub fn add_monster(&mut self, monster: Monster) -> MonsterId {
        let id = monster.id;
        self.map_monsters
            .entry(monster.map_id.clone())
            .or_default()
            .push(id);
        self.monsters.insert(id, monster);
        id
    }

    /// Remove a monster and its map index entry.
    pub fn remove_monster(&mut self, id: MonsterId) -> Option<Monster> {
        let monster = self.monsters.remove(&id)?;
        if let Some(ids) = self.map_monsters.get_mut(&monster.map_id) {
            ids.retain(|m| *m != id);
        }
        Some(monster)
    }

    /// Monster by id.
    pub fn monster(&self, id: MonsterId) -> Option<&Monster> {
        self.monsters.get(&id)
    }

    /// Mutable monster by id.
    pub fn monster_mut(&mut self, id: MonsterId) -> Option<&mut Monster> {
        self.monsters.get_mut(&id)
    }

    /// Monster by id, or `MonsterNotFound`.
    pub fn require_monster(&self, id: MonsterId) -> CoreResult<&Monster> {
        self.monsters.get(&id).ok_or(CoreError::MonsterNotFound(id))
    }

    /// Mutable monster by id, or `MonsterNotFound`.
    pub fn require_monster_mut(&mut self, id: MonsterId) -> CoreResult<&mut Monster> {
        self.monsters
            .get_mut(&id)
            .ok_or(CoreError::MonsterNotFound(id))
    }

    /// Every live monster.
    pub fn monsters(&self) -> impl Iterator<Item = &Monster> {
        self.monsters.values()
    }

    /// Snapshot of monster ids.
    pub fn monster_ids(&self) -> Vec<MonsterId> {
        self.monsters.keys().copied().collect()
    }

    /// Number of live monsters.
    pub fn monster_count(&self) -> usize {
        self.monsters.len()
    }

    /// Monsters currently on `map_id`, via the per-map index.
    pub fn monsters_on_map<'a>(
        &'a self,
        map_id: &str,
    ) -> impl Iterator<Item = &'a Monster> + use<'a> {
        self.map_monsters
            .get(map_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.monsters.get(id))
    }

    /// Borrow one player and one monster mutably at the same time.
    pub fn player_and_monster_mut(
        &mut self,
        player_id: PlayerId,
        monster_id: MonsterId,
    ) -> CoreResult<(&mut Player, &mut Monster)> {
        let player = self
            .players
            .get_mut(&player_id)
            .ok_or(CoreError::PlayerNotFound(player_id))?;
        let monster = self
            .monsters
            .get_mut(&monster_id)
            .ok_or(CoreError::MonsterNotFound(monster_id))?;
        Ok((player, monster))
    }

    // -- Static lookups --

    /// Map template by id.
    pub fn map(&self, id: &str) -> Option<&MapTemplate> {
        self.content.map(id)
    }

    /// Map template by id, or `MapNotFound`.
    pub fn require_map(&self, id: &str) -> CoreResult<&MapTemplate> {
        self.content
            .map(id)
            .ok_or_else(|| CoreError::MapNotFound(id.to_string()))
    }

    /// Mission template by id, or `MissionNotFound`.
    pub fn require_mission(&self, id: &str) -> CoreResult<&MissionTemplate> {
        self.content
            .mission(id)
            .ok_or_else(|| CoreError::MissionNotFound(id.to_string()))
    }

    // -- Resource cooldowns --

    /// Whether a resource node can be gathered at `now`.
    pub fn is_resource_ready(&self, resource_id: &str, now: DateTime<Utc>) -> bool {
        self.resource_cooldowns.is_ready(resource_id, now)
    }

    /// Put a resource node on cooldown.
    pub fn set_resource_cooldown(
        &mut self,
        resource_id: &str,
        duration_secs: f64,
        now: DateTime<Utc>,
    ) {
        self.resource_cooldowns.set(resource_id, duration_secs, now);
    }

    /// Seconds until a resource node is ready again.
    pub fn resource_cooldown_remaining(&self, resource_id: &str, now: DateTime<Utc>) -> f64 {
        self.resource_cooldowns.remaining(resource_id, now)
    }

    // -- Respawns --

    /// Schedule a monster respawn. Returns the deadline.
    pub fn queue_respawn(
        &mut self,
        template_id: &str,
        map_id: &str,
        position: Position,
        delay_secs: f64,
        now: DateTime<Utc>,
    ) -> DateTime<Utc> {
        let ready_at = self
            .respawn_queue
            .enqueue(template_id, map_id, position, delay_secs, now);
        debug!(template_id, map_id, %ready_at, "respawn queued");
        ready_at
    }

    /// Remove and return every respawn record due at `now`.
    pub fn check_respawns(&mut self, now: DateTime<Utc>) -> Vec<RespawnRecord> {
        self.respawn_queue.drain_due(now)
    }

    /// Pending respawns.
    pub fn respawn_queue(&self) -> &RespawnQueue {
        &self.respawn_queue
    }

    /// Spawn one monster from its template. Unknown templates are logged
    /// and skipped.
    pub fn spawn_from_template(
        &mut self,
        template_id: &str,
        map_id: &str,
        anchor: Position,
    ) -> Option<MonsterId> {
        let Some(template) = self.content.monster(template_id) else {
            warn!(template_id, map_id, "unknown monster template, skipping spawn");
            return None;
        };
        let monster = Monster::spawn(template, map_id, anchor);
        Some(self.add_monster(monster))
    }

    /// Materialize every map's spawn directives. Returns how many spawned.
    pub fn spawn_initial_monsters(&mut self) -> usize {
        let content = Arc::clone(&self.content);
        let mut spawned = 0;
        for map in content.maps.values() {
            for directive in &map.spawns {
                let anchor = Position::new(directive.x, directive.y);
                if self
                    .spawn_from_template(&directive.template_id, &map.id, anchor)
                    .is_some()
                {
                    spawned += 1;
                }
            }
        }
        spawned
    }

    /// Swap in new content and re-derive the monster population from it.
    /// Players and resource cooldowns survive; monsters, the map index, and
    /// pending respawns do not.
    pub fn reload(&mut self, content: Content) -> usize {
        self.content = Arc::new(content);
        self.monsters.clear();
        self.map_monsters.clear();
        self.respawn_queue.clear();
        self.spawn_initial_monsters()
    }
}
