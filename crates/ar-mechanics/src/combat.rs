//! One exchange of blows between a player and a monster.
//!
//! The player-initiated round ([`resolve_round`]) carries every side
//! effect: aggro, group aggro, XP, missions, loot, and respawn scheduling.
//! The monster-initiated path ([`monster_attack`]) only deals damage.

use ar_core::content::DEFAULT_RESPAWN_SECS;
use ar_core::{AiState, ItemInstance, Monster, MonsterId, PlayerId, Position, Stats, World};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MechError, MechResult};
use crate::inventory;
use crate::loot::{roll_drops, roll_gold};
use crate::missions;
use crate::progression::award_xp;
use crate::revival::kill_player;
use crate::rules::Rules;

/// `max(1, atk - def / 2)` with integer division.
pub fn base_damage(atk: i64, def: i64) -> i64 {
    (atk - def / 2).max(1)
}

/// Result of a single hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strike {
    /// HP removed from the defender.
    pub damage: i64,
    /// Whether the hit was a critical.
    pub critical: bool,
    /// HP the attacker regained through lifesteal.
    pub healed: i64,
}

/// Land one hit from `attacker` on `defender`.
///
/// A roll under the attacker's crit rate multiplies damage by
/// `1 + crit_damage`. Positive lifesteal heals the attacker by
/// `floor(damage * lifesteal)`, capped at max HP.
pub fn strike(attacker: &mut Stats, defender: &mut Stats, rng: &mut impl Rng) -> Strike {
    let mut damage = base_damage(attacker.atk, defender.def);
    let critical = rng.random::<f64>() < attacker.crit_rate;
    if critical {
        damage = ((damage as f64 * (1.0 + attacker.crit_damage)).floor() as i64).max(1);
    }
    defender.take_damage(damage);
    let healed = if attacker.lifesteal > 0.0 {
        attacker.heal((damage as f64 * attacker.lifesteal).floor() as i64)
    } else {
        0
    };
    Strike {
        damage,
        critical,
        healed,
    }
}

fn is_zero<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}

/// What happened in one round. An empty log means combat did not apply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatLog {
    /// Damage the player dealt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_dmg: Option<i64>,
    /// Damage the monster dealt back.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monster_dmg: Option<i64>,
    /// Player's hit was a critical.
    #[serde(skip_serializing_if = "is_zero")]
    pub critical: bool,
    /// Monster's hit was a critical.
    #[serde(skip_serializing_if = "is_zero")]
    pub monster_critical: bool,
    /// HP the player healed through lifesteal.
    #[serde(skip_serializing_if = "is_zero")]
    pub lifesteal: i64,
    /// The monster was killed this round.
    #[serde(skip_serializing_if = "is_zero")]
    pub monster_died: bool,
    /// The player was killed this round.
    #[serde(skip_serializing_if = "is_zero")]
    pub player_died: bool,
    /// XP awarded for the kill.
    #[serde(skip_serializing_if = "is_zero")]
    pub xp_gained: u64,
    /// Gold awarded for the kill.
    #[serde(skip_serializing_if = "is_zero")]
    pub gold_gained: u64,
    /// Level reached, if the kill caused a level-up.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_level: Option<u32>,
    /// Items added to the player's inventory.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub drops: Vec<ItemInstance>,
    /// Monsters pulled into the fight by group aggro.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub group_aggro: Vec<MonsterId>,
}

impl CombatLog {
    /// True when no blows were exchanged.
    pub fn is_empty(&self) -> bool {
        self.player_dmg.is_none() && self.monster_dmg.is_none()
    }
}

/// Resolve one player-initiated round against a monster.
///
/// Cross-map pairs return an empty log. The player strikes first. A dead
/// monster is removed from the world before this returns, with rewards
/// paid and its respawn queued at the spawn anchor. A surviving monster
/// without a target aggros onto the player, pulls nearby idle kin with it,
/// and strikes back.
pub fn resolve_round(
    world: &mut World,
    player_id: PlayerId,
    monster_id: MonsterId,
    rules: &Rules,
    rng: &mut impl Rng,
    now: DateTime<Utc>,
) -> MechResult<CombatLog> {
    let mut log = CombatLog::default();
    let (player, monster) = world.player_and_monster_mut(player_id, monster_id)?;
    if player.current_map_id != monster.map_id {
        return Ok(log);
    }
    if !player.is_alive() {
        return Err(MechError::PlayerDead);
    }

    let hit = strike(&mut player.stats, &mut monster.stats, rng);
    log.player_dmg = Some(hit.damage);
    log.critical = hit.critical;
    log.lifesteal = hit.healed;

    if !monster.is_alive() {
        log.monster_died = true;
        if let Some(dead) = world.remove_monster(monster_id) {
            on_monster_killed(world, player_id, &dead, rules, rng, now, &mut log)?;
        }
        return Ok(log);
    }

    if monster.target.is_none() {
        monster.target = Some(player_id);
        monster.ai_state = AiState::Chasing;
        monster.wander_target = None;
        let template_id = monster.template_id.clone();
        let map_id = monster.map_id.clone();
        let origin = monster.position;
        log.group_aggro = group_aggro(
            world,
            monster_id,
            &template_id,
            &map_id,
            origin,
            player_id,
            rules.group_aggro_radius,
        );
    }

    let (player, monster) = world.player_and_monster_mut(player_id, monster_id)?;
    let hit = strike(&mut monster.stats, &mut player.stats, rng);
    log.monster_dmg = Some(hit.damage);
    log.monster_critical = hit.critical;
    if !player.is_alive() {
        log.player_died = true;
        kill_player(player, now);
    }
    Ok(log)
}

/// A monster's scheduled hit on its target. Damage only: no aggro spread,
/// no XP, no loot.
pub fn monster_attack(
    world: &mut World,
    monster_id: MonsterId,
    player_id: PlayerId,
    rng: &mut impl Rng,
    now: DateTime<Utc>,
) -> MechResult<CombatLog> {
    let mut log = CombatLog::default();
    let (player, monster) = world.player_and_monster_mut(player_id, monster_id)?;
    if player.current_map_id != monster.map_id || !player.is_alive() {
        return Ok(log);
    }
    let hit = strike(&mut monster.stats, &mut player.stats, rng);
    log.monster_dmg = Some(hit.damage);
    log.monster_critical = hit.critical;
    if !player.is_alive() {
        log.player_died = true;
        kill_player(player, now);
    }
    Ok(log)
}

fn group_aggro(
    world: &mut World,
    source: MonsterId,
    template_id: &str,
    map_id: &str,
    origin: Position,
    target: PlayerId,
    radius: f64,
) -> Vec<MonsterId> {
    let allies: Vec<MonsterId> = world
        .monsters_on_map(map_id)
        .filter(|m| {
            m.id != source
                && m.template_id == template_id
                && m.target.is_none()
                && matches!(m.ai_state, AiState::Idle | AiState::Wandering)
                && m.position.distance_to(origin) <= radius
        })
        .map(|m| m.id)
        .collect();
    for id in &allies {
        if let Some(m) = world.monster_mut(*id) {
            m.target = Some(target);
            m.ai_state = AiState::Chasing;
            m.wander_target = None;
        }
    }
    allies
}

fn on_monster_killed(
    world: &mut World,
    player_id: PlayerId,
    dead: &Monster,
    rules: &Rules,
    rng: &mut impl Rng,
    now: DateTime<Utc>,
    log: &mut CombatLog,
) -> MechResult<()> {
    let content = world.content_arc();
    let template = content.monster(&dead.template_id);
    let player = world.require_player_mut(player_id)?;

    log.xp_gained = dead.xp_reward;
    if award_xp(player, dead.xp_reward, &rules.enhancement) > 0 {
        log.new_level = Some(player.level);
    }
    missions::record_kill(player, &dead.template_id, &content);

    let gold = roll_gold(rng);
    player.gold += gold;
    log.gold_gained = gold;
    if let Some(template) = template {
        for item in roll_drops(&content, &template.drops, rng) {
            log.drops.push(item.clone());
            inventory::add_item(player, item, &content, &rules.enhancement);
        }
    }
    player.disengage();

    let delay = template.map_or(DEFAULT_RESPAWN_SECS, |t| t.respawn_secs);
    world.queue_respawn(&dead.template_id, &dead.map_id, dead.spawn, delay, now);
    debug!(monster = %dead.id, killer = %player_id, gold, "monster killed");
    Ok(())
}
