//! Per-monster behaviour state machine.
//!
//! ```text
//! Idle ──2%/tick──▶ Wandering ──arrived──▶ Idle
//! Idle/Wandering ──player in aggro range──▶ Chasing
//! Chasing ──within melee──▶ Attacking ──out of range──▶ Chasing
//! Chasing ──past leash──▶ Returning ──at anchor──▶ Idle
//! Attacking ──target lost──▶ Idle
//! ```

use std::f64::consts::TAU;

use ar_core::{AiState, MonsterId, PlayerId, PlayerState, Position, World};
use ar_mechanics::monster_attack;
use ar_mechanics::movement::advance;
use rand::Rng;

use crate::combat::elapsed_secs;
use crate::context::TickContext;
use crate::delta::EntityDelta;
use crate::error::SimResult;
use crate::message::ServerMessage;
use crate::system::System;

/// Drives every live monster through its AI state machine once per tick.
#[derive(Debug, Default)]
pub struct MonsterAiSystem;

impl MonsterAiSystem {
    /// Create the system.
    pub fn new() -> Self {
        Self
    }
}

impl System for MonsterAiSystem {
    fn name(&self) -> &str {
        "monster_ai"
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> SimResult<()> {
        let mut ids = ctx.world.monster_ids();
        ids.sort();
        for id in ids {
            step_monster(ctx, id);
        }
        Ok(())
    }
}

/// A target is only valid while online, alive and on the monster's map.
fn valid_target(world: &World, player_id: PlayerId, map_id: &str) -> Option<Position> {
    world
        .player(player_id)
        .filter(|p| p.online && p.is_alive() && p.current_map_id == map_id)
        .map(|p| p.position)
}

fn step_monster(ctx: &mut TickContext<'_>, id: MonsterId) {
    let Some(monster) = ctx.world.monster(id) else {
        return;
    };
    if !monster.is_alive() {
        return;
    }
    let before = (monster.position, monster.ai_state);

    let target = drop_lost_target(ctx.world, id);
    let target = match target {
        Some(found) => Some(found),
        None => acquire_target(ctx.world, id),
    };

    let Some(state) = ctx.world.monster(id).map(|m| m.ai_state) else {
        return;
    };
    match (state, target) {
        (AiState::Idle, _) => idle(ctx, id),
        (AiState::Wandering, _) => wander(ctx, id),
        (AiState::Chasing, Some(target)) => chase(ctx, id, target),
        (AiState::Attacking, Some(target)) => attack(ctx, id, target),
        (AiState::Attacking, None) => {
            if let Some(monster) = ctx.world.monster_mut(id) {
                monster.ai_state = AiState::Idle;
            }
        }
        (AiState::Chasing, None) | (AiState::Returning, _) => return_home(ctx, id),
    }

    if let Some(monster) = ctx.world.monster(id) {
        if (monster.position, monster.ai_state) != before {
            let delta = EntityDelta::monster(monster);
            ctx.push_delta(delta);
        }
    }
}

/// Clear a target that is no longer valid. Returns the surviving target.
fn drop_lost_target(world: &mut World, id: MonsterId) -> Option<(PlayerId, Position)> {
    let monster = world.monster(id)?;
    let player_id = monster.target?;
    if let Some(position) = valid_target(world, player_id, &monster.map_id) {
        return Some((player_id, position));
    }
    let monster = world.monster_mut(id)?;
    monster.target = None;
    monster.ai_state = match monster.ai_state {
        AiState::Attacking => AiState::Idle,
        AiState::Chasing => AiState::Returning,
        other => other,
    };
    None
}

/// Aggressive monsters without a target pick the nearest eligible player.
fn acquire_target(world: &mut World, id: MonsterId) -> Option<(PlayerId, Position)> {
    let monster = world.monster(id)?;
    let idle = matches!(monster.ai_state, AiState::Idle | AiState::Wandering);
    if !monster.behavior.is_aggressive() || monster.target.is_some() || !idle {
        return None;
    }
    let origin = monster.position;
    let (player_id, position, _) = world
        .players()
        .filter(|p| p.online && p.is_alive() && p.current_map_id == monster.map_id)
        .map(|p| (p.id, p.position, origin.distance_to(p.position)))
        .filter(|(_, _, distance)| *distance < monster.aggro_range)
        .min_by(|a, b| a.2.total_cmp(&b.2))?;

    let monster = world.monster_mut(id)?;
    monster.target = Some(player_id);
    monster.ai_state = AiState::Chasing;
    monster.wander_target = None;
    Some((player_id, position))
}

fn idle(ctx: &mut TickContext<'_>, id: MonsterId) {
    if ctx.rng.random::<f64>() >= ctx.config.wander_chance {
        return;
    }
    let angle = ctx.rng.random::<f64>() * TAU;
    let radius = ctx.rng.random::<f64>() * ctx.config.wander_radius;
    let Some(monster) = ctx.world.monster(id) else {
        return;
    };
    let mut goal = Position::new(
        monster.spawn.x + radius * angle.cos(),
        monster.spawn.y + radius * angle.sin(),
    );
    if let Some(map) = ctx.world.map(&monster.map_id) {
        goal = goal.clamped(1.0, map.width - 1.0, map.height - 1.0);
    }
    if let Some(monster) = ctx.world.monster_mut(id) {
        monster.wander_target = Some(goal);
        monster.ai_state = AiState::Wandering;
    }
}

fn wander(ctx: &mut TickContext<'_>, id: MonsterId) {
    let step_factor = ctx.dt() * ctx.config.wander_speed_factor;
    let arrival = ctx.config.wander_arrival;
    let Some(monster) = ctx.world.monster_mut(id) else {
        return;
    };
    let Some(goal) = monster.wander_target else {
        monster.ai_state = AiState::Idle;
        return;
    };
    if monster.position.distance_to(goal) < arrival {
        monster.ai_state = AiState::Idle;
        monster.wander_target = None;
    } else {
        monster.position = advance(monster.position, goal, monster.stats.speed * step_factor);
    }
}

fn chase(ctx: &mut TickContext<'_>, id: MonsterId, (_, target): (PlayerId, Position)) {
    let dt = ctx.dt();
    let melee = ctx.config.melee_range;
    let Some(monster) = ctx.world.monster_mut(id) else {
        return;
    };
    if monster.distance_from_spawn() > monster.leash_range {
        monster.target = None;
        monster.ai_state = AiState::Returning;
    } else if monster.position.distance_to(target) <= melee {
        monster.ai_state = AiState::Attacking;
    } else {
        monster.position = advance(monster.position, target, monster.stats.speed * dt);
    }
}

fn attack(ctx: &mut TickContext<'_>, id: MonsterId, (player_id, target): (PlayerId, Position)) {
    let now = ctx.now();
    let interval = ctx.config.monster_attack_interval;
    let Some(monster) = ctx.world.monster_mut(id) else {
        return;
    };
    if monster.position.distance_to(target) > ctx.config.disengage_range {
        monster.ai_state = AiState::Chasing;
        return;
    }
    let due = monster
        .last_attack_at
        .is_none_or(|last| elapsed_secs(last, now) >= interval);
    if due {
        monster.last_attack_at = Some(now);
    }

    if let Some(player) = ctx.world.player_mut(player_id) {
        player.state = PlayerState::Combat;
        player.move_target = None;
        if player.combat_target.is_none() {
            player.combat_target = Some(id);
        }
    }
    if !due {
        return;
    }

    let Ok(log) = monster_attack(ctx.world, id, player_id, &mut *ctx.rng, now) else {
        return;
    };
    if log.is_empty() {
        return;
    }
    let Some(monster) = ctx.world.monster(id) else {
        return;
    };
    let message = ServerMessage::CombatUpdate {
        player_id,
        monster_id: id,
        monster_name: monster.name.clone(),
        player_hp: ctx.world.player(player_id).map_or(0, |p| p.stats.hp),
        monster_hp: monster.stats.hp,
        monster_max_hp: monster.stats.max_hp,
        log,
    };
    ctx.emit(message);
}

fn return_home(ctx: &mut TickContext<'_>, id: MonsterId) {
    let step_factor = ctx.dt() * ctx.config.return_speed_factor;
    let arrival = ctx.config.wander_arrival;
    let Some(monster) = ctx.world.monster_mut(id) else {
        return;
    };
    monster.ai_state = AiState::Returning;
    monster.target = None;
    if monster.position.distance_to(monster.spawn) < arrival {
        monster.position = monster.spawn;
        monster.ai_state = AiState::Idle;
    } else {
        monster.position = advance(monster.position, monster.spawn, monster.stats.speed * step_factor);
    }
}
