use ar_core::{MonsterId, PlayerId, PlayerState};
use ar_mechanics::resolve_round;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::context::TickContext;
use crate::delta::EntityDelta;
use crate::error::SimResult;
use crate::message::ServerMessage;
use crate::system::System;

/// Resolves auto-attack rounds for every online player in `Combat`.
///
/// Anything that makes the round inapplicable (a dead player, a vanished
/// or out-of-range target, an empty log) drops the player back to `Idle`
/// instead of failing the tick.
#[derive(Debug, Default)]
pub struct PlayerCombatSystem;

impl PlayerCombatSystem {
    /// Create the system.
    pub fn new() -> Self {
        Self
    }

    fn engage(ctx: &mut TickContext<'_>, player_id: PlayerId, now: DateTime<Utc>) {
        let Some(player) = ctx.world.player(player_id) else {
            return;
        };
        if !player.is_alive() {
            Self::disengage(ctx, player_id);
            return;
        }
        let cooldown = player.stats.attack_cooldown;
        let ready = player
            .last_attack_at
            .is_none_or(|last| elapsed_secs(last, now) >= cooldown);
        if !ready {
            return;
        }
        let (position, map_id) = (player.position, player.current_map_id.clone());
        let target = player.combat_target;

        if let Some(player) = ctx.world.player_mut(player_id) {
            player.last_attack_at = Some(now);
        }

        let Some(monster_id) = target else {
            Self::disengage(ctx, player_id);
            return;
        };
        let Some(monster) = ctx.world.monster(monster_id) else {
            Self::disengage(ctx, player_id);
            return;
        };
        if monster.map_id == map_id
            && position.distance_to(monster.position) > ctx.config.player_attack_range
        {
            Self::disengage(ctx, player_id);
            return;
        }
        let monster_name = monster.name.clone();
        let monster_max_hp = monster.stats.max_hp;

        let rules = &ctx.config.rules;
        let log = match resolve_round(ctx.world, player_id, monster_id, rules, &mut *ctx.rng, now) {
            Ok(log) if !log.is_empty() => log,
            Ok(_) => {
                Self::disengage(ctx, player_id);
                return;
            }
            Err(err) => {
                debug!(player = %player_id, monster = %monster_id, error = %err, "combat round rejected");
                Self::disengage(ctx, player_id);
                return;
            }
        };

        let player_hp = ctx.world.player(player_id).map_or(0, |p| p.stats.hp);
        let monster_hp = monster_hp(ctx, monster_id);
        let new_level = log.new_level;
        ctx.emit(ServerMessage::CombatUpdate {
            player_id,
            monster_id,
            monster_name,
            log,
            player_hp,
            monster_hp,
            monster_max_hp,
        });
        if let Some(level) = new_level {
            ctx.emit(ServerMessage::LevelUp { player_id, level });
        }
    }

    fn disengage(ctx: &mut TickContext<'_>, player_id: PlayerId) {
        if let Some(player) = ctx.world.player_mut(player_id) {
            player.disengage();
        }
    }
}

fn monster_hp(ctx: &TickContext<'_>, monster_id: MonsterId) -> i64 {
    ctx.world.monster(monster_id).map_or(0, |m| m.stats.hp)
}

pub(crate) fn elapsed_secs(since: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - since).num_milliseconds() as f64 / 1000.0
}

impl System for PlayerCombatSystem {
    fn name(&self) -> &str {
        "player_combat"
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> SimResult<()> {
        let now = ctx.now();
        let mut fighters: Vec<PlayerId> = ctx
            .world
            .players()
            .filter(|p| p.online && p.state == PlayerState::Combat)
            .map(|p| p.id)
            .collect();
        fighters.sort();

        for id in fighters {
            Self::engage(ctx, id, now);
            if let Some(player) = ctx.world.player(id) {
                let delta = EntityDelta::player(player);
                ctx.push_delta(delta);
            }
        }
        Ok(())
    }
}
