use ar_core::{PlayerId, PlayerState};
use ar_mechanics::move_towards;

use crate::context::TickContext;
use crate::delta::EntityDelta;
use crate::error::SimResult;
use crate::system::System;

/// Advances every online player in `Moving` toward its move target.
#[derive(Debug, Default)]
pub struct MovementSystem;

impl MovementSystem {
    /// Create the system.
    pub fn new() -> Self {
        Self
    }
}

impl System for MovementSystem {
    fn name(&self) -> &str {
        "movement"
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> SimResult<()> {
        let dt = ctx.dt();
        let mut movers: Vec<PlayerId> = ctx
            .world
            .players()
            .filter(|p| p.online && p.state == PlayerState::Moving)
            .map(|p| p.id)
            .collect();
        movers.sort();

        for id in movers {
            let Some(player) = ctx.world.player_mut(id) else {
                continue;
            };
            match player.move_target {
                Some(target) => {
                    let (position, reached) =
                        move_towards(player.position, target, player.stats.speed, dt);
                    player.position = position;
                    if reached {
                        player.state = PlayerState::Idle;
                        player.move_target = None;
                    }
                }
                None => player.state = PlayerState::Idle,
            }
            let delta = EntityDelta::player(player);
            ctx.push_delta(delta);
        }
        Ok(())
    }
}
