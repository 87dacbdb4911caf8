use tracing::debug;

use crate::context::TickContext;
use crate::error::SimResult;
use crate::message::ServerMessage;
use crate::system::System;

/// Drains due respawn records and re-materializes their monsters.
#[derive(Debug, Default)]
pub struct RespawnSystem;

impl RespawnSystem {
    /// Create the system.
    pub fn new() -> Self {
        Self
    }
}

impl System for RespawnSystem {
    fn name(&self) -> &str {
        "respawn"
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> SimResult<()> {
        let now = ctx.now();
        for record in ctx.world.check_respawns(now) {
            let Some(id) =
                ctx.world
                    .spawn_from_template(&record.template_id, &record.map_id, record.position)
            else {
                continue;
            };
            if let Some(monster) = ctx.world.monster(id) {
                debug!(monster = %id, template = %record.template_id, map = %record.map_id, "monster respawned");
                let monster = monster.clone();
                ctx.emit(ServerMessage::MonsterRespawn { monster });
            }
        }
        Ok(())
    }
}
