//! Kill and collect mission progress.
//!
//! Matching is always on template ids stored on the instance, never on
//! the shape of an instance id.

use ar_core::{Content, MissionKind, Player};
use serde::{Deserialize, Serialize};

use crate::enhancement::EnhancementConfig;
use crate::error::{MechError, MechResult};
use crate::progression::award_xp;

fn advance(
    player: &mut Player,
    kind: MissionKind,
    target_id: &str,
    amount: u32,
    content: &Content,
) -> bool {
    let Some(mission) = player
        .missions
        .active
        .as_deref()
        .and_then(|id| content.mission(id))
    else {
        return false;
    };
    if mission.kind != kind || mission.target_id != target_id {
        return false;
    }
    let target = mission.target_count;
    player.missions.progress = (player.missions.progress + amount).min(target);
    true
}

/// Count a kill toward the active kill mission. Returns whether it counted.
pub fn record_kill(player: &mut Player, monster_template_id: &str, content: &Content) -> bool {
    advance(player, MissionKind::Kill, monster_template_id, 1, content)
}

/// Count collected items toward the active collect mission.
pub fn record_collect(
    player: &mut Player,
    item_template_id: &str,
    quantity: u32,
    content: &Content,
) -> bool {
    advance(player, MissionKind::Collect, item_template_id, quantity, content)
}

/// Make `mission_id` the active mission. Switching missions resets the
/// counter; re-starting the active one keeps it.
pub fn start_mission(player: &mut Player, mission_id: &str, content: &Content) -> MechResult<()> {
    let mission = content
        .mission(mission_id)
        .ok_or_else(|| ar_core::CoreError::MissionNotFound(mission_id.to_string()))?;
    if player.level < mission.level_requirement {
        return Err(MechError::LevelTooLow {
            required: mission.level_requirement,
            actual: player.level,
        });
    }
    if player.missions.active.as_deref() != Some(mission_id) {
        player.missions.active = Some(mission_id.to_string());
        player.missions.progress = 0;
    }
    Ok(())
}

/// What a claimed mission paid out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionReward {
    /// Mission that was claimed.
    pub mission_id: String,
    /// XP awarded.
    pub xp: u64,
    /// Gold awarded.
    pub gold: u64,
    /// Levels gained from the XP.
    pub levels_gained: u32,
}

/// Pay out the active mission once its counter is full.
pub fn claim_mission(
    player: &mut Player,
    content: &Content,
    config: &EnhancementConfig,
) -> MechResult<MissionReward> {
    let mission_id = player
        .missions
        .active
        .clone()
        .ok_or(MechError::NoActiveMission)?;
    let mission = content
        .mission(&mission_id)
        .ok_or_else(|| ar_core::CoreError::MissionNotFound(mission_id.clone()))?;
    if player.missions.progress < mission.target_count {
        return Err(MechError::MissionIncomplete {
            progress: player.missions.progress,
            required: mission.target_count,
        });
    }
    let (xp, gold) = (mission.reward_xp, mission.reward_gold);

    player.gold += gold;
    let levels_gained = award_xp(player, xp, config);
    player.missions.completed.insert(mission_id.clone());
    player.missions.active = None;
    player.missions.progress = 0;

    Ok(MissionReward {
        mission_id,
        xp,
        gold,
        levels_gained,
    })
}
