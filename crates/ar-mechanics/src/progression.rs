//! Experience, level-ups, and attribute allocation.

use ar_core::{Attributes, Player};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::enhancement::EnhancementConfig;
use crate::error::{MechError, MechResult};
use crate::stats::recalculate_stats;

/// Attribute points granted per level gained.
pub const POINTS_PER_LEVEL: u32 = 5;

/// Add experience and resolve every level-up it pays for. Each level
/// grants attribute points, recomputes stats, and fully heals. Returns the
/// number of levels gained.
pub fn award_xp(player: &mut Player, amount: u64, config: &EnhancementConfig) -> u32 {
    player.xp += amount;
    let mut gained = 0;
    while player.xp >= player.next_level_xp() {
        player.xp -= player.next_level_xp();
        player.level += 1;
        player.attribute_points += POINTS_PER_LEVEL;
        recalculate_stats(player, config);
        player.stats.heal_full();
        gained += 1;
    }
    if gained > 0 {
        info!(player = %player.id, name = %player.name, level = player.level, "level up");
    }
    gained
}

/// Points to spend on each attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeAllocation {
    /// Points into strength.
    #[serde(rename = "str")]
    pub strength: u32,
    /// Points into agility.
    #[serde(rename = "agi")]
    pub agility: u32,
    /// Points into vitality.
    #[serde(rename = "vit")]
    pub vitality: u32,
    /// Points into initiative.
    #[serde(rename = "ini")]
    pub initiative: u32,
}

impl AttributeAllocation {
    /// Points this allocation spends, or `None` if the sum does not fit a `u32`.
    pub fn total(&self) -> Option<u32> {
        [self.agility, self.vitality, self.initiative]
            .into_iter()
            .try_fold(self.strength, u32::checked_add)
    }

    fn apply(&self, attrs: &mut Attributes) {
        attrs.strength = attrs.strength.saturating_add(self.strength);
        attrs.agility = attrs.agility.saturating_add(self.agility);
        attrs.vitality = attrs.vitality.saturating_add(self.vitality);
        attrs.initiative = attrs.initiative.saturating_add(self.initiative);
    }
}

/// Spend unallocated points, then recompute stats. An allocation whose
/// total overflows is treated as needing `u32::MAX` points.
pub fn allocate_attributes(
    player: &mut Player,
    allocation: AttributeAllocation,
    config: &EnhancementConfig,
) -> MechResult<()> {
    let need = allocation.total().unwrap_or(u32::MAX);
    if need > player.attribute_points {
        return Err(MechError::NotEnoughAttributePoints {
            need,
            have: player.attribute_points,
        });
    }
    allocation.apply(&mut player.attributes);
    player.attribute_points -= need;
    recalculate_stats(player, config);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ar_core::{PlayerClass, Position};

    fn player() -> Player {
        Player::new("Aria", PlayerClass::Warrior, "map_castle_1", Position::default())
    }

    #[test]
    fn exact_threshold_levels_once() {
        let mut p = player();
        let gained = award_xp(&mut p, 100, &EnhancementConfig::default());
        assert_eq!(gained, 1);
        assert_eq!(p.level, 2);
        assert_eq!(p.xp, 0);
        assert_eq!(p.attribute_points, 5);
    }

    #[test]
    fn large_award_levels_repeatedly() {
        let mut p = player();
        p.stats.hp = 1;
        // 100 (1->2) + 400 (2->3) + 50 left over
        let gained = award_xp(&mut p, 550, &EnhancementConfig::default());
        assert_eq!(gained, 2);
        assert_eq!(p.level, 3);
        assert_eq!(p.xp, 50);
        assert_eq!(p.attribute_points, 10);
        assert_eq!(p.stats.hp, p.stats.max_hp);
    }

    #[test]
    fn below_threshold_only_accumulates() {
        let mut p = player();
        assert_eq!(award_xp(&mut p, 99, &EnhancementConfig::default()), 0);
        assert_eq!(p.level, 1);
        assert_eq!(p.xp, 99);
    }

    #[test]
    fn allocation_spends_points_and_recalculates() {
        let mut p = player();
        p.attribute_points = 5;
        let alloc = AttributeAllocation {
            vitality: 3,
            strength: 2,
            ..AttributeAllocation::default()
        };
        allocate_attributes(&mut p, alloc, &EnhancementConfig::default()).unwrap();
        assert_eq!(p.attribute_points, 0);
        assert_eq!(p.attributes.vitality, 13);
        assert_eq!(p.stats.max_hp, 230);
        assert_eq!(p.stats.atk, 44);
    }

    #[test]
    fn over_allocation_is_rejected() {
        let mut p = player();
        p.attribute_points = 1;
        let alloc = AttributeAllocation {
            agility: 2,
            ..AttributeAllocation::default()
        };
        let err = allocate_attributes(&mut p, alloc, &EnhancementConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            MechError::NotEnoughAttributePoints { need: 2, have: 1 }
        ));
        assert_eq!(p.attributes.agility, 10);
    }

    #[test]
    fn overflowing_allocation_is_rejected_untouched() {
        let mut p = player();
        p.attribute_points = 5;
        let before = p.clone();
        let alloc = AttributeAllocation {
            strength: u32::MAX,
            agility: 1,
            ..AttributeAllocation::default()
        };
        assert_eq!(alloc.total(), None);

        let err = allocate_attributes(&mut p, alloc, &EnhancementConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            MechError::NotEnoughAttributePoints {
                need: u32::MAX,
                have: 5
            }
        ));
        assert_eq!(p, before);
    }
}
