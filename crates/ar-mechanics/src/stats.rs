//! Derived stat recalculation.
//!
//! Player stats are always rebuilt from attributes and equipment. Nothing
//! ever adds or subtracts an item's contribution in place, so equip order
//! and repeated swaps cannot drift the totals.

use ar_core::stats::{DEFAULT_CRIT_DAMAGE, DEFAULT_CRIT_RATE};
use ar_core::{AwakeningKind, Player, Stats};

use crate::enhancement::EnhancementConfig;

#[derive(Debug, Default)]
struct Bonuses {
    atk: f64,
    def: f64,
    hp: f64,
    speed: f64,
    pct_atk: f64,
    pct_def: f64,
    pct_hp: f64,
    pct_speed: f64,
    crit_rate: f64,
    crit_damage: f64,
    lifesteal: f64,
}

/// Recompute `player.stats` from scratch. Current HP is kept but clamped
/// to the new maximum.
pub fn recalculate_stats(player: &mut Player, config: &EnhancementConfig) {
    let base = Stats::from_attributes(&player.attributes);
    let mut b = Bonuses::default();

    for item in player.equipment.values() {
        let m = config.multiplier(item);
        b.atk += item.stats.atk as f64 * m;
        b.def += item.stats.def as f64 * m;
        b.hp += item.stats.hp as f64 * m;
        b.speed += item.stats.speed * m;
        for a in &item.awakenings {
            match a.kind {
                AwakeningKind::PercentAtk => b.pct_atk += a.value,
                AwakeningKind::PercentDef => b.pct_def += a.value,
                AwakeningKind::PercentHp => b.pct_hp += a.value,
                AwakeningKind::PercentSpeed => b.pct_speed += a.value,
                AwakeningKind::CritRate => b.crit_rate += a.value,
                AwakeningKind::CritDamage => b.crit_damage += a.value,
                AwakeningKind::Lifesteal => b.lifesteal += a.value,
            }
        }
    }

    let max_hp = ((base.max_hp as f64 + b.hp) * (1.0 + b.pct_hp)) as i64;
    let speed = (base.speed + b.speed) * (1.0 + b.pct_speed);
    let stats = &mut player.stats;
    stats.max_hp = max_hp.max(1);
    stats.atk = ((base.atk as f64 + b.atk) * (1.0 + b.pct_atk)) as i64;
    stats.def = ((base.def as f64 + b.def) * (1.0 + b.pct_def)) as i64;
    stats.speed = (speed * 100.0).round() / 100.0;
    stats.attack_cooldown = base.attack_cooldown;
    stats.crit_rate = DEFAULT_CRIT_RATE + b.crit_rate;
    stats.crit_damage = DEFAULT_CRIT_DAMAGE + b.crit_damage;
    stats.lifesteal = b.lifesteal;
    stats.hp = stats.hp.clamp(0, stats.max_hp);
}
