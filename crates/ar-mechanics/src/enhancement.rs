//! Item enhancement ("upgrade") and awakening rolls.
//!
//! Enhancement is separate from combat. It spends catalysts from the
//! player's inventory, rolls once against a level-dependent success rate,
//! and on every third successful level attaches a random permanent
//! [`Awakening`] to the item.

use std::collections::{BTreeMap, HashMap};

use ar_core::{Awakening, AwakeningKind, ItemId, ItemInstance, Player, Rarity};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MechError, MechResult};
use crate::inventory;
use crate::stats::recalculate_stats;

/// Tunable enhancement table. Every field falls back to its default when
/// missing from a JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhancementConfig {
    /// Success percent keyed by exact level (`"5"`) or inclusive range (`"4-6"`).
    pub success_rates: BTreeMap<String, u32>,
    /// Catalyst cost multiplier, by rarity.
    pub cost_multipliers: HashMap<Rarity, f64>,
    /// Share of the cost still consumed when an attempt fails.
    pub failure_penalty_percent: f64,
    /// Per-level stat bonus percent, by rarity.
    pub stat_bonus_percent: HashMap<Rarity, f64>,
    /// Highest reachable enhancement level.
    pub max_level: u32,
    /// Lowest rarity that may be enhanced.
    pub min_rarity: Rarity,
    /// An awakening is rolled whenever the new level is a multiple of this.
    pub awakening_interval: u32,
    /// Template id of the item spent as catalyst.
    pub catalyst_template_id: String,
}

impl Default for EnhancementConfig {
    fn default() -> Self {
        let success_rates = [("0-3", 100), ("4-6", 85), ("7-9", 75), ("10-15", 65)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        let cost_multipliers = HashMap::from([
            (Rarity::Common, 1.0),
            (Rarity::Uncommon, 1.0),
            (Rarity::Rare, 1.0),
            (Rarity::Epic, 1.5),
            (Rarity::Legendary, 2.0),
        ]);
        let stat_bonus_percent = [
            Rarity::Common,
            Rarity::Uncommon,
            Rarity::Rare,
            Rarity::Epic,
            Rarity::Legendary,
        ]
        .into_iter()
        .map(|r| (r, DEFAULT_STAT_BONUS_PERCENT))
        .collect();
        Self {
            success_rates,
            cost_multipliers,
            failure_penalty_percent: 50.0,
            stat_bonus_percent,
            max_level: 15,
            min_rarity: Rarity::Rare,
            awakening_interval: 3,
            catalyst_template_id: "item_catalyst_01".to_string(),
        }
    }
}

const DEFAULT_STAT_BONUS_PERCENT: f64 = 5.0;

impl EnhancementConfig {
    /// Parse a config file. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Success percent for an attempt at `level`. An exact key wins over
    /// any range containing the level; no match means 0.
    pub fn success_rate(&self, level: u32) -> u32 {
        if let Some(rate) = self.success_rates.get(&level.to_string()) {
            return *rate;
        }
        self.success_rates
            .iter()
            .filter_map(|(key, rate)| {
                let (start, end) = key.split_once('-')?;
                let start: u32 = start.trim().parse().ok()?;
                let end: u32 = end.trim().parse().ok()?;
                (start..=end).contains(&level).then_some(*rate)
            })
            .next()
            .unwrap_or(0)
    }

    /// Catalyst cost of the next attempt: `(1 + level) * multiplier`.
    pub fn cost(&self, item: &ItemInstance) -> u32 {
        let multiplier = self.cost_multipliers.get(&item.rarity).copied().unwrap_or(1.0);
        (f64::from(1 + item.enhancement_level) * multiplier).floor() as u32
    }

    /// Catalysts consumed by a failed attempt. Never less than one.
    pub fn failure_cost(&self, cost: u32) -> u32 {
        ((f64::from(cost) * self.failure_penalty_percent / 100.0).floor() as u32).max(1)
    }

    /// Per-level bonus percent for `rarity`, 5 when unset.
    pub fn stat_bonus_percent(&self, rarity: Rarity) -> f64 {
        self.stat_bonus_percent
            .get(&rarity)
            .copied()
            .unwrap_or(DEFAULT_STAT_BONUS_PERCENT)
    }

    /// `(1 + bonus/100) ^ level` for this item's rarity.
    pub fn multiplier(&self, item: &ItemInstance) -> f64 {
        let bonus = self.stat_bonus_percent(item.rarity) / 100.0;
        (1.0 + bonus).powi(item.enhancement_level as i32)
    }
}

/// Result of one enhancement roll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum UpgradeOutcome {
    /// The item gained a level.
    Success {
        /// Level after the upgrade.
        new_level: u32,
        /// Awakening rolled at a milestone level.
        awakening: Option<Awakening>,
    },
    /// The item kept its level.
    Failure {
        /// Catalysts consumed by the failed attempt.
        catalysts_lost: u32,
    },
}

/// Everything a client needs to show the result of one attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeReport {
    /// Item that was enhanced.
    pub item_id: ItemId,
    /// Success percent the roll was made against.
    pub rate: u32,
    /// Roll in `0..100`.
    pub roll: u32,
    /// Success or failure details.
    pub outcome: UpgradeOutcome,
}

impl UpgradeReport {
    /// Whether the attempt succeeded.
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, UpgradeOutcome::Success { .. })
    }
}

/// Attempt to enhance an item the player owns, in the inventory or equipped.
pub fn upgrade_item(
    player: &mut Player,
    item_id: ItemId,
    config: &EnhancementConfig,
    rng: &mut impl Rng,
) -> MechResult<UpgradeReport> {
    let (rarity, level, cost, equipped) = {
        let (item, equipped) =
            inventory::find_item(player, item_id).ok_or(ar_core::CoreError::ItemNotFound(item_id))?;
        (item.rarity, item.enhancement_level, config.cost(item), equipped)
    };

    if rarity < config.min_rarity {
        return Err(MechError::RarityTooLow(rarity));
    }
    if level >= config.max_level {
        return Err(MechError::MaxEnhancement(config.max_level));
    }
    let have = inventory::count_template(player, &config.catalyst_template_id);
    if have < cost {
        return Err(MechError::InsufficientCatalysts { need: cost, have });
    }

    let rate = config.success_rate(level);
    let roll = rng.random_range(1..=100);

    let outcome = if roll <= rate {
        inventory::consume_template(player, &config.catalyst_template_id, cost);
        let new_level = level + 1;
        let awakening = (config.awakening_interval > 0 && new_level % config.awakening_interval == 0)
            .then(|| roll_awakening(rng));
        if let Some((item, _)) = inventory::find_item_mut(player, item_id) {
            item.enhancement_level = new_level;
            if let Some(a) = awakening {
                item.awakenings.push(a);
            }
        }
        UpgradeOutcome::Success {
            new_level,
            awakening,
        }
    } else {
        let lost = config.failure_cost(cost);
        inventory::consume_template(player, &config.catalyst_template_id, lost);
        UpgradeOutcome::Failure {
            catalysts_lost: lost,
        }
    };

    if equipped {
        recalculate_stats(player, config);
    }
    debug!(%item_id, rate, roll, ?outcome, "enhancement attempt");

    Ok(UpgradeReport {
        item_id,
        rate,
        roll,
        outcome,
    })
}

/// Value range for each awakening kind, as fractions.
pub fn awakening_range(kind: AwakeningKind) -> (f64, f64) {
    match kind {
        AwakeningKind::PercentAtk
        | AwakeningKind::PercentDef
        | AwakeningKind::PercentHp
        | AwakeningKind::PercentSpeed => (0.01, 0.05),
        AwakeningKind::CritRate => (0.01, 0.03),
        AwakeningKind::CritDamage => (0.05, 0.10),
        AwakeningKind::Lifesteal => (0.01, 0.02),
    }
}

const AWAKENING_POOL: [AwakeningKind; 7] = [
    AwakeningKind::PercentAtk,
    AwakeningKind::PercentDef,
    AwakeningKind::PercentHp,
    AwakeningKind::PercentSpeed,
    AwakeningKind::CritRate,
    AwakeningKind::CritDamage,
    AwakeningKind::Lifesteal,
];

/// Pick a random awakening kind and a value within its range, rounded to
/// three decimals.
pub fn roll_awakening(rng: &mut impl Rng) -> Awakening {
    let kind = *AWAKENING_POOL
        .choose(rng)
        .unwrap_or(&AwakeningKind::PercentAtk);
    let (lo, hi) = awakening_range(kind);
    let value = (rng.random_range(lo..=hi) * 1000.0).round() / 1000.0;
    Awakening { kind, value }
}
