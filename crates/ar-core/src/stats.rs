use serde::{Deserialize, Serialize};

/// Crit chance used when nothing grants a different one.
pub const DEFAULT_CRIT_RATE: f64 = 0.05;
/// Bonus damage fraction applied on a critical hit (x1.5 total).
pub const DEFAULT_CRIT_DAMAGE: f64 = 0.5;
/// Seconds between two player attacks.
pub const DEFAULT_ATTACK_COOLDOWN: f64 = 1.0;

/// Attribute points a player distributes: strength, agility, vitality, initiative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    /// Raises attack.
    #[serde(rename = "str")]
    pub strength: u32,
    /// Raises attack, defense and speed.
    #[serde(rename = "agi")]
    pub agility: u32,
    /// Raises max HP and defense.
    #[serde(rename = "vit")]
    pub vitality: u32,
    /// Small boost to attack and defense.
    #[serde(rename = "ini")]
    pub initiative: u32,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            strength: 10,
            agility: 10,
            vitality: 10,
            initiative: 10,
        }
    }
}

impl Attributes {
    /// Total points across all four attributes, saturating at `u32::MAX`.
    pub fn total(&self) -> u32 {
        self.strength
            .saturating_add(self.agility)
            .saturating_add(self.vitality)
            .saturating_add(self.initiative)
    }
}

/// Derived combat stats. For players these are always recomputed from
/// attributes and equipment, never adjusted in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Current HP.
    pub hp: i64,
    /// Maximum HP.
    pub max_hp: i64,
    /// Attack.
    pub atk: i64,
    /// Defense.
    pub def: i64,
    /// Movement speed in units per second.
    pub speed: f64,
    /// Seconds between attacks.
    #[serde(default = "default_attack_cooldown")]
    pub attack_cooldown: f64,
    /// Chance of a critical hit, in `[0, 1]`.
    #[serde(default = "default_crit_rate")]
    pub crit_rate: f64,
    /// Extra damage fraction on a critical hit.
    #[serde(default = "default_crit_damage")]
    pub crit_damage: f64,
    /// Fraction of damage dealt healed back.
    #[serde(default)]
    pub lifesteal: f64,
}

fn default_attack_cooldown() -> f64 {
    DEFAULT_ATTACK_COOLDOWN
}

fn default_crit_rate() -> f64 {
    DEFAULT_CRIT_RATE
}

fn default_crit_damage() -> f64 {
    DEFAULT_CRIT_DAMAGE
}

impl Stats {
    /// Full-health stats with default crit, cooldown, and no lifesteal.
    pub fn new(max_hp: i64, atk: i64, def: i64, speed: f64) -> Self {
        Self {
            hp: max_hp,
            max_hp,
            atk,
            def,
            speed,
            attack_cooldown: DEFAULT_ATTACK_COOLDOWN,
            crit_rate: DEFAULT_CRIT_RATE,
            crit_damage: DEFAULT_CRIT_DAMAGE,
            lifesteal: 0.0,
        }
    }

    /// Base stats from attribute points alone, before equipment.
    ///
    /// - STR: +2 ATK
    /// - AGI: +1 ATK, +1 DEF, +0.02 speed
    /// - VIT: +10 max HP, +1 DEF
    /// - INI: +0.5 ATK, +0.5 DEF
    pub fn from_attributes(attrs: &Attributes) -> Self {
        let (s, a, v, i) = (
            i64::from(attrs.strength),
            i64::from(attrs.agility),
            i64::from(attrs.vitality),
            i64::from(attrs.initiative),
        );
        Self::new(
            100 + v * 10,
            5 + s * 2 + a + i / 2,
            v + a + i / 2,
            1.0 + f64::from(attrs.agility) * 0.02,
        )
    }

    /// Whether HP is above zero.
    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Subtract damage, flooring HP at zero.
    pub fn take_damage(&mut self, amount: i64) {
        self.hp = (self.hp - amount).max(0);
    }

    /// Heal up to max HP. Returns the amount actually restored.
    pub fn heal(&mut self, amount: i64) -> i64 {
        let before = self.hp;
        self.hp = (self.hp + amount.max(0)).min(self.max_hp);
        self.hp - before
    }

    /// Restore HP to max.
    pub fn heal_full(&mut self) {
        self.hp = self.max_hp;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn base_stats_from_default_attributes() {
        let stats = Stats::from_attributes(&Attributes::default());
        assert_eq!(stats.max_hp, 200);
        assert_eq!(stats.atk, 40);
        assert_eq!(stats.def, 25);
        assert!((stats.speed - 1.2).abs() < 1e-9);
        assert_eq!(stats.hp, stats.max_hp);
    }

    #[test]
    fn damage_floors_at_zero() {
        let mut stats = Stats::new(10, 1, 1, 1.0);
        stats.take_damage(25);
        assert_eq!(stats.hp, 0);
        assert!(!stats.is_alive());
    }

    #[test]
    fn missing_optional_fields_use_defaults() {
        let stats: Stats = serde_json::from_str(
            r#"{"hp": 50, "max_hp": 50, "atk": 8, "def": 2, "speed": 1.5}"#,
        )
        .unwrap();
        assert!((stats.crit_rate - DEFAULT_CRIT_RATE).abs() < f64::EPSILON);
        assert!((stats.crit_damage - DEFAULT_CRIT_DAMAGE).abs() < f64::EPSILON);
        assert!(stats.lifesteal.abs() < f64::EPSILON);
    }

    proptest! {
        #[test]
        fn heal_never_exceeds_max(max_hp in 1i64..10_000, hp in 0i64..10_000, amount in 0i64..100_000) {
            let mut stats = Stats::new(max_hp, 1, 1, 1.0);
            stats.hp = hp.min(max_hp);
            stats.heal(amount);
            prop_assert!(stats.hp <= stats.max_hp);
        }
    }
}
