use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::ItemId;

/// Broad item category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    /// Held in a hand slot.
    Weapon,
    /// Worn on head, chest, legs or feet.
    Armor,
    /// Crafting and enhancement input.
    Material,
    /// Used up on use.
    Consumable,
}

/// Equipment slot an item occupies when worn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipSlot {
    /// Helmets.
    Head,
    /// Body armor.
    Chest,
    /// Leg armor.
    Legs,
    /// Footwear.
    Boots,
    /// Main-hand weapon.
    HandMain,
    /// Off-hand weapon or shield.
    HandOff,
}

impl EquipSlot {
    /// Every slot, in display order.
    pub const ALL: [EquipSlot; 6] = [
        EquipSlot::Head,
        EquipSlot::Chest,
        EquipSlot::Legs,
        EquipSlot::Boots,
        EquipSlot::HandMain,
        EquipSlot::HandOff,
    ];
}

/// Item rarity, ordered from least to most rare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    /// Drops everywhere.
    Common,
    /// Slightly better than common.
    Uncommon,
    /// Lowest tier that can be enhanced by default.
    Rare,
    /// High tier.
    Epic,
    /// Top tier.
    Legendary,
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Common => write!(f, "common"),
            Self::Uncommon => write!(f, "uncommon"),
            Self::Rare => write!(f, "rare"),
            Self::Epic => write!(f, "epic"),
            Self::Legendary => write!(f, "legendary"),
        }
    }
}

/// Flat stat contribution of one item before enhancement.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemStats {
    /// Attack bonus.
    pub atk: i64,
    /// Defense bonus.
    pub def: i64,
    /// Max HP bonus.
    pub hp: i64,
    /// Movement speed bonus.
    pub speed: f64,
}

/// Kind of permanent bonus an awakening grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AwakeningKind {
    /// Percent attack.
    #[serde(rename = "pct_atk")]
    PercentAtk,
    /// Percent defense.
    #[serde(rename = "pct_def")]
    PercentDef,
    /// Percent max HP.
    #[serde(rename = "pct_hp")]
    PercentHp,
    /// Percent movement speed.
    #[serde(rename = "pct_speed")]
    PercentSpeed,
    /// Added critical hit chance.
    #[serde(rename = "crit_rate")]
    CritRate,
    /// Added critical damage multiplier.
    #[serde(rename = "crit_dmg")]
    CritDamage,
    /// Fraction of damage dealt returned as HP.
    #[serde(rename = "lifesteal")]
    Lifesteal,
}

impl AwakeningKind {
    /// Short name for display, e.g. `Crit Rate`.
    pub fn label(&self) -> &'static str {
        match self {
            Self::PercentAtk => "ATK",
            Self::PercentDef => "DEF",
            Self::PercentHp => "HP",
            Self::PercentSpeed => "Speed",
            Self::CritRate => "Crit Rate",
            Self::CritDamage => "Crit Dmg",
            Self::Lifesteal => "Lifesteal",
        }
    }
}

/// A rolled bonus permanently attached to an item at an enhancement milestone.
/// `value` is a fraction: 0.035 means +3.5%.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Awakening {
    /// Which stat the bonus applies to.
    pub kind: AwakeningKind,
    /// Size of the bonus as a fraction.
    pub value: f64,
}

impl fmt::Display for Awakening {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} +{:.1}%", self.kind.label(), self.value * 100.0)
    }
}

/// One concrete item, owned by exactly one container at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemInstance {
    /// Unique instance id.
    pub id: ItemId,
    /// Template this instance was created from. Used for stacking and missions.
    pub template_id: String,
    /// Display name.
    pub name: String,
    /// Broad category.
    pub item_type: ItemType,
    /// Slot for equippable items.
    #[serde(default)]
    pub slot: Option<EquipSlot>,
    /// Rarity tier.
    pub rarity: Rarity,
    /// Base stats before enhancement.
    #[serde(default)]
    pub stats: ItemStats,
    /// Rough strength rating.
    #[serde(default)]
    pub power_score: i64,
    /// Whether pickups merge into this stack.
    #[serde(default)]
    pub stackable: bool,
    /// Stack size. Always 1 for equipment.
    #[serde(default = "one")]
    pub quantity: u32,
    /// Current `+N` level.
    #[serde(default)]
    pub enhancement_level: u32,
    /// Bonuses rolled at enhancement milestones.
    #[serde(default)]
    pub awakenings: Vec<Awakening>,
}

fn one() -> u32 {
    1
}

impl ItemInstance {
    /// Whether the item has a slot.
    pub fn is_equippable(&self) -> bool {
        self.slot.is_some()
    }

    /// A copy of this item with a fresh id and the given quantity.
    pub fn duplicate(&self, quantity: u32) -> Self {
        Self {
            id: ItemId::new(),
            quantity,
            ..self.clone()
        }
    }
}
