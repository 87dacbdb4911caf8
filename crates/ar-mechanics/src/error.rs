//! Error types for the rule resolvers.

use ar_core::{CoreError, EquipSlot, ItemId, Rarity};

/// Rejections raised before any state is mutated.
#[derive(Debug, thiserror::Error)]
pub enum MechError {
    /// A lookup against the world failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The acting player has zero HP.
    #[error("player is dead")]
    PlayerDead,

    /// Revival was requested for a living player.
    #[error("player is still alive")]
    PlayerAlive,

    /// Actor and target are on different maps.
    #[error("target is on map \"{target}\", player is on \"{player}\"")]
    DifferentMap {
        /// Map the player is on.
        player: String,
        /// Map the target is on.
        target: String,
    },

    /// The target is further away than the action allows.
    #[error("target out of range ({distance:.1} > {range:.1})")]
    OutOfRange {
        /// Actual distance to the target.
        distance: f64,
        /// Largest distance the action accepts.
        range: f64,
    },

    /// The node was gathered recently.
    #[error("resource \"{id}\" is on cooldown for {remaining_secs:.1}s")]
    ResourceOnCooldown {
        /// Resource node id.
        id: String,
        /// Seconds until it can be gathered again.
        remaining_secs: f64,
    },

    /// The item is below the minimum enhanceable rarity.
    #[error("{0} items cannot be enhanced")]
    RarityTooLow(Rarity),

    /// The item has reached the enhancement cap.
    #[error("item is already at max enhancement level {0}")]
    MaxEnhancement(u32),

    /// Not enough catalyst items in the inventory.
    #[error("need {need} catalysts, have {have}")]
    InsufficientCatalysts {
        /// Catalysts the attempt costs.
        need: u32,
        /// Catalysts the player carries.
        have: u32,
    },

    /// Not enough gold or diamonds.
    #[error("need {need} {currency}, have {have}")]
    InsufficientCurrency {
        /// Currency name, e.g. `gold`.
        currency: &'static str,
        /// Amount required.
        need: u64,
        /// Amount held.
        have: u64,
    },

    /// Free respawn requested before the delay elapsed.
    #[error("respawn available in {remaining_secs:.1}s")]
    RespawnNotReady {
        /// Seconds left on the delay.
        remaining_secs: f64,
    },

    /// The allocation spends more points than the player has.
    #[error("need {need} attribute points, have {have}")]
    NotEnoughAttributePoints {
        /// Points the allocation spends.
        need: u32,
        /// Unspent points.
        have: u32,
    },

    /// The player does not meet a level requirement.
    #[error("requires level {required}, player is level {actual}")]
    LevelTooLow {
        /// Level required.
        required: u32,
        /// Player's level.
        actual: u32,
    },

    /// The item has no equipment slot.
    #[error("item {0} cannot be equipped")]
    NotEquippable(ItemId),

    /// The item cannot be used.
    #[error("item {0} is not a consumable")]
    NotConsumable(ItemId),

    /// Nothing is equipped in the slot.
    #[error("no item equipped in slot {0:?}")]
    SlotEmpty(EquipSlot),

    /// A mission action was attempted without an active mission.
    #[error("no active mission")]
    NoActiveMission,

    /// The active mission's target count has not been reached.
    #[error("mission incomplete ({progress}/{required})")]
    MissionIncomplete {
        /// Current count.
        progress: u32,
        /// Count needed to claim.
        required: u32,
    },
}

/// Convenience result type for rule resolvers.
pub type MechResult<T> = Result<T, MechError>;
