//! Rule resolvers for AutoRealm.
//!
//! Every function here is synchronous and operates on borrowed state from
//! `ar-core`. Randomness is always passed in, so a seeded `StdRng` makes
//! any resolver deterministic. Scheduling (who acts on which tick) is the
//! job of `ar-simulation`.

/// Damage, critical hits, and the combat round.
pub mod combat;
/// Item enhancement and awakenings.
pub mod enhancement;
/// Error types for rule rejections.
pub mod error;
/// Resource node harvesting.
pub mod gathering;
/// Inventory, stacking, and equipment.
pub mod inventory;
/// Gold and drop table rolls.
pub mod loot;
/// Mission start, progress, and claim.
pub mod missions;
/// Stepping entities towards a target.
pub mod movement;
/// XP, levels, and attribute points.
pub mod progression;
/// Death, revive, and respawn.
pub mod revival;
/// Tunables shared by the resolvers.
pub mod rules;
/// Recomputing player stats from attributes and gear.
pub mod stats;

/// Re-exports of the combat resolvers.
pub use combat::{CombatLog, Strike, base_damage, monster_attack, resolve_round, strike};
/// Re-exports of the enhancement types.
pub use enhancement::{EnhancementConfig, UpgradeOutcome, UpgradeReport, upgrade_item};
/// Re-exports of [`error::MechError`] and [`error::MechResult`].
pub use error::{MechError, MechResult};
/// Re-exports of [`gathering::gather`] and its report.
pub use gathering::{GatherReport, gather};
/// Re-export of [`movement::move_towards`].
pub use movement::move_towards;
/// Re-exports of the revival resolvers.
pub use revival::{Currency, RevivalConfig, kill_player, respawn_player, revive_player};
/// Re-export of [`rules::Rules`].
pub use rules::Rules;
/// Re-export of [`stats::recalculate_stats`].
pub use stats::recalculate_stats;
