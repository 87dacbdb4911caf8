//! Gold and drop-table rolls.

use std::ops::RangeInclusive;

use ar_core::{Content, DropEntry, ItemInstance};
use rand::Rng;
use tracing::warn;

/// Gold paid out for every kill.
pub const GOLD_PER_KILL: RangeInclusive<u64> = 10..=50;

/// Gold for one kill, uniform in [`GOLD_PER_KILL`].
pub fn roll_gold(rng: &mut impl Rng) -> u64 {
    rng.random_range(GOLD_PER_KILL)
}

/// Roll each entry independently against its chance. Quantities are
/// uniform in `min..=max`. Entries naming an unknown item template are
/// logged and skipped.
pub fn roll_drops(content: &Content, drops: &[DropEntry], rng: &mut impl Rng) -> Vec<ItemInstance> {
    let mut items = Vec::new();
    for entry in drops {
        if rng.random::<f64>() >= entry.chance {
            continue;
        }
        let quantity = if entry.max > entry.min {
            rng.random_range(entry.min..=entry.max)
        } else {
            entry.min
        };
        match content.item(&entry.item_id) {
            Some(template) => items.push(template.instantiate(quantity)),
            None => warn!(item_id = %entry.item_id, "drop references unknown item template, skipping"),
        }
    }
    items
}
