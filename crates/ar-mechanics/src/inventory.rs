//! Inventory placement, auto-equip, and consumables.

use ar_core::{Content, CoreError, EquipSlot, ItemId, ItemInstance, ItemType, Player};

use crate::enhancement::EnhancementConfig;
use crate::error::{MechError, MechResult};
use crate::missions;
use crate::stats::recalculate_stats;

/// Give an item to a player.
///
/// Stackable items merge into an existing stack of the same template.
/// Non-stackable items with `quantity > 1` are split into single instances
/// with fresh ids. Each equippable piece is auto-equipped when its slot is
/// empty or its power score is strictly higher than what is worn; the
/// displaced piece goes back to the inventory. Collect missions advance by
/// the full quantity. An empty drop (`quantity == 0`) is ignored. Returns
/// the ids of items that ended up equipped.
pub fn add_item(
    player: &mut Player,
    item: ItemInstance,
    content: &Content,
    config: &EnhancementConfig,
) -> Vec<ItemId> {
    if item.quantity == 0 {
        return Vec::new();
    }
    missions::record_collect(player, &item.template_id, item.quantity, content);

    if item.stackable {
        if let Some(stack) = player
            .inventory
            .iter_mut()
            .find(|i| i.stackable && i.template_id == item.template_id)
        {
            stack.quantity = stack.quantity.saturating_add(item.quantity);
        } else {
            player.inventory.push(item);
        }
        return Vec::new();
    }

    let copies = item.quantity.saturating_sub(1);
    let mut pieces = Vec::with_capacity(copies as usize + 1);
    for _ in 0..copies {
        pieces.push(item.duplicate(1));
    }
    pieces.push(ItemInstance { quantity: 1, ..item });

    let mut equipped = Vec::new();
    for piece in pieces {
        if let Some(id) = place_single(player, piece) {
            equipped.push(id);
        }
    }
    if !equipped.is_empty() {
        recalculate_stats(player, config);
    }
    equipped
}

fn place_single(player: &mut Player, item: ItemInstance) -> Option<ItemId> {
    let Some(slot) = item.slot else {
        player.inventory.push(item);
        return None;
    };
    let upgrade = player
        .equipment
        .get(&slot)
        .is_none_or(|worn| item.power_score > worn.power_score);
    if !upgrade {
        player.inventory.push(item);
        return None;
    }
    let id = item.id;
    if let Some(old) = player.equipment.insert(slot, item) {
        player.inventory.push(old);
    }
    Some(id)
}

/// Move an inventory item into its slot, swapping out whatever was worn.
pub fn equip_item(
    player: &mut Player,
    item_id: ItemId,
    config: &EnhancementConfig,
) -> MechResult<EquipSlot> {
    let index = inventory_index(player, item_id)?;
    let slot = player.inventory[index]
        .slot
        .ok_or(MechError::NotEquippable(item_id))?;
    let item = player.inventory.remove(index);
    if let Some(old) = player.equipment.insert(slot, item) {
        player.inventory.push(old);
    }
    recalculate_stats(player, config);
    Ok(slot)
}

/// Move the item in `slot` back to the inventory.
pub fn unequip_item(
    player: &mut Player,
    slot: EquipSlot,
    config: &EnhancementConfig,
) -> MechResult<ItemId> {
    let item = player
        .equipment
        .remove(&slot)
        .ok_or(MechError::SlotEmpty(slot))?;
    let id = item.id;
    player.inventory.push(item);
    recalculate_stats(player, config);
    Ok(id)
}

/// Consume one unit of a consumable and heal by its `hp` stat. Returns the
/// HP actually restored.
pub fn use_item(player: &mut Player, item_id: ItemId) -> MechResult<i64> {
    if !player.is_alive() {
        return Err(MechError::PlayerDead);
    }
    let index = inventory_index(player, item_id)?;
    let item = &mut player.inventory[index];
    if item.item_type != ItemType::Consumable {
        return Err(MechError::NotConsumable(item_id));
    }
    let amount = item.stats.hp;
    item.quantity = item.quantity.saturating_sub(1);
    if item.quantity == 0 {
        player.inventory.remove(index);
    }
    Ok(player.stats.heal(amount))
}

fn inventory_index(player: &Player, item_id: ItemId) -> MechResult<usize> {
    player
        .inventory
        .iter()
        .position(|i| i.id == item_id)
        .ok_or_else(|| CoreError::ItemNotFound(item_id).into())
}

/// Find an owned item. The flag is true when it is equipped.
pub fn find_item(player: &Player, item_id: ItemId) -> Option<(&ItemInstance, bool)> {
    if let Some(item) = player.inventory.iter().find(|i| i.id == item_id) {
        return Some((item, false));
    }
    player
        .equipment
        .values()
        .find(|i| i.id == item_id)
        .map(|i| (i, true))
}

/// Mutable variant of [`find_item`].
pub fn find_item_mut(player: &mut Player, item_id: ItemId) -> Option<(&mut ItemInstance, bool)> {
    if let Some(item) = player.inventory.iter_mut().find(|i| i.id == item_id) {
        return Some((item, false));
    }
    player
        .equipment
        .values_mut()
        .find(|i| i.id == item_id)
        .map(|i| (i, true))
}

/// Total inventory quantity of a template.
pub fn count_template(player: &Player, template_id: &str) -> u32 {
    player
        .inventory
        .iter()
        .filter(|i| i.template_id == template_id)
        .map(|i| i.quantity)
        .sum()
}

/// Remove up to `amount` units of a template, emptying stacks in inventory
/// order. Returns how many were removed.
pub fn consume_template(player: &mut Player, template_id: &str, amount: u32) -> u32 {
    let mut remaining = amount;
    for item in player
        .inventory
        .iter_mut()
        .filter(|i| i.template_id == template_id)
    {
        if remaining == 0 {
            break;
        }
        let take = item.quantity.min(remaining);
        item.quantity -= take;
        remaining -= take;
    }
    player
        .inventory
        .retain(|i| i.template_id != template_id || i.quantity > 0);
    amount - remaining
}
