#![allow(dead_code, missing_docs)]

use ar_core::{
    CombatStats, Content, DropEntry, ItemStats, ItemTemplate, ItemType, MapKind, MapTemplate,
    MissionKind, MissionTemplate, MonsterBehavior, MonsterTemplate, Position, ResourceNode,
    SpawnDirective, World,
};
use ar_simulation::SimConfig;
use chrono::{DateTime, Utc};

pub fn t0() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

pub fn config() -> SimConfig {
    SimConfig::default().with_wander_chance(0.0)
}

fn wolf() -> MonsterTemplate {
    MonsterTemplate {
        id: "mob_wolf_01".into(),
        name: "Wolf".into(),
        level: 1,
        behavior: MonsterBehavior::Aggressive,
        stats: CombatStats {
            hp: 50,
            atk: 8,
            def: 2,
            speed: 1.5,
        },
        xp_reward: 20,
        respawn_secs: 20.0,
        aggro_range: 5.0,
        leash_range: 15.0,
        drops: vec![DropEntry {
            item_id: "item_potion_hp_01".into(),
            chance: 1.0,
            min: 1,
            max: 1,
        }],
    }
}

fn potion() -> ItemTemplate {
    ItemTemplate {
        id: "item_potion_hp_01".into(),
        name: "Health Potion".into(),
        item_type: ItemType::Consumable,
        slot: None,
        rarity: ar_core::Rarity::Common,
        stats: ItemStats {
            hp: 50,
            ..ItemStats::default()
        },
        power_score: 10,
        stackable: true,
    }
}

fn herb() -> ItemTemplate {
    ItemTemplate {
        id: "item_herb_01".into(),
        name: "Moonleaf".into(),
        item_type: ItemType::Material,
        slot: None,
        rarity: ar_core::Rarity::Common,
        stats: ItemStats::default(),
        power_score: 0,
        stackable: true,
    }
}

/// A castle with no monsters, a forest with one wolf at (10, 10) and an
/// herb node at (30, 30), and a high-level dungeon.
pub fn content() -> Content {
    let mut castle = MapTemplate::new("map_castle_1", "Castle");
    castle.kind = MapKind::Castle;

    let mut forest = MapTemplate::new("map_forest_1", "Forest");
    forest.spawns.push(SpawnDirective {
        template_id: "mob_wolf_01".into(),
        x: 10.0,
        y: 10.0,
    });
    forest.resources.push(ResourceNode {
        id: "node_herb_1".into(),
        name: "Moonleaf Patch".into(),
        x: 30.0,
        y: 30.0,
        drops: vec![DropEntry {
            item_id: "item_herb_01".into(),
            chance: 1.0,
            min: 1,
            max: 1,
        }],
        respawn_secs: 30.0,
    });

    let mut dungeon = MapTemplate::new("map_dungeon_1", "Crypt");
    dungeon.kind = MapKind::Dungeon;
    dungeon.level_requirement = 10;

    Content::new()
        .with_map(castle)
        .with_map(forest)
        .with_map(dungeon)
        .with_monster(wolf())
        .with_item(potion())
        .with_item(herb())
        .with_mission(MissionTemplate {
            id: "mission_wolf".into(),
            title: "Wolf Hunt".into(),
            description: "Thin the pack.".into(),
            kind: MissionKind::Kill,
            target_id: "mob_wolf_01".into(),
            target_count: 1,
            reward_xp: 100,
            reward_gold: 75,
            level_requirement: 0,
            map_id: Some("map_forest_1".into()),
        })
}

pub fn world() -> World {
    World::from_content(content())
}

pub fn only_monster(world: &World) -> ar_core::MonsterId {
    world.monster_ids()[0]
}

pub fn place(world: &mut World, player: ar_core::PlayerId, map_id: &str, x: f64, y: f64) {
    let player = world.player_mut(player).unwrap();
    player.current_map_id = map_id.to_string();
    player.position = Position::new(x, y);
}
