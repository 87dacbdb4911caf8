//! Integration tests for simulation commands.
mod common;

use std::sync::Arc;

use ar_core::{CoreError, MapKind, PlayerClass, PlayerState, Position};
use ar_mechanics::MechError;
use ar_simulation::commands::{self, MoveOutcome, MoveRequest};
use ar_simulation::{BroadcastHub, CommandHandler, Outbox, ServerMessage, SimConfig, SimError, shared};
use chrono::Duration;
use rand::SeedableRng;
use rand::rngs::StdRng;

use common::*;

fn register(world: &mut ar_core::World, name: &str) -> ar_core::PlayerId {
    commands::register_player(world, name, PlayerClass::Mage, &SimConfig::default()).unwrap()
}

#[test]
fn registration_starts_offline_at_castle() {
    let mut world = world();
    let pid = register(&mut world, "Aria");
    let player = world.player(pid).unwrap();
    assert!(!player.online);
    assert_eq!(player.current_map_id, "map_castle_1");
    assert_eq!(player.respawn_map_id.as_deref(), Some("map_castle_1"));
    assert_eq!(player.position, Position::new(50.0, 50.0));
}

#[test]
fn duplicate_names_are_rejected() {
    let mut world = world();
    register(&mut world, "Aria");
    let err = commands::register_player(&mut world, "Aria", PlayerClass::Archer, &SimConfig::default())
        .unwrap_err();
    assert!(matches!(err, SimError::Core(CoreError::NameTaken(_))));
    assert!(!err.is_not_found());
}

#[test]
fn walking_target_is_clamped_to_map_bounds() {
    let mut world = world();
    let pid = register(&mut world, "Aria");
    let outcome = commands::move_player(
        &mut world,
        pid,
        &MoveRequest {
            x: 150.0,
            y: -3.0,
            map_id: Some("map_castle_1".into()),
        },
        &mut Outbox::new(),
    )
    .unwrap();
    assert_eq!(outcome, MoveOutcome::Walking);
    let player = world.player(pid).unwrap();
    assert_eq!(player.state, PlayerState::Moving);
    assert_eq!(player.move_target, Some(Position::new(100.0, 0.0)));
}

#[test]
fn map_switch_teleports_and_announces_departure() {
    let mut world = world();
    let pid = register(&mut world, "Aria");
    let mut out = Outbox::new();
    let outcome = commands::move_player(
        &mut world,
        pid,
        &MoveRequest {
            x: 20.0,
            y: 25.0,
            map_id: Some("map_forest_1".into()),
        },
        &mut out,
    )
    .unwrap();

    assert_eq!(
        outcome,
        MoveOutcome::Teleported {
            from_map: "map_castle_1".into()
        }
    );
    let player = world.player(pid).unwrap();
    assert_eq!(player.current_map_id, "map_forest_1");
    assert_eq!(player.position, Position::new(20.0, 25.0));
    assert_eq!(player.state, PlayerState::Idle);
    assert_eq!(player.respawn_map_id.as_deref(), Some("map_castle_1"));
    assert!(matches!(
        &out.messages()[0],
        ServerMessage::PlayerLeftMap { map_id, .. } if map_id == "map_castle_1"
    ));
}

#[test]
fn level_gated_map_rejects_low_players() {
    let mut world = world();
    let pid = register(&mut world, "Aria");
    let err = commands::move_player(
        &mut world,
        pid,
        &MoveRequest {
            x: 5.0,
            y: 5.0,
            map_id: Some("map_dungeon_1".into()),
        },
        &mut Outbox::new(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        SimError::Mech(MechError::LevelTooLow { required: 10, actual: 1 })
    ));
    assert_eq!(world.player(pid).unwrap().current_map_id, "map_castle_1");
}

#[test]
fn entering_a_castle_updates_respawn_map() {
    let mut content = content();
    let mut keep = ar_core::MapTemplate::new("map_castle_2", "Keep");
    keep.kind = MapKind::Castle;
    content = content.with_map(keep);
    let mut world = ar_core::World::from_content(content);
    let pid = register(&mut world, "Aria");

    let request = MoveRequest {
        x: 10.0,
        y: 10.0,
        map_id: Some("map_castle_2".into()),
    };
    commands::move_player(&mut world, pid, &request, &mut Outbox::new()).unwrap();
    assert_eq!(
        world.player(pid).unwrap().respawn_map_id.as_deref(),
        Some("map_castle_2")
    );
}

#[test]
fn attack_validates_target() {
    let mut world = world();
    let wolf = only_monster(&world);
    let pid = register(&mut world, "Aria");

    let err = commands::attack(&mut world, pid, wolf).unwrap_err();
    assert!(matches!(err, SimError::Mech(MechError::DifferentMap { .. })));

    let err = commands::attack(&mut world, pid, ar_core::MonsterId::new()).unwrap_err();
    assert!(err.is_not_found());

    place(&mut world, pid, "map_forest_1", 11.0, 10.0);
    world.player_mut(pid).unwrap().stats.hp = 0;
    let err = commands::attack(&mut world, pid, wolf).unwrap_err();
    assert!(matches!(err, SimError::Mech(MechError::PlayerDead)));

    world.player_mut(pid).unwrap().stats.hp = 10;
    commands::attack(&mut world, pid, wolf).unwrap();
    let player = world.player(pid).unwrap();
    assert_eq!(player.state, PlayerState::Combat);
    assert_eq!(player.combat_target, Some(wolf));
}

#[test]
fn gather_publishes_resource_update() {
    let mut world = world();
    let pid = register(&mut world, "Aria");
    place(&mut world, pid, "map_forest_1", 30.0, 31.0);
    let mut rng = StdRng::seed_from_u64(9);
    let rules = SimConfig::default().rules;

    let mut out = Outbox::new();
    let report =
        commands::gather(&mut world, pid, "node_herb_1", &rules, &mut rng, t0(), &mut out).unwrap();
    assert_eq!(report.ready_at, t0() + Duration::seconds(30));
    assert!(matches!(
        &out.messages()[0],
        ServerMessage::ResourceUpdate { available: false, resource_id, .. } if resource_id == "node_herb_1"
    ));

    let err = commands::gather(
        &mut world,
        pid,
        "node_herb_1",
        &rules,
        &mut rng,
        t0() + Duration::seconds(5),
        &mut Outbox::new(),
    )
    .unwrap_err();
    assert!(matches!(err, SimError::Mech(MechError::ResourceOnCooldown { .. })));
}

#[test]
fn respawn_waits_for_delay_then_returns_to_castle() {
    let mut world = world();
    let pid = register(&mut world, "Aria");
    place(&mut world, pid, "map_forest_1", 11.0, 10.0);
    ar_mechanics::kill_player(world.player_mut(pid).unwrap(), t0());
    let rules = SimConfig::default().rules;

    let err = commands::respawn(&mut world, pid, &rules, t0() + Duration::seconds(3), &mut Outbox::new())
        .unwrap_err();
    assert!(matches!(err, SimError::Mech(MechError::RespawnNotReady { .. })));

    let mut out = Outbox::new();
    commands::respawn(&mut world, pid, &rules, t0() + Duration::seconds(10), &mut out).unwrap();
    let player = world.player(pid).unwrap();
    assert_eq!(player.current_map_id, "map_castle_1");
    assert_eq!(player.position, Position::new(50.0, 50.0));
    assert_eq!(player.stats.hp, player.stats.max_hp);
    assert_eq!(out.messages()[0].kind(), "player_left_map");
}

#[test]
fn revive_costs_gold() {
    let mut world = world();
    let pid = register(&mut world, "Aria");
    ar_mechanics::kill_player(world.player_mut(pid).unwrap(), t0());
    let rules = SimConfig::default().rules;

    let err = commands::revive(&mut world, pid, &rules, &mut Outbox::new()).unwrap_err();
    assert!(matches!(
        err,
        SimError::Mech(MechError::InsufficientCurrency { need: 100, have: 0, .. })
    ));

    world.player_mut(pid).unwrap().gold = 150;
    commands::revive(&mut world, pid, &rules, &mut Outbox::new()).unwrap();
    let player = world.player(pid).unwrap();
    assert!(player.is_alive());
    assert_eq!(player.gold, 50);
}

#[test]
fn claiming_a_mission_can_level_up() {
    let mut world = world();
    let pid = register(&mut world, "Aria");
    let rules = SimConfig::default().rules;
    commands::start_mission(&mut world, pid, "mission_wolf").unwrap();

    let err = commands::claim_mission(&mut world, pid, &rules, &mut Outbox::new()).unwrap_err();
    assert!(matches!(err, SimError::Mech(MechError::MissionIncomplete { .. })));

    world.player_mut(pid).unwrap().missions.progress = 1;
    let mut out = Outbox::new();
    let reward = commands::claim_mission(&mut world, pid, &rules, &mut out).unwrap();
    assert_eq!(reward.levels_gained, 1);
    assert!(matches!(
        out.messages()[0],
        ServerMessage::LevelUp { level: 2, .. }
    ));
    let player = world.player(pid).unwrap();
    assert_eq!(player.gold, 75);
    assert!(player.missions.completed.contains("mission_wolf"));
}

#[test]
fn chat_requires_text() {
    let mut world = world();
    let pid = register(&mut world, "Aria");
    let mut out = Outbox::new();
    assert!(matches!(
        commands::chat(&world, pid, "   ", &mut out),
        Err(SimError::InvalidCommand(_))
    ));
    commands::chat(&world, pid, " hello ", &mut out).unwrap();
    assert!(matches!(
        &out.messages()[0],
        ServerMessage::Chat { message, map_id: Some(map), .. } if message == "hello" && map == "map_castle_1"
    ));
}

#[test]
fn reload_rederives_monsters_and_keeps_players() {
    let mut world = world();
    let pid = register(&mut world, "Aria");
    let old = only_monster(&world);
    let mut out = Outbox::new();

    let spawned = commands::reload_world(&mut world, content(), &mut out);
    assert_eq!(spawned, 1);
    assert!(world.player(pid).is_some());
    assert!(world.monster(old).is_none());
    assert_eq!(out.messages()[0].kind(), "server_update");
}

#[tokio::test]
async fn handler_broadcasts_after_commands() {
    let hub = Arc::new(BroadcastHub::new(16));
    let mut observer = hub.subscribe();
    let handler = CommandHandler::new(shared(world()), hub.clone(), Arc::new(SimConfig::default()));

    let pid = handler.register_player("Aria", PlayerClass::Warrior).await.unwrap();
    handler.connect(pid).await.unwrap();
    assert_eq!(observer.receiver.recv().await.unwrap().kind(), "batch_update");

    handler.chat(pid, "hi all").await.unwrap();
    assert_eq!(observer.receiver.recv().await.unwrap().kind(), "chat");

    handler.disconnect(pid).await.unwrap();
    assert_eq!(observer.receiver.recv().await.unwrap().kind(), "player_left_map");
    assert!(!handler.world().read().await.player(pid).unwrap().online);
}
