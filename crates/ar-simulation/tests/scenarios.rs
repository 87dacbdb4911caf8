//! Integration tests for simulation scenarios.
mod common;

use std::sync::Arc;

use ar_core::{AiState, PlayerClass, PlayerState};
use ar_simulation::commands::{self, MoveRequest};
use ar_simulation::{
    BroadcastHub, EntityDelta, GameLoop, Outbox, ServerMessage, SimConfig, Simulation, shared,
};
use chrono::Duration;

use common::*;

fn online_player(world: &mut ar_core::World, name: &str) -> ar_core::PlayerId {
    let id = commands::register_player(world, name, PlayerClass::Warrior, &SimConfig::default())
        .unwrap();
    commands::connect(world, id, &mut Outbox::new()).unwrap();
    id
}

#[test]
fn idle_monster_chases_nearby_player_within_one_tick() {
    let mut world = world();
    let wolf = only_monster(&world);
    let pid = online_player(&mut world, "Aria");
    place(&mut world, pid, "map_forest_1", 13.0, 10.0);

    let mut sim = Simulation::new(config());
    let messages = sim.tick(&mut world, t0());

    let monster = world.monster(wolf).unwrap();
    assert_eq!(monster.ai_state, AiState::Chasing);
    assert_eq!(monster.target, Some(pid));

    let ServerMessage::BatchUpdate { entities } = messages.last().unwrap() else {
        panic!("expected a batch_update");
    };
    assert!(entities.iter().any(|delta| matches!(
        delta,
        EntityDelta::Monster { id, state: AiState::Chasing, .. } if *id == wolf
    )));
}

#[test]
fn killing_blow_removes_monster_and_respawns_it_later() {
    let mut world = world();
    let wolf = only_monster(&world);
    let pid = online_player(&mut world, "Aria");
    place(&mut world, pid, "map_forest_1", 11.0, 10.0);
    world.monster_mut(wolf).unwrap().stats.hp = 1;
    commands::start_mission(&mut world, pid, "mission_wolf").unwrap();
    commands::attack(&mut world, pid, wolf).unwrap();

    let mut sim = Simulation::new(config());
    let messages = sim.tick(&mut world, t0());

    assert!(world.monster(wolf).is_none());
    assert_eq!(world.monster_count(), 0);
    let record = world.respawn_queue().iter().next().unwrap();
    assert_eq!(record.ready_at, t0() + Duration::seconds(20));
    assert_eq!(record.position, ar_core::Position::new(10.0, 10.0));

    let update = messages
        .iter()
        .find_map(|m| match m {
            ServerMessage::CombatUpdate { log, monster_hp, .. } => Some((log, *monster_hp)),
            _ => None,
        })
        .unwrap();
    assert!(update.0.monster_died);
    assert_eq!(update.0.xp_gained, 20);
    assert_eq!(update.1, 0);

    let player = world.player(pid).unwrap();
    assert_eq!(player.state, PlayerState::Idle);
    assert_eq!(player.combat_target, None);
    assert_eq!(player.xp, 20);
    assert!((10..=50).contains(&player.gold));
    assert_eq!(player.missions.progress, 1);
    assert_eq!(player.inventory.len(), 1);

    sim.tick(&mut world, t0() + Duration::seconds(10));
    assert_eq!(world.monster_count(), 0);

    let messages = sim.tick(&mut world, t0() + Duration::seconds(20));
    assert_eq!(world.monster_count(), 1);
    assert!(world.respawn_queue().is_empty());
    let respawned = messages
        .iter()
        .find_map(|m| match m {
            ServerMessage::MonsterRespawn { monster } => Some(monster),
            _ => None,
        })
        .unwrap();
    assert_eq!(respawned.template_id, "mob_wolf_01");
    assert_eq!(respawned.position, respawned.spawn);
    assert_ne!(respawned.id, wolf);
}

#[test]
fn out_of_range_target_drops_player_to_idle() {
    let mut world = world();
    let wolf = only_monster(&world);
    let pid = online_player(&mut world, "Aria");
    place(&mut world, pid, "map_forest_1", 40.0, 40.0);
    commands::attack(&mut world, pid, wolf).unwrap();

    Simulation::new(config()).tick(&mut world, t0());
    let player = world.player(pid).unwrap();
    assert_eq!(player.state, PlayerState::Idle);
    assert_eq!(player.combat_target, None);
    assert_eq!(world.monster(wolf).unwrap().stats.hp, 50);
}

#[test]
fn player_walks_to_target_and_stops() {
    let mut world = world();
    let pid = online_player(&mut world, "Aria");
    commands::move_player(
        &mut world,
        pid,
        &MoveRequest {
            x: 56.0,
            y: 50.0,
            map_id: None,
        },
        &mut Outbox::new(),
    )
    .unwrap();
    assert_eq!(world.player(pid).unwrap().state, PlayerState::Moving);

    let mut sim = Simulation::new(config());
    let mut now = t0();
    sim.tick(&mut world, now);
    now += Duration::milliseconds(500);
    sim.tick(&mut world, now);
    let x = world.player(pid).unwrap().position.x;
    assert!((x - 50.6).abs() < 1e-9, "moved to {x}");

    for _ in 0..20 {
        now += Duration::milliseconds(500);
        sim.tick(&mut world, now);
    }
    let player = world.player(pid).unwrap();
    assert_eq!(player.state, PlayerState::Idle);
    assert_eq!(player.move_target, None);
    assert_eq!(player.position, ar_core::Position::new(56.0, 50.0));
}

#[test]
fn monster_hits_back_until_player_dies() {
    let mut world = world();
    let wolf = only_monster(&world);
    let pid = online_player(&mut world, "Aria");
    place(&mut world, pid, "map_forest_1", 11.0, 10.0);
    {
        let player = world.player_mut(pid).unwrap();
        player.stats.hp = 1;
        player.stats.def = 0;
    }
    {
        let monster = world.monster_mut(wolf).unwrap();
        monster.target = Some(pid);
        monster.ai_state = AiState::Attacking;
    }

    let mut sim = Simulation::new(config());
    let messages = sim.tick(&mut world, t0());
    assert!(messages.iter().any(|m| m.kind() == "combat_update"));

    let player = world.player(pid).unwrap();
    assert!(!player.is_alive());
    assert_eq!(player.death_time, Some(t0()));
    assert_eq!(player.state, PlayerState::Idle);
    assert_eq!(player.combat_target, None);

    sim.tick(&mut world, t0() + Duration::milliseconds(50));
    let monster = world.monster(wolf).unwrap();
    assert_eq!(monster.target, None);
    assert_eq!(monster.ai_state, AiState::Idle);
}

#[test]
fn disconnect_makes_monster_give_up() {
    let mut world = world();
    let wolf = only_monster(&world);
    let pid = online_player(&mut world, "Aria");
    place(&mut world, pid, "map_forest_1", 14.0, 10.0);

    let mut sim = Simulation::new(config());
    sim.tick(&mut world, t0());
    assert_eq!(world.monster(wolf).unwrap().target, Some(pid));
    world.monster_mut(wolf).unwrap().position = ar_core::Position::new(12.0, 10.0);

    let mut out = Outbox::new();
    commands::disconnect(&mut world, pid, &mut out).unwrap();
    assert_eq!(out.messages()[0].kind(), "player_left_map");

    sim.tick(&mut world, t0() + Duration::milliseconds(50));
    let monster = world.monster(wolf).unwrap();
    assert_eq!(monster.target, None);
    assert_eq!(monster.ai_state, AiState::Returning);
}

#[tokio::test]
async fn game_loop_broadcasts_one_batch_per_tick() {
    let mut world = world();
    let pid = online_player(&mut world, "Aria");
    place(&mut world, pid, "map_forest_1", 13.0, 10.0);

    let hub = Arc::new(BroadcastHub::new(16));
    let mut observer = hub.subscribe();
    let mut game_loop = GameLoop::new(shared(world), Simulation::new(config()), hub.clone());

    let sent = game_loop.tick_at(t0()).await;
    assert_eq!(sent, 1);
    let message = observer.receiver.recv().await.unwrap();
    assert_eq!(message.kind(), "batch_update");
    assert!(observer.receiver.try_recv().is_err());
}
