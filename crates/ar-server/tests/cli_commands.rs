//! Integration tests for the CLI commands.
#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;
use std::path::PathBuf;

use ar_core::{Player, PlayerClass, Position};
use ar_persistence::{PersistConfig, PlayerStore};
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn sample_content() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../content")
}

fn autorealm() -> Command {
    Command::cargo_bin("autorealm").unwrap()
}

fn path_arg(path: &std::path::Path) -> &str {
    path.to_str().unwrap()
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_sample_content_is_clean() {
    autorealm()
        .args(["check", "-c", path_arg(&sample_content()), "--strict"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("map_forest_1")
                .and(predicate::str::contains("map_castle_1"))
                .and(predicate::str::contains("All references resolve")),
        );
}

#[test]
fn check_reports_dangling_spawn() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("maps.json"),
        r#"[{ "id": "map_a", "name": "A", "spawns": [{ "template_id": "mob_ghost", "x": 1.0, "y": 1.0 }] }]"#,
    )
    .unwrap();

    autorealm()
        .args(["check", "-c", path_arg(dir.path())])
        .assert()
        .success()
        .stdout(predicate::str::contains("mob_ghost").and(predicate::str::contains("1 dangling reference")));

    autorealm()
        .args(["check", "-c", path_arg(dir.path()), "--strict"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("content check failed"));
}

#[test]
fn check_missing_directory_fails() {
    let dir = TempDir::new().unwrap();
    autorealm()
        .args(["check", "-c", path_arg(&dir.path().join("absent"))])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

// ---------------------------------------------------------------------------
// serve
// ---------------------------------------------------------------------------

#[test]
fn serve_writes_snapshot_on_shutdown() {
    let data = TempDir::new().unwrap();
    autorealm()
        .args([
            "serve",
            "-c",
            path_arg(&sample_content()),
            "-d",
            path_arg(data.path()),
            "--tick-ms",
            "20",
            "--run-for-secs",
            "0.3",
        ])
        .assert()
        .success();

    let snapshot = fs::read_to_string(data.path().join("players.json")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&snapshot).unwrap();
    assert!(parsed.is_object());
    assert!(!data.path().join("players.json.tmp").exists());
}

#[test]
fn serve_keeps_saved_players() {
    let data = TempDir::new().unwrap();
    let store = PlayerStore::new(&PersistConfig::default().with_data_dir(data.path())).unwrap();
    let hero = Player::new("Aria", PlayerClass::Mage, "map_forest_1", Position::new(20.0, 20.0));
    store.save([&hero]).unwrap();

    autorealm()
        .args([
            "serve",
            "-c",
            path_arg(&sample_content()),
            "-d",
            path_arg(data.path()),
            "--run-for-secs",
            "0.2",
        ])
        .assert()
        .success();

    let players = store.load().unwrap();
    assert_eq!(players.len(), 1);
    assert_eq!(players[0].id, hero.id);
    assert_eq!(players[0].current_map_id, "map_forest_1");
}

#[test]
fn serve_rejects_unknown_start_map() {
    let data = TempDir::new().unwrap();
    autorealm()
        .args([
            "serve",
            "-c",
            path_arg(&sample_content()),
            "-d",
            path_arg(data.path()),
            "--start-map",
            "map_nowhere",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("map_nowhere"));
}

// ---------------------------------------------------------------------------
// players
// ---------------------------------------------------------------------------

#[test]
fn players_without_snapshot() {
    let data = TempDir::new().unwrap();
    autorealm()
        .args(["players", "-d", path_arg(data.path())])
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved players"));
}

#[test]
fn players_lists_snapshot() {
    let data = TempDir::new().unwrap();
    let store = PlayerStore::new(&PersistConfig::default().with_data_dir(data.path())).unwrap();
    let aria = Player::new("Aria", PlayerClass::Mage, "map_castle_1", Position::new(50.0, 50.0));
    let brom = Player::new("Brom", PlayerClass::Warrior, "map_forest_1", Position::new(5.0, 50.0));
    store.save([&aria, &brom]).unwrap();

    autorealm()
        .args(["players", "-d", path_arg(data.path())])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Aria")
                .and(predicate::str::contains("warrior"))
                .and(predicate::str::contains("2 players")),
        );
}
