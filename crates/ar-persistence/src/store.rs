use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use ar_core::{Player, World};
use tracing::{debug, info, warn};

use crate::config::PersistConfig;
use crate::error::PersistResult;

/// JSON file holding every player record, keyed by player id.
#[derive(Debug, Clone)]
pub struct PlayerStore {
    path: PathBuf,
}

impl PlayerStore {
    /// Open the store, creating the data directory if needed.
    pub fn new(config: &PersistConfig) -> PersistResult<Self> {
        fs::create_dir_all(&config.data_dir)?;
        Ok(Self {
            path: config.path(),
        })
    }

    /// Path of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }

    /// Write all players. The previous file is replaced only once the new
    /// one is fully on disk.
    pub fn save<'a>(&self, players: impl IntoIterator<Item = &'a Player>) -> PersistResult<usize> {
        let records: BTreeMap<String, &Player> = players
            .into_iter()
            .map(|p| (p.id.0.to_string(), p))
            .collect();
        let json = serde_json::to_string_pretty(&records)?;

        let temp = self.temp_path();
        {
            let mut file = File::create(&temp)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
        }
        if let Err(err) = fs::rename(&temp, &self.path) {
            if let Err(cleanup) = fs::remove_file(&temp) {
                warn!(path = %temp.display(), error = %cleanup, "could not remove temp snapshot");
            }
            return Err(err.into());
        }

        debug!(path = %self.path.display(), players = records.len(), "players saved");
        Ok(records.len())
    }

    /// Read every player back. A missing file is an empty store; a record
    /// that no longer parses is logged and skipped. Loaded players come
    /// back offline with their transient state cleared.
    pub fn load(&self) -> PersistResult<Vec<Player>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let json = fs::read_to_string(&self.path)?;
        let records: BTreeMap<String, serde_json::Value> = serde_json::from_str(&json)?;

        let mut players = Vec::with_capacity(records.len());
        for (key, value) in records {
            match serde_json::from_value::<Player>(value) {
                Ok(mut player) => {
                    player.online = false;
                    player.reset_transient();
                    players.push(player);
                }
                Err(err) => warn!(key = %key, error = %err, "skipping unreadable player record"),
            }
        }
        info!(path = %self.path.display(), players = players.len(), "players loaded");
        Ok(players)
    }
}

/// Insert loaded players into a freshly built world.
pub fn restore_players(world: &mut World, players: Vec<Player>) -> usize {
    let count = players.len();
    for player in players {
        world.add_player(player);
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use ar_core::{Content, PlayerClass, PlayerState, Position};

    fn store(dir: &Path) -> PlayerStore {
        PlayerStore::new(&PersistConfig::default().with_data_dir(dir)).unwrap()
    }

    fn player(name: &str) -> Player {
        Player::new(name, PlayerClass::Warrior, "map_forest_1", Position::new(12.0, 8.0))
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store(dir.path()).load().unwrap().is_empty());
    }

    #[test]
    fn save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let players = [player("Aria"), player("Bram")];
        assert_eq!(store.save(&players).unwrap(), 2);
        assert!(store.path().exists());
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn failed_rename_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        fs::create_dir(store.path()).unwrap();
        fs::write(store.path().join("occupied"), "x").unwrap();

        let err = store.save([&player("Aria")]).unwrap_err();
        assert!(matches!(err, crate::error::PersistError::Io(_)));
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn load_resets_transient_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let mut aria = player("Aria");
        aria.online = true;
        aria.state = PlayerState::Moving;
        aria.move_target = Some(Position::new(40.0, 40.0));
        aria.gold = 320;
        store.save([&aria]).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        let back = &loaded[0];
        assert_eq!(back.id, aria.id);
        assert_eq!(back.gold, 320);
        assert!(!back.online);
        assert_eq!(back.state, PlayerState::Idle);
        assert_eq!(back.move_target, None);
    }

    #[test]
    fn bad_record_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        store.save([&player("Aria")]).unwrap();

        let mut records: BTreeMap<String, serde_json::Value> =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        records.insert("broken".into(), serde_json::json!({ "name": 7 }));
        fs::write(store.path(), serde_json::to_string(&records).unwrap()).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "Aria");
    }

    #[test]
    fn restore_adds_players_to_world() {
        let mut world = World::new(Content::new());
        let n = restore_players(&mut world, vec![player("Aria"), player("Bram")]);
        assert_eq!(n, 2);
        assert_eq!(world.player_count(), 2);
        assert!(world.find_player_by_name("Bram").is_some());
    }
}
