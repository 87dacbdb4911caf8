use std::path::PathBuf;
use std::time::Duration;

/// Where and how often player snapshots are written.
#[derive(Debug, Clone)]
pub struct PersistConfig {
    /// Directory holding the snapshot.
    pub data_dir: PathBuf,
    /// Snapshot file name inside `data_dir`.
    pub file_name: String,
    /// Time between periodic saves.
    pub interval: Duration,
}

impl Default for PersistConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            file_name: "players.json".to_string(),
            interval: Duration::from_secs(10),
        }
    }
}

impl PersistConfig {
    /// Set the data directory.
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Set the snapshot file name.
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = name.into();
        self
    }

    /// Set the save interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Full path of the snapshot file.
    pub fn path(&self) -> PathBuf {
        self.data_dir.join(&self.file_name)
    }
}
