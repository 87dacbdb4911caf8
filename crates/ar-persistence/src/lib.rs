//! Crash-safe persistence of player records for AutoRealm.
//!
//! Players are written as one JSON object keyed by player id. Every save
//! goes to a temp file first and is renamed over the real file, so a crash
//! mid-write leaves the previous snapshot intact. [`Snapshotter`] runs the
//! save on a fixed interval behind a write gate.

/// Paths and the save interval.
pub mod config;
/// Error types for the persistence crate.
pub mod error;
/// Periodic snapshot task.
pub mod snapshotter;
/// File-backed player store.
pub mod store;

/// Re-export of [`config::PersistConfig`].
pub use config::PersistConfig;
/// Re-exports of [`error::PersistError`] and [`error::PersistResult`].
pub use error::{PersistError, PersistResult};
/// Re-export of [`snapshotter::Snapshotter`].
pub use snapshotter::Snapshotter;
/// Re-exports of [`store::PlayerStore`] and [`store::restore_players`].
pub use store::{PlayerStore, restore_players};
