//! Error types for player persistence.

/// Errors raised while reading or writing player snapshots.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// The snapshot file or data directory could not be accessed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot was not valid JSON, or a player failed to serialize.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Another save is still writing.
    #[error("a save is already in progress")]
    SaveInProgress,

    /// The blocking save task panicked or was cancelled.
    #[error("save task failed: {0}")]
    Task(String),
}

/// Convenience result type for persistence operations.
pub type PersistResult<T> = Result<T, PersistError>;
