//! Error types for the simulation crate.

use ar_core::CoreError;
use ar_mechanics::MechError;

/// Errors returned by commands and systems.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// A world lookup failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A rule resolver rejected the action.
    #[error(transparent)]
    Mech(#[from] MechError),

    /// The command itself was malformed, e.g. an empty name.
    #[error("invalid command: {0}")]
    InvalidCommand(String),

    /// A system failed during a tick.
    #[error("system error: {0}")]
    SystemError(String),
}

/// Convenience result type for simulation operations.
pub type SimResult<T> = Result<T, SimError>;

impl SimError {
    /// Whether the failure is a missing-entity condition rather than a
    /// rejected action.
    pub fn is_not_found(&self) -> bool {
        match self {
            SimError::Core(err) | SimError::Mech(MechError::Core(err)) => {
                !matches!(err, CoreError::NameTaken(_))
            }
            _ => false,
        }
    }
}
