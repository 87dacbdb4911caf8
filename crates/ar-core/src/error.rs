use crate::id::{ItemId, MonsterId, PlayerId};

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Lookups that failed against the world state store.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The requested player ID does not exist.
    #[error("player not found: {0}")]
    PlayerNotFound(PlayerId),

    /// The requested monster ID does not exist (never spawned, or already dead).
    #[error("monster not found: {0}")]
    MonsterNotFound(MonsterId),

    /// The requested map is not part of the loaded content.
    #[error("map not found: \"{0}\"")]
    MapNotFound(String),

    /// The item is in neither the inventory nor the equipment of its owner.
    #[error("item not found: {0}")]
    ItemNotFound(ItemId),

    /// The requested mission template does not exist.
    #[error("mission not found: \"{0}\"")]
    MissionNotFound(String),

    /// The resource node does not exist on the player's current map.
    #[error("resource node not found: \"{0}\"")]
    ResourceNotFound(String),

    /// A player with the same name is already registered.
    #[error("player name already taken: \"{0}\"")]
    NameTaken(String),
}
