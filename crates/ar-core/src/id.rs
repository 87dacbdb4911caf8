use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! runtime_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a new random ID.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", &self.0.to_string()[..8])
            }
        }
    };
}

runtime_id!(
    /// Identifier of a registered player. Immutable for the player's lifetime.
    PlayerId
);

runtime_id!(
    /// Identifier of one spawned monster instance, distinct from its template id.
    MonsterId
);

runtime_id!(
    /// Identifier of one item instance.
    ItemId
);
