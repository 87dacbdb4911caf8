//! Bundled tunables shared by every resolver.

use crate::enhancement::EnhancementConfig;
use crate::revival::RevivalConfig;

/// Rule tunables. Built once at startup and borrowed by resolvers.
#[derive(Debug, Clone)]
pub struct Rules {
    /// Enhancement table.
    pub enhancement: EnhancementConfig,
    /// Death and revival tunables.
    pub revival: RevivalConfig,
    /// Same-template idle monsters within this radius join a fight.
    pub group_aggro_radius: f64,
    /// Maximum distance from a resource node to gather it.
    pub gather_range: f64,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            enhancement: EnhancementConfig::default(),
            revival: RevivalConfig::default(),
            group_aggro_radius: 8.0,
            gather_range: 2.5,
        }
    }
}

impl Rules {
    /// Replace the enhancement table.
    pub fn with_enhancement(mut self, config: EnhancementConfig) -> Self {
        self.enhancement = config;
        self
    }

    /// Replace the revival tunables.
    pub fn with_revival(mut self, config: RevivalConfig) -> Self {
        self.revival = config;
        self
    }

    /// Set the group aggro radius.
    pub fn with_group_aggro_radius(mut self, radius: f64) -> Self {
        self.group_aggro_radius = radius;
        self
    }

    /// Set the gather range.
    pub fn with_gather_range(mut self, range: f64) -> Self {
        self.gather_range = range;
        self
    }
}
