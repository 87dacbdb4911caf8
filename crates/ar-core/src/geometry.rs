use serde::{Deserialize, Serialize};

/// A point on a map, in world units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Position {
    /// A point at `(x, y)`.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: Position) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Clamp both coordinates into `[min, max_x] x [min, max_y]`.
    pub fn clamped(self, min: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            x: self.x.clamp(min, max_x.max(min)),
            y: self.y.clamp(min, max_y.max(min)),
        }
    }
}
