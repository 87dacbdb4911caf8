//! Direct-line movement. No pathfinding, no collision.

use ar_core::Position;

/// Closer than this, a mover is snapped onto its target.
pub const SNAP_THRESHOLD: f64 = 1.0;

/// Advance `from` toward `target` at `speed` units per second for `dt`
/// seconds. Returns the new position and whether the target was reached,
/// in which case the position is exactly `target`.
pub fn move_towards(from: Position, target: Position, speed: f64, dt: f64) -> (Position, bool) {
    let distance = from.distance_to(target);
    let step = speed * dt;
    if distance < SNAP_THRESHOLD || step >= distance {
        return (target, true);
    }
    (step_along(from, target, distance, step), false)
}

/// Move up to `max_step` toward `target` without overshooting. Used by
/// monster AI, which decides arrival on its own thresholds.
pub fn advance(from: Position, target: Position, max_step: f64) -> Position {
    let distance = from.distance_to(target);
    if distance <= max_step || distance <= f64::EPSILON {
        return target;
    }
    step_along(from, target, distance, max_step)
}

fn step_along(from: Position, target: Position, distance: f64, step: f64) -> Position {
    let dx = (target.x - from.x) / distance;
    let dy = (target.y - from.y) / distance;
    Position::new(from.x + dx * step, from.y + dy * step)
}
