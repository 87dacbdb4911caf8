use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::geometry::Position;

/// Convert fractional seconds to a chrono duration with millisecond precision.
pub fn secs(seconds: f64) -> Duration {
    Duration::milliseconds((seconds.max(0.0) * 1000.0).round() as i64)
}

/// A monster waiting to come back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RespawnRecord {
    /// Monster template to spawn.
    pub template_id: String,
    /// Map to spawn on.
    pub map_id: String,
    /// Anchor the monster had when it died.
    pub position: Position,
    /// Earliest time the respawn may happen.
    pub ready_at: DateTime<Utc>,
}

/// Pending respawns in enqueue order. Deadlines are wall-clock timestamps,
/// so they stay correct across stalls and variable tick rates.
#[derive(Debug, Clone, Default)]
pub struct RespawnQueue {
    pending: Vec<RespawnRecord>,
}

impl RespawnQueue {
    /// An empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a respawn `delay_secs` after `now`. Returns the deadline.
    pub fn enqueue(
        &mut self,
        template_id: impl Into<String>,
        map_id: impl Into<String>,
        position: Position,
        delay_secs: f64,
        now: DateTime<Utc>,
    ) -> DateTime<Utc> {
        let ready_at = now + secs(delay_secs);
        self.pending.push(RespawnRecord {
            template_id: template_id.into(),
            map_id: map_id.into(),
            position,
            ready_at,
        });
        ready_at
    }

    /// Remove and return every record with `ready_at <= now`, earliest first.
    /// Records not yet due stay queued in their original order.
    pub fn drain_due(&mut self, now: DateTime<Utc>) -> Vec<RespawnRecord> {
        let (mut due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|r| r.ready_at <= now);
        self.pending = pending;
        due.sort_by_key(|r| r.ready_at);
        due
    }

    /// Number of pending respawns.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop every pending respawn.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Pending records in enqueue order.
    pub fn iter(&self) -> impl Iterator<Item = &RespawnRecord> {
        self.pending.iter()
    }
}

/// Ready-at timestamps keyed by resource node id. A node has at most one
/// outstanding cooldown, so setting a new one replaces the old.
#[derive(Debug, Clone, Default)]
pub struct CooldownTable {
    ready_at: HashMap<String, DateTime<Utc>>,
}

impl CooldownTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the node has no cooldown or its cooldown has passed.
    pub fn is_ready(&self, id: &str, now: DateTime<Utc>) -> bool {
        self.ready_at.get(id).is_none_or(|at| *at <= now)
    }

    /// Start a cooldown of `duration_secs` from `now`.
    pub fn set(&mut self, id: impl Into<String>, duration_secs: f64, now: DateTime<Utc>) {
        self.ready_at.insert(id.into(), now + secs(duration_secs));
    }

    /// Seconds left until the node is ready; zero if it already is.
    pub fn remaining(&self, id: &str, now: DateTime<Utc>) -> f64 {
        self.ready_at
            .get(id)
            .map(|at| (*at - now).num_milliseconds().max(0) as f64 / 1000.0)
            .unwrap_or(0.0)
    }

    /// Forget every cooldown.
    pub fn clear(&mut self) {
        self.ready_at.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn zero_delay_drains_immediately() {
        let mut q = RespawnQueue::new();
        let pos = Position::new(10.0, 10.0);
        q.enqueue("mob_wolf_01", "map_forest_1", pos, 0.0, t0());
        let due = q.drain_due(t0());
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].template_id, "mob_wolf_01");
        assert_eq!(due[0].position, pos);
        assert!(q.is_empty());
    }

    #[test]
    fn drain_partitions_due_and_pending() {
        let mut q = RespawnQueue::new();
        let pos = Position::default();
        q.enqueue("late", "m", pos, 30.0, t0());
        q.enqueue("b", "m", pos, 5.0, t0());
        q.enqueue("a", "m", pos, 2.0, t0());

        let due = q.drain_due(t0() + secs(10.0));
        let ids: Vec<_> = due.iter().map(|r| r.template_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(q.len(), 1);
        assert!(q.drain_due(t0() + secs(10.0)).is_empty());
        assert_eq!(q.drain_due(t0() + secs(30.0)).len(), 1);
    }

    #[test]
    fn enqueue_returns_deadline() {
        let mut q = RespawnQueue::new();
        let at = q.enqueue("x", "m", Position::default(), 20.0, t0());
        assert_eq!(at, t0() + Duration::seconds(20));
    }

    #[test]
    fn cooldown_expires() {
        let mut table = CooldownTable::new();
        assert!(table.is_ready("ore_1", t0()));
        table.set("ore_1", 30.0, t0());
        assert!(!table.is_ready("ore_1", t0() + secs(29.0)));
        assert!((table.remaining("ore_1", t0() + secs(20.0)) - 10.0).abs() < 1e-9);
        assert!(table.is_ready("ore_1", t0() + secs(30.0)));
        assert!(table.remaining("ore_1", t0() + secs(31.0)).abs() < f64::EPSILON);
    }
}
