use chrono::{DateTime, Utc};

/// Wall-clock tick counter.
///
/// Respawn deadlines and cooldowns are timestamps, so the clock only has
/// to produce a bounded dt for movement integration.
#[derive(Debug, Clone)]
pub struct TickClock {
    tick: u64,
    now: Option<DateTime<Utc>>,
    dt: f64,
    max_dt: f64,
}

impl TickClock {
    /// A clock that caps dt at `max_dt` seconds.
    pub fn new(max_dt: f64) -> Self {
        Self {
            tick: 0,
            now: None,
            dt: 0.0,
            max_dt,
        }
    }

    /// Step to `now` and return the clamped dt in seconds. The first tick
    /// has dt 0; a clock that went backwards also yields 0.
    pub fn advance(&mut self, now: DateTime<Utc>) -> f64 {
        let dt = match self.now {
            Some(prev) => {
                let secs = (now - prev).num_microseconds().unwrap_or(i64::MAX) as f64 / 1e6;
                secs.clamp(0.0, self.max_dt)
            }
            None => 0.0,
        };
        self.tick += 1;
        self.now = Some(now);
        self.dt = dt;
        dt
    }

    /// Ticks advanced so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Timestamp of the current tick. Falls back to the wall clock before
    /// the first tick.
    pub fn now(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }

    /// dt of the current tick in seconds.
    pub fn dt(&self) -> f64 {
        self.dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn first_tick_has_zero_dt() {
        let mut clock = TickClock::new(0.5);
        assert_eq!(clock.advance(t0()), 0.0);
        assert_eq!(clock.tick(), 1);
    }

    #[test]
    fn dt_tracks_elapsed_time() {
        let mut clock = TickClock::new(0.5);
        clock.advance(t0());
        let dt = clock.advance(t0() + Duration::milliseconds(50));
        assert!((dt - 0.05).abs() < 1e-9);
        assert_eq!(clock.now(), t0() + Duration::milliseconds(50));
    }

    #[test]
    fn stall_is_clamped() {
        let mut clock = TickClock::new(0.5);
        clock.advance(t0());
        let dt = clock.advance(t0() + Duration::seconds(5));
        assert!((dt - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn backwards_clock_yields_zero() {
        let mut clock = TickClock::new(0.5);
        clock.advance(t0());
        assert_eq!(clock.advance(t0() - Duration::seconds(1)), 0.0);
        assert_eq!(clock.tick(), 2);
    }
}
