//! Per-entity interval gates.

use std::time::{Duration, Instant};

/// Lets something happen at most once per `interval`.
///
/// Time is always passed in, never read from the clock, so callers decide
/// what "now" means for a whole tick and tests can step time by hand.
///
/// ```
/// use std::time::{Duration, Instant};
/// use runemud_tick::Cooldown;
///
/// let start = Instant::now();
/// let mut regen = Cooldown::new(Duration::from_secs(6), start);
/// assert!(!regen.try_fire(start + Duration::from_secs(5)));
/// assert!(regen.try_fire(start + Duration::from_secs(6)));
/// assert!(!regen.try_fire(start + Duration::from_secs(7)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cooldown {
    interval: Duration,
    last: Option<Instant>,
}

impl Cooldown {
    /// A cooldown that first becomes ready one interval after `now`.
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            last: Some(now),
        }
    }

    /// A cooldown that is ready immediately.
    pub fn ready(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Whether a full interval has passed since the last firing.
    pub fn is_ready(&self, now: Instant) -> bool {
        match self.last {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        }
    }

    /// Fires if ready, restarting the interval from `now`.
    ///
    /// Returns whether it fired.
    pub fn try_fire(&mut self, now: Instant) -> bool {
        if self.is_ready(now) {
            self.last = Some(now);
            true
        } else {
            false
        }
    }

    /// Restarts the interval from `now` without firing.
    pub fn reset(&mut self, now: Instant) {
        self.last = Some(now);
    }

    /// Makes the cooldown ready immediately.
    pub fn clear(&mut self) {
        self.last = None;
    }

    /// Time left until ready; zero when ready.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.last {
            None => Duration::ZERO,
            Some(last) => self
                .interval
                .saturating_sub(now.saturating_duration_since(last)),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// When it last fired or was reset, if ever.
    pub fn last(&self) -> Option<Instant> {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn test_new_is_not_ready_before_interval() {
        let t0 = Instant::now();
        let c = Cooldown::new(secs(6), t0);
        assert!(!c.is_ready(t0));
        assert!(!c.is_ready(t0 + Duration::from_millis(5999)));
        assert!(c.is_ready(t0 + secs(6)));
    }

    #[test]
    fn test_ready_fires_immediately() {
        let t0 = Instant::now();
        let mut c = Cooldown::ready(secs(6));
        assert!(c.try_fire(t0));
        assert!(!c.try_fire(t0 + secs(1)));
    }

    #[test]
    fn test_try_fire_at_most_once_per_interval() {
        let t0 = Instant::now();
        let mut c = Cooldown::new(secs(6), t0);
        let fired = (0..=60)
            .map(|tick| t0 + Duration::from_millis(tick * 200))
            .filter(|now| c.try_fire(*now))
            .count();
        // 12 s of 200 ms ticks: fires at 6 s and 12 s.
        assert_eq!(fired, 2);
    }

    #[test]
    fn test_reset_restarts_interval() {
        let t0 = Instant::now();
        let mut c = Cooldown::new(secs(6), t0);
        c.reset(t0 + secs(5));
        assert!(!c.is_ready(t0 + secs(6)));
        assert!(c.is_ready(t0 + secs(11)));
    }

    #[test]
    fn test_clear_makes_ready() {
        let t0 = Instant::now();
        let mut c = Cooldown::new(secs(60), t0);
        c.clear();
        assert!(c.is_ready(t0));
        assert_eq!(c.last(), None);
    }

    #[test]
    fn test_remaining_counts_down_to_zero() {
        let t0 = Instant::now();
        let c = Cooldown::new(secs(6), t0);
        assert_eq!(c.remaining(t0 + secs(2)), secs(4));
        assert_eq!(c.remaining(t0 + secs(9)), Duration::ZERO);
        assert_eq!(Cooldown::ready(secs(6)).remaining(t0), Duration::ZERO);
    }

    #[test]
    fn test_now_before_last_is_not_ready() {
        let t0 = Instant::now();
        let c = Cooldown::new(secs(6), t0 + secs(10));
        assert!(!c.is_ready(t0));
    }
}
