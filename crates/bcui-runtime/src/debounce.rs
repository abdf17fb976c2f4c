#![forbid(unsafe_code)]

//! Trailing-edge debouncer for search inputs.
//!
//! The most recent value wins once no new value arrived for the quiet
//! period. Every push restarts the timer. Time is passed in explicitly by
//! the `*_at` methods so callers driving their own clock stay deterministic.

use std::time::Duration;

use web_time::Instant;

use crate::config::SearchConfig;

/// Holds the latest value until its quiet period has elapsed.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    quiet: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    #[must_use]
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    /// Debouncer using the configured search quiet period.
    #[must_use]
    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(config.debounce())
    }

    #[must_use]
    pub fn quiet(&self) -> Duration {
        self.quiet
    }

    /// Replace the pending value and restart the timer.
    pub fn push(&mut self, value: T) {
        self.push_at(value, Instant::now());
    }

    pub fn push_at(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now));
    }

    /// Take the pending value if its quiet period has elapsed.
    pub fn poll(&mut self) -> Option<T> {
        self.poll_at(Instant::now())
    }

    pub fn poll_at(&mut self, now: Instant) -> Option<T> {
        let ready = self
            .pending
            .as_ref()
            .is_some_and(|(_, pushed)| now.saturating_duration_since(*pushed) >= self.quiet);
        if ready {
            self.pending.take().map(|(value, _)| value)
        } else {
            None
        }
    }

    /// When the pending value becomes ready.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, pushed)| *pushed + self.quiet)
    }

    #[must_use]
    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref().map(|(value, _)| value)
    }

    /// Drop the pending value without emitting it.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUIET: Duration = Duration::from_millis(300);

    #[test]
    fn quiet_period_follows_search_config() {
        let default: Debouncer<&str> = Debouncer::from_config(&SearchConfig::default());
        assert_eq!(default.quiet(), Duration::from_millis(500));

        let mut debouncer = Debouncer::from_config(&SearchConfig { debounce_ms: 50 });
        let start = Instant::now();
        debouncer.push_at("q", start);
        assert_eq!(debouncer.poll_at(start + Duration::from_millis(49)), None);
        assert_eq!(debouncer.poll_at(start + Duration::from_millis(50)), Some("q"));
    }

    #[test]
    fn latest_value_wins_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(QUIET);
        debouncer.push_at("a", start);
        debouncer.push_at("ab", start + Duration::from_millis(100));
        assert_eq!(debouncer.poll_at(start + Duration::from_millis(350)), None);
        assert_eq!(debouncer.poll_at(start + Duration::from_millis(400)), Some("ab"));
        assert_eq!(debouncer.poll_at(start + Duration::from_secs(5)), None);
    }

    #[test]
    fn push_restarts_timer() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(QUIET);
        debouncer.push_at(1, start);
        debouncer.push_at(2, start + Duration::from_millis(250));
        assert_eq!(debouncer.deadline(), Some(start + Duration::from_millis(550)));
    }

    #[test]
    fn cancel_discards_pending() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(QUIET);
        debouncer.push_at("x", start);
        assert_eq!(debouncer.pending(), Some(&"x"));
        assert_eq!(debouncer.cancel(), Some("x"));
        assert_eq!(debouncer.poll_at(start + QUIET), None);
    }

    #[test]
    fn zero_quiet_period_is_immediate() {
        let now = Instant::now();
        let mut debouncer = Debouncer::new(Duration::ZERO);
        debouncer.push_at(7, now);
        assert_eq!(debouncer.poll_at(now), Some(7));
    }
}
