//! Debounce/Coalescer
//!
//! Absorbs bursts of normalized states into single stable transitions.
//!
//! The coalescer is a plain state machine driven with explicit instants; the
//! monitor task owns the actual timer and calls [`Coalescer::poll`] once
//! [`Coalescer::deadline`] has passed.
//!
//! ```text
//! observe(wifi)   observe(offline)         deadline
//!     │                │                       │
//!     ├── window ──────┼──────── window ───────┤
//!                      (timer reset)           poll -> (emitted, offline)
//! ```

use bridge_traits::{Clock, NetworkState};
use core_async::time::{Duration, Instant};

use crate::state::Transition;

#[derive(Debug, Clone)]
pub struct Coalescer {
    window: Duration,
    /// State carried by the last emitted transition
    emitted: NetworkState,
    /// Most recent normalized state
    last_seen: NetworkState,
    deadline: Option<Instant>,
}

impl Coalescer {
    /// Both the emitted and the last-seen state start as `Unknown`.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            emitted: NetworkState::Unknown,
            last_seen: NetworkState::Unknown,
            deadline: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn emitted(&self) -> NetworkState {
        self.emitted
    }

    pub fn last_seen(&self) -> NetworkState {
        self.last_seen
    }

    /// When the pending window elapses, if one is running.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Record a normalized state observed at `now`.
    ///
    /// A state different from the last one seen starts (or restarts) the quiet
    /// window. Repeats of the last-seen state leave the timer untouched.
    /// Returns `true` if the timer was (re)started.
    pub fn observe(&mut self, state: NetworkState, now: Instant) -> bool {
        if state == self.last_seen {
            return false;
        }

        self.last_seen = state;
        self.deadline = Some(now + self.window);
        true
    }

    /// Settle the window if its deadline has passed.
    ///
    /// Yields a transition from the previously emitted state to the last-seen
    /// state, or nothing when the burst ended where it started.
    pub fn poll(&mut self, now: Instant, clock: &dyn Clock) -> Option<Transition> {
        match self.deadline {
            Some(deadline) if deadline <= now => {}
            _ => return None,
        }

        self.deadline = None;
        let transition = Transition::new(self.emitted, self.last_seen, clock.now())?;
        self.emitted = self.last_seen;
        Some(transition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::FixedClock;
    use chrono::{TimeZone, Utc};

    const WINDOW: Duration = Duration::from_millis(250);

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_burst_settles_to_final_state() {
        let clock = clock();
        let start = Instant::now();
        let mut coalescer = Coalescer::new(WINDOW);

        coalescer.observe(NetworkState::Wifi, start);
        coalescer.observe(NetworkState::Wifi, start + Duration::from_millis(50));
        coalescer.observe(NetworkState::Offline, start + Duration::from_millis(100));

        assert!(coalescer
            .poll(start + Duration::from_millis(300), &clock)
            .is_none());

        let transition = coalescer
            .poll(start + Duration::from_millis(350), &clock)
            .unwrap();
        assert_eq!(transition.previous(), NetworkState::Unknown);
        assert_eq!(transition.current(), NetworkState::Offline);
        assert_eq!(transition.timestamp(), clock.0);
        assert!(!coalescer.is_pending());
        assert_eq!(coalescer.emitted(), NetworkState::Offline);
    }

    #[test]
    fn test_repeat_does_not_reset_timer() {
        let start = Instant::now();
        let mut coalescer = Coalescer::new(WINDOW);

        assert!(coalescer.observe(NetworkState::Cellular, start));
        assert!(!coalescer.observe(NetworkState::Cellular, start + Duration::from_millis(200)));
        assert_eq!(coalescer.deadline(), Some(start + WINDOW));
    }

    #[test]
    fn test_flap_back_emits_nothing() {
        let clock = clock();
        let start = Instant::now();
        let mut coalescer = Coalescer::new(WINDOW);

        coalescer.observe(NetworkState::Wifi, start);
        coalescer.poll(start + WINDOW, &clock).unwrap();

        let later = start + Duration::from_secs(5);
        coalescer.observe(NetworkState::Offline, later);
        coalescer.observe(NetworkState::Wifi, later + Duration::from_millis(10));

        assert!(coalescer.poll(later + Duration::from_secs(1), &clock).is_none());
        assert!(!coalescer.is_pending());
        assert_eq!(coalescer.emitted(), NetworkState::Wifi);
    }

    #[test]
    fn test_change_after_emission_starts_new_window() {
        let clock = clock();
        let start = Instant::now();
        let mut coalescer = Coalescer::new(WINDOW);

        coalescer.observe(NetworkState::Wifi, start);
        coalescer.poll(start + WINDOW, &clock).unwrap();

        let later = start + Duration::from_secs(1);
        coalescer.observe(NetworkState::Cellular, later);
        assert_eq!(coalescer.deadline(), Some(later + WINDOW));

        let transition = coalescer.poll(later + WINDOW, &clock).unwrap();
        assert_eq!(transition.previous(), NetworkState::Wifi);
        assert_eq!(transition.current(), NetworkState::Cellular);
    }

    #[test]
    fn test_zero_window_settles_immediately() {
        let clock = clock();
        let now = Instant::now();
        let mut coalescer = Coalescer::new(Duration::ZERO);

        coalescer.observe(NetworkState::Ethernet, now);
        let transition = coalescer.poll(now, &clock).unwrap();
        assert_eq!(transition.current(), NetworkState::Ethernet);
    }

    #[test]
    fn test_unknown_before_any_change_emits_nothing() {
        let clock = clock();
        let now = Instant::now();
        let mut coalescer = Coalescer::new(WINDOW);

        assert!(!coalescer.observe(NetworkState::Unknown, now));
        assert!(coalescer.poll(now + WINDOW, &clock).is_none());
    }
}
