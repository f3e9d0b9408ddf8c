//! Time-related abstractions.
//!
//! `Instant` is Tokio's instant rather than `std::time::Instant` so that
//! debounce deadlines follow the runtime clock. Tests that pause the clock
//! (`#[tokio::test(start_paused = true)]`) therefore drive the debounce window
//! deterministically.
//!
//! # Examples
//!
//! ```rust
//! use core_async::time::{sleep_until, Duration, Instant};
//!
//! async fn example() {
//!     let deadline = Instant::now() + Duration::from_millis(250);
//!     sleep_until(deadline).await;
//!     assert!(Instant::now() >= deadline);
//! }
//! ```

pub use tokio::time::{
    error::Elapsed, sleep, sleep_until, timeout, timeout_at, Duration, Instant, Sleep, Timeout,
};

/// Converts a duration to fractional milliseconds.
///
/// Probe response times are reported in this unit.
pub fn as_millis_f64(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}
