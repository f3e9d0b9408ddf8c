//! Runtime abstraction layer for the NetSignal core.
//!
//! Core crates depend on this crate instead of Tokio directly so that the
//! executor stays swappable. Everything here is a thin re-export or wrapper
//! around Tokio on native targets.
//!
//! # Modules
//!
//! - `task`: Task spawning
//! - `time`: Timers and the monotonic clock used for debounce deadlines
//! - `sync`: Channels, locks and cancellation
//! - `runtime`: Runtime handles and `block_on`
//!
//! # Examples
//!
//! ```rust
//! use core_async::task;
//! use core_async::time::{sleep, Duration};
//!
//! async fn example() {
//!     let handle = task::spawn(async {
//!         sleep(Duration::from_millis(250)).await;
//!         "settled"
//!     });
//!     assert_eq!(handle.await.unwrap(), "settled");
//! }
//! ```

pub mod runtime;
pub mod sync;
pub mod task;
pub mod time;

pub use task::spawn;
pub use time::{sleep, Duration, Instant};
