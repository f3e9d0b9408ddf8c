//! Synchronization primitives.
//!
//! Async-aware channels and locks from Tokio plus `CancellationToken` from
//! `tokio-util`. The monitor's command queue is an `mpsc` unbounded channel;
//! source adapters use `CancellationToken` to stop their polling loops.
//!
//! # Examples
//!
//! ```rust
//! use core_async::sync::mpsc;
//!
//! async fn example() {
//!     let (tx, mut rx) = mpsc::unbounded_channel();
//!     tx.send("wifi-up").unwrap();
//!     assert_eq!(rx.recv().await, Some("wifi-up"));
//! }
//! ```

pub use tokio::sync::{broadcast, mpsc, oneshot, Mutex, MutexGuard};

pub use tokio_util::sync::CancellationToken;
