//! # Host Bridge Traits
//!
//! Platform abstraction traits that each host platform implements for the
//! NetSignal core.
//!
//! ## Overview
//!
//! This crate is the contract between the reachability core and the
//! platform-specific code that actually talks to the OS. The core never calls
//! `ConnectivityManager`, `SCNetworkReachability` or netlink itself; a host
//! adapter translates those APIs into [`RawSignal`](network::RawSignal) values
//! and pushes them through a callback.
//!
//! ## Traits
//!
//! - [`ConnectivitySource`](network::ConnectivitySource) - Push-based source of raw connectivity signals
//! - [`ReachabilityProber`](probe::ReachabilityProber) - One-shot HTTP reachability checks
//! - [`Clock`](time::Clock) - Wall-clock source for transition timestamps
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Source |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | Polling TCP reachability |
//! | iOS      | Host-provided       | `SCNetworkReachability` flags |
//! | Android  | Host-provided       | `NetworkCapabilities` callbacks |
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Adapters should
//! convert platform errors into it with an actionable message. Raw signal
//! payloads are never errors: whatever the host pushes is accepted and the
//! core decides what it means.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync`. Signal callbacks may be invoked
//! from any OS thread.
//!
//! ## Example
//!
//! ```ignore
//! use bridge_traits::network::{ConnectivitySource, RawSignal, SignalCallback, Transport};
//! use bridge_traits::error::Result;
//! use async_trait::async_trait;
//!
//! struct AndroidSource { /* JNI handles */ }
//!
//! #[async_trait]
//! impl ConnectivitySource for AndroidSource {
//!     fn name(&self) -> &str {
//!         "android"
//!     }
//!
//!     async fn start(&self, on_signal: SignalCallback) -> Result<()> {
//!         // register a NetworkCallback that calls:
//!         on_signal(RawSignal::Capabilities {
//!             has_internet: true,
//!             transports: vec![Transport::Wifi],
//!         });
//!         Ok(())
//!     }
//!
//!     async fn stop(&self) -> Result<()> {
//!         Ok(())
//!     }
//! }
//! ```

pub mod error;
pub mod network;
pub mod probe;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use network::{
    ConnectivitySource, NetworkState, RawSignal, ReachabilityFlags, SignalCallback, Transport,
};
pub use probe::{ProbeResult, ReachabilityProber};
pub use time::{Clock, ConsoleLogger, FixedClock, LogEntry, LogLevel, LoggerSink, SystemClock};
