//! # Desktop Bridge Implementations
//!
//! Default implementations of the NetSignal bridge traits for desktop
//! platforms (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `ConnectivitySource` via [`DesktopConnectivitySource`]: periodic TCP
//!   reachability checks, with interface type detection on Linux
//! - `ReachabilityProber` via [`ReqwestProber`]: HTTP `HEAD` probes using `reqwest`
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{DesktopConnectivitySource, ReqwestProber};
//! use std::sync::Arc;
//!
//! let source = Arc::new(DesktopConnectivitySource::new());
//! let prober = Arc::new(ReqwestProber::new()?);
//! // hand both to NetSignalConfig::builder()
//! ```

mod network;
mod probe;

pub use network::DesktopConnectivitySource;
pub use probe::ReqwestProber;
