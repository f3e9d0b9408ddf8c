//! NetSignal façade crate.
//!
//! Re-exports the public surface of the workspace crates so host applications
//! depend on a single crate. The `desktop-shims` feature (on by default) pulls
//! in the desktop polling source and the reqwest prober as configuration
//! defaults.
//!
//! ```ignore
//! use netsignal::{NetSignal, NetSignalConfig};
//!
//! let monitor = NetSignal::start(NetSignalConfig::builder().build()?).await?;
//! println!("online: {}", monitor.is_connected());
//! ```

pub use bridge_traits::{
    BridgeError, Clock, ConnectivitySource, FixedClock, NetworkState, ProbeResult, RawSignal,
    ReachabilityFlags, ReachabilityProber, SignalCallback, SystemClock, Transport,
};
pub use core_netsignal::{
    ConnectionChange, ListenerHandle, MonitorPhase, NetSignal, NetSignalError, Result,
    StateStream, Transition, CONNECTION_CHANGE_EVENT,
};
pub use core_runtime::config::{NetSignalConfig, NetSignalConfigBuilder};
pub use core_runtime::events::{
    ConnectivityEvent, CoreEvent, EventSeverity, EventStream, MonitorEvent, ProbeEvent,
};
pub use core_runtime::logging::{init_logging, redact_url, LogFormat, LoggingConfig};

#[cfg(feature = "desktop-shims")]
pub use bridge_desktop::{DesktopConnectivitySource, ReqwestProber};

/// Runtime helpers for hosts without their own executor.
pub mod runtime {
    pub use core_async::runtime::{block_on, in_runtime};
}
