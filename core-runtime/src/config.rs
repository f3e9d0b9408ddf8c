//! # Monitor Configuration
//!
//! Builder-based configuration for the NetSignal monitor.
//!
//! ## Overview
//!
//! [`NetSignalConfig`] holds the platform adapters and tuning knobs the monitor
//! needs. The builder validates everything up front so that a running monitor
//! never discovers a missing adapter.
//!
//! ## Required Dependencies
//!
//! - `ConnectivitySource` - platform signal source
//!
//! ## Optional Dependencies (with defaults)
//!
//! - `ReachabilityProber` - used by `probe()` (desktop default: reqwest)
//! - `Clock` - timestamps transitions (default: system clock)
//!
//! When the `desktop-shims` feature is enabled, `DesktopConnectivitySource`
//! and `ReqwestProber` are injected automatically if not provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::NetSignalConfig;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let config = NetSignalConfig::builder()
//!     .signal_source(Arc::new(MyPlatformSource::new()))
//!     .debounce_window(Duration::from_millis(500))
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::NetSignalConfig;
//! use std::time::Duration;
//!
//! // A debounce window above one minute is rejected
//! let config = NetSignalConfig::builder()
//!     .debounce_window(Duration::from_secs(120))
//!     .build()
//!     .expect("Should fail - window too long");
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::{Clock, ConnectivitySource, ReachabilityProber, SystemClock};
use std::sync::Arc;
use std::time::Duration;

/// Default quiet period before a change is considered stable.
pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_millis(250);

/// Upper bound accepted for the debounce window.
pub const MAX_DEBOUNCE_WINDOW: Duration = Duration::from_secs(60);

/// Timeout applied by `probe()` when the caller does not supply one.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for a NetSignal monitor.
///
/// Use [`NetSignalConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct NetSignalConfig {
    /// Quiet period a normalized change must survive before it is reported
    pub debounce_window: Duration,

    /// Platform signal source (required)
    pub signal_source: Arc<dyn ConnectivitySource>,

    /// Reachability prober (optional)
    pub prober: Option<Arc<dyn ReachabilityProber>>,

    /// Wall clock used to timestamp transitions
    pub clock: Arc<dyn Clock>,

    /// Capacity of the event bus channel
    pub event_buffer_size: usize,

    /// Timeout used by `probe()` when none is given
    pub default_probe_timeout: Duration,
}

impl std::fmt::Debug for NetSignalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetSignalConfig")
            .field("debounce_window", &self.debounce_window)
            .field("signal_source", &self.signal_source.name())
            .field(
                "prober",
                &self.prober.as_ref().map(|_| "ReachabilityProber { ... }"),
            )
            .field("clock", &"Clock { ... }")
            .field("event_buffer_size", &self.event_buffer_size)
            .field("default_probe_timeout", &self.default_probe_timeout)
            .finish()
    }
}

impl NetSignalConfig {
    /// Creates a new configuration builder.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_runtime::config::NetSignalConfig;
    ///
    /// let builder = NetSignalConfig::builder();
    /// ```
    pub fn builder() -> NetSignalConfigBuilder {
        NetSignalConfigBuilder::default()
    }

    /// Validates tuning values.
    ///
    /// A zero debounce window is allowed and means transitions are reported on
    /// the next turn of the monitor task.
    pub fn validate(&self) -> Result<()> {
        validate_debounce_window(self.debounce_window)?;

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        if self.default_probe_timeout.is_zero() {
            return Err(Error::Config(
                "Default probe timeout must be greater than 0ms".to_string(),
            ));
        }

        Ok(())
    }

    pub fn has_prober(&self) -> bool {
        self.prober.is_some()
    }
}

fn validate_debounce_window(window: Duration) -> Result<()> {
    if window > MAX_DEBOUNCE_WINDOW {
        return Err(Error::Config(format!(
            "Debounce window of {}ms exceeds maximum of 60 seconds (60,000ms)",
            window.as_millis()
        )));
    }
    Ok(())
}

#[cfg(not(feature = "desktop-shims"))]
fn signal_source_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "ConnectivitySource".to_string(),
        message: "A ConnectivitySource implementation is required to observe the network. \
                 Desktop: enable the 'desktop-shims' feature to use DesktopConnectivitySource. \
                 Mobile: inject an adapter over ConnectivityManager (Android) or \
                 SCNetworkReachability/NWPathMonitor (iOS)."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_signal_source() -> Result<Arc<dyn ConnectivitySource>> {
    use bridge_desktop::DesktopConnectivitySource;

    let source: Arc<dyn ConnectivitySource> = Arc::new(DesktopConnectivitySource::new());
    Ok(source)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_signal_source() -> Result<Arc<dyn ConnectivitySource>> {
    Err(signal_source_missing_error())
}

#[cfg(feature = "desktop-shims")]
fn provide_default_prober() -> Option<Arc<dyn ReachabilityProber>> {
    use bridge_desktop::ReqwestProber;

    match ReqwestProber::new() {
        Ok(prober) => Some(Arc::new(prober)),
        Err(err) => {
            tracing::warn!(error = %err, "Default reachability prober unavailable");
            None
        }
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_prober() -> Option<Arc<dyn ReachabilityProber>> {
    None
}

/// Builder for constructing [`NetSignalConfig`] instances.
#[derive(Default)]
pub struct NetSignalConfigBuilder {
    debounce_window: Option<Duration>,
    signal_source: Option<Arc<dyn ConnectivitySource>>,
    prober: Option<Arc<dyn ReachabilityProber>>,
    clock: Option<Arc<dyn Clock>>,
    event_buffer_size: Option<usize>,
    default_probe_timeout: Option<Duration>,
}

impl NetSignalConfigBuilder {
    /// Sets the debounce window.
    ///
    /// Default: 250ms. Maximum: 60s.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_runtime::config::NetSignalConfig;
    /// use std::time::Duration;
    ///
    /// let builder = NetSignalConfig::builder()
    ///     .debounce_window(Duration::from_millis(500));
    /// ```
    pub fn debounce_window(mut self, window: Duration) -> Self {
        self.debounce_window = Some(window);
        self
    }

    /// Sets the platform signal source (required).
    ///
    /// If not provided, the desktop polling source is used when the
    /// `desktop-shims` feature is enabled.
    pub fn signal_source(mut self, source: Arc<dyn ConnectivitySource>) -> Self {
        self.signal_source = Some(source);
        self
    }

    /// Sets the reachability prober (optional).
    pub fn prober(mut self, prober: Arc<dyn ReachabilityProber>) -> Self {
        self.prober = Some(prober);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Sets the event bus capacity.
    ///
    /// Default: 100
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Sets the timeout `probe()` falls back to.
    ///
    /// Default: 5s
    pub fn default_probe_timeout(mut self, timeout: Duration) -> Self {
        self.default_probe_timeout = Some(timeout);
        self
    }

    /// Builds the final `NetSignalConfig` instance.
    ///
    /// # Returns
    ///
    /// Returns an error if:
    /// - No `ConnectivitySource` was provided and no platform default exists
    /// - Tuning values are out of range
    pub fn build(self) -> Result<NetSignalConfig> {
        let debounce_window = self.debounce_window.unwrap_or(DEFAULT_DEBOUNCE_WINDOW);
        validate_debounce_window(debounce_window)?;

        let signal_source = match self.signal_source {
            Some(source) => source,
            None => provide_default_signal_source()?,
        };

        let prober = self.prober.or_else(provide_default_prober);

        let config = NetSignalConfig {
            debounce_window,
            signal_source,
            prober,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            event_buffer_size: self
                .event_buffer_size
                .unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
            default_probe_timeout: self.default_probe_timeout.unwrap_or(DEFAULT_PROBE_TIMEOUT),
        };

        config.validate()?;

        Ok(config)
    }
}
