//! Connectivity Signal Abstraction
//!
//! Defines the canonical reachability state exposed to applications and the
//! raw payloads a host platform pushes into the core.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::sync::Arc;

use crate::error::Result;

/// Canonical network reachability state.
///
/// One value represents the "current truth" at a point in time. Serialized
/// lowercase (`"wifi"`, `"offline"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkState {
    /// No platform signal observed yet, or the signal could not be interpreted
    #[default]
    Unknown,
    /// No usable network path
    Offline,
    /// Connected over WiFi
    Wifi,
    /// Connected over a cellular/mobile data link
    Cellular,
    /// Connected over wired Ethernet
    Ethernet,
    /// Connected over some other transport (VPN, Bluetooth, ...)
    Other,
}

impl NetworkState {
    /// Every variant, in declaration order.
    pub const ALL: [NetworkState; 6] = [
        NetworkState::Unknown,
        NetworkState::Offline,
        NetworkState::Wifi,
        NetworkState::Cellular,
        NetworkState::Ethernet,
        NetworkState::Other,
    ];

    /// Whether this state represents a usable connection.
    ///
    /// `Unknown` is not connected.
    pub fn is_connected(self) -> bool {
        matches!(
            self,
            NetworkState::Wifi | NetworkState::Cellular | NetworkState::Ethernet | NetworkState::Other
        )
    }

    /// Lowercase identifier, identical to the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            NetworkState::Unknown => "unknown",
            NetworkState::Offline => "offline",
            NetworkState::Wifi => "wifi",
            NetworkState::Cellular => "cellular",
            NetworkState::Ethernet => "ethernet",
            NetworkState::Other => "other",
        }
    }

    /// Connection type in the vocabulary JavaScript callers of the bridge
    /// module expect: `wifi`, `cellular`, `ethernet`, `unknown` or `none`.
    pub fn connection_type(self) -> &'static str {
        match self {
            NetworkState::Offline => "none",
            NetworkState::Wifi => "wifi",
            NetworkState::Cellular => "cellular",
            NetworkState::Ethernet => "ethernet",
            NetworkState::Unknown | NetworkState::Other => "unknown",
        }
    }
}

impl fmt::Display for NetworkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Physical or logical transport of a network interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Wifi,
    Cellular,
    Ethernet,
    Other,
}

impl From<Transport> for NetworkState {
    fn from(transport: Transport) -> Self {
        match transport {
            Transport::Wifi => NetworkState::Wifi,
            Transport::Cellular => NetworkState::Cellular,
            Transport::Ethernet => NetworkState::Ethernet,
            Transport::Other => NetworkState::Other,
        }
    }
}

/// Reachability flag bitset as reported by Apple's `SCNetworkReachability`.
///
/// Bit values match `SCNetworkReachabilityFlags`, so hosts can pass the raw
/// OS value through [`ReachabilityFlags::from_bits`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReachabilityFlags(u32);

impl ReachabilityFlags {
    pub const TRANSIENT_CONNECTION: Self = Self(1 << 0);
    pub const REACHABLE: Self = Self(1 << 1);
    pub const CONNECTION_REQUIRED: Self = Self(1 << 2);
    pub const CONNECTION_ON_TRAFFIC: Self = Self(1 << 3);
    pub const INTERVENTION_REQUIRED: Self = Self(1 << 4);
    pub const CONNECTION_ON_DEMAND: Self = Self(1 << 5);
    pub const IS_LOCAL_ADDRESS: Self = Self(1 << 16);
    pub const IS_DIRECT: Self = Self(1 << 17);
    pub const IS_WWAN: Self = Self(1 << 18);

    pub const fn empty() -> Self {
        Self(0)
    }

    /// Wraps a raw OS value. Unknown bits are preserved and ignored.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns `true` if every bit of `other` is set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for ReachabilityFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ReachabilityFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Raw connectivity payload pushed by a platform adapter.
///
/// The core treats these as untrusted: any combination is accepted and
/// interpreted by the normalizer, payloads it cannot make sense of become
/// [`NetworkState::Unknown`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RawSignal {
    /// An interface of the given transport went up or down.
    Interface { transport: Transport, up: bool },
    /// Capability report for the active network (Android style).
    Capabilities {
        has_internet: bool,
        transports: Vec<Transport>,
    },
    /// Reachability flags for the default route (Apple style).
    Flags { bits: ReachabilityFlags },
    /// Any other OS-specific payload.
    Opaque {
        platform: String,
        payload: serde_json::Value,
    },
}

impl RawSignal {
    pub fn flags(bits: ReachabilityFlags) -> Self {
        RawSignal::Flags { bits }
    }

    /// Short label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            RawSignal::Interface { .. } => "interface",
            RawSignal::Capabilities { .. } => "capabilities",
            RawSignal::Flags { .. } => "flags",
            RawSignal::Opaque { .. } => "opaque",
        }
    }
}

/// Callback through which a source pushes raw signals into the core.
///
/// May be called from any thread, any number of times, and never blocks.
pub type SignalCallback = Arc<dyn Fn(RawSignal) + Send + Sync>;

/// Push-based platform connectivity source.
///
/// Wraps the OS connectivity API of a host platform:
///
/// - **Android**: `ConnectivityManager.registerNetworkCallback`
/// - **iOS/macOS**: `SCNetworkReachabilitySetCallback` / `NWPathMonitor`
/// - **Desktop**: polling (see `bridge-desktop`)
///
/// Implementations should push an initial signal describing the current
/// network shortly after `start`, then one signal per OS notification.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::network::{ConnectivitySource, RawSignal};
/// use std::sync::Arc;
///
/// async fn wire(source: &dyn ConnectivitySource) -> bridge_traits::error::Result<()> {
///     source
///         .start(Arc::new(|signal: RawSignal| println!("{}", signal.kind())))
///         .await
/// }
/// ```
#[async_trait::async_trait]
pub trait ConnectivitySource: Send + Sync {
    /// Human-readable adapter name used in logs and events.
    fn name(&self) -> &str;

    /// Begin delivering raw signals to `on_signal`.
    async fn start(&self, on_signal: SignalCallback) -> Result<()>;

    /// Stop delivering signals and release OS resources.
    ///
    /// Calling `stop` on a source that is not running is not an error.
    async fn stop(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connected_states() {
        let connected: Vec<_> = NetworkState::ALL
            .iter()
            .filter(|s| s.is_connected())
            .copied()
            .collect();

        assert_eq!(
            connected,
            vec![
                NetworkState::Wifi,
                NetworkState::Cellular,
                NetworkState::Ethernet,
                NetworkState::Other
            ]
        );
    }

    #[test]
    fn test_connection_type_vocabulary() {
        assert_eq!(NetworkState::Offline.connection_type(), "none");
        assert_eq!(NetworkState::Other.connection_type(), "unknown");
        assert_eq!(NetworkState::Unknown.connection_type(), "unknown");
        assert_eq!(NetworkState::Wifi.connection_type(), "wifi");
    }

    #[test]
    fn test_state_serializes_lowercase() {
        let json = serde_json::to_string(&NetworkState::Cellular).unwrap();
        assert_eq!(json, "\"cellular\"");
        assert_eq!(NetworkState::Ethernet.to_string(), "ethernet");
    }

    #[test]
    fn test_flags_contains() {
        let flags = ReachabilityFlags::REACHABLE | ReachabilityFlags::IS_WWAN;

        assert!(flags.contains(ReachabilityFlags::REACHABLE));
        assert!(flags.contains(ReachabilityFlags::IS_WWAN));
        assert!(!flags.contains(ReachabilityFlags::CONNECTION_REQUIRED));
        assert_eq!(ReachabilityFlags::from_bits(flags.bits()), flags);
        assert!(ReachabilityFlags::empty().is_empty());
    }

    #[test]
    fn test_raw_signal_tagged_json() {
        let signal = RawSignal::Interface {
            transport: Transport::Wifi,
            up: true,
        };
        let json = serde_json::to_value(&signal).unwrap();

        assert_eq!(json["kind"], "interface");
        assert_eq!(json["transport"], "wifi");
        assert_eq!(signal.kind(), "interface");
    }

    #[test]
    fn test_flags_signal_serializes_bits() {
        let signal = RawSignal::flags(ReachabilityFlags::REACHABLE | ReachabilityFlags::IS_WWAN);
        let json = serde_json::to_value(&signal).unwrap();

        assert_eq!(json, serde_json::json!({ "kind": "flags", "bits": 0x2 | 0x40000 }));
        assert_eq!(signal.kind(), "flags");
    }

    #[test]
    fn test_every_signal_kind_survives_json() {
        let signals = vec![
            RawSignal::Interface {
                transport: Transport::Ethernet,
                up: false,
            },
            RawSignal::Capabilities {
                has_internet: true,
                transports: vec![Transport::Wifi, Transport::Cellular],
            },
            RawSignal::flags(ReachabilityFlags::REACHABLE),
            RawSignal::Opaque {
                platform: "android".to_string(),
                payload: serde_json::json!({ "isConnected": true, "type": "wifi" }),
            },
        ];

        for signal in signals {
            let text = serde_json::to_string(&signal).unwrap();
            let parsed: RawSignal = serde_json::from_str(&text).unwrap();
            assert_eq!(parsed, signal, "{text}");
        }
    }
}
