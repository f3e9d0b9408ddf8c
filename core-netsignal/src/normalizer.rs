//! Signal Normalizer
//!
//! Maps untrusted platform payloads onto [`NetworkState`]. The mapping is a
//! pure function of a single signal; payloads it cannot interpret become
//! [`NetworkState::Unknown`].

use bridge_traits::{NetworkState, RawSignal, ReachabilityFlags, Transport};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Raised internally when a payload carries no usable connectivity data.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Unrecognized {platform} signal: {reason}")]
pub struct UnrecognizedSignal {
    pub platform: String,
    pub reason: String,
}

/// Normalize a raw signal, recovering unrecognized payloads to `Unknown`.
pub fn normalize(signal: &RawSignal) -> NetworkState {
    match try_normalize(signal) {
        Ok(state) => state,
        Err(err) => {
            debug!(error = %err, "Treating unrecognized signal as unknown");
            NetworkState::Unknown
        }
    }
}

/// Normalize a raw signal, reporting payloads that cannot be interpreted.
pub fn try_normalize(signal: &RawSignal) -> Result<NetworkState, UnrecognizedSignal> {
    match signal {
        RawSignal::Interface { transport, up } => Ok(if *up {
            NetworkState::from(*transport)
        } else {
            NetworkState::Offline
        }),
        RawSignal::Capabilities {
            has_internet,
            transports,
        } => Ok(from_capabilities(*has_internet, transports)),
        RawSignal::Flags { bits } => Ok(from_flags(*bits)),
        RawSignal::Opaque { platform, payload } => from_opaque(platform, payload),
    }
}

fn from_capabilities(has_internet: bool, transports: &[Transport]) -> NetworkState {
    if !has_internet {
        return NetworkState::Offline;
    }

    [Transport::Wifi, Transport::Cellular, Transport::Ethernet]
        .into_iter()
        .find(|preferred| transports.contains(preferred))
        .map(NetworkState::from)
        .unwrap_or(NetworkState::Other)
}

fn from_flags(flags: ReachabilityFlags) -> NetworkState {
    if !flags.contains(ReachabilityFlags::REACHABLE) {
        return NetworkState::Offline;
    }

    if flags.contains(ReachabilityFlags::CONNECTION_REQUIRED) {
        // A connection that comes up on demand without user interaction is
        // as good as an established one.
        let automatic = flags.contains(ReachabilityFlags::CONNECTION_ON_DEMAND)
            && !flags.contains(ReachabilityFlags::INTERVENTION_REQUIRED);
        if !automatic {
            return NetworkState::Offline;
        }
    }

    if flags.contains(ReachabilityFlags::IS_WWAN) {
        NetworkState::Cellular
    } else {
        NetworkState::Wifi
    }
}

fn from_opaque(platform: &str, payload: &Value) -> Result<NetworkState, UnrecognizedSignal> {
    let unrecognized = |reason: &str| UnrecognizedSignal {
        platform: platform.to_string(),
        reason: reason.to_string(),
    };

    let object = payload
        .as_object()
        .ok_or_else(|| unrecognized("payload is not an object"))?;

    let connected = object.get("isConnected").and_then(Value::as_bool);
    let kind = object
        .get("type")
        .or_else(|| object.get("connectionType"))
        .and_then(Value::as_str);

    if connected == Some(false) {
        return Ok(NetworkState::Offline);
    }

    let kind = kind.ok_or_else(|| unrecognized("missing connection type"))?;
    Ok(match kind.to_ascii_lowercase().as_str() {
        "none" | "offline" => NetworkState::Offline,
        "wifi" => NetworkState::Wifi,
        "cellular" => NetworkState::Cellular,
        "ethernet" => NetworkState::Ethernet,
        "unknown" => NetworkState::Unknown,
        _ => NetworkState::Other,
    })
}
