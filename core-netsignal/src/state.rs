//! Transition and lifecycle types.

use bridge_traits::NetworkState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Event name the embedding layer uses for [`ConnectionChange`] payloads.
pub const CONNECTION_CHANGE_EVENT: &str = "connectionChange";

/// A stabilized change of the network state.
///
/// A transition always describes an actual change: [`Transition::new`]
/// refuses to build one whose `previous` and `current` states are equal, and
/// the fields are private so no other construction path exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    previous: NetworkState,
    current: NetworkState,
    timestamp: DateTime<Utc>,
}

impl Transition {
    /// Returns `None` when `previous == current`.
    pub fn new(
        previous: NetworkState,
        current: NetworkState,
        timestamp: DateTime<Utc>,
    ) -> Option<Self> {
        (previous != current).then_some(Self {
            previous,
            current,
            timestamp,
        })
    }

    pub fn previous(&self) -> NetworkState {
        self.previous
    }

    pub fn current(&self) -> NetworkState {
        self.current
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.previous, self.current)
    }
}

/// Payload of the `connectionChange` event delivered to application code.
///
/// Serialized as `{ "isConnected": true, "type": "wifi" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionChange {
    pub is_connected: bool,
    #[serde(rename = "type")]
    pub connection_type: String,
}

impl From<NetworkState> for ConnectionChange {
    fn from(state: NetworkState) -> Self {
        Self {
            is_connected: state.is_connected(),
            connection_type: state.connection_type().to_string(),
        }
    }
}

/// Lifecycle of a monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorPhase {
    /// Started, no platform signal observed yet
    Initializing,
    /// At least one platform signal has been observed
    Monitoring,
    /// `shutdown()` was called
    TornDown,
}

impl MonitorPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            MonitorPhase::Initializing => "initializing",
            MonitorPhase::Monitoring => "monitoring",
            MonitorPhase::TornDown => "torn_down",
        }
    }
}

impl fmt::Display for MonitorPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
