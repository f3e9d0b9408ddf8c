//! Reachability Probe Abstraction
//!
//! A probe answers "can I actually reach this endpoint right now?", which the
//! OS connectivity state alone cannot (captive portals, dead upstreams).

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::Result;

/// Outcome of a single reachability probe.
///
/// Serialized camelCase: `{ "reachable": true, "responseTime": 42.0 }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeResult {
    /// Whether the endpoint answered with a non-error status
    pub reachable: bool,
    /// Round-trip time in milliseconds, `None` when no response arrived
    pub response_time: Option<f64>,
    /// Error description when the request itself failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProbeResult {
    /// Builds a result from a received HTTP status.
    pub fn from_status(status: u16, response_time_ms: f64) -> Self {
        Self {
            reachable: is_reachable_status(status),
            response_time: Some(response_time_ms),
            error: None,
        }
    }

    /// Builds a result for a request that never produced a response.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            reachable: false,
            response_time: None,
            error: Some(error.into()),
        }
    }
}

/// HTTP statuses below 400 count as reachable (redirects included).
pub fn is_reachable_status(status: u16) -> bool {
    status < 400
}

/// One-shot reachability prober.
///
/// Implementations issue an HTTP `HEAD` request against `url`, applying
/// `timeout` to both connecting and reading. Transport failures should be
/// reported as [`ProbeResult::failed`]; an `Err` is reserved for the adapter
/// itself being unusable.
#[async_trait::async_trait]
pub trait ReachabilityProber: Send + Sync {
    async fn probe(&self, url: &str, timeout: Duration) -> Result<ProbeResult>;
}
