//! Reachability probe using Reqwest

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    probe::{ProbeResult, ReachabilityProber},
};
use core_async::time::as_millis_f64;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::debug;

/// Reqwest-based reachability prober
///
/// Issues a `HEAD` request and reports the status and round-trip time.
/// Redirects are not followed so a captive portal answering `302` still
/// counts as a response, matching how mobile platforms report it.
pub struct ReqwestProber {
    client: Client,
}

impl ReqwestProber {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(concat!("netsignal/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                BridgeError::OperationFailed(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ReachabilityProber for ReqwestProber {
    async fn probe(&self, url: &str, timeout: Duration) -> Result<ProbeResult> {
        let url = reqwest::Url::parse(url)
            .map_err(|e| BridgeError::InvalidInput(format!("Invalid probe URL: {}", e)))?;

        let start = Instant::now();
        let outcome = self.client.head(url).timeout(timeout).send().await;
        let elapsed_ms = as_millis_f64(start.elapsed());

        let result = match outcome {
            Ok(response) => ProbeResult::from_status(response.status().as_u16(), elapsed_ms),
            Err(e) => ProbeResult::failed(e.to_string()),
        };

        debug!(
            reachable = result.reachable,
            elapsed_ms = elapsed_ms,
            "Probe finished"
        );
        Ok(result)
    }
}
