//! Reachability probe service.
//!
//! Wraps the host's [`ReachabilityProber`] so that `probe()` never fails:
//! every failure mode (no prober configured, invalid timeout, adapter error)
//! becomes an unreachable [`ProbeResult`] carrying an error message.

use std::sync::Arc;
use std::time::Duration;

use bridge_traits::{ProbeResult, ReachabilityProber};
use core_runtime::events::{CoreEvent, EventBus, ProbeEvent};
use core_runtime::logging::redact_url;
use tracing::{debug, instrument, warn};

pub struct ProbeService {
    prober: Option<Arc<dyn ReachabilityProber>>,
    default_timeout: Duration,
    events: EventBus,
}

impl ProbeService {
    pub fn new(
        prober: Option<Arc<dyn ReachabilityProber>>,
        default_timeout: Duration,
        events: EventBus,
    ) -> Self {
        Self {
            prober,
            default_timeout,
            events,
        }
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    pub fn is_available(&self) -> bool {
        self.prober.is_some()
    }

    /// Probe `url` with `timeout`, or the configured default when `None`.
    #[instrument(skip(self, url), fields(url = %redact_url(url)))]
    pub async fn probe(&self, url: &str, timeout: Option<Duration>) -> ProbeResult {
        let timeout = timeout.unwrap_or(self.default_timeout);
        let result = self.run(url, timeout).await;

        if let Some(error) = &result.error {
            warn!(error = %error, "Reachability probe failed");
        } else {
            debug!(
                reachable = result.reachable,
                response_time_ms = ?result.response_time,
                "Reachability probe completed"
            );
        }

        self.events
            .emit(CoreEvent::Probe(ProbeEvent::Completed {
                url: redact_url(url),
                reachable: result.reachable,
                response_time_ms: result.response_time,
                error: result.error.clone(),
            }))
            .ok();

        result
    }

    async fn run(&self, url: &str, timeout: Duration) -> ProbeResult {
        let Some(prober) = self.prober.as_ref() else {
            return ProbeResult::failed("No reachability prober configured");
        };

        if timeout.is_zero() {
            return ProbeResult::failed("Probe timeout must be greater than 0ms");
        }

        match prober.probe(url, timeout).await {
            Ok(result) => result,
            Err(err) => ProbeResult::failed(err.to_string()),
        }
    }
}

impl std::fmt::Debug for ProbeService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProbeService")
            .field("available", &self.is_available())
            .field("default_timeout", &self.default_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use mockall::mock;
    use mockall::predicate::eq;

    mock! {
        pub Prober {}

        #[async_trait::async_trait]
        impl ReachabilityProber for Prober {
            async fn probe(&self, url: &str, timeout: Duration) -> BridgeResult<ProbeResult>;
        }
    }

    fn service(prober: Option<MockProber>) -> (ProbeService, EventBus) {
        let bus = EventBus::new(8);
        let prober = prober.map(|p| Arc::new(p) as Arc<dyn ReachabilityProber>);
        (
            ProbeService::new(prober, Duration::from_secs(5), bus.clone()),
            bus,
        )
    }

    #[tokio::test]
    async fn test_successful_probe_uses_default_timeout() {
        let mut prober = MockProber::new();
        prober
            .expect_probe()
            .with(eq("https://example.com/"), eq(Duration::from_secs(5)))
            .times(1)
            .returning(|_, _| Ok(ProbeResult::from_status(204, 12.5)));
        let (service, bus) = service(Some(prober));
        let mut events = bus.subscribe();

        let result = service.probe("https://example.com/", None).await;

        assert!(result.reachable);
        assert_eq!(result.response_time, Some(12.5));
        assert_eq!(
            events.recv().await.unwrap(),
            CoreEvent::Probe(ProbeEvent::Completed {
                url: "https://example.com/".to_string(),
                reachable: true,
                response_time_ms: Some(12.5),
                error: None,
            })
        );
    }

    #[tokio::test]
    async fn test_error_status_is_unreachable() {
        let mut prober = MockProber::new();
        prober
            .expect_probe()
            .returning(|_, _| Ok(ProbeResult::from_status(503, 40.0)));
        let (service, _bus) = service(Some(prober));

        let result = service
            .probe("https://example.com/", Some(Duration::from_secs(1)))
            .await;

        assert!(!result.reachable);
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn test_adapter_error_becomes_result() {
        let mut prober = MockProber::new();
        prober
            .expect_probe()
            .returning(|_, _| Err(BridgeError::InvalidInput("Invalid probe URL".to_string())));
        let (service, bus) = service(Some(prober));
        let mut events = bus.subscribe();

        let result = service
            .probe("https://user:pw@example.com/?token=1", None)
            .await;

        assert!(!result.reachable);
        assert!(result.error.unwrap().contains("Invalid probe URL"));
        match events.recv().await.unwrap() {
            CoreEvent::Probe(ProbeEvent::Completed { url, .. }) => {
                assert_eq!(url, "https://example.com/");
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_prober() {
        let (service, _bus) = service(None);

        let result = service.probe("https://example.com/", None).await;

        assert!(!service.is_available());
        assert!(!result.reachable);
        assert!(result.error.is_some());
    }

    #[tokio::test]
    async fn test_zero_timeout_skips_prober() {
        let mut prober = MockProber::new();
        prober.expect_probe().never();
        let (service, _bus) = service(Some(prober));

        let result = service
            .probe("https://example.com/", Some(Duration::ZERO))
            .await;

        assert!(!result.reachable);
        assert!(result.error.unwrap().contains("timeout"));
    }
}
