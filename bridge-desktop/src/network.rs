//! Desktop Connectivity Source

use async_trait::async_trait;
use bridge_traits::{
    error::Result,
    network::{ConnectivitySource, RawSignal, SignalCallback, Transport},
};
use core_async::sync::{CancellationToken, Mutex};
use std::time::Duration;
use tracing::{debug, info};

const DEFAULT_CHECK_ADDR: &str = "8.8.8.8:53";

/// Desktop connectivity source
///
/// Desktop OSes have no single portable change-notification API, so this
/// source polls: every `poll_interval` it attempts a TCP connection to a
/// well-known endpoint and reports the result as a capability signal.
/// A signal is pushed on the first check and afterwards only when the
/// observed reachability or transport set changes.
///
/// On Linux the transport is derived from `/sys/class/net`; elsewhere the
/// transport list is empty and the core reports `other` while connected.
pub struct DesktopConnectivitySource {
    check_addr: String,
    poll_interval: Duration,
    connect_timeout: Duration,
    running: Mutex<Option<CancellationToken>>,
}

impl DesktopConnectivitySource {
    pub fn new() -> Self {
        Self::with_settings(
            DEFAULT_CHECK_ADDR,
            Duration::from_secs(5),
            Duration::from_secs(3),
        )
    }

    /// Create a source polling `check_addr` (`host:port`) at `poll_interval`.
    pub fn with_settings(
        check_addr: impl Into<String>,
        poll_interval: Duration,
        connect_timeout: Duration,
    ) -> Self {
        Self {
            check_addr: check_addr.into(),
            poll_interval,
            connect_timeout,
            running: Mutex::new(None),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub async fn is_running(&self) -> bool {
        self.running.lock().await.is_some()
    }

    async fn check_connectivity(addr: &str, timeout: Duration) -> bool {
        matches!(
            tokio::time::timeout(timeout, tokio::net::TcpStream::connect(addr)).await,
            Ok(Ok(_))
        )
    }

    async fn sample(addr: &str, timeout: Duration) -> RawSignal {
        let has_internet = Self::check_connectivity(addr, timeout).await;
        let transports = if has_internet {
            detect_transports().await
        } else {
            Vec::new()
        };

        RawSignal::Capabilities {
            has_internet,
            transports,
        }
    }

    async fn poll_loop(
        addr: String,
        interval: Duration,
        timeout: Duration,
        on_signal: SignalCallback,
        token: CancellationToken,
    ) {
        let mut last: Option<RawSignal> = None;

        loop {
            let signal = tokio::select! {
                _ = token.cancelled() => break,
                signal = Self::sample(&addr, timeout) => signal,
            };

            if last.as_ref() != Some(&signal) {
                debug!(signal = ?signal, "Desktop connectivity sample changed");
                on_signal(signal.clone());
                last = Some(signal);
            }

            tokio::select! {
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }
        }

        debug!("Desktop connectivity polling stopped");
    }
}

impl Default for DesktopConnectivitySource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConnectivitySource for DesktopConnectivitySource {
    fn name(&self) -> &str {
        "desktop-poll"
    }

    async fn start(&self, on_signal: SignalCallback) -> Result<()> {
        let mut running = self.running.lock().await;
        if let Some(previous) = running.take() {
            previous.cancel();
        }

        let token = CancellationToken::new();
        *running = Some(token.clone());

        info!(
            check_addr = %self.check_addr,
            interval_ms = self.poll_interval.as_millis() as u64,
            "Starting desktop connectivity polling"
        );

        core_async::task::spawn(Self::poll_loop(
            self.check_addr.clone(),
            self.poll_interval,
            self.connect_timeout,
            on_signal,
            token,
        ));

        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        if let Some(token) = self.running.lock().await.take() {
            token.cancel();
        }
        Ok(())
    }
}

#[cfg(target_os = "linux")]
async fn detect_transports() -> Vec<Transport> {
    let mut transports = Vec::new();
    let Ok(mut entries) = tokio::fs::read_dir("/sys/class/net").await else {
        return transports;
    };

    while let Ok(Some(entry)) = entries.next_entry().await {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name == "lo" {
            continue;
        }

        let path = entry.path();
        let operstate = tokio::fs::read_to_string(path.join("operstate"))
            .await
            .unwrap_or_default();
        if operstate.trim() != "up" {
            continue;
        }

        let transport = if tokio::fs::metadata(path.join("wireless")).await.is_ok() {
            Transport::Wifi
        } else if name.starts_with("wwan") || name.starts_with("rmnet") {
            Transport::Cellular
        } else if name.starts_with("en") || name.starts_with("eth") {
            Transport::Ethernet
        } else {
            Transport::Other
        };

        if !transports.contains(&transport) {
            transports.push(transport);
        }
    }

    transports
}

#[cfg(not(target_os = "linux"))]
async fn detect_transports() -> Vec<Transport> {
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex as StdMutex};

    #[tokio::test]
    async fn test_unreachable_address_reports_offline() {
        let source = DesktopConnectivitySource::with_settings(
            "127.0.0.1:1",
            Duration::from_secs(60),
            Duration::from_millis(200),
        );
        let received = Arc::new(StdMutex::new(Vec::new()));
        let sink = received.clone();

        source
            .start(Arc::new(move |signal| sink.lock().unwrap().push(signal)))
            .await
            .unwrap();
        assert!(source.is_running().await);

        for _ in 0..50 {
            if !received.lock().unwrap().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        source.stop().await.unwrap();

        let received = received.lock().unwrap();
        assert_eq!(
            received.first(),
            Some(&RawSignal::Capabilities {
                has_internet: false,
                transports: vec![],
            })
        );
    }

    #[tokio::test]
    async fn test_stop_without_start_is_noop() {
        let source = DesktopConnectivitySource::new();
        source.stop().await.unwrap();
        assert!(!source.is_running().await);
        assert_eq!(source.name(), "desktop-poll");
    }
}
