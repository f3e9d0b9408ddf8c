//! # NetSignal Monitor
//!
//! Public entry point tying the pipeline together:
//!
//! ```text
//! ConnectivitySource ──callback──> command queue ──> monitor task
//!                                                    │ normalize
//!                                                    │ coalesce (debounce timer)
//!                                                    │ dispatch
//!                                                    v
//!                                      SubscriptionRegistry ──> listeners
//!                                                    └────────> EventBus
//! ```
//!
//! All normalization, coalescing and dispatch happens on one spawned task,
//! fed through an unbounded channel, so platform callbacks from any thread are
//! serialized. `current_state()` reads the registry cache and never waits on
//! the task or the platform.
//!
//! The source callback only holds a weak sender: once every [`NetSignal`]
//! handle is dropped the task stops the source and exits.
//!
//! ## Usage
//!
//! ```ignore
//! use core_netsignal::NetSignal;
//! use core_runtime::config::NetSignalConfig;
//!
//! let monitor = NetSignal::start(NetSignalConfig::builder().build()?).await?;
//!
//! let handle = monitor.subscribe(|state| println!("network: {}", state))?;
//! // ...
//! monitor.unsubscribe(handle);
//! monitor.shutdown().await;
//! ```

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use bridge_traits::{Clock, ConnectivitySource, NetworkState, ProbeResult, RawSignal};
use core_async::sync::{mpsc, oneshot};
use core_async::time::{self, Instant};
use core_runtime::config::NetSignalConfig;
use core_runtime::events::{ConnectivityEvent, CoreEvent, EventBus, MonitorEvent, Receiver};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::coalescer::Coalescer;
use crate::error::Result;
use crate::normalizer::normalize;
use crate::probe::ProbeService;
use crate::registry::{ListenerHandle, SubscriptionRegistry};
use crate::state::{ConnectionChange, MonitorPhase, Transition};

enum Command {
    Signal(RawSignal),
    Shutdown(oneshot::Sender<()>),
}

/// State shared between the handles and the monitor task.
struct Shared {
    registry: SubscriptionRegistry,
    phase: Mutex<MonitorPhase>,
    events: EventBus,
}

/// Network reachability monitor.
///
/// Cheap to clone; all clones refer to the same monitor.
#[derive(Clone)]
pub struct NetSignal {
    shared: Arc<Shared>,
    commands: mpsc::UnboundedSender<Command>,
    source: Arc<dyn ConnectivitySource>,
    probes: Arc<ProbeService>,
    debounce_window: Duration,
}

impl NetSignal {
    /// Spawn the monitor task and start the platform source.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// - `NetSignalError::Runtime` if the configuration is invalid
    /// - `NetSignalError::Bridge` if the source fails to start, so the host
    ///   can fall back to another adapter
    pub async fn start(config: NetSignalConfig) -> Result<Self> {
        config.validate()?;

        let events = EventBus::new(config.event_buffer_size);
        let shared = Arc::new(Shared {
            registry: SubscriptionRegistry::new(),
            phase: Mutex::new(MonitorPhase::Initializing),
            events: events.clone(),
        });

        let (commands, receiver) = mpsc::unbounded_channel();
        let source = Arc::clone(&config.signal_source);

        core_async::task::spawn(run_monitor(
            receiver,
            Arc::clone(&shared),
            Coalescer::new(config.debounce_window),
            Arc::clone(&config.clock),
            Arc::clone(&source),
        ));

        let weak = commands.downgrade();
        let on_signal = Arc::new(move |signal: RawSignal| {
            if let Some(commands) = weak.upgrade() {
                commands.send(Command::Signal(signal)).ok();
            }
        });

        if let Err(err) = source.start(on_signal).await {
            warn!(source = source.name(), error = %err, "Platform source failed to start");
            *shared.phase.lock() = MonitorPhase::TornDown;
            shared.registry.close();
            // The source never started, so the task must exit without `stop`.
            let (ack, done) = oneshot::channel();
            if commands.send(Command::Shutdown(ack)).is_ok() {
                done.await.ok();
            }
            return Err(err.into());
        }

        info!(
            source = source.name(),
            debounce_ms = config.debounce_window.as_millis() as u64,
            "NetSignal monitor started"
        );
        events
            .emit(CoreEvent::Monitor(MonitorEvent::Started {
                source: source.name().to_string(),
                debounce_ms: config.debounce_window.as_millis() as u64,
            }))
            .ok();

        Ok(Self {
            shared,
            commands,
            source,
            probes: Arc::new(ProbeService::new(
                config.prober.clone(),
                config.default_probe_timeout,
                events,
            )),
            debounce_window: config.debounce_window,
        })
    }

    /// Latest stable state. `Unknown` before the first transition and after
    /// shutdown.
    pub fn current_state(&self) -> NetworkState {
        self.shared.registry.current()
    }

    pub fn phase(&self) -> MonitorPhase {
        *self.shared.phase.lock()
    }

    pub fn is_connected(&self) -> bool {
        self.current_state().is_connected()
    }

    /// Connection type as reported to application code: `wifi`, `cellular`,
    /// `ethernet`, `unknown` or `none`.
    pub fn connection_type(&self) -> &'static str {
        self.current_state().connection_type()
    }

    /// Current state as a `connectionChange` payload.
    pub fn connection_change(&self) -> ConnectionChange {
        ConnectionChange::from(self.current_state())
    }

    pub fn debounce_window(&self) -> Duration {
        self.debounce_window
    }

    /// Number of registered listeners, stream subscriptions included.
    pub fn listener_count(&self) -> usize {
        self.shared.registry.len()
    }

    /// Register a listener.
    ///
    /// `callback` is invoked with the current state before this returns, then
    /// once per stabilized transition from the monitor task.
    ///
    /// # Errors
    ///
    /// `NetSignalError::ShutDown` after [`shutdown`](Self::shutdown).
    pub fn subscribe<F>(&self, callback: F) -> Result<ListenerHandle>
    where
        F: Fn(NetworkState) + Send + Sync + 'static,
    {
        self.shared.registry.subscribe(Arc::new(callback))
    }

    /// Remove a listener. Unknown or already-removed handles are ignored and
    /// reported as `false`.
    pub fn unsubscribe(&self, handle: ListenerHandle) -> bool {
        self.shared.registry.unsubscribe(handle)
    }

    /// Subscribe through a channel instead of a callback.
    ///
    /// The first item is the current state. The stream ends after shutdown
    /// and unsubscribes when dropped.
    pub fn subscribe_stream(&self) -> Result<StateStream> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = self.subscribe(move |state| {
            sender.send(state).ok();
        })?;

        Ok(StateStream {
            receiver,
            handle,
            shared: Arc::clone(&self.shared),
        })
    }

    /// Receiver for monitor, connectivity and probe events.
    pub fn events(&self) -> Receiver<CoreEvent> {
        self.shared.events.subscribe()
    }

    /// Check whether `url` answers an HTTP `HEAD` request within `timeout`.
    ///
    /// Never fails: problems are reported through `ProbeResult::error`.
    pub async fn probe(&self, url: &str, timeout: Duration) -> ProbeResult {
        self.probes.probe(url, Some(timeout)).await
    }

    /// Like [`probe`](Self::probe) with the configured default timeout.
    pub async fn probe_default(&self, url: &str) -> ProbeResult {
        self.probes.probe(url, None).await
    }

    /// Stop the platform source, drop every listener and end the monitor task.
    ///
    /// Idempotent. A source that fails to stop is logged and otherwise
    /// ignored.
    pub async fn shutdown(&self) {
        {
            let mut phase = self.shared.phase.lock();
            if *phase == MonitorPhase::TornDown {
                return;
            }
            *phase = MonitorPhase::TornDown;
        }

        if let Err(err) = self.source.stop().await {
            warn!(source = self.source.name(), error = %err, "Platform source failed to stop");
            self.shared
                .events
                .emit(CoreEvent::Monitor(MonitorEvent::SourceFailed {
                    source: self.source.name().to_string(),
                    message: err.to_string(),
                }))
                .ok();
        }

        self.shared.registry.close();

        let (ack, done) = oneshot::channel();
        if self.commands.send(Command::Shutdown(ack)).is_ok() {
            done.await.ok();
        }

        self.shared
            .events
            .emit(CoreEvent::Monitor(MonitorEvent::Stopped))
            .ok();
        info!(source = self.source.name(), "NetSignal monitor shut down");
    }
}

impl std::fmt::Debug for NetSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetSignal")
            .field("source", &self.source.name())
            .field("phase", &self.phase())
            .field("current_state", &self.current_state())
            .field("debounce_window", &self.debounce_window)
            .field("listeners", &self.listener_count())
            .finish()
    }
}

async fn run_monitor(
    mut commands: mpsc::UnboundedReceiver<Command>,
    shared: Arc<Shared>,
    mut coalescer: Coalescer,
    clock: Arc<dyn Clock>,
    source: Arc<dyn ConnectivitySource>,
) {
    loop {
        let command = match coalescer.deadline() {
            Some(deadline) => match time::timeout_at(deadline, commands.recv()).await {
                Ok(command) => command,
                Err(_) => {
                    settle(&mut coalescer, &shared, clock.as_ref());
                    continue;
                }
            },
            None => commands.recv().await,
        };

        match command {
            Some(Command::Signal(signal)) => {
                handle_signal(signal, &mut coalescer, &shared);
                settle(&mut coalescer, &shared, clock.as_ref());
            }
            Some(Command::Shutdown(ack)) => {
                ack.send(()).ok();
                debug!("Monitor task stopped");
                return;
            }
            None => {
                // Every handle was dropped without an explicit shutdown.
                debug!("All NetSignal handles dropped, stopping platform source");
                *shared.phase.lock() = MonitorPhase::TornDown;
                shared.registry.close();
                if let Err(err) = source.stop().await {
                    warn!(source = source.name(), error = %err, "Platform source failed to stop");
                }
                return;
            }
        }
    }
}

fn handle_signal(signal: RawSignal, coalescer: &mut Coalescer, shared: &Shared) {
    {
        let mut phase = shared.phase.lock();
        match *phase {
            MonitorPhase::TornDown => return,
            MonitorPhase::Initializing => {
                *phase = MonitorPhase::Monitoring;
                debug!(kind = signal.kind(), "First platform signal received");
                shared
                    .events
                    .emit(CoreEvent::Monitor(MonitorEvent::FirstSignal {
                        kind: signal.kind().to_string(),
                    }))
                    .ok();
            }
            MonitorPhase::Monitoring => {}
        }
    }

    let state = normalize(&signal);
    let restarted = coalescer.observe(state, Instant::now());
    debug!(kind = signal.kind(), %state, restarted, "Platform signal normalized");
}

fn settle(coalescer: &mut Coalescer, shared: &Shared, clock: &dyn Clock) {
    let Some(transition) = coalescer.poll(Instant::now(), clock) else {
        return;
    };
    publish(&transition, shared);
}

fn publish(transition: &Transition, shared: &Shared) {
    let delivered = shared.registry.dispatch(transition);
    info!(
        previous = %transition.previous(),
        current = %transition.current(),
        listeners = delivered,
        "Network state changed"
    );

    shared
        .events
        .emit(CoreEvent::Connectivity(ConnectivityEvent::Changed {
            previous: transition.previous(),
            current: transition.current(),
            timestamp_ms: transition.timestamp().timestamp_millis(),
        }))
        .ok();
}

/// Channel-backed subscription returned by [`NetSignal::subscribe_stream`].
pub struct StateStream {
    receiver: mpsc::UnboundedReceiver<NetworkState>,
    handle: ListenerHandle,
    shared: Arc<Shared>,
}

impl StateStream {
    /// Next state, or `None` once the monitor has shut down.
    pub async fn next(&mut self) -> Option<NetworkState> {
        self.receiver.recv().await
    }

    /// Buffered state, if any, without waiting.
    pub fn try_next(&mut self) -> Option<NetworkState> {
        self.receiver.try_recv().ok()
    }

    pub fn handle(&self) -> ListenerHandle {
        self.handle
    }
}

impl futures::Stream for StateStream {
    type Item = NetworkState;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl Drop for StateStream {
    fn drop(&mut self) {
        self.shared.registry.unsubscribe(self.handle);
    }
}

impl std::fmt::Debug for StateStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStream")
            .field("handle", &self.handle)
            .finish()
    }
}
