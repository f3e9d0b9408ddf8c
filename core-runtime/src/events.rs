//! # Event Bus System
//!
//! Broadcasts monitor, connectivity and probe events using
//! `tokio::sync::broadcast`.
//!
//! ## Overview
//!
//! Callback listeners registered through `NetSignal::subscribe` are the primary
//! delivery path for reachability changes. The event bus is the secondary,
//! observational path: every stabilized transition, lifecycle change and probe
//! outcome is also published here so that loggers, diagnostics panels and
//! async consumers can follow along without registering callbacks.
//!
//! ```text
//!                  ┌──────────────┐   callbacks    ┌───────────┐
//! platform ──────> │ monitor task ├──────────────> │ listeners │
//!                  └──────┬───────┘                └───────────┘
//!                         │ emit
//!                         v
//!                  ┌──────────────┐   subscribe    ┌───────────┐
//!                  │   EventBus   ├──────────────> │ observers │
//!                  └──────────────┘                └───────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{ConnectivityEvent, CoreEvent, EventBus};
//! use bridge_traits::NetworkState;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::new(16);
//! let mut rx = bus.subscribe();
//!
//! bus.emit(CoreEvent::Connectivity(ConnectivityEvent::Changed {
//!     previous: NetworkState::Unknown,
//!     current: NetworkState::Wifi,
//!     timestamp_ms: 0,
//! }))
//! .ok();
//!
//! assert!(matches!(rx.recv().await, Ok(CoreEvent::Connectivity(_))));
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber missed `n` events; non-fatal.
//! - **`RecvError::Closed`**: the monitor was dropped; treat as shutdown.
//!
//! Emitting with no subscribers returns `Err`; publishers ignore it.

use bridge_traits::NetworkState;
use core_async::sync::broadcast;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use core_async::sync::broadcast::error::{RecvError, SendError};
pub use core_async::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
///
/// Subscribers that fall further behind receive `RecvError::Lagged`.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event published on the bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Stabilized reachability changes
    Connectivity(ConnectivityEvent),
    /// Monitor lifecycle
    Monitor(MonitorEvent),
    /// Reachability probe outcomes
    Probe(ProbeEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Connectivity(e) => e.description(),
            CoreEvent::Monitor(e) => e.description(),
            CoreEvent::Probe(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Monitor(MonitorEvent::SourceFailed { .. }) => EventSeverity::Error,
            CoreEvent::Probe(ProbeEvent::Completed {
                reachable: false, ..
            }) => EventSeverity::Warning,
            CoreEvent::Connectivity(ConnectivityEvent::Changed {
                current: NetworkState::Offline,
                ..
            }) => EventSeverity::Warning,
            CoreEvent::Connectivity(_) | CoreEvent::Monitor(_) => EventSeverity::Info,
            CoreEvent::Probe(_) => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

/// Reachability transitions after debouncing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum ConnectivityEvent {
    /// The stable network state changed.
    Changed {
        previous: NetworkState,
        current: NetworkState,
        /// Wall-clock time of the transition (Unix epoch milliseconds).
        timestamp_ms: i64,
    },
}

impl ConnectivityEvent {
    fn description(&self) -> &str {
        match self {
            ConnectivityEvent::Changed { .. } => "Network state changed",
        }
    }
}

/// Monitor lifecycle events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum MonitorEvent {
    /// The platform source was started.
    Started {
        /// Adapter name reported by the source.
        source: String,
        /// Debounce window in milliseconds.
        debounce_ms: u64,
    },
    /// The first platform signal arrived.
    FirstSignal { kind: String },
    /// The platform source reported an error while stopping.
    SourceFailed { source: String, message: String },
    /// The monitor was shut down.
    Stopped,
}

impl MonitorEvent {
    fn description(&self) -> &str {
        match self {
            MonitorEvent::Started { .. } => "Monitor started",
            MonitorEvent::FirstSignal { .. } => "First platform signal received",
            MonitorEvent::SourceFailed { .. } => "Platform source failed",
            MonitorEvent::Stopped => "Monitor stopped",
        }
    }
}

/// Reachability probe events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum ProbeEvent {
    /// A probe finished (successfully or not).
    Completed {
        /// Probe URL with credentials and query stripped.
        url: String,
        reachable: bool,
        response_time_ms: Option<f64>,
        error: Option<String>,
    },
}

impl ProbeEvent {
    fn description(&self) -> &str {
        match self {
            ProbeEvent::Completed {
                reachable: true, ..
            } => "Endpoint reachable",
            ProbeEvent::Completed { .. } => "Endpoint unreachable",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Cloning is cheap; all clones publish to the same channel. Each
/// `subscribe()` creates an independent receiver that sees only events
/// emitted after it was created.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus buffering up to `capacity` events per subscriber.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero; `NetSignalConfig` validation rejects that.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an error
    /// if there are none.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A `broadcast::Receiver` with an optional filter.
///
/// ```rust
/// use core_runtime::events::{CoreEvent, EventBus, EventStream};
///
/// let bus = EventBus::new(16);
/// let connectivity_only = EventStream::new(bus.subscribe())
///     .filter(|event| matches!(event, CoreEvent::Connectivity(_)));
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` will be returned.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter.
    ///
    /// # Errors
    ///
    /// `RecvError::Lagged(n)` if the subscriber fell behind by `n` events,
    /// `RecvError::Closed` once every sender is gone.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive a matching event without waiting.
    ///
    /// Returns `None` if no matching event is currently buffered.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.accepts(&event) => return Some(Ok(event)),
                Ok(_) => continue,
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}
