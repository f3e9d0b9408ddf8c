//! # NetSignal Core
//!
//! Network reachability monitor: observes platform connectivity signals and
//! exposes a de-bounced, subscribable [`NetworkState`](bridge_traits::NetworkState).
//!
//! ## Components
//!
//! - **Normalizer** (`normalizer`): maps untrusted platform payloads to a canonical state
//! - **Coalescer** (`coalescer`): debounces bursts into stable transitions
//! - **Subscription Registry** (`registry`): listener storage with snapshot dispatch
//! - **Monitor** (`monitor`): the serialized monitor task and public API
//! - **Probe Service** (`probe`): never-failing HTTP reachability probes

pub mod coalescer;
pub mod error;
pub mod monitor;
pub mod normalizer;
pub mod probe;
pub mod registry;
pub mod state;

pub use coalescer::Coalescer;
pub use error::{NetSignalError, Result};
pub use monitor::{NetSignal, StateStream};
pub use normalizer::{normalize, try_normalize, UnrecognizedSignal};
pub use probe::ProbeService;
pub use registry::{Listener, ListenerHandle, SubscriptionRegistry};
pub use state::{ConnectionChange, MonitorPhase, Transition, CONNECTION_CHANGE_EVENT};
