//! Subscription Registry
//!
//! Tracks listeners and the cached [`NetworkState`].
//!
//! Listeners live in a [`SlotMap`], so handles are unique and never reused
//! for a different listener. The cached state and the listener map share one
//! lock: a `subscribe` racing a dispatch either observes the new state in its
//! initial callback or is part of the dispatch snapshot, never neither.
//!
//! Deliveries are serialized by a separate reentrant guard held across the
//! initial callback of `subscribe` and the whole loop of `dispatch`, so a new
//! listener always sees its initial state before any later one. Callbacks run
//! with the state lock released and may call back into the registry from the
//! delivering thread.

use std::sync::Arc;

use bridge_traits::NetworkState;
use parking_lot::{Mutex, ReentrantMutex};
use slotmap::{new_key_type, SlotMap};
use tracing::trace;

use crate::error::{NetSignalError, Result};
use crate::state::Transition;

new_key_type! {
    /// Opaque identifier of a registered listener.
    ///
    /// Returned by `subscribe`, consumed by `unsubscribe`.
    pub struct ListenerHandle;
}

/// Listener callback.
pub type Listener = Arc<dyn Fn(NetworkState) + Send + Sync>;

struct Inner {
    listeners: SlotMap<ListenerHandle, Listener>,
    current: NetworkState,
    closed: bool,
}

pub struct SubscriptionRegistry {
    inner: Mutex<Inner>,
    delivery: ReentrantMutex<()>,
}

impl Default for SubscriptionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                listeners: SlotMap::with_key(),
                current: NetworkState::Unknown,
                closed: false,
            }),
            delivery: ReentrantMutex::new(()),
        }
    }

    /// Register `callback` and invoke it with the cached state before
    /// returning.
    ///
    /// Fails with [`NetSignalError::ShutDown`] once the registry is closed.
    pub fn subscribe(&self, callback: Listener) -> Result<ListenerHandle> {
        let _delivering = self.delivery.lock();
        let (handle, current) = {
            let mut inner = self.inner.lock();
            if inner.closed {
                return Err(NetSignalError::ShutDown);
            }
            let handle = inner.listeners.insert(Arc::clone(&callback));
            (handle, inner.current)
        };

        trace!(?handle, %current, "Listener subscribed");
        callback(current);
        Ok(handle)
    }

    /// Remove a listener. Returns `false` if the handle was not registered.
    pub fn unsubscribe(&self, handle: ListenerHandle) -> bool {
        let removed = self.inner.lock().listeners.remove(handle).is_some();
        trace!(?handle, removed, "Listener unsubscribed");
        removed
    }

    /// Cache `transition.current()` and deliver it to every listener that was
    /// registered when dispatch started.
    ///
    /// A listener removed before its turn is skipped. Listeners added during
    /// dispatch are not called. Returns the number of listeners invoked.
    pub fn dispatch(&self, transition: &Transition) -> usize {
        let state = transition.current();
        let _delivering = self.delivery.lock();
        let snapshot: Vec<(ListenerHandle, Listener)> = {
            let mut inner = self.inner.lock();
            if inner.closed {
                return 0;
            }
            inner.current = state;
            inner
                .listeners
                .iter()
                .map(|(handle, listener)| (handle, Arc::clone(listener)))
                .collect()
        };

        let mut delivered = 0;
        for (handle, listener) in snapshot {
            if !self.inner.lock().listeners.contains_key(handle) {
                continue;
            }
            listener(state);
            delivered += 1;
        }
        delivered
    }

    /// Cached state. `Unknown` until the first dispatch and after close.
    pub fn current(&self) -> NetworkState {
        self.inner.lock().current
    }

    /// Drop every listener, reset the cache and reject further subscriptions.
    pub fn close(&self) {
        let mut inner = self.inner.lock();
        inner.listeners.clear();
        inner.current = NetworkState::Unknown;
        inner.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    pub fn len(&self) -> usize {
        self.inner.lock().listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for SubscriptionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("SubscriptionRegistry")
            .field("listeners", &inner.listeners.len())
            .field("current", &inner.current)
            .field("closed", &inner.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::HashSet;
    use std::sync::{Barrier, Mutex as StdMutex};
    use std::thread;
    use std::time::Duration;

    fn transition(previous: NetworkState, current: NetworkState) -> Transition {
        Transition::new(previous, current, Utc::now()).unwrap()
    }

    fn recorder() -> (Listener, Arc<StdMutex<Vec<NetworkState>>>) {
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let listener: Listener = Arc::new(move |state| sink.lock().unwrap().push(state));
        (listener, seen)
    }

    #[test]
    fn test_subscribe_delivers_current_state() {
        let registry = SubscriptionRegistry::new();
        let (listener, seen) = recorder();

        registry.subscribe(listener).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![NetworkState::Unknown]);

        registry.dispatch(&transition(NetworkState::Unknown, NetworkState::Wifi));
        let (late, late_seen) = recorder();
        registry.subscribe(late).unwrap();

        assert_eq!(*late_seen.lock().unwrap(), vec![NetworkState::Wifi]);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![NetworkState::Unknown, NetworkState::Wifi]
        );
    }

    #[test]
    fn test_initial_delivery_precedes_concurrent_dispatch() {
        let registry = Arc::new(SubscriptionRegistry::new());
        let in_callback = Arc::new(Barrier::new(2));
        let seen = Arc::new(StdMutex::new(Vec::new()));

        let dispatcher = {
            let registry = Arc::clone(&registry);
            let in_callback = Arc::clone(&in_callback);
            thread::spawn(move || {
                in_callback.wait();
                registry.dispatch(&transition(NetworkState::Unknown, NetworkState::Wifi))
            })
        };

        let sink = Arc::clone(&seen);
        let gate = Arc::clone(&in_callback);
        registry
            .subscribe(Arc::new(move |state| {
                if state == NetworkState::Unknown {
                    // Let the dispatcher run while the initial delivery is
                    // still in progress.
                    gate.wait();
                    thread::sleep(Duration::from_millis(100));
                }
                sink.lock().unwrap().push(state);
            }))
            .unwrap();

        assert_eq!(dispatcher.join().unwrap(), 1);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![NetworkState::Unknown, NetworkState::Wifi]
        );
        assert_eq!(registry.current(), NetworkState::Wifi);
    }

    #[test]
    fn test_handles_are_unique() {
        let registry = SubscriptionRegistry::new();
        let mut handles = HashSet::new();

        for _ in 0..32 {
            let (listener, _) = recorder();
            assert!(handles.insert(registry.subscribe(listener).unwrap()));
        }
        assert_eq!(registry.len(), 32);
    }

    #[test]
    fn test_duplicate_unsubscribe_is_noop() {
        let registry = SubscriptionRegistry::new();
        let (listener, seen) = recorder();
        let handle = registry.subscribe(listener).unwrap();

        assert!(registry.unsubscribe(handle));
        assert!(!registry.unsubscribe(handle));
        assert!(registry.is_empty());

        registry.dispatch(&transition(NetworkState::Unknown, NetworkState::Offline));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_removed_during_dispatch_is_skipped() {
        let registry = Arc::new(SubscriptionRegistry::new());
        let target: Arc<StdMutex<Option<ListenerHandle>>> = Arc::new(StdMutex::new(None));

        // Slots of a fresh map iterate in insertion order, so the first
        // listener runs before `victim`.
        let reg = Arc::clone(&registry);
        let victim_handle = Arc::clone(&target);
        registry
            .subscribe(Arc::new(move |state| {
                if state == NetworkState::Unknown {
                    return;
                }
                if let Some(handle) = victim_handle.lock().unwrap().take() {
                    assert!(reg.unsubscribe(handle));
                }
            }))
            .unwrap();

        let (victim, victim_seen) = recorder();
        *target.lock().unwrap() = Some(registry.subscribe(victim).unwrap());

        let delivered = registry.dispatch(&transition(NetworkState::Unknown, NetworkState::Wifi));

        assert_eq!(delivered, 1);
        assert_eq!(*victim_seen.lock().unwrap(), vec![NetworkState::Unknown]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_self_unsubscribe_during_dispatch() {
        let registry = Arc::new(SubscriptionRegistry::new());
        let own_handle: Arc<StdMutex<Option<ListenerHandle>>> = Arc::new(StdMutex::new(None));
        let (other, other_seen) = recorder();
        let once_seen = Arc::new(StdMutex::new(Vec::new()));

        let reg = Arc::clone(&registry);
        let me = Arc::clone(&own_handle);
        let sink = Arc::clone(&once_seen);
        let handle = registry
            .subscribe(Arc::new(move |state| {
                sink.lock().unwrap().push(state);
                if state != NetworkState::Unknown {
                    if let Some(handle) = *me.lock().unwrap() {
                        reg.unsubscribe(handle);
                    }
                }
            }))
            .unwrap();
        *own_handle.lock().unwrap() = Some(handle);
        registry.subscribe(other).unwrap();

        registry.dispatch(&transition(NetworkState::Unknown, NetworkState::Wifi));
        registry.dispatch(&transition(NetworkState::Wifi, NetworkState::Offline));

        assert_eq!(
            *once_seen.lock().unwrap(),
            vec![NetworkState::Unknown, NetworkState::Wifi]
        );
        assert_eq!(
            *other_seen.lock().unwrap(),
            vec![
                NetworkState::Unknown,
                NetworkState::Wifi,
                NetworkState::Offline
            ]
        );
    }

    #[test]
    fn test_added_during_dispatch_not_called() {
        let registry = Arc::new(SubscriptionRegistry::new());
        let (late, late_seen) = recorder();

        let reg = Arc::clone(&registry);
        registry
            .subscribe(Arc::new(move |state| {
                if state == NetworkState::Cellular {
                    reg.subscribe(Arc::clone(&late)).unwrap();
                }
            }))
            .unwrap();

        let delivered = registry.dispatch(&transition(NetworkState::Unknown, NetworkState::Cellular));

        assert_eq!(delivered, 1);
        // Only the synchronous initial delivery from subscribe itself
        assert_eq!(*late_seen.lock().unwrap(), vec![NetworkState::Cellular]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_close_rejects_subscribe() {
        let registry = SubscriptionRegistry::new();
        let (listener, seen) = recorder();
        registry.subscribe(listener).unwrap();
        registry.dispatch(&transition(NetworkState::Unknown, NetworkState::Ethernet));

        registry.close();

        assert!(registry.is_closed());
        assert!(registry.is_empty());
        assert_eq!(registry.current(), NetworkState::Unknown);
        let (late, _) = recorder();
        assert!(matches!(
            registry.subscribe(late),
            Err(NetSignalError::ShutDown)
        ));
        assert_eq!(
            registry.dispatch(&transition(NetworkState::Ethernet, NetworkState::Wifi)),
            0
        );
        assert_eq!(seen.lock().unwrap().len(), 2);
    }
}
