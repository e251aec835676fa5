//! # State Store & Change Notifier
//!
//! Process-wide playback state with synchronous observer notification.
//! Observers run in registration order on the mutating call's own stack;
//! they are expected to be cheap state mirrors, never to perform I/O. A
//! panicking observer is caught and logged so it can neither corrupt the
//! stored state nor starve later observers.
//!
//! The `generation` counter is the engine's staleness primitive: every new
//! playback session and every stop bumps it, and background queue
//! extension re-checks it before each append so stale work aborts
//! promptly.

use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Weak};
use tracing::warn;

/// Snapshot of the orchestration engine's observable state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerState {
    /// A playback request is resolving and the queue is not yet final.
    pub loading: bool,
    /// A playback session exists (queue populated or being populated).
    pub is_active: bool,
    /// Continuation identifier of the current recommendation sequence.
    pub continuation_token: Option<String>,
    /// Session generation; bumped by every new session and every stop.
    pub generation: u64,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            loading: false,
            is_active: false,
            continuation_token: None,
            generation: 0,
        }
    }
}

/// Partial state update, shallow-merged by [`StateStore::apply`].
#[derive(Debug, Clone, Default)]
pub struct StateUpdate {
    loading: Option<bool>,
    is_active: Option<bool>,
    continuation_token: Option<Option<String>>,
}

impl StateUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loading(mut self, value: bool) -> Self {
        self.loading = Some(value);
        self
    }

    pub fn active(mut self, value: bool) -> Self {
        self.is_active = Some(value);
        self
    }

    pub fn token(mut self, token: Option<String>) -> Self {
        self.continuation_token = Some(token);
        self
    }
}

type Observer = Arc<dyn Fn(&PlayerState) + Send + Sync>;

struct StoreData {
    state: PlayerState,
    observers: Vec<(u64, Observer)>,
    next_observer_id: u64,
}

/// Shared mutable state store.
///
/// Cloning is cheap; clones observe and mutate the same state.
#[derive(Clone)]
pub struct StateStore {
    inner: Arc<Mutex<StoreData>>,
}

/// Handle to a registered observer; dropping it unregisters.
pub struct Subscription {
    inner: Weak<Mutex<StoreData>>,
    id: u64,
}

impl Subscription {
    /// Explicitly remove the observer. Equivalent to dropping the handle.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.lock().observers.retain(|(id, _)| *id != self.id);
        }
    }
}

impl StateStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(StoreData {
                state: PlayerState::default(),
                observers: Vec::new(),
                next_observer_id: 0,
            })),
        }
    }

    /// Register an observer, invoked synchronously after every mutation in
    /// registration order.
    pub fn subscribe(&self, callback: impl Fn(&PlayerState) + Send + Sync + 'static) -> Subscription {
        let mut data = self.inner.lock();
        let id = data.next_observer_id;
        data.next_observer_id += 1;
        data.observers.push((id, Arc::new(callback)));
        Subscription {
            inner: Arc::downgrade(&self.inner),
            id,
        }
    }

    /// Shallow-merge an update into the state and notify observers.
    pub fn apply(&self, update: StateUpdate) {
        let (snapshot, observers) = {
            let mut data = self.inner.lock();
            if let Some(loading) = update.loading {
                data.state.loading = loading;
            }
            if let Some(is_active) = update.is_active {
                data.state.is_active = is_active;
            }
            if let Some(token) = update.continuation_token {
                data.state.continuation_token = token;
            }
            (data.state.clone(), Self::observer_list(&data))
        };
        Self::invoke(&snapshot, &observers);
    }

    /// Re-notify observers of the current state without mutating it.
    ///
    /// Used after queue appends, which change engine-owned state the
    /// observers mirror but not the store itself.
    pub fn notify(&self) {
        let (snapshot, observers) = {
            let data = self.inner.lock();
            (data.state.clone(), Self::observer_list(&data))
        };
        Self::invoke(&snapshot, &observers);
    }

    /// Start a new playback session: clear the continuation token, bump
    /// the generation, mark the engine loading and active, and notify.
    ///
    /// Returns the new generation for background tasks to capture.
    pub fn begin_session(&self) -> u64 {
        let (generation, snapshot, observers) = {
            let mut data = self.inner.lock();
            data.state.continuation_token = None;
            data.state.generation += 1;
            data.state.loading = true;
            data.state.is_active = true;
            (
                data.state.generation,
                data.state.clone(),
                Self::observer_list(&data),
            )
        };
        Self::invoke(&snapshot, &observers);
        generation
    }

    /// Reset to defaults, bumping the generation so in-flight background
    /// work aborts, and notify.
    pub fn reset(&self) {
        let (snapshot, observers) = {
            let mut data = self.inner.lock();
            let generation = data.state.generation + 1;
            data.state = PlayerState {
                generation,
                ..PlayerState::default()
            };
            (data.state.clone(), Self::observer_list(&data))
        };
        Self::invoke(&snapshot, &observers);
    }

    pub fn snapshot(&self) -> PlayerState {
        self.inner.lock().state.clone()
    }

    pub fn loading(&self) -> bool {
        self.inner.lock().state.loading
    }

    pub fn is_active(&self) -> bool {
        self.inner.lock().state.is_active
    }

    pub fn continuation_token(&self) -> Option<String> {
        self.inner.lock().state.continuation_token.clone()
    }

    pub fn generation(&self) -> u64 {
        self.inner.lock().state.generation
    }

    fn observer_list(data: &StoreData) -> Vec<Observer> {
        data.observers.iter().map(|(_, cb)| Arc::clone(cb)).collect()
    }

    // Invoked outside the lock so observers may read the store.
    fn invoke(snapshot: &PlayerState, observers: &[Observer]) {
        for observer in observers {
            if catch_unwind(AssertUnwindSafe(|| observer(snapshot))).is_err() {
                warn!("State observer panicked; continuing with remaining observers");
            }
        }
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}
