//! The observable snapshot store.
//!
//! Holds the single current [`State`] value and the listener registry.
//! Every mutation in the crate goes through whole-value replacement under
//! the state lock followed by a notify pass over the listener set captured
//! at mutation time, so a subscriber joining or leaving mid-pass never
//! affects a delivery already in progress.

use crate::model::{State, TreeValue};
use crate::persist::TreeStorage;
use crate::tree::path_to_node;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

type Listener = Arc<dyn Fn() + Send + Sync>;

pub(crate) struct Shared {
    state: Mutex<State>,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_listener_id: AtomicU64,
    pub(crate) storage: TreeStorage,
}

impl Shared {
    /// Lock the state cell. Poisoning is recovered rather than propagated:
    /// the state is always a complete value, never mid-edit.
    pub(crate) fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Deliver a notification to the listener set as of this call.
    pub(crate) fn notify(&self) {
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener();
        }
    }
}

/// Observable state store orchestrating one generation job at a time.
///
/// Cheap to clone; clones share the same state, listeners, and storage.
/// Independent stores (say, one per test) don't interact at all.
#[derive(Clone)]
pub struct TreeStore {
    pub(crate) inner: Arc<Shared>,
}

impl TreeStore {
    /// A store persisting to the platform data directory.
    pub fn new() -> Self {
        Self::with_storage(TreeStorage::new())
    }

    /// A store persisting through the given storage.
    pub fn with_storage(storage: TreeStorage) -> Self {
        TreeStore {
            inner: Arc::new(Shared {
                state: Mutex::new(State::initial()),
                listeners: Mutex::new(Vec::new()),
                next_listener_id: AtomicU64::new(0),
                storage,
            }),
        }
    }

    /// Current state. Synchronous and side-effect free.
    pub fn snapshot(&self) -> State {
        self.inner.state().clone()
    }

    /// Register a listener invoked after every state replacement. Dropping
    /// the returned [`Subscription`] deregisters it.
    ///
    /// Listeners must be idempotent: redundant notifications (same value
    /// twice) are not suppressed.
    pub fn subscribe(&self, listener: impl Fn() + Send + Sync + 'static) -> Subscription {
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(listener)));
        Subscription {
            shared: Arc::downgrade(&self.inner),
            id,
        }
    }

    /// The concatenated text of the root-to-node path for `node_id`,
    /// including the node itself. `None` when the store is showing an error
    /// or the id is absent.
    pub fn token_and_prefix(&self, node_id: &str) -> Option<String> {
        let state = self.snapshot();
        let roots = state.value.roots()?;
        let path = path_to_node(node_id, roots)?;
        Some(path.iter().map(|t| t.text().to_owned()).collect())
    }

    /// Replace the tree with whatever the storage holds. Called once by the
    /// embedder at startup; no-op while a job is running.
    pub fn load_persisted(&self) {
        let roots = self.inner.storage.load();
        {
            let mut state = self.inner.state();
            if state.running {
                return;
            }
            state.value = TreeValue::Tree { roots };
        }
        self.inner.notify();
    }
}

impl Default for TreeStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Capability that deregisters one listener. Dropping it (or calling
/// [`Subscription::unsubscribe`]) removes exactly that listener; a notify
/// pass already in progress still completes against the old set.
pub struct Subscription {
    shared: Weak<Shared>,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.upgrade() {
            shared
                .listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .retain(|(id, _)| *id != self.id);
        }
    }
}
