//! Versioned, subscribable holder of one screen's current state.
//!
//! Values are never mutated in place: every change publishes a new value and
//! the previous snapshot stays valid for whoever is still reading it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::watch;

use crate::mvi::{Reducer, UiState};
use crate::state::error::StateError;
use crate::state::snapshot::Snapshot;
use crate::state::subscription::{deliver, Subscription, SubscriptionShared};

/// Single-producer, many-subscriber state container.
///
/// The current value lives in a `watch` channel, whose lock is the only
/// mutual exclusion around "read current or replace it". Publishing never
/// waits for subscribers; each subscriber is fed by its own task and may skip
/// intermediate values, but always ends up with the latest one.
pub struct ObservableState<S: UiState> {
    tx: watch::Sender<Snapshot<S>>,
    next_subscription: AtomicU64,
}

impl<S: UiState> ObservableState<S> {
    pub fn new(initial: S) -> Self {
        let (tx, _rx) = watch::channel(Snapshot::new(0, initial));
        Self {
            tx,
            next_subscription: AtomicU64::new(1),
        }
    }

    /// The current value. Cheap: clones an `Arc`.
    pub fn current(&self) -> Snapshot<S> {
        self.tx.borrow().clone()
    }

    pub fn version(&self) -> u64 {
        self.tx.borrow().version()
    }

    /// Number of live callback subscriptions and receivers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Replace the current value. Returns the new version.
    pub fn publish(&self, value: S) -> u64 {
        let mut version = 0;
        self.tx.send_modify(|current| {
            version = current.version() + 1;
            *current = Snapshot::new(version, value);
        });
        tracing::debug!(version, receivers = self.tx.receiver_count(), "State published");
        version
    }

    /// Atomically derive the next value from the current one and publish it.
    ///
    /// `f` runs while the value slot is locked and must not call back into
    /// this state.
    pub fn update<F>(&self, f: F) -> u64
    where
        F: FnOnce(&S) -> S,
    {
        let mut version = 0;
        self.tx.send_modify(|current| {
            let next = f(current.value());
            version = current.version() + 1;
            *current = Snapshot::new(version, next);
        });
        tracing::debug!(version, "State updated");
        version
    }

    /// Like [`update`](Self::update), but publishes nothing if `f` fails.
    pub fn try_update<E, F>(&self, f: F) -> Result<u64, E>
    where
        F: FnOnce(&S) -> Result<S, E>,
    {
        let mut version = 0;
        let mut error = None;
        self.tx.send_if_modified(|current| match f(current.value()) {
            Ok(next) => {
                version = current.version() + 1;
                *current = Snapshot::new(version, next);
                true
            }
            Err(e) => {
                error = Some(e);
                false
            }
        });

        match error {
            Some(e) => Err(e),
            None => {
                tracing::debug!(version, "State updated");
                Ok(version)
            }
        }
    }

    /// Apply a reducer to the current value and publish the result.
    pub fn dispatch<R>(&self, intent: R::Intent) -> Result<u64, R::Error>
    where
        R: Reducer<State = S>,
        R::Error: std::fmt::Display,
    {
        self.try_update(|state| R::reduce(state, intent))
            .inspect_err(|e| tracing::warn!(error = %e, "Intent rejected, state unchanged"))
    }

    /// Register `callback` for the current value and every later publish.
    ///
    /// The callback first receives the value current at subscription time,
    /// then newer values in publish order. Under load, intermediate values
    /// may be skipped; the most recent one is always delivered.
    ///
    /// # Errors
    /// [`StateError::NoRuntime`] when called outside a tokio runtime.
    pub fn subscribe<F>(&self, callback: F) -> Result<Subscription, StateError>
    where
        F: FnMut(Snapshot<S>) + Send + 'static,
    {
        let runtime = Handle::try_current().map_err(|_| StateError::NoRuntime)?;
        let id = self.next_subscription.fetch_add(1, Ordering::Relaxed);
        let shared = Arc::new(SubscriptionShared::new(id));

        let task = runtime.spawn(deliver(self.tx.subscribe(), Arc::clone(&shared), callback));
        shared.attach(task.abort_handle());

        tracing::debug!(subscription = id, version = self.version(), "Subscribed");
        Ok(Subscription::new(shared))
    }

    /// Pull-style access for consumers driving their own loop.
    pub fn watch(&self) -> StateReceiver<S> {
        StateReceiver {
            rx: self.tx.subscribe(),
        }
    }
}

impl<S: UiState> Default for ObservableState<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S: UiState> Drop for ObservableState<S> {
    fn drop(&mut self) {
        tracing::debug!(
            version = self.tx.borrow().version(),
            receivers = self.tx.receiver_count(),
            "State dropped, detaching subscribers"
        );
    }
}

/// Receiver half returned by [`ObservableState::watch`].
pub struct StateReceiver<S> {
    rx: watch::Receiver<Snapshot<S>>,
}

impl<S> StateReceiver<S> {
    /// The latest value, marking it as seen.
    pub fn latest(&mut self) -> Snapshot<S> {
        self.rx.borrow_and_update().clone()
    }

    /// Wait for a value newer than the last one seen and return it.
    ///
    /// # Errors
    /// [`StateError::Closed`] once the owning state has been dropped.
    pub async fn changed(&mut self) -> Result<Snapshot<S>, StateError> {
        self.rx.changed().await.map_err(|_| StateError::Closed)?;
        Ok(self.rx.borrow_and_update().clone())
    }
}
