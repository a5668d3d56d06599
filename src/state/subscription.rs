//! Subscriber handles and the per-subscriber delivery task.

use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::AbortHandle;

use crate::state::snapshot::Snapshot;

thread_local! {
    /// Number of subscriber callbacks running on this thread.
    static DELIVERING: Cell<usize> = const { Cell::new(0) };
}

fn in_delivery() -> bool {
    DELIVERING.with(|depth| depth.get() > 0)
}

/// Non-owning handle to a callback registered with
/// [`ObservableState::subscribe`](crate::state::ObservableState::subscribe).
///
/// Holds no reference to the state itself, so a renderer keeping this
/// handle never keeps a finished session alive. Dropping the handle does not
/// cancel delivery; call [`unsubscribe`](Self::unsubscribe), or drop the
/// owning state.
#[derive(Clone)]
pub struct Subscription {
    shared: Arc<SubscriptionShared>,
}

pub(crate) struct SubscriptionShared {
    id: u64,
    /// Held while a callback runs.
    gate: Mutex<()>,
    active: AtomicBool,
    task: Mutex<Option<AbortHandle>>,
}

impl SubscriptionShared {
    pub(crate) fn new(id: u64) -> Self {
        Self {
            id,
            gate: Mutex::new(()),
            active: AtomicBool::new(true),
            task: Mutex::new(None),
        }
    }

    pub(crate) fn attach(&self, task: AbortHandle) {
        if self.active.load(Ordering::Acquire) {
            *self.task.lock() = Some(task);
        } else {
            task.abort();
        }
    }

    /// Run `deliver` unless the subscription was cancelled.
    fn deliver_one(&self, deliver: impl FnOnce()) -> bool {
        let _gate = self.gate.lock();
        if !self.active.load(Ordering::Acquire) {
            return false;
        }
        DELIVERING.with(|depth| depth.set(depth.get() + 1));
        let _depth = scopeguard::guard((), |_| DELIVERING.with(|depth| depth.set(depth.get() - 1)));
        deliver();
        true
    }

    fn deactivate(&self) -> bool {
        let was_active = self.active.swap(false, Ordering::AcqRel);
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
        was_active
    }
}

impl Subscription {
    pub(crate) fn new(shared: Arc<SubscriptionShared>) -> Self {
        Self { shared }
    }

    pub fn id(&self) -> u64 {
        self.shared.id
    }

    pub fn is_active(&self) -> bool {
        self.shared.active.load(Ordering::Acquire)
    }

    /// Stop delivery to this handle. Idempotent.
    ///
    /// When this returns, no further callback invocation will begin. Called
    /// from outside any subscriber callback, it also waits for a callback
    /// running on another thread to finish. Called from inside a callback
    /// (this subscription's or another's), it never waits, so subscribers
    /// may cancel each other.
    pub fn unsubscribe(&self) {
        if self.shared.deactivate() {
            tracing::debug!(subscription = self.shared.id, "Unsubscribed");
        }
        if !in_delivery() {
            drop(self.shared.gate.lock());
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.shared.id)
            .field("active", &self.is_active())
            .finish()
    }
}

/// Delivery loop for one subscriber.
///
/// Sends the current value first, then the latest value after each change.
/// Values published while the callback is busy collapse into the newest one,
/// so versions seen by the callback only ever increase.
pub(crate) async fn deliver<S, F>(
    mut rx: watch::Receiver<Snapshot<S>>,
    shared: Arc<SubscriptionShared>,
    mut callback: F,
) where
    S: Send + Sync + 'static,
    F: FnMut(Snapshot<S>) + Send + 'static,
{
    // Runs on every exit, including an abort or a panicking callback.
    let shared = scopeguard::guard(shared, |shared| {
        shared.active.store(false, Ordering::Release);
    });

    let mut next = rx.borrow_and_update().clone();
    loop {
        let version = next.version();
        if !shared.deliver_one(|| callback(next)) {
            break;
        }
        tracing::trace!(subscription = shared.id, version, "Delivered");

        if rx.changed().await.is_err() {
            tracing::debug!(subscription = shared.id, "State closed, detaching subscriber");
            break;
        }
        next = rx.borrow_and_update().clone();
    }
}
