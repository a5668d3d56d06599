//! Screen session: sole owner of a screen's observable state.

use std::sync::{Arc, Weak};

use uuid::Uuid;

use crate::state::observable::ObservableState;
use crate::state::screen::{EventHandlers, ScreenState};

/// Owns the [`ObservableState`] of one active screen.
///
/// Lives exactly as long as the screen. Event handlers reach back into the
/// session through a [`WeakSession`], so the state never owns its session and
/// dropping the last `ScreenSession` ends it and detaches every subscriber.
#[derive(Clone)]
pub struct ScreenSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    id: Uuid,
    state: ObservableState<ScreenState>,
}

/// Non-owning back-reference handed to event handlers.
#[derive(Clone)]
pub struct WeakSession {
    inner: Weak<SessionInner>,
}

impl WeakSession {
    /// `None` once the session has ended.
    pub fn upgrade(&self) -> Option<ScreenSession> {
        self.inner.upgrade().map(|inner| ScreenSession { inner })
    }
}

impl ScreenSession {
    /// Create a session. `wire` builds the screen's event handlers from a
    /// weak reference to the session being constructed.
    pub fn new<W>(initial: ScreenState, wire: W) -> Self
    where
        W: FnOnce(WeakSession) -> EventHandlers,
    {
        let inner = Arc::new_cyclic(|weak: &Weak<SessionInner>| {
            let handlers = wire(WeakSession {
                inner: weak.clone(),
            });
            SessionInner {
                id: Uuid::new_v4(),
                state: ObservableState::new(initial.with_handlers(handlers)),
            }
        });
        tracing::info!(session = %inner.id, "Screen session started");
        Self { inner }
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn state(&self) -> &ObservableState<ScreenState> {
        &self.inner.state
    }

    pub fn downgrade(&self) -> WeakSession {
        WeakSession {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        tracing::info!(session = %self.id, "Screen session ended");
    }
}
