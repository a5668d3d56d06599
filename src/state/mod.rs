//! Observable screen state and its subscription protocol.
//!
//! ```text
//! ScreenSession ──owns──→ ObservableState<ScreenState>
//!      ↑                        │ publish / update / dispatch
//!      │ Weak                   ▼
//!  Handler closures      watch slot (current Snapshot)
//!                               │ one task per subscriber, coalescing
//!                               ▼
//!                        renderer callbacks (Subscription handles)
//! ```

mod error;
mod observable;
mod screen;
mod session;
mod snapshot;
mod subscription;

pub use error::StateError;
pub use observable::{ObservableState, StateReceiver};
pub use screen::{EventHandlers, Handler, ScreenState};
pub use session::{ScreenSession, WeakSession};
pub use snapshot::Snapshot;
pub use subscription::Subscription;
