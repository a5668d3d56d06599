use thiserror::Error;

/// Errors from observable state delivery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// Callback delivery runs on a tokio task and needs a runtime.
    #[error("subscribe requires a running tokio runtime")]
    NoRuntime,

    /// The owning session ended and its state was dropped.
    #[error("observable state closed")]
    Closed,
}
