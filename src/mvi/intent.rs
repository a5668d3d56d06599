//! Base trait for intents in MVI architecture.

/// Marker trait for intent objects.
///
/// Intents represent:
/// - User actions (tap handlers, pull-to-refresh)
/// - System events (page loaded, reload finished)
///
/// Intents are processed by reducers to produce new states.
pub trait Intent: Send + 'static {}
