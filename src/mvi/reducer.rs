//! Reducer trait for MVI architecture.

use super::intent::Intent;
use super::state::UiState;

/// Reducer transforms state based on intents.
///
/// The reducer is the only place where state transitions happen.
/// It must be a pure function: (&State, Intent) -> Result<State, Error>.
/// On error the caller keeps the old state.
pub trait Reducer {
    /// The state type this reducer operates on.
    type State: UiState;

    /// The intent type this reducer handles.
    type Intent: Intent;

    /// Returned when the intent cannot be applied to the given state.
    type Error;

    /// Process an intent and return the new state.
    fn reduce(state: &Self::State, intent: Self::Intent) -> Result<Self::State, Self::Error>;
}
