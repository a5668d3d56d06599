//! Model-View-Intent (MVI) primitives.
//!
//! Unidirectional data flow between screen logic and whatever renders it.
//!
//! # Architecture
//!
//! ```text
//! Intent ──→ Reducer ──→ State ──→ ObservableState ──→ Renderer
//!    ↑                                                    │
//!    └────────────────────────────────────────────────────┘
//! ```
//!
//! - **State**: Immutable value describing everything a renderer needs
//! - **Intent**: A requested change (user action, pagination, reload)
//! - **Reducer**: Pure function producing the next state, or an error

mod intent;
mod reducer;
mod state;

pub use intent::Intent;
pub use reducer::Reducer;
pub use state::UiState;
