//! Sectioned collection data sources and observable screen state.
//!
//! A screen's list/grid content is a [`model::CollectionDataSource`]: an
//! ordered list of sections, each with an optional header, an optional cell
//! block and an optional footer, every block naming the view template that
//! renders it. Screen logic builds new values with pure mutators and
//! publishes them into a [`state::ObservableState`]; renderers subscribe,
//! [`diff`] successive values by section/row identity, and
//! [`binding`] view names to their own view factories.

pub mod binding;
pub mod config;
pub mod diff;
pub mod logging;
pub mod model;
pub mod mvi;
pub mod state;
