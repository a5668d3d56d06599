//! Screen-level UI state: the collection plus everything carried alongside it.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::model::{CollectionDataSource, CollectionError, CollectionIntent, CollectionReducer, Row};
use crate::mvi::{Reducer, UiState};
use crate::state::observable::ObservableState;

/// A callback field wired when the screen session is constructed.
#[derive(Clone)]
pub enum Handler {
    /// Zero-argument handler, e.g. a button tap.
    Action(Arc<dyn Fn() + Send + Sync>),
    /// Handler receiving the row that was tapped.
    Item(Arc<dyn Fn(&Row) + Send + Sync>),
}

impl Handler {
    pub fn action(f: impl Fn() + Send + Sync + 'static) -> Self {
        Self::Action(Arc::new(f))
    }

    pub fn item(f: impl Fn(&Row) + Send + Sync + 'static) -> Self {
        Self::Item(Arc::new(f))
    }
}

// Handlers are equal only when they are the same closure.
impl PartialEq for Handler {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Action(a), Self::Action(b)) => Arc::ptr_eq(a, b),
            (Self::Item(a), Self::Item(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Action(_) => f.write_str("Action(..)"),
            Self::Item(_) => f.write_str("Item(..)"),
        }
    }
}

/// Named event handlers of a screen.
#[derive(Clone, Default, PartialEq, Debug)]
pub struct EventHandlers {
    handlers: BTreeMap<String, Handler>,
}

impl EventHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, handler: Handler) -> Self {
        self.handlers.insert(name.into(), handler);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Handler> {
        self.handlers.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Invoke a zero-argument handler. Returns false if none is registered
    /// under `name`.
    pub fn invoke_action(&self, name: &str) -> bool {
        match self.handlers.get(name) {
            Some(Handler::Action(f)) => {
                f();
                true
            }
            _ => false,
        }
    }

    pub fn invoke_item(&self, name: &str, row: &Row) -> bool {
        match self.handlers.get(name) {
            Some(Handler::Item(f)) => {
                f(row);
                true
            }
            _ => false,
        }
    }
}

/// Everything a screen renders from.
///
/// The `with_*` methods return a new value and keep every other part, so
/// publishing a fresh collection never drops handlers or fields.
#[derive(Clone, Default, PartialEq, Debug)]
pub struct ScreenState {
    pub collection: Option<CollectionDataSource>,
    /// Other UI fields (text inputs, error messages, flags).
    pub fields: Row,
    pub handlers: EventHandlers,
}

impl UiState for ScreenState {}

impl ScreenState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collection(&self, collection: CollectionDataSource) -> Self {
        Self {
            collection: Some(collection),
            ..self.clone()
        }
    }

    pub fn with_field(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            fields: self.fields.clone().with(key, value),
            ..self.clone()
        }
    }

    pub fn with_handler(&self, name: impl Into<String>, handler: Handler) -> Self {
        Self {
            handlers: self.handlers.clone().with(name, handler),
            ..self.clone()
        }
    }

    pub fn with_handlers(&self, handlers: EventHandlers) -> Self {
        Self {
            handlers,
            ..self.clone()
        }
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

impl ObservableState<ScreenState> {
    /// Publish a new collection, keeping fields and handlers.
    pub fn publish_collection(&self, collection: CollectionDataSource) -> u64 {
        self.update(|state| state.with_collection(collection))
    }

    /// Apply a collection intent to the screen's collection.
    ///
    /// A screen without a collection yet is treated as holding an empty one.
    pub fn dispatch_collection(&self, intent: CollectionIntent) -> Result<u64, CollectionError> {
        self.try_update(|state| {
            let current = state.collection.clone().unwrap_or_default();
            let next = CollectionReducer::reduce(&current, intent)?;
            Ok(state.with_collection(next))
        })
        .inspect_err(|e| tracing::warn!(error = %e, "Collection intent rejected"))
    }
}
