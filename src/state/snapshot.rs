use std::ops::Deref;
use std::sync::Arc;

/// A published, immutable state value and the version it was published at.
///
/// Cloning is cheap and never copies the value, so any number of
/// subscribers can read the same snapshot concurrently without locking.
#[derive(Debug)]
pub struct Snapshot<S> {
    version: u64,
    value: Arc<S>,
}

impl<S> Snapshot<S> {
    pub(crate) fn new(version: u64, value: S) -> Self {
        Self {
            version,
            value: Arc::new(value),
        }
    }

    /// Monotonically increasing per state instance. The initial value is 0.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn value(&self) -> &S {
        &self.value
    }

    pub fn shared(&self) -> Arc<S> {
        Arc::clone(&self.value)
    }
}

impl<S> Clone for Snapshot<S> {
    fn clone(&self) -> Self {
        Self {
            version: self.version,
            value: Arc::clone(&self.value),
        }
    }
}

impl<S> Deref for Snapshot<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.value
    }
}
