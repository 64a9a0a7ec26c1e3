use std::sync::{Arc, RwLock};

/// Shared storage for a signal's current value.
pub(crate) struct ValueCell<T>(Arc<RwLock<T>>);

impl<T> Clone for ValueCell<T> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<T> ValueCell<T> {
    pub fn new(value: T) -> Self { Self(Arc::new(RwLock::new(value))) }

    pub fn set(&self, value: T) {
        let mut current = self.0.write().expect("value lock poisoned");
        *current = value;
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let guard = self.0.read().expect("value lock poisoned");
        f(&guard)
    }
}

impl<T: Clone> ValueCell<T> {
    pub fn value(&self) -> T { self.0.read().expect("value lock poisoned").clone() }
}
