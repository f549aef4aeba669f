//! Host objects whose function properties get patched
//!
//! A [`Host`] is a table of named [`Function`] properties plus one hidden
//! slot for the wrapper bookkeeping kept by [`crate::wrap`]. The slot is not a
//! property: it never shows up in [`Host::keys`] and cannot collide with any
//! key a caller uses.

use std::cell::{OnceCell, RefCell};
use std::fmt;

use indexmap::IndexMap;

use crate::error::HostError;
use crate::function::Function;
use crate::store::VersionStore;

pub struct Host<A, R> {
    properties: RefCell<IndexMap<String, Function<A, R>>>,
    store: OnceCell<RefCell<VersionStore<A, R>>>,
}

impl<A, R> Host<A, R> {
    pub fn new() -> Self {
        Self {
            properties: RefCell::new(IndexMap::new()),
            store: OnceCell::new(),
        }
    }

    /// Builder-style property definition
    pub fn with(self, key: &str, value: Function<A, R>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<Function<A, R>> {
        self.properties.borrow().get(key).cloned()
    }

    /// Replace the property, returning the previous value
    pub fn set(&self, key: &str, value: Function<A, R>) -> Option<Function<A, R>> {
        self.properties.borrow_mut().insert(key.to_string(), value)
    }

    pub fn remove(&self, key: &str) -> Option<Function<A, R>> {
        self.properties.borrow_mut().shift_remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.properties.borrow().contains_key(key)
    }

    /// Visible property names, in definition order
    pub fn keys(&self) -> Vec<String> {
        self.properties.borrow().keys().cloned().collect()
    }

    /// Invoke a property with this host as the receiver, like `host.key(args)`
    ///
    /// No borrow of the host is held while the function runs, so it may read
    /// or replace properties of the same host.
    pub fn call(&self, key: &str, args: &[A]) -> Result<R, HostError> {
        let func = self.get(key).ok_or_else(|| HostError::NotCallable {
            key: key.to_string(),
        })?;
        Ok(func.call(self, args))
    }

    pub(crate) fn hidden_store(&self) -> &OnceCell<RefCell<VersionStore<A, R>>> {
        &self.store
    }
}

impl<A, R> Default for Host<A, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, R> fmt::Debug for Host<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("keys", &self.keys())
            .field("has_store", &self.store.get().is_some())
            .finish()
    }
}
