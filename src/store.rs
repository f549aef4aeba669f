//! Hidden wrapper bookkeeping attached to a host
//!
//! Each host lazily gets one [`VersionStore`], mapping property keys to a
//! [`WrapperMap`]. A map remembers the property's original function and the
//! wrappers registered for it, keyed by version id in registration order.
//!
//! The store lives in a private slot of the host, so it is dropped with it.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;

use indexmap::IndexMap;
use tracing::debug;

use crate::function::{Function, Wrapper};
use crate::host::Host;
use crate::wrapper::unwrap;

pub struct WrapperMap<A, R> {
    raw: Option<Function<A, R>>,
    wrappers: IndexMap<String, Wrapper<A, R>>,
}

impl<A, R> WrapperMap<A, R> {
    fn new(raw: Option<Function<A, R>>) -> Self {
        Self {
            raw,
            wrappers: IndexMap::new(),
        }
    }

    /// The original function captured when the map was created
    pub fn raw(&self) -> Option<&Function<A, R>> {
        self.raw.as_ref()
    }

    /// Registered version ids, in registration order
    pub fn versions(&self) -> Vec<String> {
        self.wrappers.keys().cloned().collect()
    }

    pub fn wrapper(&self, version: &str) -> Option<&Wrapper<A, R>> {
        self.wrappers.get(version)
    }

    pub fn len(&self) -> usize {
        self.wrappers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wrappers.is_empty()
    }

    /// Register `wrapper` under `version` unless one is already there.
    /// Returns whether the map changed.
    pub(crate) fn register(&mut self, version: &str, wrapper: Wrapper<A, R>) -> bool {
        if self.wrappers.contains_key(version) {
            return false;
        }
        self.wrappers.insert(version.to_string(), wrapper);
        true
    }
}

pub struct VersionStore<A, R> {
    maps: HashMap<String, WrapperMap<A, R>>,
}

impl<A, R> VersionStore<A, R> {
    fn new() -> Self {
        Self {
            maps: HashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&WrapperMap<A, R>> {
        self.maps.get(key)
    }

    /// Property keys that have a wrapper map
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.maps.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}

pub fn get_store<A, R>(object: &Host<A, R>) -> Option<&RefCell<VersionStore<A, R>>> {
    object.hidden_store().get()
}

pub fn get_or_create_store<A, R>(object: &Host<A, R>) -> &RefCell<VersionStore<A, R>> {
    object.hidden_store().get_or_init(|| {
        debug!("Creating wrapper store");
        RefCell::new(VersionStore::new())
    })
}

pub fn get_map<'a, A, R>(object: &'a Host<A, R>, key: &str) -> Option<Ref<'a, WrapperMap<A, R>>> {
    let store = get_store(object)?;
    Ref::filter_map(store.borrow(), |store| store.maps.get(key)).ok()
}

/// Existing map for `key`, or a new one whose raw function is the
/// property's current value with any dispatcher stripped
pub fn get_or_create_map<'a, A, R>(object: &'a Host<A, R>, key: &str) -> RefMut<'a, WrapperMap<A, R>> {
    let store = get_or_create_store(object);
    RefMut::map(store.borrow_mut(), |store| {
        store.maps.entry(key.to_string()).or_insert_with(|| {
            debug!("Creating wrapper map for {}", key);
            WrapperMap::new(unwrap(object, key))
        })
    })
}
