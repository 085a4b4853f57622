// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process versioned store
//!
//! Backs every object with a monotonically increasing version counter and
//! enforces compare-and-swap on update. Clones share the same state, so one
//! store can be handed to many contenders.

use super::{ObjectStore, StoreError};
use async_trait::async_trait;
use rlock_core::{ObjectKey, StoredObject};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

#[derive(Debug)]
struct State<T> {
    objects: BTreeMap<ObjectKey, T>,
    version: u64,
}

impl<T> Default for State<T> {
    fn default() -> Self {
        Self {
            objects: BTreeMap::new(),
            version: 0,
        }
    }
}

impl<T> State<T> {
    fn next_version(&mut self) -> String {
        self.version += 1;
        self.version.to_string()
    }
}

/// Versioned in-memory store for one object kind
#[derive(Debug)]
pub struct MemoryStore<T> {
    state: Arc<Mutex<State<T>>>,
}

impl<T> Clone for MemoryStore<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
        }
    }
}

impl<T: StoredObject> MemoryStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current stored copy of an object, bypassing the adapter interface
    pub fn peek(&self, key: &ObjectKey) -> Option<T> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .objects
            .get(key)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .objects
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl<T: StoredObject> ObjectStore<T> for MemoryStore<T> {
    async fn get(&self, key: &ObjectKey) -> Result<T, StoreError> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state
            .objects
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::not_found::<T>(key.clone()))
    }

    async fn create(&self, obj: &T) -> Result<T, StoreError> {
        let key = obj.meta().key();
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        if state.objects.contains_key(&key) {
            return Err(StoreError::already_exists::<T>(key));
        }

        let version = state.next_version();
        let mut stored = obj.clone();
        let meta = stored.meta_mut();
        meta.uid = format!("uid-{}", version);
        meta.resource_version = version;

        state.objects.insert(key, stored.clone());
        Ok(stored)
    }

    async fn update(&self, obj: &T) -> Result<T, StoreError> {
        let key = obj.meta().key();
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        let current = match state.objects.get(&key) {
            Some(current) => current.meta().clone(),
            None => return Err(StoreError::not_found::<T>(key)),
        };

        // An update without a version token is never accepted
        if obj.meta().resource_version != current.resource_version {
            return Err(StoreError::Conflict {
                kind: T::KIND,
                key,
                current: current.resource_version,
                requested: obj.meta().resource_version.clone(),
            });
        }

        let version = state.next_version();
        let mut stored = obj.clone();
        let meta = stored.meta_mut();
        meta.uid = current.uid;
        meta.resource_version = version;

        state.objects.insert(key, stored.clone());
        Ok(stored)
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
