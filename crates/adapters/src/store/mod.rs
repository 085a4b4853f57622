// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Versioned object store adapters
//!
//! The store is the single arbiter of write ordering: every `update` carries
//! the version token the caller last saw, and the store rejects it if another
//! write landed in between.

mod memory;

pub use memory::MemoryStore;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeStore, StoreCall};

use async_trait::async_trait;
use rlock_core::{ObjectKey, StoredObject};
use thiserror::Error;

/// Errors from store operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("{kind} {key} not found")]
    NotFound { kind: &'static str, key: ObjectKey },
    #[error("{kind} {key} already exists")]
    AlreadyExists { kind: &'static str, key: ObjectKey },
    #[error("conflict writing {kind} {key}: object is at version {current}, write was based on {requested:?}")]
    Conflict {
        kind: &'static str,
        key: ObjectKey,
        current: String,
        requested: String,
    },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("store request timed out")]
    Timeout,
}

impl StoreError {
    pub fn not_found<T: StoredObject>(key: ObjectKey) -> Self {
        StoreError::NotFound { kind: T::KIND, key }
    }

    pub fn already_exists<T: StoredObject>(key: ObjectKey) -> Self {
        StoreError::AlreadyExists { kind: T::KIND, key }
    }
}

/// Typed, namespace-scoped access to one kind of object
#[async_trait]
pub trait ObjectStore<T: StoredObject>: Clone + Send + Sync + 'static {
    /// Fetch the object with the given key
    async fn get(&self, key: &ObjectKey) -> Result<T, StoreError>;

    /// Create a new object; fails if one with the same key exists
    async fn create(&self, obj: &T) -> Result<T, StoreError>;

    /// Replace an object, guarded by its `resource_version`
    async fn update(&self, obj: &T) -> Result<T, StoreError>;
}
