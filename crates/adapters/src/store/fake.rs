// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake store for testing: records calls and injects failures
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{MemoryStore, ObjectStore, StoreError};
use async_trait::async_trait;
use rlock_core::{ObjectKey, StoredObject};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Recorded store call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Get { key: ObjectKey },
    Create { key: ObjectKey },
    Update { key: ObjectKey, version: String },
}

/// Store wrapper around [`MemoryStore`] with scripted failures and latency
#[derive(Debug)]
pub struct FakeStore<T> {
    inner: MemoryStore<T>,
    calls: Arc<Mutex<Vec<StoreCall>>>,
    failures: Arc<Mutex<VecDeque<StoreError>>>,
    latency: Arc<Mutex<Option<Duration>>>,
}

impl<T> Clone for FakeStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            calls: Arc::clone(&self.calls),
            failures: Arc::clone(&self.failures),
            latency: Arc::clone(&self.latency),
        }
    }
}

impl<T> Default for FakeStore<T> {
    fn default() -> Self {
        Self {
            inner: MemoryStore::default(),
            calls: Arc::default(),
            failures: Arc::default(),
            latency: Arc::default(),
        }
    }
}

impl<T: StoredObject> FakeStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share state with an existing memory store
    pub fn wrapping(inner: MemoryStore<T>) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    /// The shared backing store
    pub fn memory(&self) -> &MemoryStore<T> {
        &self.inner
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Fail the next call with `err` instead of reaching the store
    pub fn fail_next(&self, err: StoreError) {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(err);
    }

    /// Delay every call by `latency` before it reaches the store
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.lock().unwrap_or_else(|e| e.into_inner()) = latency;
    }

    async fn before_call(&self, call: StoreCall) -> Result<(), StoreError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);

        let latency = *self.latency.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let failure = self
            .failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl<T: StoredObject> ObjectStore<T> for FakeStore<T> {
    async fn get(&self, key: &ObjectKey) -> Result<T, StoreError> {
        self.before_call(StoreCall::Get { key: key.clone() }).await?;
        self.inner.get(key).await
    }

    async fn create(&self, obj: &T) -> Result<T, StoreError> {
        self.before_call(StoreCall::Create {
            key: obj.meta().key(),
        })
        .await?;
        self.inner.create(obj).await
    }

    async fn update(&self, obj: &T) -> Result<T, StoreError> {
        self.before_call(StoreCall::Update {
            key: obj.meta().key(),
            version: obj.meta().resource_version.clone(),
        })
        .await?;
        self.inner.update(obj).await
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
