// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::sink::{EventSink, SinkError};
use crate::store::{ObjectStore, StoreError};
use async_trait::async_trait;
use rlock_core::{Event, ObjectKey, StoredObject};
use tracing::Instrument;

/// Wrapper that adds tracing to any ObjectStore
#[derive(Clone, Debug)]
pub struct TracedStore<S> {
    inner: S,
}

impl<S> TracedStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<T, S> ObjectStore<T> for TracedStore<S>
where
    T: StoredObject,
    S: ObjectStore<T>,
{
    async fn get(&self, key: &ObjectKey) -> Result<T, StoreError> {
        let span = tracing::debug_span!("store.get", kind = T::KIND, %key);
        let start = std::time::Instant::now();
        let result = self.inner.get(key).instrument(span.clone()).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        span.in_scope(|| match &result {
            Ok(obj) => tracing::debug!(
                version = %obj.meta().resource_version,
                elapsed_ms,
                "fetched"
            ),
            // Missing objects are an expected outcome before first create
            Err(StoreError::NotFound { .. }) => tracing::debug!(elapsed_ms, "not found"),
            Err(e) => tracing::warn!(elapsed_ms, error = %e, "get failed"),
        });

        result
    }

    async fn create(&self, obj: &T) -> Result<T, StoreError> {
        let key = obj.meta().key();
        let span = tracing::info_span!("store.create", kind = T::KIND, %key);
        let start = std::time::Instant::now();
        let result = self.inner.create(obj).instrument(span.clone()).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        span.in_scope(|| match &result {
            Ok(created) => tracing::info!(
                version = %created.meta().resource_version,
                elapsed_ms,
                "created"
            ),
            Err(StoreError::AlreadyExists { .. }) => {
                tracing::info!(elapsed_ms, "lost create race")
            }
            Err(e) => tracing::warn!(elapsed_ms, error = %e, "create failed"),
        });

        result
    }

    async fn update(&self, obj: &T) -> Result<T, StoreError> {
        let key = obj.meta().key();
        let span = tracing::debug_span!(
            "store.update",
            kind = T::KIND,
            %key,
            from_version = %obj.meta().resource_version
        );
        let start = std::time::Instant::now();
        let result = self.inner.update(obj).instrument(span.clone()).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        span.in_scope(|| match &result {
            Ok(updated) => tracing::debug!(
                version = %updated.meta().resource_version,
                elapsed_ms,
                "updated"
            ),
            Err(StoreError::Conflict { current, .. }) => {
                tracing::info!(elapsed_ms, current = %current, "lost update race")
            }
            Err(e) => tracing::warn!(elapsed_ms, error = %e, "update failed"),
        });

        result
    }
}

/// Wrapper that adds tracing to any EventSink
#[derive(Clone, Debug)]
pub struct TracedEventSink<K> {
    inner: K,
}

impl<K> TracedEventSink<K> {
    pub fn new(inner: K) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<K: EventSink> EventSink for TracedEventSink<K> {
    async fn create(&self, event: &Event) -> Result<Event, SinkError> {
        let result = self.inner.create(event).await;
        match &result {
            Ok(_) => tracing::trace!(name = %event.metadata.name, "event published"),
            Err(e) => tracing::debug!(name = %event.metadata.name, error = %e, "event publish failed"),
        }
        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
