// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event sink that writes events as objects into a versioned store

use super::{EventSink, SinkError};
use crate::store::ObjectStore;
use async_trait::async_trait;
use rlock_core::Event;

/// Persists each event through an [`ObjectStore`] for `Event`s
#[derive(Clone, Debug)]
pub struct StoreEventSink<S> {
    store: S,
}

impl<S> StoreEventSink<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: ObjectStore<Event>> EventSink for StoreEventSink<S> {
    async fn create(&self, event: &Event) -> Result<Event, SinkError> {
        Ok(self.store.create(event).await?)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
