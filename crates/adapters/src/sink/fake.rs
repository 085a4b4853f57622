// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake event sink for testing
#![cfg_attr(coverage_nightly, coverage(off))]
#![allow(clippy::panic)]

use super::{EventSink, SinkError};
use async_trait::async_trait;
use rlock_core::Event;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How the fake sink reacts to a publish
#[derive(Debug, Clone, Default)]
pub enum SinkBehavior {
    /// Record the event and succeed
    #[default]
    Accept,
    /// Fail without recording
    Fail(SinkError),
    /// Panic inside the publish call
    Panic,
    /// Wait before recording
    Delay(Duration),
}

/// Fake event sink for testing
#[derive(Clone, Default)]
pub struct FakeEventSink {
    events: Arc<Mutex<Vec<Event>>>,
    behavior: Arc<Mutex<SinkBehavior>>,
}

impl FakeEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_behavior(behavior: SinkBehavior) -> Self {
        let sink = Self::default();
        sink.set_behavior(behavior);
        sink
    }

    pub fn set_behavior(&self, behavior: SinkBehavior) {
        *self.behavior.lock().unwrap_or_else(|e| e.into_inner()) = behavior;
    }

    /// Get all recorded events
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Poll until `count` events were recorded or `timeout` elapses
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> Vec<Event> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let events = self.events();
            if events.len() >= count || tokio::time::Instant::now() >= deadline {
                return events;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

#[async_trait]
impl EventSink for FakeEventSink {
    async fn create(&self, event: &Event) -> Result<Event, SinkError> {
        let behavior = self
            .behavior
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();

        match behavior {
            SinkBehavior::Accept => {}
            SinkBehavior::Fail(err) => return Err(err),
            SinkBehavior::Panic => panic!("fake event sink panicked"),
            SinkBehavior::Delay(delay) => tokio::time::sleep(delay).await,
        }

        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event.clone());
        Ok(event.clone())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
