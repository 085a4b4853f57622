// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event sink adapters
//!
//! Sinks are the far end of event publication. Callers treat them as
//! fire-and-forget: a failed publish is logged and dropped.

mod log;
mod store;

pub use log::TracingEventSink;
pub use store::StoreEventSink;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeEventSink, SinkBehavior};

use crate::store::StoreError;
use async_trait::async_trait;
use rlock_core::Event;
use thiserror::Error;

/// Errors from publishing an event
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SinkError {
    #[error("event rejected: {0}")]
    Rejected(String),
    #[error("event sink unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for SinkError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Transport(_) | StoreError::Timeout => {
                SinkError::Unavailable(err.to_string())
            }
            other => SinkError::Rejected(other.to_string()),
        }
    }
}

/// Destination for published events
#[async_trait]
pub trait EventSink: Send + Sync + 'static {
    /// Publish a new event
    async fn create(&self, event: &Event) -> Result<Event, SinkError>;
}
