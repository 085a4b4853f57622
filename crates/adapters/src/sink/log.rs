// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event sink that writes events to the tracing log

use super::{EventSink, SinkError};
use async_trait::async_trait;
use rlock_core::{Event, EventType};

/// Logs each event; Warning events are logged at warn level
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingEventSink;

impl TracingEventSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventSink for TracingEventSink {
    async fn create(&self, event: &Event) -> Result<Event, SinkError> {
        let subject = format!(
            "{}/{}/{}",
            event.regarding.kind, event.regarding.namespace, event.regarding.name
        );
        match event.event_type {
            EventType::Normal => tracing::info!(
                target: "rlock::events",
                subject,
                reason = %event.reason,
                "{}",
                event.note
            ),
            EventType::Warning => tracing::warn!(
                target: "rlock::events",
                subject,
                reason = %event.reason,
                "{}",
                event.note
            ),
        }
        Ok(event.clone())
    }
}
