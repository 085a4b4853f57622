// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Best-effort publication of leader election events
//!
//! Recording never blocks and never fails from the caller's point of view.
//! Events go onto a bounded queue drained by one background worker, which
//! publishes each event on its own detached task so a misbehaving sink can
//! only lose that event. A hung publish holds one of a bounded number of
//! in-flight slots and never delays the events behind it.

use rlock_adapters::{EventSink, SinkError};
use rlock_core::{
    Clock, Event, EventDetails, EventSource, EventType, ObjectReference, StoredObject, SystemClock,
};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::{JoinError, JoinSet};

/// Queue depth used by [`EventRecorder::new`]
pub const DEFAULT_QUEUE_CAPACITY: usize = 1000;

/// Publishes allowed to run at once; further events wait in the queue
const MAX_IN_FLIGHT_PUBLISHES: usize = 64;

/// Cloneable handle for recording events against stored objects
#[derive(Clone, Debug)]
pub struct EventRecorder {
    tx: Option<mpsc::Sender<Event>>,
    source: EventSource,
}

impl EventRecorder {
    pub fn new<K: EventSink>(sink: K, source: EventSource) -> Self {
        Self::with_capacity(sink, source, DEFAULT_QUEUE_CAPACITY)
    }

    /// Start a recorder whose queue holds at most `capacity` pending events.
    ///
    /// Must be called inside a Tokio runtime to do anything useful; outside
    /// one the recorder is built disabled and drops every event.
    pub fn with_capacity<K: EventSink>(sink: K, source: EventSource, capacity: usize) -> Self {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                tracing::warn!(
                    controller = %source.controller,
                    "no async runtime available, leader election events will be dropped"
                );
                return Self::disabled(source);
            }
        };

        let (tx, rx) = mpsc::channel(capacity.max(1));
        let sink: Arc<dyn EventSink> = Arc::new(sink);
        handle.spawn(publish_events(rx, sink));

        Self {
            tx: Some(tx),
            source,
        }
    }

    /// A recorder that drops everything
    pub fn disabled(source: EventSource) -> Self {
        Self { tx: None, source }
    }

    pub fn is_enabled(&self) -> bool {
        self.tx.as_ref().is_some_and(|tx| !tx.is_closed())
    }

    pub fn source(&self) -> &EventSource {
        &self.source
    }

    /// Record an event about `regarding`
    pub fn event<T: StoredObject>(&self, regarding: &T, event_type: &str, reason: &str, note: &str) {
        self.event_with_related::<T, T>(regarding, None, event_type, reason, "", note);
    }

    /// Record an event about `regarding`, optionally pointing at a second object
    pub fn event_with_related<T: StoredObject, R: StoredObject>(
        &self,
        regarding: &T,
        related: Option<&R>,
        event_type: &str,
        reason: &str,
        action: &str,
        note: &str,
    ) {
        let regarding = match ObjectReference::for_object(regarding) {
            Ok(reference) => reference,
            Err(e) => {
                tracing::error!(error = %e, reason, note, "could not reference event subject, dropping event");
                return;
            }
        };

        let related = related.and_then(|obj| match ObjectReference::for_object(obj) {
            Ok(reference) => Some(reference),
            Err(e) => {
                tracing::debug!(error = %e, "could not reference related object, omitting it");
                None
            }
        });

        let event_type = match event_type.parse::<EventType>() {
            Ok(event_type) => event_type,
            Err(e) => {
                tracing::error!(error = %e, reason, note, "dropping event");
                return;
            }
        };

        let details = EventDetails {
            event_type,
            reason: reason.to_string(),
            action: action.to_string(),
            note: note.to_string(),
        };
        let event = Event::new(regarding, related, details, &self.source, SystemClock.now());
        self.enqueue(event);
    }

    fn enqueue(&self, event: Event) {
        let Some(tx) = &self.tx else {
            tracing::warn!(name = %event.metadata.name, "event recorder disabled, dropping event");
            return;
        };

        match tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                tracing::warn!(name = %event.metadata.name, "event queue full, dropping event")
            }
            Err(TrySendError::Closed(event)) => {
                tracing::warn!(name = %event.metadata.name, "event publisher stopped, dropping event")
            }
        }
    }
}

async fn publish_events(mut rx: mpsc::Receiver<Event>, sink: Arc<dyn EventSink>) {
    let mut in_flight = JoinSet::new();
    loop {
        tokio::select! {
            Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => log_publish(joined),
            event = rx.recv(), if in_flight.len() < MAX_IN_FLIGHT_PUBLISHES => {
                let Some(event) = event else { break };
                let sink = Arc::clone(&sink);
                in_flight.spawn(async move {
                    let name = event.metadata.name.clone();
                    (name, sink.create(&event).await)
                });
            }
        }
    }
    tracing::debug!(pending = in_flight.len(), "event queue closed");

    while let Some(joined) = in_flight.join_next().await {
        log_publish(joined);
    }
}

fn log_publish(joined: Result<(String, Result<Event, SinkError>), JoinError>) {
    match joined {
        Ok((name, Ok(_))) => tracing::trace!(%name, "event published"),
        Ok((name, Err(e))) => tracing::warn!(%name, error = %e, "failed to publish event"),
        Err(e) if e.is_panic() => tracing::error!("event publisher panicked"),
        Err(e) => tracing::debug!(error = %e, "event publish cancelled"),
    }
}

#[cfg(test)]
#[path = "recorder_tests.rs"]
mod tests;
