// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Observability events describing leadership transitions

use crate::object::{ObjectMeta, StoredObject, TypeMeta};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Namespace used for events whose subject has none
pub const DEFAULT_NAMESPACE: &str = "default";

/// Reason attached to every leader election event
pub const LEADER_ELECTION_REASON: &str = "LeaderElection";

/// Severity of an event; the set is closed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    Normal,
    Warning,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Normal => "Normal",
            EventType::Warning => "Warning",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported event type: '{0}'")]
pub struct UnsupportedEventType(pub String);

impl FromStr for EventType {
    type Err = UnsupportedEventType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Normal" => Ok(EventType::Normal),
            "Warning" => Ok(EventType::Warning),
            other => Err(UnsupportedEventType(other.to_string())),
        }
    }
}

/// Why a reference to an object could not be built
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("object has no name")]
    MissingName,
    #[error("object has no kind")]
    MissingKind,
}

/// Enough information to locate the object an event is about
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectReference {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uid: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resource_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub field_path: String,
}

impl ObjectReference {
    /// Reference a stored object, using its registered kind if it carries none
    pub fn for_object<T: StoredObject>(obj: &T) -> Result<Self, ReferenceError> {
        Self::from_parts(&obj.resolved_type_meta(), obj.meta())
    }

    pub fn from_parts(type_meta: &TypeMeta, meta: &ObjectMeta) -> Result<Self, ReferenceError> {
        if type_meta.kind.is_empty() {
            return Err(ReferenceError::MissingKind);
        }
        if meta.name.is_empty() {
            return Err(ReferenceError::MissingName);
        }
        Ok(Self {
            kind: type_meta.kind.clone(),
            namespace: meta.namespace.clone(),
            name: meta.name.clone(),
            uid: meta.uid.clone(),
            api_version: type_meta.api_version.clone(),
            resource_version: meta.resource_version.clone(),
            field_path: String::new(),
        })
    }
}

/// A published event
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(flatten)]
    pub type_meta: TypeMeta,
    #[serde(default)]
    pub metadata: ObjectMeta,
    pub event_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reporting_controller: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reporting_instance: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub action: String,
    pub reason: String,
    pub regarding: ObjectReference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related: Option<ObjectReference>,
    pub note: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
}

/// Fields of an event that the caller chooses
#[derive(Clone, Debug)]
pub struct EventDetails {
    pub event_type: EventType,
    pub reason: String,
    pub action: String,
    pub note: String,
}

/// Who is reporting events
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventSource {
    pub controller: String,
    pub instance: String,
}

impl Event {
    /// Build an event about `regarding`.
    ///
    /// The name is unique per subject and timestamp; the namespace follows the
    /// subject, or [`DEFAULT_NAMESPACE`] when the subject has none.
    pub fn new(
        regarding: ObjectReference,
        related: Option<ObjectReference>,
        details: EventDetails,
        source: &EventSource,
        now: DateTime<Utc>,
    ) -> Self {
        let nanos = now
            .timestamp_nanos_opt()
            .unwrap_or_else(|| now.timestamp_micros().saturating_mul(1000));
        let namespace = if regarding.namespace.is_empty() {
            DEFAULT_NAMESPACE.to_string()
        } else {
            regarding.namespace.clone()
        };

        Self {
            type_meta: TypeMeta::new(Self::KIND, Self::API_VERSION),
            metadata: ObjectMeta::new(namespace, format!("{}.{:x}", regarding.name, nanos)),
            event_time: now,
            reporting_controller: source.controller.clone(),
            reporting_instance: source.instance.clone(),
            action: details.action,
            reason: details.reason,
            regarding,
            related,
            note: details.note,
            event_type: details.event_type,
        }
    }
}

impl StoredObject for Event {
    const KIND: &'static str = "Event";
    const API_VERSION: &'static str = "events.k8s.io/v1";

    /// Placeholder event for a bare metadata shell
    fn from_meta(meta: ObjectMeta) -> Self {
        Self {
            type_meta: TypeMeta::new(Self::KIND, Self::API_VERSION),
            metadata: meta,
            event_time: DateTime::<Utc>::UNIX_EPOCH,
            reporting_controller: String::new(),
            reporting_instance: String::new(),
            action: String::new(),
            reason: String::new(),
            regarding: ObjectReference::default(),
            related: None,
            note: String::new(),
            event_type: EventType::Normal,
        }
    }

    fn meta(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }

    fn type_meta(&self) -> &TypeMeta {
        &self.type_meta
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
