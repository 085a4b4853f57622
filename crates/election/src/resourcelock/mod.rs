// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource locks: a leader election record kept inside a stored object
//!
//! A lock reads and writes exactly one object. Every write carries the
//! version token of the object last read, so the store rejects writes based
//! on stale reads. Locks never retry; deciding what to do after a rejected
//! write belongs to the caller.

mod annotation;
mod lease;

pub use annotation::{AnnotatedObject, AnnotationLock, ConfigMapLock, EndpointsLock};
pub use lease::LeaseLock;

use crate::error::LockError;
use crate::recorder::EventRecorder;
use async_trait::async_trait;
use rlock_adapters::{MemoryStore, ObjectStore, StoreError};
use rlock_core::{
    ConfigMap, Endpoints, EventType, Lease, LeaderElectionRecord, ObjectKey, StoredObject,
    LEADER_ELECTION_REASON,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Read and conditionally write a leader election record
///
/// I/O methods take `&mut self`: one lock instance serves one control flow.
#[async_trait]
pub trait ResourceLock: Send + Sync {
    /// Read the current record and the raw bytes it was decoded from
    async fn get(&mut self) -> Result<(LeaderElectionRecord, Vec<u8>), LockError>;

    /// Create the lock object holding `record`
    async fn create(&mut self, record: &LeaderElectionRecord) -> Result<(), LockError>;

    /// Replace the record in the object last read or written
    async fn update(&mut self, record: &LeaderElectionRecord) -> Result<(), LockError>;

    /// Emit a best-effort event about this lock
    fn record_event(&self, message: &str);

    /// Human-readable location of the lock, `namespace/name`
    fn describe(&self) -> String;

    fn identity(&self) -> &str;
}

/// Settings shared by every lock implementation
#[derive(Clone, Debug)]
pub struct ResourceLockConfig {
    /// Unique name of this contender
    pub identity: String,
    pub event_recorder: Option<EventRecorder>,
}

impl ResourceLockConfig {
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            event_recorder: None,
        }
    }

    pub fn with_event_recorder(mut self, recorder: EventRecorder) -> Self {
        self.event_recorder = Some(recorder);
        self
    }
}

/// Which kind of object holds the record
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockKind {
    ConfigMaps,
    Endpoints,
    #[default]
    Leases,
}

impl LockKind {
    pub const ALL: [LockKind; 3] = [LockKind::ConfigMaps, LockKind::Endpoints, LockKind::Leases];

    pub fn as_str(&self) -> &'static str {
        match self {
            LockKind::ConfigMaps => "configmaps",
            LockKind::Endpoints => "endpoints",
            LockKind::Leases => "leases",
        }
    }
}

impl fmt::Display for LockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LockKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LockKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("invalid lock kind '{s}', expected configmaps, endpoints or leases"))
    }
}

/// One store per lockable object kind
#[derive(Clone, Debug)]
pub struct LockStores<C, E, L> {
    pub configmaps: C,
    pub endpoints: E,
    pub leases: L,
}

impl LockStores<MemoryStore<ConfigMap>, MemoryStore<Endpoints>, MemoryStore<Lease>> {
    pub fn in_memory() -> Self {
        Self {
            configmaps: MemoryStore::new(),
            endpoints: MemoryStore::new(),
            leases: MemoryStore::new(),
        }
    }
}

/// Build a lock of the given kind over the matching store
pub fn new_lock<C, E, L>(
    kind: LockKind,
    key: ObjectKey,
    stores: &LockStores<C, E, L>,
    config: ResourceLockConfig,
) -> Box<dyn ResourceLock>
where
    C: ObjectStore<ConfigMap>,
    E: ObjectStore<Endpoints>,
    L: ObjectStore<Lease>,
{
    match kind {
        LockKind::ConfigMaps => Box::new(ConfigMapLock::new(key, stores.configmaps.clone(), config)),
        LockKind::Endpoints => Box::new(EndpointsLock::new(key, stores.endpoints.clone(), config)),
        LockKind::Leases => Box::new(LeaseLock::new(key, stores.leases.clone(), config)),
    }
}

/// Process-local state every lock keeps next to its store
#[derive(Debug)]
struct LockState<T> {
    key: ObjectKey,
    config: ResourceLockConfig,
    /// Last object read or written; its version token guards the next update
    cached: Option<T>,
}

impl<T: StoredObject> LockState<T> {
    fn new(key: ObjectKey, config: ResourceLockConfig) -> Self {
        Self {
            key,
            config,
            cached: None,
        }
    }

    fn cached(&self) -> Result<&T, LockError> {
        self.cached
            .as_ref()
            .ok_or_else(|| LockError::NotInitialized(self.key.to_string()))
    }

    /// Cache the object a successful update returned.
    ///
    /// A stale-version rejection discards the cache so the next update must
    /// re-read first. Any other failure leaves it as it was.
    fn settle_update(&mut self, written: Result<T, StoreError>) -> Result<(), LockError> {
        match written.map_err(LockError::from) {
            Ok(updated) => {
                self.cached = Some(updated);
                Ok(())
            }
            Err(err @ LockError::Conflict(_)) => {
                tracing::debug!(lock = %self.key, "update rejected as stale, dropping cached object");
                self.cached = None;
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    fn record_event(&self, message: &str) {
        let Some(recorder) = &self.config.event_recorder else {
            return;
        };
        let Some(cached) = &self.cached else {
            tracing::debug!(lock = %self.key, message, "lock object not observed yet, skipping event");
            return;
        };

        // Bare subject so the reference carries the registered kind
        let subject = T::from_meta(cached.meta().clone());
        recorder.event(
            &subject,
            EventType::Normal.as_str(),
            LEADER_ELECTION_REASON,
            &format!("{} {}", self.config.identity, message),
        );
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
