// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{LockState, ResourceLock, ResourceLockConfig};
use crate::error::LockError;
use async_trait::async_trait;
use rlock_adapters::ObjectStore;
use rlock_core::codec;
use rlock_core::{LeaderElectionRecord, Lease, LeaseSpec, ObjectKey, ObjectMeta, StoredObject};

/// Lock kept in the typed spec of a dedicated Lease object
///
/// The spec has no raw form of its own, so `get` reports the encoded record
/// as the raw bytes.
pub struct LeaseLock<S> {
    store: S,
    state: LockState<Lease>,
}

impl<S: ObjectStore<Lease>> LeaseLock<S> {
    pub fn new(key: ObjectKey, store: S, config: ResourceLockConfig) -> Self {
        Self {
            store,
            state: LockState::new(key, config),
        }
    }

    pub fn cached(&self) -> Option<&Lease> {
        self.state.cached.as_ref()
    }
}

#[async_trait]
impl<S: ObjectStore<Lease>> ResourceLock for LeaseLock<S> {
    async fn get(&mut self) -> Result<(LeaderElectionRecord, Vec<u8>), LockError> {
        let lease = self.store.get(&self.state.key).await?;
        let record = lease.spec.to_record();
        let raw = codec::encode(&record)?;
        self.state.cached = Some(lease);
        Ok((record, raw))
    }

    async fn create(&mut self, record: &LeaderElectionRecord) -> Result<(), LockError> {
        let mut lease = Lease::from_meta(ObjectMeta::new(
            self.state.key.namespace.clone(),
            self.state.key.name.clone(),
        ));
        lease.spec = LeaseSpec::from_record(record);

        let created = self.store.create(&lease).await?;
        self.state.cached = Some(created);
        Ok(())
    }

    async fn update(&mut self, record: &LeaderElectionRecord) -> Result<(), LockError> {
        let mut lease = self.state.cached()?.clone();
        lease.spec = LeaseSpec::from_record(record);

        let written = self.store.update(&lease).await;
        self.state.settle_update(written)
    }

    fn record_event(&self, message: &str) {
        self.state.record_event(message);
    }

    fn describe(&self) -> String {
        self.state.key.to_string()
    }

    fn identity(&self) -> &str {
        &self.state.config.identity
    }
}
