// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Locks that keep the record in an annotation of a general-purpose object

use super::{LockState, ResourceLock, ResourceLockConfig};
use crate::error::LockError;
use async_trait::async_trait;
use rlock_adapters::ObjectStore;
use rlock_core::codec;
use rlock_core::{
    ConfigMap, Endpoints, LeaderElectionRecord, ObjectKey, ObjectMeta, StoredObject,
    LEADER_ANNOTATION_KEY,
};

/// Objects whose annotations may carry the leader election record
pub trait AnnotatedObject: StoredObject {}

impl AnnotatedObject for ConfigMap {}
impl AnnotatedObject for Endpoints {}

/// Lock stored under [`LEADER_ANNOTATION_KEY`]; every other field of the
/// object is carried through writes unchanged
pub struct AnnotationLock<T, S> {
    store: S,
    state: LockState<T>,
}

pub type ConfigMapLock<S> = AnnotationLock<ConfigMap, S>;
pub type EndpointsLock<S> = AnnotationLock<Endpoints, S>;

impl<T, S> AnnotationLock<T, S>
where
    T: AnnotatedObject,
    S: ObjectStore<T>,
{
    pub fn new(key: ObjectKey, store: S, config: ResourceLockConfig) -> Self {
        Self {
            store,
            state: LockState::new(key, config),
        }
    }

    /// Object last read or written, if any
    pub fn cached(&self) -> Option<&T> {
        self.state.cached.as_ref()
    }
}

#[async_trait]
impl<T, S> ResourceLock for AnnotationLock<T, S>
where
    T: AnnotatedObject,
    S: ObjectStore<T>,
{
    async fn get(&mut self) -> Result<(LeaderElectionRecord, Vec<u8>), LockError> {
        let obj = self.store.get(&self.state.key).await?;
        let raw = obj
            .meta()
            .annotation(LEADER_ANNOTATION_KEY)
            .map(|value| value.as_bytes().to_vec())
            .unwrap_or_default();
        self.state.cached = Some(obj);

        // A garbled annotation counts as no claim; the next update overwrites it
        let record = codec::decode(&raw).unwrap_or_else(|e| {
            tracing::warn!(lock = %self.state.key, kind = T::KIND, error = %e, "ignoring malformed leader election record");
            LeaderElectionRecord::default()
        });
        Ok((record, raw))
    }

    async fn create(&mut self, record: &LeaderElectionRecord) -> Result<(), LockError> {
        let mut obj = T::from_meta(ObjectMeta::new(
            self.state.key.namespace.clone(),
            self.state.key.name.clone(),
        ));
        obj.meta_mut()
            .set_annotation(LEADER_ANNOTATION_KEY, codec::encode_string(record)?);

        let created = self.store.create(&obj).await?;
        self.state.cached = Some(created);
        Ok(())
    }

    async fn update(&mut self, record: &LeaderElectionRecord) -> Result<(), LockError> {
        let mut obj = self.state.cached()?.clone();
        obj.meta_mut()
            .set_annotation(LEADER_ANNOTATION_KEY, codec::encode_string(record)?);

        let written = self.store.update(&obj).await;
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
