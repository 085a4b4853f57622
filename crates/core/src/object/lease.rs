// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{ObjectMeta, StoredObject, TypeMeta};
use crate::record::LeaderElectionRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lease fields; a dedicated home for the election record
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaseSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holder_identity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lease_duration_seconds: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acquire_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renew_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lease_transitions: Option<i32>,
}

impl LeaseSpec {
    pub fn from_record(record: &LeaderElectionRecord) -> Self {
        Self {
            holder_identity: Some(record.holder_identity.clone()),
            lease_duration_seconds: Some(record.lease_duration_seconds),
            acquire_time: record.acquire_time,
            renew_time: record.renew_time,
            lease_transitions: Some(record.leader_transitions),
        }
    }

    /// Unset fields read as their zero value
    pub fn to_record(&self) -> LeaderElectionRecord {
        LeaderElectionRecord {
            holder_identity: self.holder_identity.clone().unwrap_or_default(),
            lease_duration_seconds: self.lease_duration_seconds.unwrap_or_default(),
            acquire_time: self.acquire_time,
            renew_time: self.renew_time,
            leader_transitions: self.lease_transitions.unwrap_or_default(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lease {
    #[serde(flatten)]
    pub type_meta: TypeMeta,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: LeaseSpec,
}

impl StoredObject for Lease {
    const KIND: &'static str = "Lease";
    const API_VERSION: &'static str = "coordination.k8s.io/v1";

    fn from_meta(meta: ObjectMeta) -> Self {
        Self {
            metadata: meta,
            ..Default::default()
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
