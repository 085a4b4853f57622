// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rlock-core: data model for resource-lock leader election
//!
//! This crate provides:
//! - The leader election record and its invariants
//! - The JSON codec used to embed the record in stored objects
//! - Typed stored objects (ConfigMap, Endpoints, Lease, Event)
//! - Clock and identity abstractions

pub mod clock;
pub mod codec;
pub mod event;
pub mod id;
pub mod object;
pub mod record;

pub use clock::{Clock, FakeClock, SystemClock};
pub use codec::{MalformedRecord, LEADER_ANNOTATION_KEY};
pub use event::{
    Event, EventDetails, EventSource, EventType, ObjectReference, ReferenceError,
    UnsupportedEventType, LEADER_ELECTION_REASON,
};
pub use id::{HostUuidIdGen, IdGen, SequentialIdGen};
pub use object::{
    ConfigMap, Endpoints, Lease, LeaseSpec, ObjectKey, ObjectMeta, StoredObject, TypeMeta,
};
pub use record::{InvalidRecord, LeaderElectionRecord};
