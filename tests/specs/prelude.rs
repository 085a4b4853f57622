//! Shared fixtures for the behavioral specs

use chrono::{DateTime, TimeZone, Utc};
use rlock_adapters::MemoryStore;
use rlock_core::{ConfigMap, Endpoints, FakeClock, LeaderElectionRecord, Lease, ObjectKey};
use rlock_election::{
    new_lock, ElectionConfig, LeaderElector, LockKind, LockStores, ResourceLock,
    ResourceLockConfig,
};
use std::time::Duration;

pub use rlock_election::LockKind::{ConfigMaps, Endpoints as EndpointsKind, Leases};

pub type Stores = LockStores<MemoryStore<ConfigMap>, MemoryStore<Endpoints>, MemoryStore<Lease>>;

pub const LEASE: Duration = Duration::from_secs(15);

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

pub fn key() -> ObjectKey {
    ObjectKey::new("kube-system", "controller")
}

pub fn stores() -> Stores {
    LockStores::in_memory()
}

pub fn lock(kind: LockKind, stores: &Stores, identity: &str) -> Box<dyn ResourceLock> {
    new_lock(kind, key(), stores, ResourceLockConfig::new(identity))
}

pub fn elector(
    kind: LockKind,
    stores: &Stores,
    identity: &str,
    clock: &FakeClock,
) -> LeaderElector<FakeClock> {
    LeaderElector::with_clock(
        lock(kind, stores, identity),
        ElectionConfig::default(),
        clock.clone(),
    )
    .unwrap()
}

/// Record a fresh holder writes at `at`
pub fn claim(holder: &str, at: DateTime<Utc>) -> LeaderElectionRecord {
    LeaderElectionRecord::acquired(holder, LEASE, at)
}

pub fn secs(n: i64) -> chrono::Duration {
    chrono::Duration::seconds(n)
}
