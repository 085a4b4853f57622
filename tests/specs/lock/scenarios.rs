//! Resource lock scenarios
//!
//! One contender creates the lock, another respects the live lease, takes
//! over once it expires, and both survive a hostile store and event sink.

use crate::prelude::*;
use rlock_adapters::{FakeEventSink, SinkBehavior, SinkError};
use rlock_core::{EventSource, LeaderElectionRecord, StoredObject, LEADER_ANNOTATION_KEY};
use rlock_election::{new_lock, EventRecorder, LockError, LockKind, ResourceLockConfig};
use std::time::{Duration, Instant};

#[tokio::test]
async fn first_contender_creates_the_lock() {
    for kind in LockKind::ALL {
        let stores = stores();
        let mut a = lock(kind, &stores, "A");

        assert!(matches!(a.get().await, Err(LockError::NotFound(_))), "{kind}");

        a.create(&claim("A", t0())).await.unwrap();

        let (record, _) = a.get().await.unwrap();
        assert_eq!(record.holder_identity, "A", "{kind}");
        assert_eq!(record.leader_transitions, 0, "{kind}");
    }
}

#[tokio::test]
async fn live_lease_is_left_alone() {
    for kind in LockKind::ALL {
        let stores = stores();
        let mut a = lock(kind, &stores, "A");
        a.create(&claim("A", t0())).await.unwrap();

        let mut b = lock(kind, &stores, "B");
        let (record, _) = b.get().await.unwrap();
        let now = t0() + secs(5);

        // B sees an unexpired foreign claim and writes nothing
        assert!(record.has_holder());
        assert!(!record.is_held_by("B"));
        assert!(!record.is_expired(now), "{kind}");

        let (unchanged, _) = a.get().await.unwrap();
        assert_eq!(unchanged, claim("A", t0()));
    }
}

#[tokio::test]
async fn expired_lease_is_taken_over_and_stale_holder_rejected() {
    for kind in LockKind::ALL {
        let stores = stores();
        let mut a = lock(kind, &stores, "A");
        a.create(&claim("A", t0())).await.unwrap();
        // A read the lock before B takes it over
        a.get().await.unwrap();

        let mut b = lock(kind, &stores, "B");
        let (old, _) = b.get().await.unwrap();
        let now = t0() + secs(20);
        assert!(old.is_expired(now));

        let takeover = old.successor("B", LEASE, now);
        assert_eq!(takeover.leader_transitions, old.leader_transitions + 1);
        b.update(&takeover).await.unwrap();

        let renewal = old.successor("A", LEASE, now);
        let err = a.update(&renewal).await.unwrap_err();
        assert!(matches!(err, LockError::Conflict(_)), "{kind}: {err:?}");

        let (current, _) = b.get().await.unwrap();
        assert_eq!(current.holder_identity, "B");
        assert_eq!(current.leader_transitions, 1);
    }
}

#[tokio::test]
async fn record_event_returns_immediately_whatever_the_sink_does() {
    let behaviors = [
        SinkBehavior::Delay(Duration::from_secs(60)),
        SinkBehavior::Fail(SinkError::Unavailable("sink down".to_string())),
        SinkBehavior::Panic,
    ];

    for behavior in behaviors {
        let sink = FakeEventSink::with_behavior(behavior.clone());
        let recorder = EventRecorder::new(sink.clone(), EventSource::default());
        let stores = stores();
        let mut b = new_lock(
            Leases,
            key(),
            &stores,
            ResourceLockConfig::new("B").with_event_recorder(recorder),
        );
        b.create(&claim("B", t0())).await.unwrap();

        let started = Instant::now();
        for _ in 0..100 {
            b.record_event("became leader");
        }

        assert!(
            started.elapsed() < Duration::from_secs(1),
            "record_event blocked with {behavior:?}"
        );
        // The lock keeps working after the sink misbehaves
        tokio::time::sleep(Duration::from_millis(20)).await;
        b.get().await.unwrap();
    }
}

#[tokio::test]
async fn malformed_record_reads_as_zero_value() {
    for kind in [ConfigMaps, EndpointsKind] {
        let stores = stores();
        let mut setup = lock(kind, &stores, "setup");
        setup.create(&claim("setup", t0())).await.unwrap();

        // Corrupt the stored annotation behind the lock's back
        match kind {
            ConfigMaps => {
                let mut obj = stores.configmaps.peek(&key()).unwrap();
                obj.meta_mut().set_annotation(LEADER_ANNOTATION_KEY, "\u{0}garbage");
                rlock_adapters::ObjectStore::update(&stores.configmaps, &obj).await.unwrap();
            }
            _ => {
                let mut obj = stores.endpoints.peek(&key()).unwrap();
                obj.meta_mut().set_annotation(LEADER_ANNOTATION_KEY, "\u{0}garbage");
                rlock_adapters::ObjectStore::update(&stores.endpoints, &obj).await.unwrap();
            }
        }

        let mut reader = lock(kind, &stores, "reader");
        let (record, raw) = reader.get().await.unwrap();

        assert_eq!(record, LeaderElectionRecord::default(), "{kind}");
        assert_eq!(raw, "\u{0}garbage".as_bytes());
    }
}
