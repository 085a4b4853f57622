//! Resource lock properties
//!
//! Writes race through the store's version check: one winner per version,
//! stale tokens are refused, and what is written reads back unchanged.

use crate::prelude::*;
use proptest::prelude::*;
use rlock_core::{codec, LeaderElectionRecord, ObjectMeta, StoredObject};
use rlock_election::{LockError, LockKind};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_have_one_winner() {
    for kind in LockKind::ALL {
        let stores = stores();
        let mut handles = Vec::new();
        for i in 0..8 {
            let mut contender = lock(kind, &stores, &format!("c{i}"));
            handles.push(tokio::spawn(async move {
                let record = claim(contender.identity(), t0());
                contender.create(&record).await
            }));
        }

        let mut winners = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => winners += 1,
                Err(LockError::AlreadyExists(_)) => {}
                Err(e) => panic!("{kind}: unexpected error {e:?}"),
            }
        }
        assert_eq!(winners, 1, "{kind}");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_updates_from_one_version_have_one_winner() {
    for kind in LockKind::ALL {
        let stores = stores();
        lock(kind, &stores, "setup")
            .create(&LeaderElectionRecord::default())
            .await
            .unwrap();

        let mut contenders = Vec::new();
        for i in 0..8 {
            let mut contender = lock(kind, &stores, &format!("c{i}"));
            contender.get().await.unwrap();
            contenders.push(contender);
        }

        let handles: Vec<_> = contenders
            .into_iter()
            .map(|mut contender| {
                tokio::spawn(async move {
                    let record = claim(contender.identity(), t0());
                    contender.update(&record).await
                })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => winners += 1,
                Err(LockError::Conflict(_)) => {}
                Err(e) => panic!("{kind}: unexpected error {e:?}"),
            }
        }
        assert_eq!(winners, 1, "{kind}");
    }
}

#[tokio::test]
async fn stale_token_never_overwrites() {
    for kind in LockKind::ALL {
        let stores = stores();
        let mut a = lock(kind, &stores, "A");
        let mut b = lock(kind, &stores, "B");
        a.create(&claim("A", t0())).await.unwrap();
        b.get().await.unwrap();

        // A renews twice; B's token is now two writes behind
        a.update(&claim("A", t0()).successor("A", LEASE, t0() + secs(2)))
            .await
            .unwrap();
        a.update(&claim("A", t0()).successor("A", LEASE, t0() + secs(4)))
            .await
            .unwrap();

        let err = b
            .update(&claim("A", t0()).successor("B", LEASE, t0() + secs(30)))
            .await
            .unwrap_err();
        assert!(matches!(err, LockError::Conflict(_)), "{kind}: {err:?}");

        let (current, _) = b.get().await.unwrap();
        assert_eq!(current.holder_identity, "A");
        assert_eq!(current.renew_time, Some(t0() + secs(4)));
    }
}

#[tokio::test]
async fn absent_record_reads_as_zero_value() {
    let stores = stores();
    let mut reader = lock(Leases, &stores, "reader");
    // A lease object created by someone else with an empty spec
    rlock_adapters::ObjectStore::create(
        &stores.leases,
        &rlock_core::Lease::from_meta(ObjectMeta::new(key().namespace, key().name)),
    )
    .await
    .unwrap();

    let (record, _) = reader.get().await.unwrap();

    assert_eq!(record, LeaderElectionRecord::default());
    assert!(record.is_expired(t0()));
}

fn holder() -> impl Strategy<Value = String> {
    prop_oneof![Just("A".to_string()), Just("B".to_string()), Just("C".to_string())]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn written_records_read_back(holder in "[a-z0-9-]{1,24}", offset in 0i64..1_000_000, transitions in 0i32..1000) {
        let record = LeaderElectionRecord {
            leader_transitions: transitions,
            ..claim(&holder, t0() + secs(offset))
        };
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();

        for kind in LockKind::ALL {
            let (read, raw) = runtime.block_on(async {
                let stores = stores();
                let mut writer = lock(kind, &stores, &holder);
                writer.create(&record).await.unwrap();
                lock(kind, &stores, "reader").get().await.unwrap()
            });
            prop_assert_eq!(&read, &record);
            prop_assert_eq!(codec::decode(&raw).unwrap(), record.clone());
        }
    }

    #[test]
    fn transitions_count_holder_changes(holders in proptest::collection::vec(holder(), 1..20)) {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let written = runtime.block_on(async {
            let stores = stores();
            let mut writer = lock(Leases, &stores, "writer");
            let mut written = vec![claim(&holders[0], t0())];
            writer.create(&written[0]).await.unwrap();

            for (i, next) in holders.iter().enumerate().skip(1) {
                let (current, _) = writer.get().await.unwrap();
                let record = current.successor(next, LEASE, t0() + secs(i as i64 * 20));
                writer.update(&record).await.unwrap();
                written.push(record);
            }
            written
        });

        for pair in written.windows(2) {
            let changed = pair[0].holder_identity != pair[1].holder_identity;
            let delta = pair[1].leader_transitions - pair[0].leader_transitions;
            prop_assert_eq!(delta, i32::from(changed));
            prop_assert!(pair[1].validate().is_ok());
        }
    }
}
