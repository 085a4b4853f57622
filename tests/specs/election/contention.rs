//! Elector contention specs
//!
//! Several electors share one lock and one clock. At every step at most one
//! of them may believe it leads, and leadership moves only on expiry or
//! release.

use crate::prelude::*;
use rlock_core::FakeClock;
use rlock_election::{LeaderElector, LockKind};
use std::time::Duration;

async fn round(electors: &mut [LeaderElector<FakeClock>]) -> Vec<bool> {
    let mut won = Vec::with_capacity(electors.len());
    for elector in electors.iter_mut() {
        won.push(elector.try_acquire_or_renew().await.unwrap());
    }
    won
}

fn leaders(electors: &[LeaderElector<FakeClock>]) -> Vec<String> {
    electors
        .iter()
        .filter(|e| e.is_leader())
        .map(|e| e.identity().to_string())
        .collect()
}

#[tokio::test]
async fn one_leader_while_it_keeps_renewing() {
    for kind in LockKind::ALL {
        let stores = stores();
        let clock = FakeClock::at(t0());
        let mut electors: Vec<_> = ["a", "b", "c"]
            .into_iter()
            .map(|id| elector(kind, &stores, id, &clock))
            .collect();

        for _ in 0..10 {
            let won = round(&mut electors).await;
            assert_eq!(won, vec![true, false, false], "{kind}");
            assert_eq!(leaders(&electors), vec!["a".to_string()], "{kind}");
            clock.advance(Duration::from_secs(2));
        }
    }
}

#[tokio::test]
async fn leadership_moves_when_the_leader_goes_silent() {
    let stores = stores();
    let clock = FakeClock::at(t0());
    let mut a = elector(Leases, &stores, "a", &clock);
    let mut b = elector(Leases, &stores, "b", &clock);

    assert!(a.try_acquire_or_renew().await.unwrap());

    // a stops renewing; b keeps trying every two seconds
    let mut elapsed = 0;
    while !b.try_acquire_or_renew().await.unwrap() {
        clock.advance(Duration::from_secs(2));
        elapsed += 2;
        assert!(elapsed <= 16, "b never took over");
    }
    assert!(elapsed >= 15, "took over a live lease after {elapsed}s");

    let record = b.observed_record().unwrap().clone();
    assert_eq!(record.holder_identity, "b");
    assert_eq!(record.leader_transitions, 1);

    // a comes back and finds it has lost
    assert!(!a.try_acquire_or_renew().await.unwrap());
    assert_eq!(leaders(&[a, b]), vec!["b".to_string()]);
}

#[tokio::test]
async fn released_lock_is_taken_immediately() {
    let stores = stores();
    let clock = FakeClock::at(t0());
    let mut a = elector(ConfigMaps, &stores, "a", &clock);
    let mut b = elector(ConfigMaps, &stores, "b", &clock);

    assert!(a.try_acquire_or_renew().await.unwrap());
    assert!(!b.try_acquire_or_renew().await.unwrap());

    a.release().await.unwrap();
    assert!(b.try_acquire_or_renew().await.unwrap());

    let record = b.observed_record().unwrap();
    assert_eq!(record.holder_identity, "b");
    // A released lock has no prior holder, so this is not a transition
    assert_eq!(record.leader_transitions, 0);
    assert_eq!(record.acquire_time, Some(t0()));
}
