// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Leader elector: drives a [`ResourceLock`] through acquire and renew loops
//!
//! A successful conditional write is the only proof of leadership. The
//! elector never assumes it still leads because of elapsed time alone: it
//! steps down as soon as renewals stop succeeding within the renew deadline.

use crate::config::ElectionConfig;
use crate::error::{ConfigError, ElectionError, LockError};
use crate::resourcelock::ResourceLock;
use chrono::{DateTime, Utc};
use rlock_core::codec;
use rlock_core::{Clock, LeaderElectionRecord, SystemClock};
use std::future::Future;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;

/// Leadership transitions reported by [`LeaderElector::run`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LeadershipChange {
    /// This contender now holds the lock
    StartedLeading,
    /// This contender no longer holds the lock
    StoppedLeading,
    /// The lock is held by a different identity than last observed
    NewLeader(String),
}

/// Why [`LeaderElector::run`] returned
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunExit {
    Shutdown,
    LostLeadership,
}

/// Last record seen, and when this process saw it change
#[derive(Clone, Debug)]
struct Observation {
    record: LeaderElectionRecord,
    raw: Vec<u8>,
    at: DateTime<Utc>,
}

pub struct LeaderElector<C: Clock = SystemClock> {
    lock: Box<dyn ResourceLock>,
    config: ElectionConfig,
    clock: C,
    observed: Option<Observation>,
    reported_leader: Option<String>,
    changes: Option<mpsc::Sender<LeadershipChange>>,
}

impl LeaderElector<SystemClock> {
    pub fn new(lock: Box<dyn ResourceLock>, config: ElectionConfig) -> Result<Self, ElectionError> {
        Self::with_clock(lock, config, SystemClock)
    }
}

impl<C: Clock> LeaderElector<C> {
    pub fn with_clock(
        lock: Box<dyn ResourceLock>,
        config: ElectionConfig,
        clock: C,
    ) -> Result<Self, ElectionError> {
        config.validate()?;
        if lock.identity().is_empty() {
            return Err(ConfigError::Invalid("lock identity must not be empty".to_string()).into());
        }

        Ok(Self {
            lock,
            config,
            clock,
            observed: None,
            reported_leader: None,
            changes: None,
        })
    }

    pub fn identity(&self) -> &str {
        self.lock.identity()
    }

    pub fn describe(&self) -> String {
        self.lock.describe()
    }

    pub fn config(&self) -> &ElectionConfig {
        &self.config
    }

    /// Whether the last observed record names this contender
    pub fn is_leader(&self) -> bool {
        self.observed
            .as_ref()
            .is_some_and(|o| o.record.is_held_by(self.lock.identity()))
    }

    /// Holder of the last observed record, if anyone holds it
    pub fn leader(&self) -> Option<&str> {
        self.observed
            .as_ref()
            .filter(|o| o.record.has_holder())
            .map(|o| o.record.holder_identity.as_str())
    }

    pub fn observed_record(&self) -> Option<&LeaderElectionRecord> {
        self.observed.as_ref().map(|o| &o.record)
    }

    /// Health check for a leader process.
    ///
    /// A leader whose last observed record is older than its lease plus
    /// `tolerance` is stuck and reports unhealthy. Non-leaders are healthy.
    pub fn is_healthy(&self, tolerance: Duration) -> bool {
        let Some(observed) = self.observed.as_ref().filter(|_| self.is_leader()) else {
            return true;
        };
        let allowed = self.config.lease_duration.saturating_add(tolerance);
        let deadline = chrono::Duration::from_std(allowed)
            .ok()
            .and_then(|allowed| observed.at.checked_add_signed(allowed));
        match deadline {
            Some(deadline) => deadline > self.clock.now(),
            None => true,
        }
    }

    /// Run one acquire-or-renew round.
    ///
    /// Returns `Ok(true)` when this contender wrote the record and holds the
    /// lock, `Ok(false)` when someone else holds it or a concurrent writer
    /// won. Transport failures and timeouts are returned as errors.
    pub async fn try_acquire_or_renew(&mut self) -> Result<bool, ElectionError> {
        let now = self.clock.now();
        let identity = self.lock.identity().to_string();
        let lock_name = self.lock.describe();
        let timeout = self.config.request_timeout;

        let (current, raw) = match bounded(timeout, "get", &lock_name, self.lock.get()).await {
            Ok(found) => found,
            Err(ElectionError::Lock(LockError::NotFound(_))) => {
                let record =
                    LeaderElectionRecord::acquired(&identity, self.config.lease_duration, now);
                match bounded(timeout, "create", &lock_name, self.lock.create(&record)).await {
                    Ok(()) => {}
                    Err(ElectionError::Lock(e)) if e.is_recoverable() => {
                        tracing::info!(lock = %lock_name, error = %e, "lost race creating lock");
                        return Ok(false);
                    }
                    Err(e) => return Err(e),
                }
                tracing::info!(lock = %lock_name, %identity, "created lock and acquired leadership");
                self.observe_write(record, now)?;
                self.lock.record_event("became leader");
                return Ok(true);
            }
            Err(e) => return Err(e),
        };

        let changed = match &self.observed {
            Some(observed) => observed.raw != raw,
            None => true,
        };
        if changed {
            self.observed = Some(Observation {
                record: current.clone(),
                raw,
                at: now,
            });
        }
        self.report_leader(&current);

        if current.has_holder() && !current.is_held_by(&identity) && !current.is_expired(now) {
            tracing::debug!(
                lock = %lock_name,
                holder = %current.holder_identity,
                "lock is held by another contender and has not yet expired"
            );
            return Ok(false);
        }

        let was_leader = current.is_held_by(&identity);
        let next = current.successor(&identity, self.config.lease_duration, now);
        match bounded(timeout, "update", &lock_name, self.lock.update(&next)).await {
            Ok(()) => {}
            Err(ElectionError::Lock(e)) if e.is_recoverable() => {
                tracing::info!(lock = %lock_name, error = %e, "lost race updating lock");
                return Ok(false);
            }
            Err(e) => return Err(e),
        }

        if was_leader {
            tracing::debug!(lock = %lock_name, "renewed lease");
        } else {
            tracing::info!(
                lock = %lock_name,
                %identity,
                previous = %current.holder_identity,
                transitions = next.leader_transitions,
                "acquired leadership"
            );
        }
        self.observe_write(next, now)?;
        if !was_leader {
            self.lock.record_event("became leader");
        }
        Ok(true)
    }

    /// Step down by writing an empty holder with a one second lease.
    ///
    /// Does nothing when this contender is not the observed leader.
    pub async fn release(&mut self) -> Result<(), ElectionError> {
        let Some(observed) = self.observed.as_ref().filter(|_| self.is_leader()) else {
            return Ok(());
        };

        let now = self.clock.now();
        let released = observed.record.released(now);
        let lock_name = self.lock.describe();
        bounded(
            self.config.request_timeout,
            "update",
            &lock_name,
            self.lock.update(&released),
        )
        .await?;

        tracing::info!(lock = %lock_name, identity = %self.lock.identity(), "released leadership");
        self.observe_write(released, now)
    }

    /// Contend for the lock until leadership is gained and then lost, or
    /// until `shutdown` flips to `true` (or its sender is dropped).
    ///
    /// Leadership changes are sent on `changes` without blocking; a full
    /// channel drops the notification.
    pub async fn run(
        &mut self,
        mut shutdown: watch::Receiver<bool>,
        changes: mpsc::Sender<LeadershipChange>,
    ) -> RunExit {
        self.changes = Some(changes);

        if !self.acquire(&mut shutdown).await {
            return RunExit::Shutdown;
        }
        self.notify(LeadershipChange::StartedLeading);

        let exit = self.renew(&mut shutdown).await;

        if exit == RunExit::Shutdown && self.config.release_on_cancel {
            if let Err(e) = self.release().await {
                tracing::warn!(lock = %self.lock.describe(), error = %e, "failed to release lock");
            }
        }
        tracing::info!(lock = %self.lock.describe(), ?exit, "stopped leading");
        self.lock.record_event("stopped leading");
        self.notify(LeadershipChange::StoppedLeading);
        exit
    }

    async fn acquire(&mut self, shutdown: &mut watch::Receiver<bool>) -> bool {
        tracing::info!(lock = %self.lock.describe(), identity = %self.lock.identity(), "attempting to acquire leader lease");
        loop {
            if *shutdown.borrow() {
                return false;
            }
            match self.try_acquire_or_renew().await {
                Ok(true) => return true,
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(lock = %self.lock.describe(), error = %e, "error acquiring lease")
                }
            }
            if !pause(shutdown, self.config.retry_period).await {
                return false;
            }
        }
    }

    async fn renew(&mut self, shutdown: &mut watch::Receiver<bool>) -> RunExit {
        loop {
            if !pause(shutdown, self.config.retry_period).await {
                return RunExit::Shutdown;
            }

            let deadline = Instant::now() + self.config.renew_deadline;
            loop {
                match tokio::time::timeout_at(deadline, self.try_acquire_or_renew()).await {
                    Ok(Ok(true)) => break,
                    Ok(Ok(false)) => {}
                    Ok(Err(e)) => {
                        tracing::warn!(lock = %self.lock.describe(), error = %e, "error renewing lease")
                    }
                    Err(_) => {
                        tracing::warn!(lock = %self.lock.describe(), "renew deadline exceeded");
                        return RunExit::LostLeadership;
                    }
                }

                if self.leader().is_some() && !self.is_leader() {
                    tracing::info!(lock = %self.lock.describe(), "lock was taken by another contender");
                    return RunExit::LostLeadership;
                }
                if Instant::now() + self.config.retry_period >= deadline {
                    tracing::warn!(lock = %self.lock.describe(), "failed to renew lease before deadline");
                    return RunExit::LostLeadership;
                }
                if !pause(shutdown, self.config.retry_period).await {
                    return RunExit::Shutdown;
                }
            }
        }
    }

    fn observe_write(
        &mut self,
        record: LeaderElectionRecord,
        now: DateTime<Utc>,
    ) -> Result<(), ElectionError> {
        let raw = codec::encode(&record).map_err(LockError::from)?;
        self.report_leader(&record);
        self.observed = Some(Observation { record, raw, at: now });
        Ok(())
    }

    fn report_leader(&mut self, record: &LeaderElectionRecord) {
        if !record.has_holder() || self.reported_leader.as_deref() == Some(&record.holder_identity) {
            return;
        }
        tracing::info!(lock = %self.lock.describe(), leader = %record.holder_identity, "new leader observed");
        self.reported_leader = Some(record.holder_identity.clone());
        self.notify(LeadershipChange::NewLeader(record.holder_identity.clone()));
    }

    fn notify(&self, change: LeadershipChange) {
        let Some(changes) = &self.changes else {
            return;
        };
        if let Err(e) = changes.try_send(change) {
            tracing::warn!(error = %e, "dropping leadership notification");
        }
    }
}

/// Bound a lock call by `timeout`
async fn bounded<T>(
    timeout: Duration,
    op: &'static str,
    lock: &str,
    call: impl Future<Output = Result<T, LockError>>,
) -> Result<T, ElectionError> {
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(ElectionError::Timeout {
            op,
            lock: lock.to_string(),
            timeout,
        }),
    }
}

/// Sleep for `period` unless shutdown is requested first.
///
/// Returns `false` when the caller should stop.
async fn pause(shutdown: &mut watch::Receiver<bool>, period: Duration) -> bool {
    if *shutdown.borrow() {
        return false;
    }
    tokio::select! {
        changed = shutdown.changed() => changed.is_ok() && !*shutdown.borrow(),
        _ = tokio::time::sleep(period) => true,
    }
}

#[cfg(test)]
#[path = "elector_tests.rs"]
mod tests;
