// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Leader election record stored in the shared coordination object
//!
//! The record is the only state competing processes share. Every decision an
//! elector makes (acquire, renew, yield) is derived from the last record it
//! read, and every claim is a new record written through compare-and-swap.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Lease duration written by a holder that gives up leadership voluntarily
pub const RELEASED_LEASE_SECONDS: i32 = 1;

/// Violations of the record invariants
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidRecord {
    #[error("renew time {renew} precedes acquire time {acquire}")]
    RenewBeforeAcquire {
        acquire: DateTime<Utc>,
        renew: DateTime<Utc>,
    },
    #[error("negative lease duration: {0}s")]
    NegativeLeaseDuration(i32),
    #[error("negative leader transition count: {0}")]
    NegativeTransitions(i32),
}

/// Current leadership as persisted in the coordination object
///
/// The zero value (`Default`) means "no current claim".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderElectionRecord {
    /// Identity of the process claiming leadership; empty when unclaimed
    #[serde(default)]
    pub holder_identity: String,
    /// How long the claim stays valid without renewal
    #[serde(default)]
    pub lease_duration_seconds: i32,
    /// When the current holder first acquired
    #[serde(default)]
    pub acquire_time: Option<DateTime<Utc>>,
    /// When the current holder last renewed
    #[serde(default)]
    pub renew_time: Option<DateTime<Utc>>,
    /// Number of times leadership moved between holders
    #[serde(default)]
    pub leader_transitions: i32,
}

impl LeaderElectionRecord {
    /// Record for a first acquisition of a lock that has never been held
    pub fn acquired(holder: impl Into<String>, lease_duration: Duration, now: DateTime<Utc>) -> Self {
        Self {
            holder_identity: holder.into(),
            lease_duration_seconds: lease_seconds(lease_duration),
            acquire_time: Some(now),
            renew_time: Some(now),
            leader_transitions: 0,
        }
    }

    /// Whether anyone currently claims leadership
    pub fn has_holder(&self) -> bool {
        !self.holder_identity.is_empty()
    }

    pub fn is_held_by(&self, identity: &str) -> bool {
        self.has_holder() && self.holder_identity == identity
    }

    pub fn lease_duration(&self) -> Duration {
        Duration::from_secs(u64::try_from(self.lease_duration_seconds).unwrap_or(0))
    }

    /// Instant after which the claim is no longer valid
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let renew = self.renew_time?;
        renew.checked_add_signed(chrono::Duration::seconds(i64::from(
            self.lease_duration_seconds.max(0),
        )))
    }

    /// A record with no renew time never protects its holder
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at() {
            Some(expiry) => expiry <= now,
            None => true,
        }
    }

    /// Build the record `identity` writes to claim or renew this lock.
    ///
    /// The acquire time is kept when the holder does not change, and the
    /// transition count moves only when leadership passes from one named
    /// holder to another.
    pub fn successor(&self, identity: &str, lease_duration: Duration, now: DateTime<Utc>) -> Self {
        let same_holder = self.holder_identity == identity;
        let acquire_time = match (same_holder, self.acquire_time) {
            (true, Some(acquired)) => Some(acquired),
            _ => Some(now),
        };
        let leader_transitions = if self.has_holder() && !same_holder {
            self.leader_transitions.saturating_add(1)
        } else {
            self.leader_transitions
        };

        Self {
            holder_identity: identity.to_string(),
            lease_duration_seconds: lease_seconds(lease_duration),
            acquire_time,
            renew_time: Some(now),
            leader_transitions,
        }
    }

    /// Record a holder writes when stepping down before its lease runs out
    pub fn released(&self, now: DateTime<Utc>) -> Self {
        Self {
            holder_identity: String::new(),
            lease_duration_seconds: RELEASED_LEASE_SECONDS,
            acquire_time: Some(now),
            renew_time: Some(now),
            leader_transitions: self.leader_transitions,
        }
    }

    /// Check the invariants a well-formed record must satisfy
    pub fn validate(&self) -> Result<(), InvalidRecord> {
        if self.lease_duration_seconds < 0 {
            return Err(InvalidRecord::NegativeLeaseDuration(self.lease_duration_seconds));
        }
        if self.leader_transitions < 0 {
            return Err(InvalidRecord::NegativeTransitions(self.leader_transitions));
        }
        if let (Some(acquire), Some(renew)) = (self.acquire_time, self.renew_time) {
            if renew < acquire {
                return Err(InvalidRecord::RenewBeforeAcquire { acquire, renew });
            }
        }
        Ok(())
    }
}

fn lease_seconds(duration: Duration) -> i32 {
    i32::try_from(duration.as_secs()).unwrap_or(i32::MAX)
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
