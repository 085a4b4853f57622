// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Election timing and lock settings, loadable from TOML
//!
//! ```toml
//! [lock]
//! kind = "leases"
//! namespace = "kube-system"
//! name = "scheduler"
//!
//! [election]
//! lease_duration = "15s"
//! renew_deadline = "10s"
//! retry_period = "2s"
//! ```

use crate::error::ConfigError;
use crate::resourcelock::LockKind;
use rlock_core::ObjectKey;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Timing of the acquire and renew loops
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElectionConfig {
    /// How long a claim stays valid without renewal
    #[serde(with = "humantime_serde")]
    pub lease_duration: Duration,
    /// How long the leader keeps retrying a failed renewal before giving up
    #[serde(with = "humantime_serde")]
    pub renew_deadline: Duration,
    /// Pause between attempts
    #[serde(with = "humantime_serde")]
    pub retry_period: Duration,
    /// Bound on each individual store call
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Step down explicitly on shutdown instead of letting the lease run out
    pub release_on_cancel: bool,
}

impl Default for ElectionConfig {
    fn default() -> Self {
        Self {
            lease_duration: Duration::from_secs(15),
            renew_deadline: Duration::from_secs(10),
            retry_period: Duration::from_secs(2),
            request_timeout: Duration::from_secs(5),
            release_on_cancel: true,
        }
    }
}

impl ElectionConfig {
    pub fn with_lease_duration(mut self, lease_duration: Duration) -> Self {
        self.lease_duration = lease_duration;
        self
    }

    pub fn with_renew_deadline(mut self, renew_deadline: Duration) -> Self {
        self.renew_deadline = renew_deadline;
        self
    }

    pub fn with_retry_period(mut self, retry_period: Duration) -> Self {
        self.retry_period = retry_period;
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn with_release_on_cancel(mut self, release_on_cancel: bool) -> Self {
        self.release_on_cancel = release_on_cancel;
        self
    }

    /// Check the ordering the loops depend on:
    /// `lease_duration > renew_deadline > retry_period > 0` and
    /// `0 < request_timeout <= renew_deadline`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Records store whole seconds
        if self.lease_duration < Duration::from_secs(1) {
            return Err(invalid("lease_duration must be at least 1s"));
        }
        if self.lease_duration <= self.renew_deadline {
            return Err(invalid("lease_duration must be greater than renew_deadline"));
        }
        if self.renew_deadline <= self.retry_period {
            return Err(invalid("renew_deadline must be greater than retry_period"));
        }
        if self.retry_period.is_zero() {
            return Err(invalid("retry_period must be greater than zero"));
        }
        if self.request_timeout.is_zero() {
            return Err(invalid("request_timeout must be greater than zero"));
        }
        if self.request_timeout > self.renew_deadline {
            return Err(invalid("request_timeout must not exceed renew_deadline"));
        }
        Ok(())
    }
}

fn invalid(reason: &str) -> ConfigError {
    ConfigError::Invalid(reason.to_string())
}

/// Where the lock lives and who is contending for it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockSettings {
    pub kind: LockKind,
    pub namespace: String,
    pub name: String,
    /// Fixed identity; generated per contender when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
}

impl Default for LockSettings {
    fn default() -> Self {
        Self {
            kind: LockKind::default(),
            namespace: "default".to_string(),
            name: "rlock".to_string(),
            identity: None,
        }
    }
}

impl LockSettings {
    pub fn key(&self) -> ObjectKey {
        ObjectKey::new(self.namespace.clone(), self.name.clone())
    }
}

/// Complete settings file
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub lock: LockSettings,
    pub election: ElectionConfig,
}

impl Settings {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lock.name.is_empty() {
            return Err(invalid("lock name must not be empty"));
        }
        if self.lock.identity.as_deref() == Some("") {
            return Err(invalid("lock identity must not be empty"));
        }
        self.election.validate()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
