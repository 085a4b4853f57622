// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Contender identity generation
//!
//! Identities must be unique across every process competing for a lock, so
//! the default pairs the host name with a random UUID.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Generates identities for lock contenders
pub trait IdGen: Clone + Send + Sync {
    fn next(&self) -> String;
}

/// `{host}_{uuid}` identities for production use
#[derive(Clone, Debug)]
pub struct HostUuidIdGen {
    host: String,
}

impl HostUuidIdGen {
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }

    /// Use `HOSTNAME` from the environment, or `rlock` when unset
    pub fn from_env() -> Self {
        let host = std::env::var("HOSTNAME")
            .ok()
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| "rlock".to_string());
        Self::new(host)
    }
}

impl Default for HostUuidIdGen {
    fn default() -> Self {
        Self::from_env()
    }
}

impl IdGen for HostUuidIdGen {
    fn next(&self) -> String {
        format!("{}_{}", self.host, uuid::Uuid::new_v4())
    }
}

/// `{prefix}-{n}` identities numbered from 1, shared across clones
#[derive(Clone)]
pub struct SequentialIdGen {
    prefix: String,
    counter: Arc<AtomicU64>,
}

impl SequentialIdGen {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl Default for SequentialIdGen {
    fn default() -> Self {
        Self::new("contender")
    }
}

impl IdGen for SequentialIdGen {
    fn next(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        format!("{}-{}", self.prefix, n)
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
