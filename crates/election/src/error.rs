// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for resource locks and the elector

use rlock_adapters::StoreError;
use rlock_core::MalformedRecord;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors returned by [`ResourceLock`](crate::ResourceLock) operations
///
/// The lock never retries; `NotFound`, `AlreadyExists` and `Conflict` mean
/// "read again and re-evaluate".
#[derive(Debug, Error)]
pub enum LockError {
    #[error("lock object {0} not found")]
    NotFound(String),
    #[error("lock object {0} already exists")]
    AlreadyExists(String),
    #[error("lock object {0} was modified since it was read")]
    Conflict(String),
    #[error(transparent)]
    MalformedRecord(#[from] MalformedRecord),
    #[error("lock {0} not initialized, call get or create first")]
    NotInitialized(String),
    #[error("store error: {0}")]
    Store(StoreError),
}

impl LockError {
    /// Whether the caller should simply start over from `get`
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            LockError::NotFound(_) | LockError::AlreadyExists(_) | LockError::Conflict(_)
        )
    }
}

impl From<StoreError> for LockError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { key, .. } => LockError::NotFound(key.to_string()),
            StoreError::AlreadyExists { key, .. } => LockError::AlreadyExists(key.to_string()),
            StoreError::Conflict { key, .. } => LockError::Conflict(key.to_string()),
            other => LockError::Store(other),
        }
    }
}

/// Errors from the leader elector
#[derive(Debug, Error)]
pub enum ElectionError {
    #[error(transparent)]
    Lock(#[from] LockError),
    #[error("{op} on {lock} timed out after {timeout:?}")]
    Timeout {
        op: &'static str,
        lock: String,
        timeout: Duration,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
