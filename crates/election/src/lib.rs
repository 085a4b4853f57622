// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rlock-election: resource locks and the leader elector built on them
//!
//! This crate provides:
//! - [`ResourceLock`] and its ConfigMap, Endpoints and Lease backends
//! - [`EventRecorder`] for best-effort leadership events
//! - [`LeaderElector`] with acquire, renew and release loops
//! - [`Settings`] loaded from TOML

pub mod config;
pub mod elector;
pub mod error;
pub mod recorder;
pub mod resourcelock;

pub use config::{ElectionConfig, LockSettings, Settings};
pub use elector::{LeaderElector, LeadershipChange, RunExit};
pub use error::{ConfigError, ElectionError, LockError};
pub use recorder::{EventRecorder, DEFAULT_QUEUE_CAPACITY};
pub use resourcelock::{
    new_lock, AnnotatedObject, AnnotationLock, ConfigMapLock, EndpointsLock, LeaseLock, LockKind,
    LockStores, ResourceLock, ResourceLockConfig,
};
