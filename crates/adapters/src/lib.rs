// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for the versioned object store and the event sink

pub mod sink;
pub mod store;
pub mod traced;

pub use sink::{EventSink, SinkError, StoreEventSink, TracingEventSink};
pub use store::{MemoryStore, ObjectStore, StoreError};
pub use traced::{TracedEventSink, TracedStore};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use sink::{FakeEventSink, SinkBehavior};
#[cfg(any(test, feature = "test-support"))]
pub use store::{FakeStore, StoreCall};
