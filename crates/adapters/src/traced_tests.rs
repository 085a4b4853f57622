// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::sink::{FakeEventSink, SinkBehavior};
use crate::store::{FakeStore, MemoryStore};
use rlock_core::{ConfigMap, ObjectMeta};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// A writer that captures log output for testing
#[derive(Clone, Default)]
struct CapturedLogs {
    logs: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    fn new() -> Self {
        Self::default()
    }

    fn contents(&self) -> String {
        let logs = self.logs.lock().unwrap();
        String::from_utf8_lossy(&logs).to_string()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.logs.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run a test with captured tracing output
fn with_tracing<F, Fut>(f: F) -> (String, Fut::Output)
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future,
{
    let logs = CapturedLogs::new();
    let logs_clone = logs.clone();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(logs_clone)
        .with_ansi(false)
        .without_time()
        .finish();

    let result = tracing::subscriber::with_default(subscriber, || {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(f())
    });

    (logs.contents(), result)
}

fn configmap() -> ConfigMap {
    ConfigMap::from_meta(ObjectMeta::new("default", "leader"))
}

#[test]
fn traced_create_logs_span_and_version() {
    let (logs, result) = with_tracing(|| async {
        let traced = TracedStore::new(MemoryStore::<ConfigMap>::new());
        traced.create(&configmap()).await
    });

    assert!(result.is_ok(), "create should succeed: {:?}", result);
    assert!(logs.contains("store.create"), "Should log span name. Logs:\n{}", logs);
    assert!(logs.contains("default/leader"), "Should log key. Logs:\n{}", logs);
    assert!(logs.contains("created"), "Should log completion. Logs:\n{}", logs);
    assert!(logs.contains("elapsed_ms"), "Should log timing. Logs:\n{}", logs);
}

#[test]
fn traced_create_logs_lost_race() {
    let (logs, result) = with_tracing(|| async {
        let traced = TracedStore::new(MemoryStore::<ConfigMap>::new());
        traced.create(&configmap()).await.unwrap();
        traced.create(&configmap()).await
    });

    assert!(matches!(result, Err(StoreError::AlreadyExists { .. })));
    assert!(logs.contains("lost create race"), "Logs:\n{}", logs);
}

#[test]
fn traced_update_logs_conflict() {
    let (logs, result) = with_tracing(|| async {
        let traced = TracedStore::new(MemoryStore::<ConfigMap>::new());
        let created = traced.create(&configmap()).await.unwrap();
        traced.update(&created).await.unwrap();
        traced.update(&created).await
    });

    assert!(matches!(result, Err(StoreError::Conflict { .. })));
    assert!(logs.contains("store.update"), "Logs:\n{}", logs);
    assert!(logs.contains("lost update race"), "Logs:\n{}", logs);
}

#[test]
fn traced_get_logs_transport_failure_as_warning() {
    let (logs, result) = with_tracing(|| async {
        let fake = FakeStore::<ConfigMap>::new();
        fake.fail_next(StoreError::Transport("connection refused".to_string()));
        let traced = TracedStore::new(fake);
        traced.get(&ObjectKey::new("default", "leader")).await
    });

    assert!(result.is_err());
    assert!(logs.contains("WARN"), "Logs:\n{}", logs);
    assert!(logs.contains("connection refused"), "Logs:\n{}", logs);
}

#[tokio::test]
async fn traced_store_passes_results_through() {
    let memory = MemoryStore::<ConfigMap>::new();
    let traced = TracedStore::new(memory.clone());

    let created = traced.create(&configmap()).await.unwrap();
    let fetched = traced.get(&created.metadata.key()).await.unwrap();

    assert_eq!(created, fetched);
    assert_eq!(traced.inner().len(), 1);
}

#[test]
fn traced_sink_logs_publish_failure() {
    let (logs, result) = with_tracing(|| async {
        let fake = FakeEventSink::with_behavior(SinkBehavior::Fail(SinkError::Rejected(
            "quota".to_string(),
        )));
        let traced = TracedEventSink::new(fake);
        traced
            .create(&Event::from_meta(ObjectMeta::new("default", "leader.1")))
            .await
    });

    assert!(result.is_err());
    assert!(logs.contains("event publish failed"), "Logs:\n{}", logs);
}
