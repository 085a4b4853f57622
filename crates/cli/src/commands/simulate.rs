// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `rlock simulate` - Contend for one lock with several electors in-process

use crate::output::{self, OutputFormat};
use anyhow::{bail, Context, Result};
use clap::Args;
use rlock_adapters::{MemoryStore, TracedEventSink, TracedStore, TracingEventSink};
use rlock_core::{
    ConfigMap, Endpoints, EventSource, HostUuidIdGen, IdGen, LeaderElectionRecord, Lease,
    SequentialIdGen,
};
use rlock_election::{
    new_lock, EventRecorder, LeaderElector, LeadershipChange, LockKind, LockStores,
    ResourceLockConfig, RunExit, Settings,
};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;

const CONTROLLER: &str = "rlock";

#[derive(Args)]
pub struct SimulateArgs {
    /// Settings file (TOML) with [lock] and [election] sections
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of contenders
    #[arg(long, default_value_t = 3)]
    contenders: usize,

    /// Stop after this long (e.g. "30s"); runs until Ctrl-C when omitted
    #[arg(long, value_parser = humantime::parse_duration)]
    duration: Option<Duration>,

    /// Namespace of the lock object
    #[arg(long)]
    namespace: Option<String>,

    /// Name of the lock object
    #[arg(long)]
    name: Option<String>,

    /// Kind of object holding the record
    #[arg(long)]
    kind: Option<LockKind>,

    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

/// One leadership change seen by one contender
#[derive(Debug, Serialize)]
struct Transition {
    contender: String,
    change: String,
}

#[derive(Debug, Serialize)]
struct SimulationReport {
    lock: String,
    kind: LockKind,
    contenders: Vec<String>,
    transitions: Vec<Transition>,
    final_record: Option<LeaderElectionRecord>,
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Lock: {} ({})", self.lock, self.kind)?;
        writeln!(f, "Contenders: {}", self.contenders.join(", "))?;
        writeln!(f, "Transitions:")?;
        for t in &self.transitions {
            writeln!(f, "  {}: {}", t.contender, t.change)?;
        }
        match &self.final_record {
            Some(record) if record.has_holder() => write!(
                f,
                "Leader: {} (transitions: {})",
                record.holder_identity, record.leader_transitions
            ),
            Some(record) => write!(f, "Leader: none (transitions: {})", record.leader_transitions),
            None => write!(f, "Leader: none (lock never created)"),
        }
    }
}

pub async fn handle(args: SimulateArgs) -> Result<()> {
    let mut settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(namespace) = args.namespace {
        settings.lock.namespace = namespace;
    }
    if let Some(name) = args.name {
        settings.lock.name = name;
    }
    if let Some(kind) = args.kind {
        settings.lock.kind = kind;
    }
    settings.validate()?;
    if args.contenders == 0 {
        bail!("--contenders must be at least 1");
    }

    let key = settings.lock.key();
    let stores = LockStores {
        configmaps: TracedStore::new(MemoryStore::<ConfigMap>::new()),
        endpoints: TracedStore::new(MemoryStore::<Endpoints>::new()),
        leases: TracedStore::new(MemoryStore::<Lease>::new()),
    };
    let sink = TracedEventSink::new(TracingEventSink::new());
    let host_ids = HostUuidIdGen::from_env();
    let prefixed_ids = settings.lock.identity.as_deref().map(SequentialIdGen::new);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (report_tx, mut report_rx) = mpsc::unbounded_channel();
    let mut contenders = Vec::with_capacity(args.contenders);
    let mut tasks = JoinSet::new();

    for _ in 0..args.contenders {
        let identity = match &prefixed_ids {
            Some(ids) => ids.next(),
            None => host_ids.next(),
        };
        let source = EventSource {
            controller: CONTROLLER.to_string(),
            instance: identity.clone(),
        };
        let config = ResourceLockConfig::new(identity.clone())
            .with_event_recorder(EventRecorder::new(sink.clone(), source));
        let lock = new_lock(settings.lock.kind, key.clone(), &stores, config);
        let elector = LeaderElector::new(lock, settings.election.clone())
            .with_context(|| format!("invalid settings for contender {identity}"))?;

        contenders.push(identity);
        tasks.spawn(contend(elector, shutdown_rx.clone(), report_tx.clone()));
    }
    drop(report_tx);

    tracing::info!(
        lock = %key,
        kind = %settings.lock.kind,
        contenders = args.contenders,
        "simulation started"
    );

    let mut transitions = Vec::new();
    let duration = args.duration;
    let deadline = async move {
        match duration {
            Some(duration) => tokio::time::sleep(duration).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            result = tokio::signal::ctrl_c() => {
                result.context("failed to listen for Ctrl-C")?;
                eprintln!("\nShutting down...");
                break;
            }
            Some(transition) = report_rx.recv() => transitions.push(transition),
        }
    }

    shutdown_tx.send(true).ok();
    while let Some(joined) = tasks.join_next().await {
        joined.context("contender task failed")?;
    }
    while let Some(transition) = report_rx.recv().await {
        transitions.push(transition);
    }

    // Read the final state through a lock of our own
    let mut observer = new_lock(
        settings.lock.kind,
        key.clone(),
        &stores,
        ResourceLockConfig::new(CONTROLLER),
    );
    let final_record = observer.get().await.ok().map(|(record, _)| record);

    let report = SimulationReport {
        lock: key.to_string(),
        kind: settings.lock.kind,
        contenders,
        transitions,
        final_record,
    };
    output::print(&report, args.format);
    Ok(())
}

/// Keep contending until shutdown, starting over after each lost leadership
async fn contend(
    mut elector: LeaderElector,
    shutdown: watch::Receiver<bool>,
    report: mpsc::UnboundedSender<Transition>,
) {
    let identity = elector.identity().to_string();
    let (tx, mut rx) = mpsc::channel(16);

    let forward = {
        let identity = identity.clone();
        tokio::spawn(async move {
            while let Some(change) = rx.recv().await {
                let change = match change {
                    LeadershipChange::StartedLeading => "started leading".to_string(),
                    LeadershipChange::StoppedLeading => "stopped leading".to_string(),
                    LeadershipChange::NewLeader(leader) => format!("observed leader {leader}"),
                };
                if report
                    .send(Transition {
                        contender: identity.clone(),
                        change,
                    })
                    .is_err()
                {
                    break;
                }
            }
        })
    };

    loop {
        match elector.run(shutdown.clone(), tx.clone()).await {
            RunExit::Shutdown => break,
            RunExit::LostLeadership => {
                tracing::info!(%identity, "lost leadership, contending again");
            }
        }
    }

    drop(tx);
    drop(elector);
    if let Err(e) = forward.await {
        tracing::warn!(%identity, error = %e, "leadership report forwarder failed");
    }
}
