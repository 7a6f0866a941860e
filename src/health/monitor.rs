//! Health monitor: shared signal state, aggregator loop and task wiring.
//!
//! # Responsibilities
//! - Validate configuration before anything runs
//! - Own the shared signal state and the verdict tracker
//! - Spawn pollers, aggregator and status broadcaster
//! - Answer on-demand verdict queries

use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::client::NodeClient;
use crate::config::{ConfigError, MonitorConfig};
use crate::health::cadence::Cadence;
use crate::health::pollers::{self, BootstrapOutcome};
use crate::health::signals::{Partition, PartitionSet, PeerObservation, SignalState};
use crate::health::status::{self, MonitorStatus};
use crate::health::verdict::{compute_verdict, Thresholds, Transition, Verdict, VerdictTracker};
use crate::lifecycle::Shutdown;
use crate::notify::Notifier;
use crate::observability::metrics::{MetricEmitter, MetricWriter};

struct Inner {
    config: MonitorConfig,
    partitions: PartitionSet,
    thresholds: Thresholds,
    client: Arc<dyn NodeClient>,
    notifier: Arc<dyn Notifier>,
    emitter: MetricEmitter,
    signals: Mutex<SignalState>,
    tracker: Mutex<VerdictTracker>,
}

/// Health monitor of one node. Cloning shares the same state.
#[derive(Clone)]
pub struct Monitor {
    inner: Arc<Inner>,
}

impl Monitor {
    /// Create a monitor. Fails fast on invalid configuration.
    ///
    /// The monitor's start time, against which never-seen signals are aged, is
    /// the time of this call.
    pub fn new(
        config: MonitorConfig,
        client: Arc<dyn NodeClient>,
        notifier: Arc<dyn Notifier>,
        metric_writer: Arc<dyn MetricWriter>,
    ) -> Result<Self, ConfigError> {
        let partitions = PartitionSet::from_config(&config).map_err(ConfigError::Validation)?;
        let started_at = Instant::now();
        let thresholds = Thresholds {
            grace: config.unhealthy_threshold(),
            min_peers: config.min_peers,
        };

        Ok(Self {
            inner: Arc::new(Inner {
                emitter: MetricEmitter::new(metric_writer, config.metric_min_gap()),
                signals: Mutex::new(SignalState::new(&partitions, started_at)),
                tracker: Mutex::new(VerdictTracker::new(started_at)),
                config,
                partitions,
                thresholds,
                client,
                notifier,
            }),
        })
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.inner.config
    }

    pub fn partitions(&self) -> &PartitionSet {
        &self.inner.partitions
    }

    /// Verdict computed from the current signals.
    pub fn verdict(&self) -> Verdict {
        self.verdict_at(Instant::now())
    }

    pub fn verdict_at(&self, now: Instant) -> Verdict {
        let signals = self.signals();
        compute_verdict(&signals, &self.inner.thresholds, now)
    }

    /// Copy of the current signal state.
    pub fn snapshot(&self) -> SignalState {
        self.signals().clone()
    }

    pub fn status(&self) -> MonitorStatus {
        let now = Instant::now();
        let (state, since) = {
            let tracker = self.tracker();
            (tracker.state(), tracker.since())
        };
        MonitorStatus {
            state,
            elapsed: now.saturating_duration_since(since),
            peer_count: self.signals().peer_count(),
        }
    }

    /// Spawn every monitor task. All of them stop on `shutdown`.
    pub fn start(&self, shutdown: &Shutdown) -> MonitorTasks {
        tracing::info!(
            poll_interval = ?self.config().poll_interval(),
            status_interval = ?self.config().status_interval(),
            unhealthy_threshold = ?self.config().unhealthy_threshold(),
            min_peers = self.config().min_peers,
            partitions = self.partitions().len(),
            "Health monitor starting"
        );

        let bootstraps = self
            .partitions()
            .iter()
            .map(|partition| {
                let handle = tokio::spawn(pollers::poll_bootstrap(
                    self.clone(),
                    partition.clone(),
                    shutdown.subscribe(),
                ));
                (partition.clone(), handle)
            })
            .collect();

        let loops = vec![
            (
                "liveness",
                tokio::spawn(pollers::poll_liveness(self.clone(), shutdown.subscribe())),
            ),
            (
                "peers",
                tokio::spawn(pollers::poll_peers(self.clone(), shutdown.subscribe())),
            ),
            (
                "aggregator",
                tokio::spawn(run_aggregator(self.clone(), shutdown.subscribe())),
            ),
            (
                "status",
                tokio::spawn(status::run_status_broadcaster(self.clone(), shutdown.subscribe())),
            ),
        ];

        MonitorTasks { bootstraps, loops }
    }

    /// One aggregator step: fold the verdict at `now` into the tracker.
    pub(crate) fn evaluate(&self, now: Instant) -> (Verdict, Option<Transition>) {
        let verdict = self.verdict_at(now);
        let transition = self.tracker().observe(&verdict, now);
        (verdict, transition)
    }

    pub(crate) fn client(&self) -> &dyn NodeClient {
        self.inner.client.as_ref()
    }

    pub(crate) fn notifier(&self) -> &dyn Notifier {
        self.inner.notifier.as_ref()
    }

    pub(crate) fn emitter(&self) -> &MetricEmitter {
        &self.inner.emitter
    }

    pub(crate) fn record_bootstrapped(&self, partition: &Partition, at: Instant) -> bool {
        self.signals().record_bootstrapped(partition, at)
    }

    pub(crate) fn record_liveness(&self, at: Instant) {
        self.signals().record_liveness(at);
    }

    pub(crate) fn record_peer_count(&self, count: u64, at: Instant) -> PeerObservation {
        self.signals()
            .record_peer_count(count, self.inner.config.min_peers, at)
    }

    // A panicking holder cannot leave the state half-written: every update is
    // a single field assignment, so a poisoned lock is still consistent.
    fn signals(&self) -> MutexGuard<'_, SignalState> {
        self.inner
            .signals
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn tracker(&self) -> MutexGuard<'_, VerdictTracker> {
        self.inner
            .tracker
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for Monitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Monitor")
            .field("config", &self.inner.config)
            .field("emitter", &self.inner.emitter)
            .finish()
    }
}

/// Aggregator loop: evaluate once per poll interval, notify on edges.
async fn run_aggregator(monitor: Monitor, shutdown: tokio::sync::broadcast::Receiver<()>) {
    let mut cadence = Cadence::new(monitor.config().poll_interval(), shutdown);

    while cadence.tick().await {
        let (verdict, transition) = monitor.evaluate(Instant::now());
        let Some(transition) = transition else {
            tracing::trace!(healthy = verdict.is_healthy(), "Verdict unchanged");
            continue;
        };

        match &transition {
            Transition::BecameUnhealthy(reason) => {
                tracing::warn!(reason = %reason, "Node became unhealthy");
                monitor.notifier().alert(&transition.message());
            }
            Transition::BecameHealthy { after } => {
                tracing::info!(after = ?after, "Node became healthy");
                monitor.notifier().info(&transition.message());
            }
        }
    }

    tracing::debug!("Aggregator stopped");
}

/// Handles of the tasks spawned by [`Monitor::start`].
#[derive(Debug)]
pub struct MonitorTasks {
    bootstraps: Vec<(Partition, JoinHandle<BootstrapOutcome>)>,
    loops: Vec<(&'static str, JoinHandle<()>)>,
}

impl MonitorTasks {
    /// Bootstrap pollers that have not finished yet.
    pub fn pending_bootstraps(&self) -> Vec<&Partition> {
        self.bootstraps
            .iter()
            .filter(|(_, handle)| !handle.is_finished())
            .map(|(partition, _)| partition)
            .collect()
    }

    /// Whether every task, including the bootstrap pollers, has stopped.
    pub fn is_finished(&self) -> bool {
        self.bootstraps.iter().all(|(_, handle)| handle.is_finished())
            && self.loops.iter().all(|(_, handle)| handle.is_finished())
    }

    /// Wait for every task and collect the bootstrap outcomes in partition order.
    pub async fn wait(self) -> Vec<BootstrapOutcome> {
        let mut outcomes = Vec::with_capacity(self.bootstraps.len());
        for (partition, handle) in self.bootstraps {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    tracing::error!(partition = %partition, error = %e, "Bootstrap poller failed")
                }
            }
        }

        for (name, handle) in self.loops {
            if let Err(e) = handle.await {
                tracing::error!(task = name, error = %e, "Monitor task failed");
            }
        }

        tracing::info!("Health monitor stopped");
        outcomes
    }
}
