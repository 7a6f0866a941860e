//! Signal pollers.
//!
//! # Responsibilities
//! - Query one readiness signal per loop on the poll cadence
//! - Record successes into the shared signal state
//! - Absorb every query error as an Alert and keep polling
//!
//! # Design Decisions
//! - The bootstrap poller stops after the first `true`: the flag is monotonic
//! - The signal lock is taken only around the state update itself

use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::Instant;

use crate::health::cadence::Cadence;
use crate::health::display_duration;
use crate::health::monitor::Monitor;
use crate::health::signals::Partition;

/// How a bootstrap poller finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// The partition reported bootstrapped `after` the poller started.
    Bootstrapped { partition: Partition, after: Duration },
    /// Shutdown arrived first.
    Cancelled { partition: Partition },
}

impl BootstrapOutcome {
    pub fn partition(&self) -> &Partition {
        match self {
            BootstrapOutcome::Bootstrapped { partition, .. }
            | BootstrapOutcome::Cancelled { partition } => partition,
        }
    }
}

/// Poll bootstrap status of one partition until it completes.
pub(crate) async fn poll_bootstrap(
    monitor: Monitor,
    partition: Partition,
    shutdown: broadcast::Receiver<()>,
) -> BootstrapOutcome {
    let started = Instant::now();
    let mut cadence = Cadence::new(monitor.config().poll_interval(), shutdown);

    while cadence.tick().await {
        let Some(result) = cadence
            .until_shutdown(monitor.client().is_bootstrapped(&partition))
            .await
        else {
            break;
        };

        match result {
            Err(e) => {
                tracing::warn!(partition = %partition, error = %e, "Bootstrap check failed");
                monitor
                    .notifier()
                    .alert(&format!("{} bootstrap check failed: {}", partition, e));
            }
            Ok(false) => {
                tracing::debug!(partition = %partition, "Partition still bootstrapping");
            }
            Ok(true) => {
                let now = Instant::now();
                let after = now.saturating_duration_since(started);
                if monitor.record_bootstrapped(&partition, now) {
                    tracing::info!(
                        partition = %partition,
                        after = ?after,
                        "Partition bootstrapped"
                    );
                    monitor.notifier().info(&format!(
                        "{} bootstrapped after {}",
                        partition,
                        display_duration(after)
                    ));
                }
                return BootstrapOutcome::Bootstrapped { partition, after };
            }
        }
    }

    tracing::debug!(partition = %partition, "Bootstrap poller cancelled");
    BootstrapOutcome::Cancelled { partition }
}

/// Poll liveness for as long as the monitor runs.
pub(crate) async fn poll_liveness(monitor: Monitor, shutdown: broadcast::Receiver<()>) {
    let mut cadence = Cadence::new(monitor.config().poll_interval(), shutdown);

    while cadence.tick().await {
        let Some(result) = cadence.until_shutdown(monitor.client().is_healthy()).await else {
            break;
        };

        match result {
            Err(e) => {
                tracing::warn!(error = %e, "Liveness check failed");
                monitor
                    .notifier()
                    .alert(&format!("liveness check failed: {}", e));
            }
            Ok(false) => tracing::debug!("Node reports not live"),
            Ok(true) => monitor.record_liveness(Instant::now()),
        }
    }

    tracing::debug!("Liveness poller stopped");
}

/// Poll the peer count, forward it to metrics and stamp sufficient counts.
pub(crate) async fn poll_peers(monitor: Monitor, shutdown: broadcast::Receiver<()>) {
    let min_peers = monitor.config().min_peers;
    let mut cadence = Cadence::new(monitor.config().poll_interval(), shutdown);

    while cadence.tick().await {
        let Some(result) = cadence.until_shutdown(monitor.client().peer_count()).await else {
            break;
        };

        let count = match result {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!(error = %e, "Peer count check failed");
                monitor
                    .notifier()
                    .alert(&format!("peer count check failed: {}", e));
                continue;
            }
        };

        let now = Instant::now();
        let observation = monitor.record_peer_count(count, now);
        tracing::debug!(count, sufficient = observation.sufficient, "Peer count observed");

        let Some(emitted) = cadence
            .until_shutdown(monitor.emitter().emit_peer_count(count, now))
            .await
        else {
            break;
        };
        if let Err(e) = emitted {
            tracing::warn!(error = %e, "Peer count metric write failed");
            monitor
                .notifier()
                .alert(&format!("peer count metric write failed: {}", e));
        }

        if observation.first_sufficient {
            monitor
                .notifier()
                .info(&format!("connected peers ({}) >= {}", count, min_peers));
        }
    }

    tracing::debug!("Peer poller stopped");
}
