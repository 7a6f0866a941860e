//! Health verdict and its hysteresis state machine.
//!
//! # States
//! - Unknown: no evaluation yet
//! - Healthy: every readiness signal is fresh
//! - Unhealthy: at least one signal failed
//!
//! # State Transitions
//! ```text
//! Unknown   → Unhealthy: silent, the node starts out unready
//! Unknown   → Healthy:   Info "healthy after <elapsed since start>"
//! Healthy   → Unhealthy: Alert with the failing reason
//! Unhealthy → Healthy:   Info "healthy after <elapsed unhealthy>"
//! ```
//!
//! # Design Decisions
//! - `compute_verdict` is a pure function of the signal state and `now`
//! - Only edges notify; a steady verdict never repeats a notification
//! - `since` moves on every edge and nowhere else

use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

use crate::health::signals::{Partition, SignalState};
use crate::health::display_duration;

/// Thresholds the verdict is computed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// Maximum tolerated staleness of a timestamped signal.
    pub grace: Duration,
    /// Minimum connected peers.
    pub min_peers: u64,
}

/// Why the node is considered unhealthy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnhealthyReason {
    NotBootstrapped(Partition),
    LivenessStale(Duration),
    InsufficientPeers { min_peers: u64, stale_for: Duration },
}

impl fmt::Display for UnhealthyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnhealthyReason::NotBootstrapped(partition) => {
                write!(f, "{} not bootstrapped", partition)
            }
            UnhealthyReason::LivenessStale(stale_for) => {
                write!(f, "liveness stale for {}", display_duration(*stale_for))
            }
            UnhealthyReason::InsufficientPeers { min_peers, stale_for } => write!(
                f,
                "insufficient peers (< {}) for {}",
                min_peers,
                display_duration(*stale_for)
            ),
        }
    }
}

/// Derived health of the node at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Healthy,
    Unhealthy(UnhealthyReason),
}

impl Verdict {
    pub fn is_healthy(&self) -> bool {
        matches!(self, Verdict::Healthy)
    }

    /// Failure reason, empty when healthy.
    pub fn reason(&self) -> String {
        match self {
            Verdict::Healthy => String::new(),
            Verdict::Unhealthy(reason) => reason.to_string(),
        }
    }
}

/// Evaluate the signals at `now`. The first failing condition wins.
pub fn compute_verdict(state: &SignalState, thresholds: &Thresholds, now: Instant) -> Verdict {
    if let Some(partition) = state.first_unbootstrapped() {
        return Verdict::Unhealthy(UnhealthyReason::NotBootstrapped(partition.clone()));
    }

    let since_live =
        now.saturating_duration_since(state.last_liveness().unwrap_or(state.started_at()));
    if since_live > thresholds.grace {
        return Verdict::Unhealthy(UnhealthyReason::LivenessStale(since_live));
    }

    let since_peers = now.saturating_duration_since(
        state.last_sufficient_peers().unwrap_or(state.started_at()),
    );
    if since_peers > thresholds.grace {
        return Verdict::Unhealthy(UnhealthyReason::InsufficientPeers {
            min_peers: thresholds.min_peers,
            stale_for: since_peers,
        });
    }

    Verdict::Healthy
}

/// Recorded verdict state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictState {
    Unknown,
    Healthy,
    Unhealthy,
}

impl fmt::Display for VerdictState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VerdictState::Unknown => "unknown",
            VerdictState::Healthy => "healthy",
            VerdictState::Unhealthy => "unhealthy",
        };
        f.write_str(name)
    }
}

/// An edge that must be reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    BecameUnhealthy(UnhealthyReason),
    BecameHealthy { after: Duration },
}

impl Transition {
    /// Notification text for this edge.
    pub fn message(&self) -> String {
        match self {
            Transition::BecameUnhealthy(reason) => format!("not healthy: {}", reason),
            Transition::BecameHealthy { after } => {
                format!("healthy after {}", display_duration(*after))
            }
        }
    }
}

/// Hysteresis over successive verdicts.
#[derive(Debug, Clone)]
pub struct VerdictTracker {
    state: VerdictState,
    since: Instant,
}

impl VerdictTracker {
    pub fn new(started_at: Instant) -> Self {
        Self {
            state: VerdictState::Unknown,
            since: started_at,
        }
    }

    pub fn state(&self) -> VerdictState {
        self.state
    }

    /// Time of the last transition (or of start, before any).
    pub fn since(&self) -> Instant {
        self.since
    }

    /// Fold a fresh verdict in, returning the edge to report if any.
    pub fn observe(&mut self, verdict: &Verdict, now: Instant) -> Option<Transition> {
        match (self.state, verdict) {
            (VerdictState::Healthy, Verdict::Healthy)
            | (VerdictState::Unhealthy, Verdict::Unhealthy(_)) => None,
            (VerdictState::Unknown, Verdict::Unhealthy(_)) => {
                self.state = VerdictState::Unhealthy;
                None
            }
            (VerdictState::Healthy, Verdict::Unhealthy(reason)) => {
                self.state = VerdictState::Unhealthy;
                self.since = now;
                Some(Transition::BecameUnhealthy(reason.clone()))
            }
            (VerdictState::Unknown | VerdictState::Unhealthy, Verdict::Healthy) => {
                let after = now.saturating_duration_since(self.since);
                self.state = VerdictState::Healthy;
                self.since = now;
                Some(Transition::BecameHealthy { after })
            }
        }
    }
}
