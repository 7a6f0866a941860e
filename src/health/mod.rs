//! Health aggregation subsystem.
//!
//! # Data Flow
//! ```text
//! Signal pollers (pollers.rs), one task each:
//!     bootstrap per partition / liveness / peer count
//!     → NodeClient query
//!     → record into SignalState (signals.rs)
//!
//! Aggregator (monitor.rs), once per poll interval:
//!     SignalState → compute_verdict (verdict.rs)
//!     → VerdictTracker hysteresis
//!     → Notifier on edges only
//!
//! Status broadcaster (status.rs):
//!     VerdictTracker + peer count → periodic Status notification
//! ```
//!
//! # Design Decisions
//! - Signal state sits behind one mutex; no lock is held across a client,
//!   notifier or metric call
//! - Only the aggregator task decides transitions
//! - Every loop waits on a cadence that also listens for shutdown, and
//!   in-flight queries are dropped when shutdown wins the race
//! - Bootstrap pollers finish on their own and report a `BootstrapOutcome`

pub mod cadence;
pub mod monitor;
pub mod pollers;
pub mod signals;
pub mod status;
pub mod verdict;

use std::time::Duration;

pub use monitor::{Monitor, MonitorTasks};
pub use pollers::BootstrapOutcome;
pub use signals::{Partition, PartitionSet, PeerObservation, SignalState};
pub use status::MonitorStatus;
pub use verdict::{
    compute_verdict, Thresholds, Transition, UnhealthyReason, Verdict, VerdictState,
    VerdictTracker,
};

/// Render a duration for notifications, truncated to milliseconds.
pub(crate) fn display_duration(duration: Duration) -> String {
    format!("{:?}", Duration::from_millis(duration.as_millis() as u64))
}
