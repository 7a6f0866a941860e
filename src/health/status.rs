//! Periodic status heartbeat.

use std::fmt;
use std::time::Duration;
use tokio::sync::broadcast;

use crate::health::cadence::Cadence;
use crate::health::display_duration;
use crate::health::monitor::Monitor;
use crate::health::verdict::VerdictState;

/// Point-in-time summary of the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorStatus {
    /// Last recorded verdict state.
    pub state: VerdictState,
    /// Time since the last transition (or since start).
    pub elapsed: Duration,
    /// Latest observed peer count.
    pub peer_count: Option<u64>,
}

impl fmt::Display for MonitorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} for {}, peers: ", self.state, display_duration(self.elapsed))?;
        match self.peer_count {
            Some(count) => write!(f, "{}", count),
            None => f.write_str("unknown"),
        }
    }
}

/// Emit a Status notification every status interval, regardless of verdict.
pub(crate) async fn run_status_broadcaster(monitor: Monitor, shutdown: broadcast::Receiver<()>) {
    let mut cadence = Cadence::new(monitor.config().status_interval(), shutdown);

    while cadence.tick().await {
        let status = monitor.status();
        tracing::debug!(state = %status.state, peers = ?status.peer_count, "Broadcasting status");
        monitor.notifier().status(&status.to_string());
    }

    tracing::debug!("Status broadcaster stopped");
}
