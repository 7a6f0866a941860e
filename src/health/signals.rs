//! Shared signal state written by the pollers.
//!
//! # Responsibilities
//! - Hold the last-success timestamp of every readiness signal
//! - Keep bootstrap completion monotonic (recorded at most once)
//! - Track the latest peer count and the first time it was sufficient

use std::fmt;
use tokio::time::Instant;

use crate::config::{validate_monitor, MonitorConfig, ValidationError};

/// Identifier of a partition (chain) of the monitored node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Partition(String);

impl Partition {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-Chain", self.0)
    }
}

/// Fixed, ordered set of partitions known at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionSet(Vec<Partition>);

impl PartitionSet {
    /// Build the set from a validated monitor configuration.
    pub fn from_config(config: &MonitorConfig) -> Result<Self, Vec<ValidationError>> {
        validate_monitor(config)?;
        Ok(Self(config.partitions.iter().map(Partition::new).collect()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Partition> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// What a peer-count observation changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerObservation {
    /// The count met the configured minimum.
    pub sufficient: bool,
    /// This is the first observation that met the minimum.
    pub first_sufficient: bool,
}

/// Latest readiness signals of the monitored node.
///
/// Timestamps that were never recorded are `None`; staleness of such a signal
/// is measured from `started_at`.
#[derive(Debug, Clone)]
pub struct SignalState {
    started_at: Instant,
    bootstrapped: Vec<(Partition, Option<Instant>)>,
    last_liveness: Option<Instant>,
    last_sufficient_peers: Option<Instant>,
    peer_count: Option<u64>,
}

impl SignalState {
    pub fn new(partitions: &PartitionSet, started_at: Instant) -> Self {
        Self {
            started_at,
            bootstrapped: partitions.iter().map(|p| (p.clone(), None)).collect(),
            last_liveness: None,
            last_sufficient_peers: None,
            peer_count: None,
        }
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Record bootstrap completion for `partition`.
    ///
    /// Returns `true` only for the call that set the flag. Later calls and
    /// unknown partitions leave the state untouched.
    pub fn record_bootstrapped(&mut self, partition: &Partition, at: Instant) -> bool {
        match self.bootstrapped.iter_mut().find(|(p, _)| p == partition) {
            Some((_, slot @ None)) => {
                *slot = Some(at);
                true
            }
            _ => false,
        }
    }

    pub fn bootstrapped_at(&self, partition: &Partition) -> Option<Instant> {
        self.bootstrapped
            .iter()
            .find(|(p, _)| p == partition)
            .and_then(|(_, at)| *at)
    }

    /// First partition (in configured order) that has not bootstrapped yet.
    pub fn first_unbootstrapped(&self) -> Option<&Partition> {
        self.bootstrapped
            .iter()
            .find(|(_, at)| at.is_none())
            .map(|(p, _)| p)
    }

    pub fn record_liveness(&mut self, at: Instant) {
        self.last_liveness = Some(at);
    }

    pub fn last_liveness(&self) -> Option<Instant> {
        self.last_liveness
    }

    /// Store a peer count and stamp it when it meets `min_peers`.
    pub fn record_peer_count(
        &mut self,
        count: u64,
        min_peers: u64,
        at: Instant,
    ) -> PeerObservation {
        self.peer_count = Some(count);
        if count < min_peers {
            return PeerObservation {
                sufficient: false,
                first_sufficient: false,
            };
        }

        let first_sufficient = self.last_sufficient_peers.is_none();
        self.last_sufficient_peers = Some(at);
        PeerObservation {
            sufficient: true,
            first_sufficient,
        }
    }

    pub fn last_sufficient_peers(&self) -> Option<Instant> {
        self.last_sufficient_peers
    }

    pub fn peer_count(&self) -> Option<u64> {
        self.peer_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn partitions() -> PartitionSet {
        PartitionSet::from_config(&MonitorConfig::default()).unwrap()
    }

    #[test]
    fn test_partition_set_keeps_order() {
        let names: Vec<_> = partitions().iter().map(|p| p.as_str().to_string()).collect();
        assert_eq!(names, vec!["X", "C", "P"]);
        assert_eq!(Partition::new("C").to_string(), "C-Chain");
    }

    #[test]
    fn test_partition_set_rejects_empty() {
        let config = MonitorConfig {
            partitions: Vec::new(),
            ..MonitorConfig::default()
        };
        assert_eq!(
            PartitionSet::from_config(&config).unwrap_err(),
            vec![ValidationError::NoPartitions]
        );
    }

    #[test]
    fn test_bootstrap_recorded_once() {
        let start = Instant::now();
        let mut state = SignalState::new(&partitions(), start);
        let x = Partition::new("X");

        assert!(state.record_bootstrapped(&x, start + Duration::from_secs(1)));
        assert!(!state.record_bootstrapped(&x, start + Duration::from_secs(2)));
        assert_eq!(state.bootstrapped_at(&x), Some(start + Duration::from_secs(1)));
        assert!(!state.record_bootstrapped(&Partition::new("Q"), start));
    }

    #[test]
    fn test_first_unbootstrapped_follows_order() {
        let start = Instant::now();
        let mut state = SignalState::new(&partitions(), start);
        assert_eq!(state.first_unbootstrapped(), Some(&Partition::new("X")));

        state.record_bootstrapped(&Partition::new("X"), start);
        state.record_bootstrapped(&Partition::new("P"), start);
        assert_eq!(state.first_unbootstrapped(), Some(&Partition::new("C")));

        state.record_bootstrapped(&Partition::new("C"), start);
        assert_eq!(state.first_unbootstrapped(), None);
    }

    #[test]
    fn test_peer_observations() {
        let start = Instant::now();
        let mut state = SignalState::new(&partitions(), start);

        let low = state.record_peer_count(3, 5, start);
        assert!(!low.sufficient && !low.first_sufficient);
        assert_eq!(state.last_sufficient_peers(), None);

        let first = state.record_peer_count(5, 5, start + Duration::from_secs(1));
        assert!(first.sufficient && first.first_sufficient);

        let again = state.record_peer_count(8, 5, start + Duration::from_secs(2));
        assert!(again.sufficient && !again.first_sufficient);
        assert_eq!(state.last_sufficient_peers(), Some(start + Duration::from_secs(2)));

        state.record_peer_count(1, 5, start + Duration::from_secs(3));
        assert_eq!(state.peer_count(), Some(1));
        assert_eq!(state.last_sufficient_peers(), Some(start + Duration::from_secs(2)));
    }
}
