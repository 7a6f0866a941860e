//! Shared fakes for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

use node_sentinel::client::{ClientError, NodeClient};
use node_sentinel::config::MonitorConfig;
use node_sentinel::health::{Monitor, Partition};
use node_sentinel::notify::{NotificationKind, Notifier};
use node_sentinel::observability::metrics::{MetricError, MetricWriter, PEER_COUNT_METRIC};

fn rpc_error(message: &str) -> ClientError {
    ClientError::Rpc {
        code: -32000,
        message: message.to_string(),
    }
}

/// Programmable node. Every signal can be flipped or made to fail at runtime.
#[derive(Default)]
pub struct FakeNode {
    live: AtomicBool,
    liveness_fails: AtomicBool,
    peers: AtomicU64,
    peers_fail: AtomicBool,
    bootstrapped: Mutex<HashMap<String, bool>>,
    bootstrap_script: Mutex<HashMap<String, VecDeque<Result<bool, String>>>>,
    delay: Mutex<Duration>,
    liveness_calls: AtomicUsize,
    peer_calls: AtomicUsize,
    bootstrap_calls: Mutex<HashMap<String, usize>>,
}

impl FakeNode {
    /// A node that is live, fully bootstrapped and has `peers` peers.
    pub fn ready(partitions: &[&str], peers: u64) -> Arc<Self> {
        let node = Self::default();
        node.set_live(true);
        node.set_peers(peers);
        for p in partitions {
            node.set_bootstrapped(p, true);
        }
        Arc::new(node)
    }

    pub fn set_live(&self, live: bool) {
        self.live.store(live, Ordering::SeqCst);
    }

    pub fn fail_liveness(&self, fail: bool) {
        self.liveness_fails.store(fail, Ordering::SeqCst);
    }

    pub fn set_peers(&self, peers: u64) {
        self.peers.store(peers, Ordering::SeqCst);
    }

    pub fn fail_peers(&self, fail: bool) {
        self.peers_fail.store(fail, Ordering::SeqCst);
    }

    pub fn set_bootstrapped(&self, partition: &str, bootstrapped: bool) {
        self.bootstrapped
            .lock()
            .unwrap()
            .insert(partition.to_string(), bootstrapped);
    }

    /// Answers consumed one per bootstrap call before the steady value applies.
    pub fn script_bootstrap(&self, partition: &str, answers: Vec<Result<bool, String>>) {
        self.bootstrap_script
            .lock()
            .unwrap()
            .insert(partition.to_string(), answers.into());
    }

    /// Make every call take `delay` before answering.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn liveness_calls(&self) -> usize {
        self.liveness_calls.load(Ordering::SeqCst)
    }

    pub fn peer_calls(&self) -> usize {
        self.peer_calls.load(Ordering::SeqCst)
    }

    pub fn bootstrap_calls(&self, partition: &str) -> usize {
        self.bootstrap_calls
            .lock()
            .unwrap()
            .get(partition)
            .copied()
            .unwrap_or(0)
    }

    async fn pause(&self) {
        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl NodeClient for FakeNode {
    async fn is_healthy(&self) -> Result<bool, ClientError> {
        self.liveness_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if self.liveness_fails.load(Ordering::SeqCst) {
            return Err(rpc_error("liveness unavailable"));
        }
        Ok(self.live.load(Ordering::SeqCst))
    }

    async fn is_bootstrapped(&self, partition: &Partition) -> Result<bool, ClientError> {
        *self
            .bootstrap_calls
            .lock()
            .unwrap()
            .entry(partition.as_str().to_string())
            .or_default() += 1;
        self.pause().await;

        let scripted = self
            .bootstrap_script
            .lock()
            .unwrap()
            .get_mut(partition.as_str())
            .and_then(|queue| queue.pop_front());
        match scripted {
            Some(answer) => answer.map_err(|message| rpc_error(&message)),
            None => Ok(self
                .bootstrapped
                .lock()
                .unwrap()
                .get(partition.as_str())
                .copied()
                .unwrap_or(false)),
        }
    }

    async fn peer_count(&self) -> Result<u64, ClientError> {
        self.peer_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if self.peers_fail.load(Ordering::SeqCst) {
            return Err(rpc_error("peers unavailable"));
        }
        Ok(self.peers.load(Ordering::SeqCst))
    }
}

/// Notifier that keeps every notification in order.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(NotificationKind, String)>>,
}

impl RecordingNotifier {
    pub fn all(&self) -> Vec<(NotificationKind, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn of_kind(&self, kind: NotificationKind) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, message)| message.clone())
            .collect()
    }

    pub fn count_containing(&self, kind: NotificationKind, needle: &str) -> usize {
        self.of_kind(kind)
            .iter()
            .filter(|message| message.contains(needle))
            .count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, kind: NotificationKind, message: &str) {
        self.sent.lock().unwrap().push((kind, message.to_string()));
    }
}

/// Metric writer recording when each write happened.
#[derive(Default)]
pub struct RecordingMetricWriter {
    writes: Mutex<Vec<(Instant, u64)>>,
    fail: AtomicBool,
}

impl RecordingMetricWriter {
    pub fn writes(&self) -> Vec<(Instant, u64)> {
        self.writes.lock().unwrap().clone()
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl MetricWriter for RecordingMetricWriter {
    async fn write_peer_count(&self, count: u64) -> Result<(), MetricError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(MetricError {
                metric: PEER_COUNT_METRIC,
                reason: "sink offline".into(),
            });
        }
        self.writes.lock().unwrap().push((Instant::now(), count));
        Ok(())
    }
}

/// Fast monitor settings: poll 10ms, grace 30ms, status 15ms, 5 peers.
pub fn fast_config() -> MonitorConfig {
    MonitorConfig {
        poll_interval_ms: 10,
        status_interval_ms: 15,
        unhealthy_threshold_ms: 30,
        min_peers: 5,
        partitions: vec!["X".into(), "C".into(), "P".into()],
        metric_min_gap_ms: 0,
    }
}

/// Monitor over the given fakes.
pub fn monitor_with(
    config: MonitorConfig,
    node: Arc<FakeNode>,
    notifier: Arc<RecordingNotifier>,
    metrics: Arc<RecordingMetricWriter>,
) -> Monitor {
    Monitor::new(config, node, notifier, metrics).unwrap()
}
