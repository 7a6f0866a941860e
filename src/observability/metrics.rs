//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Forward the peer-count signal to an external metrics sink
//! - Bound the write rate per metric independently of the poll cadence
//! - Expose a Prometheus-compatible scrape endpoint
//!
//! # Metrics
//! - `node_connected_peers` (gauge): latest peer count, labelled by `node_id`
//!
//! # Design Decisions
//! - Skipped writes are not errors
//! - The last-write timestamp only moves when a write succeeds, so a failed
//!   write is retried on the next poll

use async_trait::async_trait;
use dashmap::DashMap;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

/// Name of the peer-count metric.
pub const PEER_COUNT_METRIC: &str = "node_connected_peers";

/// Failure reported by a metrics sink.
#[derive(Debug, Error)]
#[error("could not write {metric}: {reason}")]
pub struct MetricError {
    pub metric: &'static str,
    pub reason: String,
}

/// External sink for node metrics.
#[async_trait]
pub trait MetricWriter: Send + Sync {
    async fn write_peer_count(&self, count: u64) -> Result<(), MetricError>;
}

/// Publishes metrics through the `metrics` facade.
///
/// Without an installed recorder the writes are no-ops.
#[derive(Debug, Clone)]
pub struct PrometheusMetricWriter {
    node_id: String,
}

impl PrometheusMetricWriter {
    pub fn new(node_id: impl Into<String>) -> Self {
        Self { node_id: node_id.into() }
    }
}

#[async_trait]
impl MetricWriter for PrometheusMetricWriter {
    async fn write_peer_count(&self, count: u64) -> Result<(), MetricError> {
        metrics::gauge!(PEER_COUNT_METRIC, "node_id" => self.node_id.clone()).set(count as f64);
        Ok(())
    }
}

/// Install the global Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    metrics::describe_gauge!(PEER_COUNT_METRIC, "Connected peers reported by the monitored node");
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Minimum-gap rate limiter keyed by metric name.
#[derive(Debug)]
pub struct RateLimiter {
    min_gap: Duration,
    last_write: DashMap<&'static str, Instant>,
}

impl RateLimiter {
    pub fn new(min_gap: Duration) -> Self {
        Self {
            min_gap,
            last_write: DashMap::new(),
        }
    }

    /// Whether a write of `metric` at `now` is allowed.
    pub fn admits(&self, metric: &'static str, now: Instant) -> bool {
        match self.last_write.get(metric) {
            Some(last) => now.saturating_duration_since(*last) >= self.min_gap,
            None => true,
        }
    }

    /// Remember a performed write.
    pub fn record(&self, metric: &'static str, at: Instant) {
        self.last_write.insert(metric, at);
    }
}

/// Result of an emit request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitOutcome {
    Written,
    Skipped,
}

/// Rate-limited front of a [`MetricWriter`].
pub struct MetricEmitter {
    writer: Arc<dyn MetricWriter>,
    limiter: RateLimiter,
}

impl MetricEmitter {
    pub fn new(writer: Arc<dyn MetricWriter>, min_gap: Duration) -> Self {
        Self {
            writer,
            limiter: RateLimiter::new(min_gap),
        }
    }

    /// Write the peer count unless the previous write is closer than the gap.
    pub async fn emit_peer_count(
        &self,
        count: u64,
        now: Instant,
    ) -> Result<EmitOutcome, MetricError> {
        if !self.limiter.admits(PEER_COUNT_METRIC, now) {
            tracing::trace!(count, "Peer count write rate limited");
            return Ok(EmitOutcome::Skipped);
        }

        self.writer.write_peer_count(count).await?;
        self.limiter.record(PEER_COUNT_METRIC, now);
        Ok(EmitOutcome::Written)
    }
}

impl std::fmt::Debug for MetricEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricEmitter")
            .field("limiter", &self.limiter)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        writes: Mutex<Vec<u64>>,
        fail: AtomicBool,
    }

    #[async_trait]
    impl MetricWriter for Recorder {
        async fn write_peer_count(&self, count: u64) -> Result<(), MetricError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(MetricError {
                    metric: PEER_COUNT_METRIC,
                    reason: "sink down".into(),
                });
            }
            self.writes.lock().unwrap().push(count);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_emitter_skips_inside_gap() {
        let recorder = Arc::new(Recorder::default());
        let emitter = MetricEmitter::new(recorder.clone(), Duration::from_secs(10));
        let start = Instant::now();

        assert_eq!(emitter.emit_peer_count(1, start).await.unwrap(), EmitOutcome::Written);
        assert_eq!(
            emitter.emit_peer_count(2, start + Duration::from_secs(9)).await.unwrap(),
            EmitOutcome::Skipped
        );
        assert_eq!(
            emitter.emit_peer_count(3, start + Duration::from_secs(10)).await.unwrap(),
            EmitOutcome::Written
        );
        assert_eq!(*recorder.writes.lock().unwrap(), vec![1, 3]);
    }

    #[tokio::test]
    async fn test_failed_write_is_retried() {
        let recorder = Arc::new(Recorder::default());
        let emitter = MetricEmitter::new(recorder.clone(), Duration::from_secs(10));
        let start = Instant::now();

        recorder.fail.store(true, Ordering::SeqCst);
        let err = emitter.emit_peer_count(1, start).await.unwrap_err();
        assert_eq!(err.to_string(), "could not write node_connected_peers: sink down");

        recorder.fail.store(false, Ordering::SeqCst);
        assert_eq!(
            emitter.emit_peer_count(2, start + Duration::from_secs(1)).await.unwrap(),
            EmitOutcome::Written
        );
    }

    #[tokio::test]
    async fn test_prometheus_writer_without_recorder() {
        let writer = PrometheusMetricWriter::new("node-1");
        assert!(writer.write_peer_count(42).await.is_ok());
    }

    proptest! {
        #[test]
        fn prop_write_iff_gap_elapsed(
            gap_ms in 0u64..50,
            steps in proptest::collection::vec(0u64..40, 1..40),
        ) {
            let limiter = RateLimiter::new(Duration::from_millis(gap_ms));
            let start = Instant::now();
            let mut at = 0u64;
            let mut last_performed: Option<u64> = None;

            for step in steps {
                at += step;
                let now = start + Duration::from_millis(at);
                let expected = match last_performed {
                    Some(last) => at - last >= gap_ms,
                    None => true,
                };
                let admitted = limiter.admits(PEER_COUNT_METRIC, now);
                prop_assert_eq!(admitted, expected);
                if admitted {
                    limiter.record(PEER_COUNT_METRIC, now);
                    last_performed = Some(at);
                }
            }
        }
    }
}
