//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the sentinel.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the sentinel.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SentinelConfig {
    /// Health monitor cadence and thresholds.
    pub monitor: MonitorConfig,

    /// Connection to the monitored node.
    pub node: NodeConfig,

    /// Verdict endpoint settings.
    pub server: ServerConfig,

    /// Notification delivery settings.
    pub notifier: NotifierConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Health monitor configuration.
///
/// Immutable once handed to [`crate::health::Monitor::new`].
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct MonitorConfig {
    /// Interval between signal polls and verdict evaluations, in milliseconds.
    pub poll_interval_ms: u64,

    /// Interval between status heartbeats, in milliseconds.
    pub status_interval_ms: u64,

    /// Maximum tolerated staleness of a timestamped signal, in milliseconds.
    pub unhealthy_threshold_ms: u64,

    /// Minimum number of connected peers for the node to count as healthy.
    pub min_peers: u64,

    /// Partitions (chains) that must finish bootstrapping, in report order.
    pub partitions: Vec<String>,

    /// Minimum gap between two writes of the same metric, in milliseconds.
    pub metric_min_gap_ms: u64,
}

impl MonitorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn status_interval(&self) -> Duration {
        Duration::from_millis(self.status_interval_ms)
    }

    pub fn unhealthy_threshold(&self) -> Duration {
        Duration::from_millis(self.unhealthy_threshold_ms)
    }

    pub fn metric_min_gap(&self) -> Duration {
        Duration::from_millis(self.metric_min_gap_ms)
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 10_000,
            status_interval_ms: 60 * 60 * 1000,
            unhealthy_threshold_ms: 60_000,
            min_peers: 400,
            partitions: vec!["X".to_string(), "C".to_string(), "P".to_string()],
            metric_min_gap_ms: 10_000,
        }
    }
}

/// Node RPC configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Base URL of the node's HTTP API (e.g., "http://localhost:9650").
    pub endpoint: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9650".to_string(),
            request_timeout_secs: 10,
        }
    }
}

/// Verdict endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Serve the verdict endpoint.
    pub enabled: bool,

    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 5,
        }
    }
}

/// Notification configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NotifierConfig {
    /// Identifier of the monitored node, prefixed to every message.
    pub node_id: String,

    /// Optional webhook receiving every notification as JSON.
    pub webhook_url: Option<String>,

    /// Number of undelivered webhook messages kept before dropping new ones.
    pub queue_capacity: usize,

    /// Webhook request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            node_id: "local".to_string(),
            webhook_url: None,
            queue_capacity: 64,
            timeout_secs: 10,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
