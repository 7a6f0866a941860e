//! Node health sentinel library.
//!
//! Polls a node for liveness, per-partition bootstrap status and peer count,
//! folds the signals into a single healthy/unhealthy verdict, notifies on
//! verdict flips and serves the verdict over HTTP.

pub mod client;
pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod notify;
pub mod observability;

pub use client::{NodeClient, RpcClient};
pub use config::schema::SentinelConfig;
pub use health::{Monitor, MonitorTasks, Verdict};
pub use http::VerdictServer;
pub use lifecycle::Shutdown;
pub use notify::{NotificationKind, Notifier};
