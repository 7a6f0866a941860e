//! Monitored node client subsystem.
//!
//! # Data Flow
//! ```text
//! Signal pollers
//!     → NodeClient trait (liveness, bootstrap status, peer count)
//!     → rpc.rs (JSON-RPC 2.0 over HTTP to the node API)
//! ```
//!
//! # Design Decisions
//! - Pollers only see the trait; tests drive the monitor with fakes
//! - Every call is independent and bounded by the request timeout
//! - Errors are transient from the monitor's point of view

pub mod rpc;

use async_trait::async_trait;
use thiserror::Error;

use crate::health::Partition;

pub use rpc::RpcClient;

/// Errors returned by a node query.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure, timeout or non-success HTTP status.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The node answered with a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The node answered with something we could not interpret.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The configured endpoint is not a usable base URL.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
}

/// Queries the readiness signals of the monitored node.
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// Whether the node reports itself live.
    async fn is_healthy(&self) -> Result<bool, ClientError>;

    /// Whether the given partition has finished bootstrapping.
    async fn is_bootstrapped(&self, partition: &Partition) -> Result<bool, ClientError>;

    /// Number of currently connected peers.
    async fn peer_count(&self) -> Result<u64, ClientError>;
}
