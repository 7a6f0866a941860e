//! node-sentinel
//!
//! Health sentinel for a blockchain node, built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────────┐
//!                 │                    NODE SENTINEL                     │
//!                 │                                                      │
//!   Node API      │  ┌──────────┐    ┌─────────────┐    ┌────────────┐  │
//!   ◀─────────────┼──│ client   │◀───│  pollers    │───▶│  signal    │  │
//!   (JSON-RPC)    │  │ (rpc)    │    │ boot/live/  │    │  state     │  │
//!                 │  └──────────┘    │ peers       │    └─────┬──────┘  │
//!                 │                  └──────┬──────┘          │         │
//!                 │                         │                 ▼         │
//!                 │                  ┌──────▼──────┐    ┌────────────┐  │
//!   Prometheus    │                  │  metrics    │    │ aggregator │  │
//!   ◀─────────────┼──────────────────│  emitter    │    │ hysteresis │  │
//!                 │                  └─────────────┘    └─────┬──────┘  │
//!                 │                                           │         │
//!   Webhook/logs  │  ┌──────────┐    ┌─────────────┐          │         │
//!   ◀─────────────┼──│ notify   │◀───│  status     │◀─────────┘         │
//!                 │  └──────────┘    └─────────────┘                    │
//!                 │                                                      │
//!   GET /*        │  ┌──────────────────────────────┐                   │
//!   ──────────────┼─▶│ http: 200 healthy | 503 why  │                   │
//!                 │  └──────────────────────────────┘                   │
//!                 └──────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;

use node_sentinel::config::{load_config, validate_config, ConfigError, SentinelConfig};
use node_sentinel::lifecycle::startup;
use node_sentinel::observability::init_logging;

#[derive(Parser)]
#[command(name = "node-sentinel")]
#[command(about = "Health sentinel for a blockchain node", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Node API base URL, overrides [node].endpoint
    #[arg(long)]
    node_endpoint: Option<String>,

    /// Verdict endpoint address, overrides [server].bind_address
    #[arg(long)]
    bind: Option<String>,

    /// Node identifier used in notifications and metric labels
    #[arg(long)]
    node_id: Option<String>,
}

impl Cli {
    fn apply(&self, config: &mut SentinelConfig) {
        if let Some(endpoint) = &self.node_endpoint {
            config.node.endpoint = endpoint.clone();
        }
        if let Some(bind) = &self.bind {
            config.server.bind_address = bind.clone();
        }
        if let Some(node_id) = &self.node_id {
            config.notifier.node_id = node_id.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => SentinelConfig::default(),
    };
    cli.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        node_endpoint = %config.node.endpoint,
        node_id = %config.notifier.node_id,
        bind_address = %config.server.bind_address,
        "node-sentinel starting"
    );

    startup::run(config).await
}
