//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the real collaborators from configuration
//! - Start the monitor tasks, the verdict endpoint and webhook delivery
//! - Wait for a termination signal, then stop everything in order
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Every shutdown receiver is subscribed before the signal can fire
//! - Shutdown has a deadline: tasks still running after it are abandoned

use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::client::RpcClient;
use crate::config::SentinelConfig;
use crate::health::{BootstrapOutcome, Monitor};
use crate::http::VerdictServer;
use crate::lifecycle::{signals, Shutdown};
use crate::notify::{FanoutNotifier, LogNotifier, Notifier, WebhookNotifier};
use crate::observability::metrics::{init_metrics, PrometheusMetricWriter};

/// How long stopped tasks get to finish before the process exits anyway.
pub const SHUTDOWN_DEADLINE: Duration = Duration::from_secs(10);

/// Run the sentinel until SIGINT/SIGTERM.
pub async fn run(config: SentinelConfig) -> Result<(), Box<dyn Error>> {
    let shutdown = Shutdown::new();

    let client = Arc::new(RpcClient::new(&config.node)?);
    tracing::info!(endpoint = %config.node.endpoint, "Node client ready");

    let log: Arc<dyn Notifier> = Arc::new(LogNotifier::new(config.notifier.node_id.clone()));
    let mut notifier = FanoutNotifier::new(vec![log]);

    let mut background: Vec<JoinHandle<()>> = Vec::new();
    if let Some(url) = &config.notifier.webhook_url {
        let (webhook, delivery) = WebhookNotifier::new(url, &config.notifier)?;
        notifier.push(Arc::new(webhook));
        background.push(tokio::spawn(delivery.run(shutdown.subscribe())));
    }

    tracing::info!(targets = notifier.target_count(), "Notifiers ready");

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        init_metrics(addr)?;
    }
    let metric_writer = Arc::new(PrometheusMetricWriter::new(config.notifier.node_id.clone()));

    let monitor = Monitor::new(
        config.monitor.clone(),
        client,
        Arc::new(notifier),
        metric_writer,
    )?;

    if config.server.enabled {
        let listener = TcpListener::bind(&config.server.bind_address).await?;
        let server = VerdictServer::new(
            monitor.clone(),
            Duration::from_secs(config.server.request_timeout_secs),
        );
        let server_shutdown = shutdown.subscribe();
        background.push(tokio::spawn(async move {
            if let Err(e) = server.run(listener, server_shutdown).await {
                tracing::error!(error = %e, "Verdict endpoint failed");
            }
        }));
    } else {
        tracing::info!("Verdict endpoint disabled");
    }

    let tasks = monitor.start(&shutdown);

    signals::wait_for_signal().await?;
    shutdown.trigger();

    let drain = async {
        let outcomes = tasks.wait().await;
        for handle in background {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Background task failed");
            }
        }
        outcomes
    };

    match tokio::time::timeout(SHUTDOWN_DEADLINE, drain).await {
        Ok(outcomes) => {
            let pending: Vec<&str> = outcomes
                .iter()
                .filter(|o| matches!(o, BootstrapOutcome::Cancelled { .. }))
                .map(|o| o.partition().as_str())
                .collect();
            tracing::info!(
                partitions = outcomes.len(),
                not_bootstrapped = ?pending,
                "Shutdown complete"
            );
        }
        Err(_) => {
            tracing::warn!(deadline = ?SHUTDOWN_DEADLINE, "Shutdown deadline exceeded, exiting");
        }
    }

    Ok(())
}
