//! Webhook notifier.
//!
//! # Responsibilities
//! - Queue notifications without blocking the caller
//! - Deliver them as JSON POSTs from a background task
//! - Drop (and log) messages when the queue is full
//!
//! # Payload
//! ```text
//! {"kind": "ALERT", "node_id": "NodeID-...", "text": "[ALERT](NodeID-...): not healthy: ..."}
//! ```

use serde::Serialize;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use url::Url;

use crate::config::NotifierConfig;
use crate::notify::{NotificationKind, Notifier};

/// One queued notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookMessage {
    pub kind: NotificationKind,
    pub node_id: String,
    pub text: String,
}

/// Error creating a webhook notifier.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("invalid webhook url: {0}")]
    Url(#[from] url::ParseError),

    #[error("could not build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Queueing front end, cheap to call from any task.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    node_id: String,
    queue: mpsc::Sender<WebhookMessage>,
}

/// Background half that performs the HTTP deliveries.
#[derive(Debug)]
pub struct WebhookDelivery {
    http: reqwest::Client,
    url: Url,
    queue: mpsc::Receiver<WebhookMessage>,
}

impl WebhookNotifier {
    /// Create the notifier and its delivery task body.
    pub fn new(
        url: &str,
        config: &NotifierConfig,
    ) -> Result<(Self, WebhookDelivery), WebhookError> {
        let url = Url::parse(url)?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));

        Ok((
            Self {
                node_id: config.node_id.clone(),
                queue: tx,
            },
            WebhookDelivery { http, url, queue: rx },
        ))
    }
}

impl Notifier for WebhookNotifier {
    fn notify(&self, kind: NotificationKind, message: &str) {
        let message = WebhookMessage {
            kind,
            node_id: self.node_id.clone(),
            text: format!("[{}]({}): {}", kind, self.node_id, message),
        };

        match self.queue.try_send(message) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(dropped)) => {
                tracing::warn!(kind = %dropped.kind, "Webhook queue full, dropping notification");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!("Webhook delivery stopped, dropping notification");
            }
        }
    }
}

impl WebhookDelivery {
    /// Deliver queued messages until shutdown or until every sender is gone.
    ///
    /// Messages already accepted when shutdown arrives are still delivered;
    /// the caller bounds how long that may take.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(url = %self.url, "Webhook delivery starting");

        loop {
            let message = tokio::select! {
                message = self.queue.recv() => match message {
                    Some(message) => message,
                    None => return,
                },
                _ = shutdown.recv() => break,
            };

            self.deliver(&message).await;
        }

        let pending = self.queue.len();
        tracing::info!(pending, "Webhook delivery received shutdown signal, draining queue");
        self.queue.close();
        while let Ok(message) = self.queue.try_recv() {
            self.deliver(&message).await;
        }
        tracing::info!(drained = pending, "Webhook queue drained");
    }

    async fn deliver(&self, message: &WebhookMessage) {
        let result = self
            .http
            .post(self.url.clone())
            .json(message)
            .send()
            .await
            .and_then(|response| response.error_for_status());

        if let Err(e) = result {
            tracing::error!(kind = %message.kind, error = %e, "Webhook delivery failed");
        }
    }
}
