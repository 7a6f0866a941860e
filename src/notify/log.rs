//! Notifier that writes to the structured log.

use crate::notify::{NotificationKind, Notifier};

/// Emits every notification as a `tracing` event.
///
/// Alerts are logged at WARN, everything else at INFO.
#[derive(Debug, Clone)]
pub struct LogNotifier {
    node_id: String,
}

impl LogNotifier {
    pub fn new(node_id: impl Into<String>) -> Self {
        Self { node_id: node_id.into() }
    }
}

impl Notifier for LogNotifier {
    fn notify(&self, kind: NotificationKind, message: &str) {
        match kind {
            NotificationKind::Alert => {
                tracing::warn!(node_id = %self.node_id, kind = %kind, "{}", message);
            }
            NotificationKind::Info | NotificationKind::Status => {
                tracing::info!(node_id = %self.node_id, kind = %kind, "{}", message);
            }
        }
    }
}
