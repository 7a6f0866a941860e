//! Notification delivery subsystem.
//!
//! # Data Flow
//! ```text
//! Pollers / aggregator / status broadcaster
//!     → Notifier trait (info, alert, status)
//!     → log.rs (structured tracing events)
//!     → webhook.rs (queued JSON POSTs, delivered in the background)
//! ```
//!
//! # Design Decisions
//! - Fire-and-forget: callers never wait on delivery
//! - Delivery failures are logged, never surfaced to the monitor

pub mod log;
pub mod webhook;

use std::fmt;
use std::sync::Arc;

pub use log::LogNotifier;
pub use webhook::WebhookNotifier;

/// Category of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NotificationKind {
    Info,
    Alert,
    Status,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NotificationKind::Info => "INFO",
            NotificationKind::Alert => "ALERT",
            NotificationKind::Status => "STATUS",
        };
        f.write_str(label)
    }
}

/// Sink for operator-facing messages.
///
/// Implementations must return promptly.
pub trait Notifier: Send + Sync {
    fn notify(&self, kind: NotificationKind, message: &str);

    fn info(&self, message: &str) {
        self.notify(NotificationKind::Info, message);
    }

    fn alert(&self, message: &str) {
        self.notify(NotificationKind::Alert, message);
    }

    fn status(&self, message: &str) {
        self.notify(NotificationKind::Status, message);
    }
}

/// Forwards every notification to each inner notifier in order.
#[derive(Clone, Default)]
pub struct FanoutNotifier {
    targets: Vec<Arc<dyn Notifier>>,
}

impl FanoutNotifier {
    pub fn new(targets: Vec<Arc<dyn Notifier>>) -> Self {
        Self { targets }
    }

    pub fn push(&mut self, target: Arc<dyn Notifier>) {
        self.targets.push(target);
    }

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }
}

impl Notifier for FanoutNotifier {
    fn notify(&self, kind: NotificationKind, message: &str) {
        for target in &self.targets {
            target.notify(kind, message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Collect(Mutex<Vec<(NotificationKind, String)>>);

    impl Notifier for Collect {
        fn notify(&self, kind: NotificationKind, message: &str) {
            self.0.lock().unwrap().push((kind, message.to_string()));
        }
    }

    #[test]
    fn test_default_methods_tag_kind() {
        let collect = Collect::default();
        collect.info("a");
        collect.alert("b");
        collect.status("c");

        let seen = collect.0.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                (NotificationKind::Info, "a".to_string()),
                (NotificationKind::Alert, "b".to_string()),
                (NotificationKind::Status, "c".to_string()),
            ]
        );
    }

    #[test]
    fn test_fanout_reaches_every_target() {
        let first = Arc::new(Collect::default());
        let second = Arc::new(Collect::default());
        let mut fanout = FanoutNotifier::new(vec![first.clone() as Arc<dyn Notifier>]);
        fanout.push(second.clone());
        assert_eq!(fanout.target_count(), 2);

        fanout.alert("disk full");
        assert_eq!(first.0.lock().unwrap().len(), 1);
        assert_eq!(second.0.lock().unwrap()[0].1, "disk full");
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(NotificationKind::Alert.to_string(), "ALERT");
        assert_eq!(
            serde_json::to_string(&NotificationKind::Status).unwrap(),
            "\"STATUS\""
        );
    }
}
