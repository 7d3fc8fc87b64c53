//! Process-wide, fire-and-forget user notification channel.

use tokio::sync::broadcast;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Success(String),
    Error(String),
    Info(String),
}

impl Notification {
    pub fn message(&self) -> &str {
        match self {
            Notification::Success(msg) | Notification::Error(msg) | Notification::Info(msg) => msg,
        }
    }
}

/// Collaborator boundary: controllers report outcomes here and never
/// learn whether anyone is listening.
pub trait NotificationSink: Send + Sync {
    fn notify_success(&self, message: &str);
    fn notify_error(&self, message: &str);
    fn notify_info(&self, message: &str);
}

/// Fan-out sink backed by a broadcast channel. UI layers subscribe;
/// sends without a live receiver are dropped silently.
pub struct BroadcastNotifier {
    tx: broadcast::Sender<Notification>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    fn publish(&self, notification: Notification) {
        if self.tx.send(notification).is_err() {
            tracing::debug!("notification dropped; no subscribers");
        }
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(64)
    }
}

impl NotificationSink for BroadcastNotifier {
    fn notify_success(&self, message: &str) {
        self.publish(Notification::Success(message.to_string()));
    }

    fn notify_error(&self, message: &str) {
        self.publish(Notification::Error(message.to_string()));
    }

    fn notify_info(&self, message: &str) {
        self.publish(Notification::Info(message.to_string()));
    }
}

/// Discards everything. Stands in where no UI is attached.
pub struct NullNotifier;

impl NotificationSink for NullNotifier {
    fn notify_success(&self, _message: &str) {}
    fn notify_error(&self, _message: &str) {}
    fn notify_info(&self, _message: &str) {}
}
