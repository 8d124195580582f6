use crate::application::ports::notifier::{Notification, NotificationKind, Notifier};
use tokio::sync::broadcast;

/// Fans notifications out to the shell over a broadcast channel. Sending
/// never blocks and never fails the caller: with no subscriber (headless
/// runs, tests that don't care) the toast simply evaporates, which is the
/// fire-and-forget contract.
pub struct BroadcastNotifier {
    sender: broadcast::Sender<Notification>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(64)
    }
}

impl Notifier for BroadcastNotifier {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Success => tracing::info!(
                target: "notify",
                message = %notification.message,
                "toast"
            ),
            NotificationKind::Error => tracing::warn!(
                target: "notify",
                message = %notification.message,
                "toast"
            ),
        }
        let _ = self.sender.send(notification);
    }
}
