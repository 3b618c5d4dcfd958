use tokio::sync::broadcast;

use crate::models::Notification;

/// Delivers `"{subject}: {message}"` to the user. Best-effort, never fails.
pub trait Notifier: Send + Sync {
    fn notify(&self, subject: &str, message: &str);
}

/// Logs every notification and publishes it to the `/events` stream.
#[derive(Clone)]
pub struct BroadcastNotifier {
    events_tx: broadcast::Sender<String>,
}

impl BroadcastNotifier {
    pub fn new(events_tx: broadcast::Sender<String>) -> Self {
        Self { events_tx }
    }
}

impl Notifier for BroadcastNotifier {
    fn notify(&self, subject: &str, message: &str) {
        let n = Notification::new(subject, message);
        tracing::info!(target: "notify", "{}", n.text());

        let payload = match serde_json::to_string(&n) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("could not encode notification: {}", e);
                return;
            }
        };

        // no subscribers is fine
        let _ = self.events_tx.send(payload);
    }
}
