//! Application events
//!
//! The core publishes events over a broadcast bus; hosts subscribe and
//! render them (transient notifications auto-dismiss on the UI side).
//! Sending is fire-and-forget: the core never blocks on, or fails
//! because of, an absent subscriber.

use serde::Serialize;
use tokio::sync::broadcast;

use super::types::CapturedItem;

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "payload")]
pub enum AppEvent {
    #[serde(rename = "capture://item")]
    ItemCaptured(CapturedItem),

    /// Transient user-facing message
    #[serde(rename = "notify://message")]
    Notification(String),

    #[serde(rename = "monitor://changed")]
    MonitoringChanged { text: bool, images: bool },

    /// Sticky "clipboard permission needed" banner state
    #[serde(rename = "clipboard://permission")]
    PermissionRequired(bool),
}

/// Broadcast bus for application events
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<AppEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// A send error only means nobody is listening; that is fine.
    pub fn emit(&self, event: AppEvent) {
        let _ = self.tx.send(event);
    }

    /// Emit a transient notification message
    pub fn notify(&self, message: impl Into<String>) {
        self.emit(AppEvent::Notification(message.into()));
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn notify_reaches_subscriber() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        bus.notify("hello");
        match rx.recv().await.unwrap() {
            AppEvent::Notification(msg) => assert_eq!(msg, "hello"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn emit_without_subscribers_is_a_no_op() {
        let bus = EventBus::new();
        bus.notify("nobody is listening");
    }
}
