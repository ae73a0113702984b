//! Delivery of approach notifications.

use std::fmt;
use std::sync::Mutex;

use chrono::{DateTime, Local};
use tracing::info;

/// A one-shot "your bus is nearly here" message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Label of the session that produced it.
    pub session: String,
    /// Public line name, e.g. `672`.
    pub line: String,
    /// Name of the rider's target stop.
    pub stop_name: String,
    /// How many stops before the target the vehicle was seen.
    pub distance: u32,
    /// Estimated seconds until the vehicle reaches the watched stop.
    pub estimate_secs: u64,
    pub issued_at: DateTime<Local>,
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Bus {} is approaching {} in the next {} stops! (~{}s)",
            self.line, self.stop_name, self.distance, self.estimate_secs
        )
    }
}

/// Fire-and-forget delivery of notifications.
///
/// Delivery is best effort: sinks swallow their own failures.
pub trait NotificationSink: Send + Sync {
    fn deliver(&self, notification: &Notification);
}

impl<T: NotificationSink> NotificationSink for std::sync::Arc<T> {
    fn deliver(&self, notification: &Notification) {
        (**self).deliver(notification)
    }
}

/// Sink that prints to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

impl NotificationSink for ConsoleSink {
    fn deliver(&self, notification: &Notification) {
        info!(session = %notification.session, "notification delivered");
        println!("[{}] {}", notification.issued_at.format("%H:%M:%S"), notification);
    }
}

/// Sink that keeps every notification in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    delivered: Mutex<Vec<Notification>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything delivered so far, in delivery order.
    pub fn delivered(&self) -> Vec<Notification> {
        self.delivered
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl NotificationSink for MemorySink {
    fn deliver(&self, notification: &Notification) {
        if let Ok(mut guard) = self.delivered.lock() {
            guard.push(notification.clone());
        }
    }
}
