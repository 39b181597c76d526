//! In-memory activity feed built from tracing events.
//!
//! [`ActivityLayer`] forwards every event it sees over a channel; the
//! receiving side keeps the most recent ones in an [`ActivityLog`] so the
//! shell can show what the store and the deploy runner have been doing.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use tokio::sync::mpsc;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

/// One captured tracing event.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ActivityEvent {
    /// Module path that emitted the event (e.g. "opsdeck_core::store::app_store")
    pub target: String,
    /// Log level (INFO, DEBUG, WARN, ERROR)
    pub level: String,
    pub message: String,
    /// Structured fields other than the message
    pub fields: HashMap<String, Value>,
    pub timestamp: DateTime<Utc>,
}

/// A tracing layer that sends each event to an unbounded channel.
pub struct ActivityLayer {
    sender: mpsc::UnboundedSender<ActivityEvent>,
}

impl ActivityLayer {
    pub fn new(sender: mpsc::UnboundedSender<ActivityEvent>) -> Self {
        Self { sender }
    }

    /// Creates a layer together with the receiver for its events.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ActivityEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl<S> Layer<S> for ActivityLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = HashMap::new();
        event.record(&mut FieldVisitor(&mut fields));

        let message = match fields.remove("message") {
            Some(Value::String(text)) => text,
            Some(other) => other.to_string(),
            None => String::new(),
        };

        let activity = ActivityEvent {
            target: event.metadata().target().to_string(),
            level: event.metadata().level().to_string(),
            message,
            fields,
            timestamp: Utc::now(),
        };

        // Receiver gone means nobody is watching; drop the event.
        let _ = self.sender.send(activity);
    }
}

struct FieldVisitor<'a>(&'a mut HashMap<String, Value>);

impl Visit for FieldVisitor<'_> {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.0.insert(
            field.name().to_string(),
            serde_json::json!(format!("{:?}", value)),
        );
    }
}

/// Fixed-capacity ring of the most recent activity events.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    entries: VecDeque<ActivityEvent>,
    capacity: usize,
}

impl ActivityLog {
    /// A capacity of 0 is treated as 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self, event: ActivityEvent) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(event);
    }

    /// Moves every event currently queued on `rx` into the log.
    ///
    /// Returns the number of events taken.
    pub fn drain_from(&mut self, rx: &mut mpsc::UnboundedReceiver<ActivityEvent>) -> usize {
        let mut taken = 0;
        while let Ok(event) = rx.try_recv() {
            self.push(event);
            taken += 1;
        }
        taken
    }

    /// Oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &ActivityEvent> {
        self.entries.iter()
    }

    /// The last `n` events, oldest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &ActivityEvent> {
        self.entries.iter().skip(self.entries.len().saturating_sub(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::layer::SubscriberExt;

    fn capture(f: impl FnOnce()) -> Vec<ActivityEvent> {
        let (layer, mut rx) = ActivityLayer::channel();
        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, f);

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_layer_captures_message_and_fields() {
        let events = capture(|| {
            tracing::info!(agent_id = "2", online = true, "agent status toggled");
        });

        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.level, "INFO");
        assert_eq!(event.message, "agent status toggled");
        assert_eq!(event.fields["agent_id"], serde_json::json!("2"));
        assert_eq!(event.fields["online"], serde_json::json!(true));
        assert!(!event.fields.contains_key("message"));
    }

    #[test]
    fn test_log_keeps_most_recent() {
        let events = capture(|| {
            for i in 0..5 {
                tracing::warn!(step = i, "tick");
            }
        });

        let mut log = ActivityLog::new(3);
        for event in events {
            log.push(event);
        }

        assert_eq!(log.len(), 3);
        let steps: Vec<_> = log.entries().map(|e| e.fields["step"].clone()).collect();
        assert_eq!(steps, vec![serde_json::json!(2), serde_json::json!(3), serde_json::json!(4)]);

        let last: Vec<_> = log.recent(1).map(|e| e.fields["step"].clone()).collect();
        assert_eq!(last, vec![serde_json::json!(4)]);
    }

    #[test]
    fn test_drain_from_channel() {
        let (layer, mut rx) = ActivityLayer::channel();
        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!("one");
            tracing::debug!("two");
        });

        let mut log = ActivityLog::new(10);
        assert_eq!(log.drain_from(&mut rx), 2);
        assert_eq!(log.drain_from(&mut rx), 0);
        assert_eq!(log.len(), 2);
    }
}
