//! Event sink trait and implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, info, Level};

/// Receives run events.
#[async_trait]
pub trait EventSink: Send + Sync + std::fmt::Debug {
    /// Emits an event.
    ///
    /// # Arguments
    ///
    /// * `event_type` - Dotted event name (e.g., "stage.failed")
    /// * `data` - Optional JSON payload
    async fn emit(&self, event_type: &str, data: Option<Value>);
}

/// Discards every event. The orchestrator's default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event_type: &str, _data: Option<Value>) {}
}

/// Forwards events to `tracing`, lifting the stage name out of the payload
/// so log lines can be filtered per stage.
#[derive(Debug, Clone)]
pub struct LoggingEventSink {
    level: Level,
}

impl Default for LoggingEventSink {
    fn default() -> Self {
        Self { level: Level::INFO }
    }
}

impl LoggingEventSink {
    /// Logs at `level`. Anything other than `DEBUG` logs at `INFO`.
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// Logs at `DEBUG`.
    #[must_use]
    pub fn debug() -> Self {
        Self::new(Level::DEBUG)
    }
}

#[async_trait]
impl EventSink for LoggingEventSink {
    async fn emit(&self, event_type: &str, data: Option<Value>) {
        let stage = data
            .as_ref()
            .and_then(|d| d.get("stage"))
            .and_then(Value::as_str)
            .unwrap_or("-");
        if self.level == Level::DEBUG {
            debug!(event_type, stage, payload = ?data, "Run event");
        } else {
            info!(event_type, stage, payload = ?data, "Run event");
        }
    }
}

/// An event kept by [`CollectingEventSink`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    /// Event name.
    pub event_type: String,
    /// Event payload.
    pub data: Option<Value>,
    /// When the event arrived.
    pub recorded_at: DateTime<Utc>,
}

impl RecordedEvent {
    /// Returns a string field of the payload.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.data.as_ref()?.get(key)?.as_str()
    }
}

/// Keeps every event in memory, for assertions in tests.
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: RwLock<Vec<RecordedEvent>>,
}

impl CollectingEventSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all events, in emission order.
    #[must_use]
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.read().clone()
    }

    /// Returns the event names, in emission order.
    #[must_use]
    pub fn event_types(&self) -> Vec<String> {
        self.events.read().iter().map(|e| e.event_type.clone()).collect()
    }

    /// Number of events received.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// True if nothing was received.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Returns the most recent event with the given name.
    #[must_use]
    pub fn last_of_type(&self, event_type: &str) -> Option<RecordedEvent> {
        self.events
            .read()
            .iter()
            .rev()
            .find(|e| e.event_type == event_type)
            .cloned()
    }

    /// Returns the `stage` field of every event with the given name.
    #[must_use]
    pub fn stages_with(&self, event_type: &str) -> Vec<String> {
        self.events
            .read()
            .iter()
            .filter(|e| e.event_type == event_type)
            .filter_map(|e| e.field("stage").map(str::to_string))
            .collect()
    }
}

#[async_trait]
impl EventSink for CollectingEventSink {
    async fn emit(&self, event_type: &str, data: Option<Value>) {
        self.events.write().push(RecordedEvent {
            event_type: event_type.to_string(),
            data,
            recorded_at: Utc::now(),
        });
    }
}
