//! Run events for observability.
//!
//! The orchestrator reports every state change to an [`EventSink`]:
//! `run.started`, `stage.started`, `stage.completed`, `stage.failed` and
//! `run.completed`.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink, RecordedEvent};
