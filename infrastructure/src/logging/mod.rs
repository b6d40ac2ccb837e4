//! Logging infrastructure: persisted progress events.
//!
//! Provides [`JsonlEventLog`], a JSONL file writer that implements the
//! [`EventPublisher`](council_application::EventPublisher) port.

mod jsonl_event_log;

pub use jsonl_event_log::JsonlEventLog;
