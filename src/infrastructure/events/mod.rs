//! Event Sink Implementations
//!
//! Provides concrete implementations of DeployEventSink:
//! - JsonEventSink: NDJSON output for CI/automation
//! - TracingEventSink: structured log records

mod json;
mod log_sink;

pub use json::{event_json, JsonEventSink};
pub use log_sink::TracingEventSink;
