//! JSON Event Sink
//!
//! Outputs deploy events as NDJSON for CI/automation consumption.

use crate::domain::ports::{DeployEvent, DeployEventSink};
use serde_json::json;
use std::io::{self, Write};
use std::sync::Mutex;

/// Event sink that outputs NDJSON events to stdout
pub struct JsonEventSink {
    /// Mutex to ensure thread-safe writes
    writer: Mutex<Box<dyn Write + Send>>,
    command: &'static str,
}

impl JsonEventSink {
    /// Create a new JSON event sink writing to stdout
    pub fn stdout(command: &'static str) -> Self {
        Self::with_writer(command, io::stdout())
    }

    /// Create a JSON event sink writing to a custom writer
    pub fn with_writer<W: Write + Send + 'static>(command: &'static str, writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
            command,
        }
    }

    fn write_event(&self, mut event: serde_json::Value) {
        event["command"] = json!(self.command);
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", event);
            let _ = writer.flush();
        }
    }
}

/// NDJSON form of one event
pub fn event_json(event: &DeployEvent) -> serde_json::Value {
    match event {
        DeployEvent::Started { model, node_count } => json!({
            "event": "start",
            "model": model.as_str(),
            "signing_identity": model.signing_identity().map(|k| k.as_str()),
            "nodes": node_count,
        }),

        DeployEvent::NodeStarted { id, kind, attempt } => json!({
            "event": "node_start",
            "id": id,
            "kind": kind.as_str(),
            "attempt": attempt,
        }),

        DeployEvent::NodeRetrying {
            id,
            attempt,
            delay,
            error,
        } => json!({
            "event": "node_retry",
            "id": id,
            "attempt": attempt,
            "delay_ms": delay.as_millis() as u64,
            "error": error,
        }),

        DeployEvent::NodeApplied { id, provider_id } => json!({
            "event": "node_applied",
            "id": id,
            "provider_id": provider_id,
        }),

        DeployEvent::NodeUnchanged { id } => json!({
            "event": "node_unchanged",
            "id": id,
        }),

        DeployEvent::NodeFailed { id, kind, error } => json!({
            "event": "node_failed",
            "id": id,
            "kind": kind.as_str(),
            "error": error,
        }),

        DeployEvent::NodeSkipped { id, blocked_by } => json!({
            "event": "node_skipped",
            "id": id,
            "blocked_by": blocked_by,
        }),

        DeployEvent::NodeCancelled { id } => json!({
            "event": "node_cancelled",
            "id": id,
        }),

        DeployEvent::ObjectUploaded { key, bytes } => json!({
            "event": "object_uploaded",
            "key": key,
            "bytes": bytes,
        }),

        DeployEvent::ObjectFailed { key, error } => json!({
            "event": "object_failed",
            "key": key,
            "error": error,
        }),

        DeployEvent::ContentSynced {
            uploaded,
            skipped,
            failed,
        } => json!({
            "event": "content_synced",
            "uploaded": uploaded,
            "skipped": skipped,
            "failed": failed,
        }),

        DeployEvent::InvalidationRequested {
            distribution_id,
            invalidation_id,
        } => json!({
            "event": "invalidation_requested",
            "distribution_id": distribution_id,
            "invalidation_id": invalidation_id,
        }),

        DeployEvent::InvalidationFailed { error } => json!({
            "event": "invalidation_failed",
            "kind": "invalidation_failed",
            "error": error,
        }),

        DeployEvent::Completed {
            status,
            applied,
            unchanged,
            failed,
            skipped,
            cancelled,
        } => json!({
            "event": "complete",
            "status": status.as_str(),
            "applied": applied,
            "unchanged": unchanged,
            "failed": failed,
            "skipped": skipped,
            "cancelled": cancelled,
        }),
    }
}

impl DeployEventSink for JsonEventSink {
    fn on_event(&self, event: DeployEvent) {
        self.write_event(event_json(&event));
    }

    fn wants_detailed_events(&self) -> bool {
        true // JSON mode wants all events
    }
}
