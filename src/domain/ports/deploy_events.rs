//! Deploy Event Port
//!
//! Provides an observable interface for plan execution.
//! Enables progress reporting, JSON event streams, and debugging.

use std::time::Duration;

use crate::domain::entities::ResourceKind;
use crate::domain::value_objects::{AggregateStatus, OriginAccessModel, ResourceId};
use crate::error::ErrorKind;

/// Event emitted while a plan is applied
#[derive(Debug, Clone)]
pub enum DeployEvent {
    /// Execution started
    Started {
        model: OriginAccessModel,
        node_count: usize,
    },

    /// Node submitted to the provider
    NodeStarted {
        id: ResourceId,
        kind: ResourceKind,
        attempt: u32,
    },

    /// Provider call failed transiently and will be retried
    NodeRetrying {
        id: ResourceId,
        attempt: u32,
        delay: Duration,
        error: String,
    },

    /// Node was created or updated
    NodeApplied { id: ResourceId, provider_id: String },

    /// Stored fingerprint matched; provider not called
    NodeUnchanged { id: ResourceId },

    /// Node failed for good
    NodeFailed {
        id: ResourceId,
        kind: ErrorKind,
        error: String,
    },

    /// Node not submitted because a dependency did not succeed
    NodeSkipped {
        id: ResourceId,
        blocked_by: ResourceId,
    },

    /// Node not submitted because the operator cancelled
    NodeCancelled { id: ResourceId },

    /// Content object uploaded
    ObjectUploaded { key: String, bytes: u64 },

    /// Content object upload failed after retries
    ObjectFailed { key: String, error: String },

    /// Content sync finished
    ContentSynced {
        uploaded: usize,
        skipped: usize,
        failed: usize,
    },

    /// Cache invalidation requested
    InvalidationRequested {
        distribution_id: String,
        invalidation_id: String,
    },

    /// Cache invalidation failed; the deployment is still successful
    InvalidationFailed { error: String },

    /// Execution completed
    Completed {
        status: AggregateStatus,
        applied: usize,
        unchanged: usize,
        failed: usize,
        skipped: usize,
        cancelled: usize,
    },
}

/// Trait for receiving deploy events
///
/// Implementations can be:
/// - JsonEventSink: NDJSON event stream for CI
/// - TracingEventSink: structured log lines
/// - NoopEventSink: Silent operation
pub trait DeployEventSink: Send + Sync {
    /// Handle a deploy event
    fn on_event(&self, event: DeployEvent);

    /// Check if this sink wants detailed events (e.g., per-object)
    ///
    /// Some sinks (like CI) may only want summary events.
    fn wants_detailed_events(&self) -> bool {
        true
    }
}

/// No-op event sink for silent operation
pub struct NoopEventSink;

impl DeployEventSink for NoopEventSink {
    fn on_event(&self, _event: DeployEvent) {}

    fn wants_detailed_events(&self) -> bool {
        false
    }
}
