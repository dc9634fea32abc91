//! Tracing Event Sink
//!
//! Turns deploy events into structured log records for human-facing runs.
//! Per-node detail goes to `debug`; the summary stays at `info`.

use crate::domain::ports::{DeployEvent, DeployEventSink};

#[derive(Debug, Default)]
pub struct TracingEventSink {
    detailed: bool,
}

impl TracingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also log per-object upload events
    pub fn detailed(mut self, detailed: bool) -> Self {
        self.detailed = detailed;
        self
    }
}

impl DeployEventSink for TracingEventSink {
    fn on_event(&self, event: DeployEvent) {
        match event {
            DeployEvent::Started { model, node_count } => {
                tracing::info!(%model, nodes = node_count, "deploy started");
            }
            DeployEvent::NodeStarted { id, kind, attempt } => {
                tracing::debug!(node = %id, %kind, attempt, "node started");
            }
            DeployEvent::NodeRetrying {
                id,
                attempt,
                delay,
                error,
            } => {
                tracing::warn!(node = %id, attempt, ?delay, %error, "retrying node");
            }
            DeployEvent::NodeApplied { id, provider_id } => {
                tracing::info!(node = %id, %provider_id, "node applied");
            }
            DeployEvent::NodeUnchanged { id } => {
                tracing::debug!(node = %id, "node unchanged");
            }
            DeployEvent::NodeFailed { id, kind, error } => {
                tracing::error!(node = %id, %kind, %error, "node failed");
            }
            DeployEvent::NodeSkipped { id, blocked_by } => {
                tracing::warn!(node = %id, %blocked_by, "node skipped");
            }
            DeployEvent::NodeCancelled { id } => {
                tracing::warn!(node = %id, "node cancelled");
            }
            DeployEvent::ObjectUploaded { key, bytes } => {
                tracing::debug!(%key, bytes, "object uploaded");
            }
            DeployEvent::ObjectFailed { key, error } => {
                tracing::error!(%key, %error, "object upload failed");
            }
            DeployEvent::ContentSynced {
                uploaded,
                skipped,
                failed,
            } => {
                tracing::info!(uploaded, skipped, failed, "content synced");
            }
            DeployEvent::InvalidationRequested {
                distribution_id,
                invalidation_id,
            } => {
                tracing::info!(%distribution_id, %invalidation_id, "invalidation requested");
            }
            DeployEvent::InvalidationFailed { error } => {
                tracing::warn!(%error, "invalidation failed; cached content expires on its own");
            }
            DeployEvent::Completed {
                status,
                applied,
                unchanged,
                failed,
                skipped,
                cancelled,
            } => {
                tracing::info!(%status, applied, unchanged, failed, skipped, cancelled, "deploy finished");
            }
        }
    }

    fn wants_detailed_events(&self) -> bool {
        self.detailed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_is_opt_in() {
        assert!(!TracingEventSink::new().wants_detailed_events());
        assert!(TracingEventSink::new().detailed(true).wants_detailed_events());
    }
}
