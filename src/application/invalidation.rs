//! Edge cache invalidation after a deploy
//!
//! A failed invalidation is a warning: the new content is live at the origin
//! and the cache expires on its own.

use std::sync::Arc;

use serde::Serialize;

use super::content_sync::SyncReport;
use super::executor::ExecutionReport;
use super::retry::RetryPolicy;
use crate::domain::ports::{CacheInvalidator, DeployEvent, DeployEventSink, NoopEventSink};
use crate::domain::value_objects::ResourceId;
use crate::error::ErrorKind;

/// Every deploy invalidates the whole distribution
pub const INVALIDATION_PATH: &str = "/*";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InvalidationOutcome {
    Requested { invalidation_id: String },
    Failed { kind: ErrorKind, error: String },
    NotRun { reason: String },
}

impl InvalidationOutcome {
    fn not_run(reason: &str) -> Self {
        Self::NotRun {
            reason: reason.to_string(),
        }
    }

    pub fn is_requested(&self) -> bool {
        matches!(self, Self::Requested { .. })
    }
}

pub struct InvalidationTrigger {
    invalidator: Arc<dyn CacheInvalidator>,
    events: Arc<dyn DeployEventSink>,
    retry: RetryPolicy,
}

impl InvalidationTrigger {
    pub fn new(invalidator: Arc<dyn CacheInvalidator>) -> Self {
        Self {
            invalidator,
            events: Arc::new(NoopEventSink),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_events(mut self, events: Arc<dyn DeployEventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Invalidate only if enabled and both the distribution and the content
    /// sync succeeded
    pub fn after_deploy(
        &self,
        enabled: bool,
        execution: &ExecutionReport,
        sync: Option<&SyncReport>,
    ) -> InvalidationOutcome {
        if !enabled {
            return InvalidationOutcome::not_run("invalidation disabled");
        }
        if !execution.succeeded(ResourceId::DISTRIBUTION) {
            return InvalidationOutcome::not_run("distribution not applied");
        }
        match sync {
            Some(report) if report.is_success() => {}
            Some(_) => return InvalidationOutcome::not_run("content sync incomplete"),
            None => return InvalidationOutcome::not_run("content not synced"),
        }
        match execution.output(ResourceId::DISTRIBUTION, "id") {
            Some(distribution_id) => self.invalidate(distribution_id),
            None => InvalidationOutcome::not_run("distribution id unknown"),
        }
    }

    pub fn invalidate(&self, distribution_id: &str) -> InvalidationOutcome {
        let paths = vec![INVALIDATION_PATH.to_string()];
        let caller_reference = format!(
            "cdnplan-{}",
            chrono::Utc::now().format("%Y%m%dT%H%M%S%3fZ")
        );

        let result = self.retry.run(
            |_| {
                self.invalidator
                    .invalidate(distribution_id, &paths, &caller_reference)
            },
            |_, _, _| {},
        );
        match result {
            Ok(invalidation_id) => {
                tracing::info!(distribution_id, invalidation_id = %invalidation_id, "invalidation requested");
                self.events.on_event(DeployEvent::InvalidationRequested {
                    distribution_id: distribution_id.to_string(),
                    invalidation_id: invalidation_id.clone(),
                });
                InvalidationOutcome::Requested { invalidation_id }
            }
            Err(err) => {
                tracing::warn!(distribution_id, error = %err, "invalidation failed");
                self.events.on_event(DeployEvent::InvalidationFailed {
                    error: err.to_string(),
                });
                InvalidationOutcome::Failed {
                    kind: ErrorKind::InvalidationFailed,
                    error: err.to_string(),
                }
            }
        }
    }
}
