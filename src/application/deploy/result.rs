//! Deploy Result

use serde::Serialize;

use crate::application::content_sync::SyncReport;
use crate::application::executor::ExecutionReport;
use crate::application::invalidation::InvalidationOutcome;
use crate::domain::entities::ResolvedOutputs;
use crate::domain::value_objects::{AggregateStatus, OriginAccessModel};

/// What happened to the bucket contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ContentOutcome {
    Synced(SyncReport),
    NotRun { reason: String },
    Error { error: String },
}

impl ContentOutcome {
    pub fn report(&self) -> Option<&SyncReport> {
        match self {
            Self::Synced(report) => Some(report),
            _ => None,
        }
    }
}

/// Result of a deploy operation
#[derive(Debug, Clone, Serialize)]
pub struct DeployResult {
    pub model: OriginAccessModel,
    pub execution: ExecutionReport,
    pub content: ContentOutcome,
    pub invalidation: InvalidationOutcome,
}

impl DeployResult {
    /// Node status, downgraded to partial when the content did not fully sync
    ///
    /// Invalidation never affects the status.
    pub fn status(&self) -> AggregateStatus {
        let content_ok = match &self.content {
            ContentOutcome::Synced(report) => report.is_success(),
            ContentOutcome::NotRun { .. } => true,
            ContentOutcome::Error { .. } => false,
        };
        match self.execution.status {
            AggregateStatus::Success if !content_ok => AggregateStatus::PartialFailure,
            status => status,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status().is_success()
    }

    pub fn outputs(&self) -> &ResolvedOutputs {
        &self.execution.resolved_outputs
    }
}
