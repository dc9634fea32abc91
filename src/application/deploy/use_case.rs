//! Deploy Use Case
//!
//! Orchestrates the deployment flow:
//! 1. Plan the topology (fails fast on any planning error)
//! 2. Apply the plan through the executor
//! 3. Sync content into the bucket, if the bucket is in place
//! 4. Invalidate the edge cache, if enabled and everything above succeeded
//!
//! This use case is pure orchestration - all business logic lives in domain services.

use std::sync::Arc;

use thiserror::Error;

use super::options::DeployOptions;
use super::result::{ContentOutcome, DeployResult};
use crate::application::content_sync::ContentSync;
use crate::application::executor::{CancellationToken, ExecutionReport, PlanExecutor};
use crate::application::invalidation::InvalidationTrigger;
use crate::domain::entities::DeploymentSpec;
use crate::domain::ports::{
    CacheInvalidator, ContentSource, DeployEventSink, NoopEventSink, ObjectStore,
    ResourceProvider, StateError, StateStore,
};
use crate::domain::services::TopologyPlanner;
use crate::domain::value_objects::ResourceId;
use crate::error::PlanError;

#[derive(Error, Debug)]
pub enum DeployError {
    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    State(#[from] StateError),
}

/// Deploy use case - orchestrates the deployment flow
///
/// Parameterized by its ports, so the same flow runs against the simulated
/// cloud and against test doubles.
pub struct DeployUseCase {
    planner: TopologyPlanner,
    provider: Arc<dyn ResourceProvider>,
    state: Arc<dyn StateStore>,
    source: Arc<dyn ContentSource>,
    store: Arc<dyn ObjectStore>,
    invalidator: Arc<dyn CacheInvalidator>,
    events: Arc<dyn DeployEventSink>,
}

impl DeployUseCase {
    pub fn new(
        provider: Arc<dyn ResourceProvider>,
        state: Arc<dyn StateStore>,
        source: Arc<dyn ContentSource>,
        store: Arc<dyn ObjectStore>,
        invalidator: Arc<dyn CacheInvalidator>,
    ) -> Self {
        Self {
            planner: TopologyPlanner::new(),
            provider,
            state,
            source,
            store,
            invalidator,
            events: Arc::new(NoopEventSink),
        }
    }

    /// Report progress to `events`
    pub fn with_events(mut self, events: Arc<dyn DeployEventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn execute(
        &self,
        spec: &DeploymentSpec,
        options: &DeployOptions,
        cancel: &CancellationToken,
    ) -> Result<DeployResult, DeployError> {
        let plan = self.planner.plan(spec)?;
        tracing::info!(
            project = %spec.project().name,
            environment = %spec.project().environment,
            model = %plan.model(),
            nodes = plan.len(),
            "planned deployment"
        );

        let execution = PlanExecutor::new(self.provider.clone(), self.state.clone())
            .with_events(self.events.clone())
            .with_options(options.executor)
            .execute(&plan, cancel)?;

        let content = self.sync_content(&execution, options, cancel);

        let invalidation = InvalidationTrigger::new(self.invalidator.clone())
            .with_events(self.events.clone())
            .with_retry(options.executor.retry)
            .after_deploy(spec.invalidate_on_deploy(), &execution, content.report());

        Ok(DeployResult {
            model: plan.model(),
            execution,
            content,
            invalidation,
        })
    }

    fn sync_content(
        &self,
        execution: &ExecutionReport,
        options: &DeployOptions,
        cancel: &CancellationToken,
    ) -> ContentOutcome {
        let not_run = |reason: &str| ContentOutcome::NotRun {
            reason: reason.to_string(),
        };
        if options.skip_content {
            return not_run("content sync disabled");
        }
        if cancel.is_cancelled() {
            return not_run("cancelled");
        }
        let Some(bucket) = execution
            .output(ResourceId::BUCKET, "name")
            .filter(|_| execution.succeeded(ResourceId::BUCKET))
        else {
            return not_run("bucket not applied");
        };

        let sync = ContentSync::new(self.source.clone(), self.store.clone(), self.state.clone())
            .with_events(self.events.clone())
            .with_options(options.sync);
        match sync.sync(bucket) {
            Ok(report) => ContentOutcome::Synced(report),
            Err(err) => {
                tracing::warn!(error = %err, "content sync failed");
                ContentOutcome::Error {
                    error: err.to_string(),
                }
            }
        }
    }
}
