//! Topological plan walk
//!
//! The coordinator thread owns all bookkeeping. Workers only call the
//! provider and report back over a channel, so at most `max_concurrency`
//! provider calls run at once and no lock guards the walk state.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{mpsc, Arc};
use std::thread;

use serde_json::Value;

use super::cancel::CancellationToken;
use super::options::ExecutorOptions;
use super::outcome::{ExecutionReport, NodeOutcome, NodeOutputs};
use crate::domain::entities::reference::resolve;
use crate::domain::entities::{ResourceDecl, ResourcePlan, CALLER_IDENTITY};
use crate::domain::ports::{
    AppliedResource, DeployEvent, DeployEventSink, NoopEventSink, ResourceProvider, StateEntry,
    StateResult, StateStore,
};
use crate::domain::value_objects::{AggregateStatus, ResourceId};
use crate::error::{ErrorKind, ProviderError};

type Completion = (usize, u32, Result<AppliedResource, ProviderError>);

/// Applies plans node by node, dependencies first
pub struct PlanExecutor {
    provider: Arc<dyn ResourceProvider>,
    state: Arc<dyn StateStore>,
    events: Arc<dyn DeployEventSink>,
    options: ExecutorOptions,
}

impl PlanExecutor {
    pub fn new(provider: Arc<dyn ResourceProvider>, state: Arc<dyn StateStore>) -> Self {
        Self {
            provider,
            state,
            events: Arc::new(NoopEventSink),
            options: ExecutorOptions::default(),
        }
    }

    pub fn with_events(mut self, events: Arc<dyn DeployEventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn with_options(mut self, options: ExecutorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ExecutorOptions {
        &self.options
    }

    /// Apply every node of `plan`
    ///
    /// Node failures are reported in the returned `ExecutionReport`; only a
    /// state store that cannot be read fails the call itself.
    pub fn execute(
        &self,
        plan: &ResourcePlan,
        cancel: &CancellationToken,
    ) -> StateResult<ExecutionReport> {
        let prior = self.state.entries()?;
        let context = self.context();
        let max_in_flight = self.options.max_concurrency.max(1);

        tracing::info!(
            model = %plan.model(),
            nodes = plan.len(),
            max_in_flight,
            "executing plan"
        );
        self.events.on_event(DeployEvent::Started {
            model: plan.model(),
            node_count: plan.len(),
        });

        let mut walk = Walk::new(plan);

        thread::scope(|scope| {
            let (tx, rx) = mpsc::channel::<Completion>();
            let mut in_flight = 0usize;

            loop {
                while in_flight < max_in_flight && !cancel.is_cancelled() {
                    let Some(index) = walk.next_ready() else {
                        break;
                    };
                    let node = &plan.nodes()[index];
                    let stored = prior.get(&node.id);

                    if let Some(entry) = stored.filter(|e| e.fingerprint == node.fingerprint()) {
                        tracing::debug!(node = %node.id, "fingerprint unchanged");
                        self.events.on_event(DeployEvent::NodeUnchanged {
                            id: node.id.clone(),
                        });
                        walk.succeed(
                            index,
                            NodeOutcome::Unchanged {
                                provider_id: entry.provider_id.clone(),
                            },
                            entry.outputs.clone(),
                        );
                        continue;
                    }

                    let lookup = |id: &ResourceId, attr: &str| walk.output(id, attr);
                    let attributes = match resolve(&node.attributes, &lookup, &context) {
                        Ok(attributes) => attributes,
                        Err(err) => {
                            self.fail(&mut walk, index, ErrorKind::ProviderPermanent, err.to_string());
                            continue;
                        }
                    };

                    let prior_id = stored.map(|e| e.provider_id.clone());
                    let tx = tx.clone();
                    in_flight += 1;
                    scope.spawn(move || {
                        let (attempts, result) =
                            self.apply_node(node, &attributes, prior_id.as_deref());
                        // The receiver outlives every worker.
                        let _ = tx.send((index, attempts, result));
                    });
                }

                if in_flight == 0 {
                    break;
                }
                let Ok((index, attempts, result)) = rx.recv() else {
                    break;
                };
                in_flight -= 1;

                let node = &plan.nodes()[index];
                match result {
                    Ok(applied) => {
                        tracing::info!(node = %node.id, provider_id = %applied.provider_id, attempts, "applied");
                        self.record(node, &applied);
                        self.events.on_event(DeployEvent::NodeApplied {
                            id: node.id.clone(),
                            provider_id: applied.provider_id.clone(),
                        });
                        walk.succeed(
                            index,
                            NodeOutcome::Applied {
                                provider_id: applied.provider_id,
                                attempts,
                            },
                            applied.outputs,
                        );
                    }
                    Err(err) => self.fail(&mut walk, index, err.kind(), err.to_string()),
                }
            }
        });

        for id in walk.cancel_remaining() {
            tracing::debug!(node = %id, "not submitted, cancelled");
            self.events.on_event(DeployEvent::NodeCancelled { id });
        }

        let report = walk.into_report();
        tracing::info!(status = %report.status, "plan execution finished");
        self.events.on_event(DeployEvent::Completed {
            status: report.status,
            applied: report.count("applied"),
            unchanged: report.count("unchanged"),
            failed: report.count("failed"),
            skipped: report.count("skipped"),
            cancelled: report.count("cancelled"),
        });
        Ok(report)
    }

    fn context(&self) -> BTreeMap<String, String> {
        let mut context = BTreeMap::new();
        match self
            .options
            .retry
            .run(|_| self.provider.caller_identity(), |_, _, _| {})
        {
            Ok(identity) => {
                context.insert(CALLER_IDENTITY.to_string(), identity);
            }
            Err(err) => {
                tracing::warn!(error = %err, "caller identity unavailable");
            }
        }
        context
    }

    fn apply_node(
        &self,
        node: &ResourceDecl,
        attributes: &Value,
        prior_id: Option<&str>,
    ) -> (u32, Result<AppliedResource, ProviderError>) {
        let mut attempts = 0;
        let result = self.options.retry.run(
            |attempt| {
                attempts = attempt;
                self.events.on_event(DeployEvent::NodeStarted {
                    id: node.id.clone(),
                    kind: node.kind,
                    attempt,
                });
                panic::catch_unwind(AssertUnwindSafe(|| {
                    self.provider.apply(node, attributes, prior_id)
                }))
                .unwrap_or_else(|_| {
                    Err(ProviderError::Permanent(format!(
                        "provider panicked while applying '{}'",
                        node.id
                    )))
                })
            },
            |attempt, delay, err| {
                tracing::warn!(
                    node = %node.id,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "transient provider error, retrying"
                );
                self.events.on_event(DeployEvent::NodeRetrying {
                    id: node.id.clone(),
                    attempt,
                    delay,
                    error: err.to_string(),
                });
            },
        );
        (attempts, result)
    }

    /// Persist an applied node; a failed write only costs a redundant apply later
    fn record(&self, node: &ResourceDecl, applied: &AppliedResource) {
        let mut entry = StateEntry::new(applied.provider_id.clone(), node.fingerprint());
        entry.outputs = applied.outputs.clone();
        entry.attributes = Some(node.attributes.clone());
        entry.applied_at = Some(chrono::Utc::now().to_rfc3339());
        if let Err(err) = self.state.put(&node.id, entry) {
            tracing::warn!(node = %node.id, error = %err, "failed to persist state");
        }
    }

    fn fail(&self, walk: &mut Walk<'_>, index: usize, kind: ErrorKind, error: String) {
        let id = walk.id(index).clone();
        tracing::warn!(node = %id, %kind, %error, "node failed");
        self.events.on_event(DeployEvent::NodeFailed {
            id: id.clone(),
            kind,
            error: error.clone(),
        });
        for skipped in walk.fail(index, NodeOutcome::Failed { kind, error }) {
            tracing::debug!(node = %skipped, blocked_by = %id, "skipped");
            self.events.on_event(DeployEvent::NodeSkipped {
                id: skipped,
                blocked_by: id.clone(),
            });
        }
    }
}

/// Bookkeeping for one run, indexed by plan position
struct Walk<'p> {
    plan: &'p ResourcePlan,
    dependents: Vec<Vec<usize>>,
    pending: Vec<usize>,
    ready: BTreeSet<usize>,
    outcomes: Vec<Option<NodeOutcome>>,
    outputs: BTreeMap<ResourceId, NodeOutputs>,
}

impl<'p> Walk<'p> {
    fn new(plan: &'p ResourcePlan) -> Self {
        let positions: HashMap<&str, usize> = plan
            .nodes()
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id.as_str(), i))
            .collect();

        let mut dependents = vec![Vec::new(); plan.len()];
        let mut pending = vec![0; plan.len()];
        for (i, node) in plan.nodes().iter().enumerate() {
            for dep in &node.depends_on {
                if let Some(&d) = positions.get(dep.as_str()) {
                    dependents[d].push(i);
                    pending[i] += 1;
                }
            }
        }
        let ready = (0..plan.len()).filter(|&i| pending[i] == 0).collect();

        Self {
            plan,
            dependents,
            pending,
            ready,
            outcomes: vec![None; plan.len()],
            outputs: BTreeMap::new(),
        }
    }

    fn id(&self, index: usize) -> &'p ResourceId {
        &self.plan.nodes()[index].id
    }

    /// Lowest plan position whose dependencies have all succeeded
    fn next_ready(&mut self) -> Option<usize> {
        self.ready.pop_first()
    }

    fn output(&self, id: &ResourceId, attr: &str) -> Option<String> {
        self.outputs.get(id)?.get(attr).cloned()
    }

    fn succeed(&mut self, index: usize, outcome: NodeOutcome, outputs: NodeOutputs) {
        self.outcomes[index] = Some(outcome);
        self.outputs.insert(self.id(index).clone(), outputs);
        for &dependent in &self.dependents[index] {
            self.pending[dependent] -= 1;
            if self.pending[dependent] == 0 && self.outcomes[dependent].is_none() {
                self.ready.insert(dependent);
            }
        }
    }

    /// Record a failure and skip everything downstream; returns skipped ids in plan order
    fn fail(&mut self, index: usize, outcome: NodeOutcome) -> Vec<ResourceId> {
        self.outcomes[index] = Some(outcome);
        let blocked_by = self.id(index).clone();

        let mut skipped = Vec::new();
        let mut stack = self.dependents[index].clone();
        while let Some(dependent) = stack.pop() {
            if self.outcomes[dependent].is_some() {
                continue;
            }
            self.outcomes[dependent] = Some(NodeOutcome::Skipped {
                blocked_by: blocked_by.clone(),
            });
            self.ready.remove(&dependent);
            skipped.push(dependent);
            stack.extend(self.dependents[dependent].iter().copied());
        }
        skipped.sort_unstable();
        skipped.into_iter().map(|i| self.id(i).clone()).collect()
    }

    /// Mark every node that never ran as cancelled
    fn cancel_remaining(&mut self) -> Vec<ResourceId> {
        let mut cancelled = Vec::new();
        for (i, outcome) in self.outcomes.iter_mut().enumerate() {
            if outcome.is_none() {
                *outcome = Some(NodeOutcome::Cancelled);
                cancelled.push(self.plan.nodes()[i].id.clone());
            }
        }
        cancelled
    }

    fn into_report(self) -> ExecutionReport {
        let nodes: Vec<(ResourceId, NodeOutcome)> = self
            .plan
            .nodes()
            .iter()
            .zip(self.outcomes)
            .map(|(node, outcome)| (node.id.clone(), outcome.unwrap_or(NodeOutcome::Cancelled)))
            .collect();

        let succeeded = nodes.iter().filter(|(_, o)| o.is_success()).count();
        let status = AggregateStatus::from_counts(succeeded, nodes.len() - succeeded);
        let outputs = self.outputs;
        let resolved_outputs = self.plan.outputs().resolve(|reference| {
            outputs
                .get(&reference.node)
                .and_then(|o| o.get(&reference.attr))
                .cloned()
        });

        ExecutionReport {
            status,
            nodes,
            outputs,
            resolved_outputs,
        }
    }
}
