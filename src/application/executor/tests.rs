//! Plan Executor Tests

use super::*;
use crate::application::retry::RetryPolicy;
use crate::domain::entities::{
    context_value, DeploymentOutputs, DeploymentSpec, FeatureFlags, Reference, ResourceDecl,
    ResourceKind, ResourcePlan, TlsConfig, CALLER_IDENTITY,
};
use crate::domain::ports::deploy_events::testing::RecordingEventSink;
use crate::domain::ports::{AppliedResource, DeployEvent, ResourceProvider, StateStore};
use crate::domain::services::TopologyPlanner;
use crate::domain::value_objects::{AggregateStatus, OriginAccessModel, ResourceId};
use crate::error::{ErrorKind, ProviderError};
use crate::infrastructure::state::MemoryStateStore;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const CALLER: &str = "arn:aws:iam::123456789012:user/deployer";

// Provider that succeeds unless a node has scripted errors queued

#[derive(Default)]
struct ScriptedProvider {
    errors: Mutex<HashMap<String, VecDeque<ProviderError>>>,
    calls: Mutex<Vec<(String, Value)>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    delay: Duration,
    cancel_on_apply: Option<CancellationToken>,
    identity: Option<String>,
}

impl ScriptedProvider {
    fn new() -> Self {
        Self {
            identity: Some(CALLER.to_string()),
            ..Self::default()
        }
    }

    fn failing(self, id: &str, errors: Vec<ProviderError>) -> Self {
        self.errors
            .lock()
            .unwrap()
            .insert(id.to_string(), errors.into());
        self
    }

    fn called(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }

    fn attributes_for(&self, id: &str) -> Option<Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(node, _)| node == id)
            .map(|(_, attributes)| attributes.clone())
    }
}

impl ResourceProvider for ScriptedProvider {
    fn apply(
        &self,
        node: &ResourceDecl,
        attributes: &Value,
        _prior_id: Option<&str>,
    ) -> Result<AppliedResource, ProviderError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        self.calls
            .lock()
            .unwrap()
            .push((node.id.to_string(), attributes.clone()));
        if let Some(token) = &self.cancel_on_apply {
            token.cancel();
        }
        let scripted = self
            .errors
            .lock()
            .unwrap()
            .get_mut(node.id.as_str())
            .and_then(VecDeque::pop_front);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(err) = scripted {
            return Err(err);
        }
        let mut applied = AppliedResource::new(format!("{}-0001", node.id));
        for attr in node.kind.outputs() {
            applied = applied.with_output(*attr, format!("{}:{}", node.id, attr));
        }
        Ok(applied)
    }

    fn caller_identity(&self) -> Result<String, ProviderError> {
        self.identity
            .clone()
            .ok_or_else(|| ProviderError::Permanent("no credentials".to_string()))
    }
}

// Fixtures

fn plan_of(nodes: Vec<ResourceDecl>) -> ResourcePlan {
    ResourcePlan::new(
        OriginAccessModel::PublicWebsite,
        nodes,
        Vec::new(),
        DeploymentOutputs {
            cdn_domain_name: Reference::new("distribution", "domain_name"),
            origin_hostname: Some(Reference::new("bucket", "website_endpoint")),
        },
    )
}

/// bucket -> distribution -> dns-record, plus an independent headers policy
fn chain_plan() -> ResourcePlan {
    plan_of(vec![
        ResourceDecl::new("bucket", ResourceKind::StorageBucket, json!({"name": "site"})),
        ResourceDecl::new(
            "response-headers",
            ResourceKind::ResponseHeadersPolicy,
            json!({"name": "site-headers"}),
        ),
        ResourceDecl::new(
            "distribution",
            ResourceKind::Distribution,
            json!({"origin": Reference::new("bucket", "website_endpoint").to_value()}),
        )
        .depends_on_references(),
        ResourceDecl::new(
            "dns-record",
            ResourceKind::DnsRecord,
            json!({"target": Reference::new("distribution", "domain_name").to_value()}),
        )
        .depends_on_references(),
    ])
}

fn executor(provider: &Arc<ScriptedProvider>, state: &Arc<MemoryStateStore>) -> PlanExecutor {
    PlanExecutor::new(provider.clone(), state.clone())
        .with_options(ExecutorOptions::default().with_retry(RetryPolicy::immediate(4)))
}

fn run(provider: &Arc<ScriptedProvider>, state: &Arc<MemoryStateStore>) -> ExecutionReport {
    executor(provider, state)
        .execute(&chain_plan(), &CancellationToken::new())
        .unwrap()
}

// === Ordering ===

#[test]
fn applies_dependencies_before_dependents() {
    let spec = DeploymentSpec::builder("site")
        .domain("site.example.com")
        .tls(TlsConfig::enabled("arn:aws:acm:us-east-1:123:certificate/abc"))
        .features(FeatureFlags {
            restrict_origin_access: true,
            security_headers: true,
            ..FeatureFlags::default()
        })
        .build()
        .unwrap();
    let plan = TopologyPlanner::new().plan(&spec).unwrap();
    let provider = Arc::new(ScriptedProvider::new());
    let state = Arc::new(MemoryStateStore::new());

    let report = executor(&provider, &state)
        .execute(&plan, &CancellationToken::new())
        .unwrap();

    assert_eq!(report.status, AggregateStatus::Success);
    let called = provider.called();
    assert_eq!(called.len(), plan.len());
    for node in plan.nodes() {
        let at = called.iter().position(|id| id == node.id.as_str()).unwrap();
        for dep in &node.depends_on {
            let dep_at = called.iter().position(|id| id == dep.as_str()).unwrap();
            assert!(dep_at < at, "{} applied before its dependency {}", node.id, dep);
        }
    }
}

#[test]
fn references_resolve_from_dependency_outputs() {
    let provider = Arc::new(ScriptedProvider::new());
    let state = Arc::new(MemoryStateStore::new());

    let report = run(&provider, &state);

    assert_eq!(
        provider.attributes_for("dns-record").unwrap(),
        json!({"target": "distribution:domain_name"})
    );
    assert_eq!(
        report.resolved_outputs.cdn_url.as_deref(),
        Some("https://distribution:domain_name")
    );
    assert_eq!(report.output("bucket", "arn"), Some("bucket:arn"));
}

#[test]
fn caller_identity_fills_context_markers() {
    let plan = plan_of(vec![ResourceDecl::new(
        "bucket-policy",
        ResourceKind::BucketPolicy,
        json!({"principal": context_value(CALLER_IDENTITY)}),
    )]);
    let provider = Arc::new(ScriptedProvider::new());
    let state = Arc::new(MemoryStateStore::new());

    executor(&provider, &state)
        .execute(&plan, &CancellationToken::new())
        .unwrap();

    assert_eq!(
        provider.attributes_for("bucket-policy").unwrap(),
        json!({"principal": CALLER})
    );
}

#[test]
fn missing_caller_identity_fails_only_nodes_that_need_it() {
    let plan = plan_of(vec![
        ResourceDecl::new("bucket", ResourceKind::StorageBucket, json!({})),
        ResourceDecl::new(
            "bucket-policy",
            ResourceKind::BucketPolicy,
            json!({"principal": context_value(CALLER_IDENTITY)}),
        ),
    ]);
    let provider = Arc::new(ScriptedProvider {
        identity: None,
        ..ScriptedProvider::default()
    });
    let state = Arc::new(MemoryStateStore::new());

    let report = executor(&provider, &state)
        .execute(&plan, &CancellationToken::new())
        .unwrap();

    assert!(report.succeeded("bucket"));
    assert!(matches!(
        report.outcome("bucket-policy"),
        Some(NodeOutcome::Failed {
            kind: ErrorKind::ProviderPermanent,
            ..
        })
    ));
    assert_eq!(provider.called(), vec!["bucket"]);
}

#[test]
fn in_flight_nodes_never_exceed_concurrency() {
    let nodes = (0..6)
        .map(|i| {
            ResourceDecl::new(
                format!("edge-logs-{}", i),
                ResourceKind::EdgeLogGroup,
                json!({}),
            )
        })
        .collect();
    let provider = Arc::new(ScriptedProvider {
        delay: Duration::from_millis(20),
        ..ScriptedProvider::new()
    });
    let state = Arc::new(MemoryStateStore::new());

    let report = PlanExecutor::new(provider.clone(), state)
        .with_options(ExecutorOptions::default().with_max_concurrency(2))
        .execute(&plan_of(nodes), &CancellationToken::new())
        .unwrap();

    assert!(report.is_success());
    assert!(provider.peak.load(Ordering::SeqCst) <= 2);
}

// === Failure isolation ===

#[test]
fn failed_node_skips_dependents_only() {
    let provider = Arc::new(
        ScriptedProvider::new().failing(
            "distribution",
            vec![ProviderError::Permanent("AccessDenied".into())],
        ),
    );
    let state = Arc::new(MemoryStateStore::new());
    let events = RecordingEventSink::new();

    let report = executor(&provider, &state)
        .with_events(Arc::new(events.clone()))
        .execute(&chain_plan(), &CancellationToken::new())
        .unwrap();

    assert_eq!(report.status, AggregateStatus::PartialFailure);
    assert!(report.succeeded("bucket"));
    assert!(report.succeeded("response-headers"));
    assert_eq!(
        report.outcome("dns-record"),
        Some(&NodeOutcome::Skipped {
            blocked_by: ResourceId::new("distribution")
        })
    );
    assert_eq!(
        report.failures(),
        vec![(&ResourceId::new("distribution"), ErrorKind::ProviderPermanent)]
    );
    assert!(!provider.called().contains(&"dns-record".to_string()));
    assert!(events.events().iter().any(|e| matches!(
        e,
        DeployEvent::NodeSkipped { id, .. } if id == "dns-record"
    )));
    assert!(report.resolved_outputs.cdn_domain_name.is_none());
}

#[test]
fn failure_at_root_is_total_failure() {
    let provider = Arc::new(
        ScriptedProvider::new().failing("bucket", vec![ProviderError::Permanent("quota".into())]),
    );
    let plan = plan_of(vec![
        ResourceDecl::new("bucket", ResourceKind::StorageBucket, json!({})),
        ResourceDecl::new("distribution", ResourceKind::Distribution, json!({}))
            .depends_on("bucket"),
    ]);

    let report = executor(&provider, &Arc::new(MemoryStateStore::new()))
        .execute(&plan, &CancellationToken::new())
        .unwrap();

    assert_eq!(report.status, AggregateStatus::Failure);
}

#[test]
fn failed_nodes_are_not_recorded_in_state() {
    let provider = Arc::new(
        ScriptedProvider::new().failing(
            "distribution",
            vec![ProviderError::Permanent("AccessDenied".into())],
        ),
    );
    let state = Arc::new(MemoryStateStore::new());

    run(&provider, &state);

    let entries = state.entries().unwrap();
    assert!(entries.contains_key("bucket"));
    assert!(!entries.contains_key("distribution"));
    assert!(!entries.contains_key("dns-record"));
}

// === Cancellation ===

#[test]
fn cancelled_before_start_submits_nothing() {
    let provider = Arc::new(ScriptedProvider::new());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = executor(&provider, &Arc::new(MemoryStateStore::new()))
        .execute(&chain_plan(), &cancel)
        .unwrap();

    assert!(provider.called().is_empty());
    assert_eq!(report.count("cancelled"), 4);
    assert_eq!(report.status, AggregateStatus::Failure);
}

#[test]
fn cancellation_lets_in_flight_node_finish() {
    let cancel = CancellationToken::new();
    let provider = Arc::new(ScriptedProvider {
        cancel_on_apply: Some(cancel.clone()),
        ..ScriptedProvider::new()
    });

    let report = PlanExecutor::new(provider.clone(), Arc::new(MemoryStateStore::new()))
        .with_options(ExecutorOptions::default().with_max_concurrency(1))
        .execute(&chain_plan(), &cancel)
        .unwrap();

    assert_eq!(provider.called(), vec!["bucket"]);
    assert!(report.succeeded("bucket"));
    assert_eq!(report.outcome("distribution"), Some(&NodeOutcome::Cancelled));
    assert_eq!(report.count("cancelled"), 3);
    assert_eq!(report.status, AggregateStatus::PartialFailure);
}

// === Retry ===

#[test]
fn transient_errors_are_retried() {
    let provider = Arc::new(ScriptedProvider::new().failing(
        "bucket",
        vec![
            ProviderError::Transient("SlowDown".into()),
            ProviderError::Transient("SlowDown".into()),
        ],
    ));
    let events = RecordingEventSink::new();

    let report = executor(&provider, &Arc::new(MemoryStateStore::new()))
        .with_events(Arc::new(events.clone()))
        .execute(&chain_plan(), &CancellationToken::new())
        .unwrap();

    assert_eq!(
        report.outcome("bucket"),
        Some(&NodeOutcome::Applied {
            provider_id: "bucket-0001".into(),
            attempts: 3
        })
    );
    let retries = events
        .events()
        .iter()
        .filter(|e| matches!(e, DeployEvent::NodeRetrying { .. }))
        .count();
    assert_eq!(retries, 2);
    assert!(report.is_success());
}

#[test]
fn exhausted_retries_fail_as_transient() {
    let provider = Arc::new(ScriptedProvider::new().failing(
        "response-headers",
        vec![ProviderError::Transient("Throttling".into()); 4],
    ));

    let report = run(&provider, &Arc::new(MemoryStateStore::new()));

    assert_eq!(
        report.failures(),
        vec![(&ResourceId::new("response-headers"), ErrorKind::ProviderTransient)]
    );
    assert_eq!(report.status, AggregateStatus::PartialFailure);
}

// === Idempotence ===

#[test]
fn second_run_leaves_everything_unchanged() {
    let provider = Arc::new(ScriptedProvider::new());
    let state = Arc::new(MemoryStateStore::new());

    let first = run(&provider, &state);
    let calls_after_first = provider.called().len();
    let second = run(&provider, &state);

    assert_eq!(provider.called().len(), calls_after_first);
    assert_eq!(second.count("unchanged"), 4);
    assert_eq!(second.resolved_outputs, first.resolved_outputs);
    assert_eq!(second.status, AggregateStatus::Success);
}

#[test]
fn changed_node_is_reapplied_in_place() {
    let provider = Arc::new(ScriptedProvider::new());
    let state = Arc::new(MemoryStateStore::new());
    run(&provider, &state);

    let mut nodes = chain_plan().nodes().to_vec();
    nodes[1].attributes = json!({"name": "site-headers-v2"});
    let report = executor(&provider, &state)
        .execute(&plan_of(nodes), &CancellationToken::new())
        .unwrap();

    assert!(matches!(
        report.outcome("response-headers"),
        Some(NodeOutcome::Applied { .. })
    ));
    assert_eq!(report.count("unchanged"), 3);
}
