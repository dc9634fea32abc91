//! Execution outcomes

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::entities::ResolvedOutputs;
use crate::domain::value_objects::{AggregateStatus, ResourceId};
use crate::error::ErrorKind;

/// Named outputs of one applied node
pub type NodeOutputs = BTreeMap<String, String>;

/// What happened to one node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NodeOutcome {
    /// Created or updated by the provider
    Applied { provider_id: String, attempts: u32 },
    /// Stored fingerprint matched; prior outputs reused
    Unchanged { provider_id: String },
    /// The provider (or reference resolution) failed for good
    Failed { kind: ErrorKind, error: String },
    /// Not submitted because a dependency did not succeed
    Skipped { blocked_by: ResourceId },
    /// Not submitted because the run was cancelled
    Cancelled,
}

impl NodeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Applied { .. } | Self::Unchanged { .. })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Applied { .. } => "applied",
            Self::Unchanged { .. } => "unchanged",
            Self::Failed { .. } => "failed",
            Self::Skipped { .. } => "skipped",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Result of one executor run
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionReport {
    pub status: AggregateStatus,
    /// Every plan node, in plan order
    pub nodes: Vec<(ResourceId, NodeOutcome)>,
    /// Outputs of every node that applied or was unchanged
    #[serde(skip)]
    pub outputs: BTreeMap<ResourceId, NodeOutputs>,
    pub resolved_outputs: ResolvedOutputs,
}

impl ExecutionReport {
    pub fn outcome(&self, id: &str) -> Option<&NodeOutcome> {
        self.nodes
            .iter()
            .find(|(node, _)| node == id)
            .map(|(_, outcome)| outcome)
    }

    pub fn output(&self, id: &str, attr: &str) -> Option<&str> {
        self.outputs.get(id)?.get(attr).map(String::as_str)
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Whether `id` applied or was already current
    pub fn succeeded(&self, id: &str) -> bool {
        self.outcome(id).is_some_and(NodeOutcome::is_success)
    }

    pub fn count(&self, status: &str) -> usize {
        self.nodes
            .iter()
            .filter(|(_, outcome)| outcome.as_str() == status)
            .count()
    }

    /// Failed nodes with their error kind, in plan order
    pub fn failures(&self) -> Vec<(&ResourceId, ErrorKind)> {
        self.nodes
            .iter()
            .filter_map(|(id, outcome)| match outcome {
                NodeOutcome::Failed { kind, .. } => Some((id, *kind)),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(nodes: Vec<(&str, NodeOutcome)>) -> ExecutionReport {
        let nodes: Vec<_> = nodes
            .into_iter()
            .map(|(id, outcome)| (ResourceId::new(id), outcome))
            .collect();
        let ok = nodes.iter().filter(|(_, o)| o.is_success()).count();
        ExecutionReport {
            status: AggregateStatus::from_counts(ok, nodes.len() - ok),
            nodes,
            outputs: BTreeMap::new(),
            resolved_outputs: ResolvedOutputs::default(),
        }
    }

    #[test]
    fn partial_failure_lists_failed_nodes() {
        let report = report(vec![
            (
                "bucket",
                NodeOutcome::Applied {
                    provider_id: "b".into(),
                    attempts: 1,
                },
            ),
            (
                "distribution",
                NodeOutcome::Failed {
                    kind: ErrorKind::ProviderPermanent,
                    error: "denied".into(),
                },
            ),
            (
                "dns-record",
                NodeOutcome::Skipped {
                    blocked_by: ResourceId::new("distribution"),
                },
            ),
        ]);

        assert_eq!(report.status, AggregateStatus::PartialFailure);
        assert!(report.succeeded("bucket"));
        assert!(!report.succeeded("dns-record"));
        assert_eq!(report.count("skipped"), 1);
        assert_eq!(
            report.failures(),
            vec![(&ResourceId::new("distribution"), ErrorKind::ProviderPermanent)]
        );
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(NodeOutcome::Skipped {
            blocked_by: ResourceId::new("distribution"),
        })
        .unwrap();
        assert_eq!(json["status"], "skipped");
        assert_eq!(json["blocked_by"], "distribution");
    }
}
