//! Differ Domain Service
//!
//! Compares a freshly planned topology with what was last applied, node by
//! node, and renders attribute changes as line diffs.

use std::collections::BTreeMap;

use serde_json::Value;
use similar::{ChangeTag, TextDiff};

use crate::domain::entities::{ResourceDecl, ResourcePlan};
use crate::domain::value_objects::{Fingerprint, ResourceId};

/// A single line change in a diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub tag: DiffTag,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffTag {
    Delete,
    Insert,
    Equal,
}

impl From<ChangeTag> for DiffTag {
    fn from(tag: ChangeTag) -> Self {
        match tag {
            ChangeTag::Delete => DiffTag::Delete,
            ChangeTag::Insert => DiffTag::Insert,
            ChangeTag::Equal => DiffTag::Equal,
        }
    }
}

/// Result of a diff operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffResult {
    pub lines: Vec<DiffLine>,
    pub additions: usize,
    pub deletions: usize,
}

impl DiffResult {
    pub fn has_changes(&self) -> bool {
        self.additions > 0 || self.deletions > 0
    }

    /// Only insertions and deletions
    pub fn changed_lines(&self) -> impl Iterator<Item = &DiffLine> {
        self.lines.iter().filter(|l| l.tag != DiffTag::Equal)
    }

    /// Summary such as "+5, -3"
    pub fn summary(&self) -> String {
        format!("+{}, -{}", self.additions, self.deletions)
    }
}

/// What applying a node would do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeChange {
    Create,
    /// Fingerprint changed; the diff is empty when no prior attributes were kept
    Update(DiffResult),
    Unchanged,
}

impl NodeChange {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update(_) => "update",
            Self::Unchanged => "unchanged",
        }
    }
}

/// What was applied for a node last time
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedNode {
    pub fingerprint: Fingerprint,
    pub attributes: Option<Value>,
}

/// Planned change for every node, in plan order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanDiff {
    pub changes: Vec<(ResourceId, NodeChange)>,
    /// Ids applied earlier that the plan no longer contains
    pub orphaned: Vec<ResourceId>,
}

impl PlanDiff {
    pub fn count(&self, action: &str) -> usize {
        self.changes
            .iter()
            .filter(|(_, change)| change.as_str() == action)
            .count()
    }

    pub fn is_noop(&self) -> bool {
        self.orphaned.is_empty()
            && self
                .changes
                .iter()
                .all(|(_, change)| *change == NodeChange::Unchanged)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Differ;

impl Differ {
    pub fn new() -> Self {
        Self
    }

    /// Line diff between two strings
    pub fn diff(&self, old: &str, new: &str) -> DiffResult {
        let text_diff = TextDiff::from_lines(old, new);
        let mut result = DiffResult::default();

        for change in text_diff.iter_all_changes() {
            let tag = DiffTag::from(change.tag());
            match tag {
                DiffTag::Delete => result.deletions += 1,
                DiffTag::Insert => result.additions += 1,
                DiffTag::Equal => {}
            }
            result.lines.push(DiffLine {
                tag,
                content: change.value().to_string(),
            });
        }
        result
    }

    /// Classify one node against its last applied state
    pub fn node_change(&self, node: &ResourceDecl, applied: Option<&AppliedNode>) -> NodeChange {
        let Some(applied) = applied else {
            return NodeChange::Create;
        };
        if applied.fingerprint == node.fingerprint() {
            return NodeChange::Unchanged;
        }
        let diff = match &applied.attributes {
            Some(old) => self.diff(&pretty(old), &pretty(&node.attributes)),
            None => DiffResult::default(),
        };
        NodeChange::Update(diff)
    }

    /// Classify every node of the plan
    pub fn plan_diff(
        &self,
        plan: &ResourcePlan,
        applied: &BTreeMap<ResourceId, AppliedNode>,
    ) -> PlanDiff {
        let changes = plan
            .nodes()
            .iter()
            .map(|node| (node.id.clone(), self.node_change(node, applied.get(&node.id))))
            .collect();
        let orphaned = applied
            .keys()
            .filter(|id| !plan.contains(id.as_str()))
            .cloned()
            .collect();
        PlanDiff { changes, orphaned }
    }
}

fn pretty(value: &Value) -> String {
    let mut out = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    out.push('\n');
    out
}
