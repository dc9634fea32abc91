//! ResourcePlan entity

use serde::Serialize;

use super::edge_binding::EdgeBinding;
use super::reference::Reference;
use super::resource::ResourceDecl;
use crate::domain::value_objects::{OriginAccessModel, ResourceId};

/// Outputs the deployment reports once applied, as references into the plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentOutputs {
    pub cdn_domain_name: Reference,
    /// Only present for the public website model
    pub origin_hostname: Option<Reference>,
}

impl DeploymentOutputs {
    /// Substitute applied node outputs
    pub fn resolve<F>(&self, lookup: F) -> ResolvedOutputs
    where
        F: Fn(&Reference) -> Option<String>,
    {
        let cdn_domain_name = lookup(&self.cdn_domain_name);
        let origin_hostname = self.origin_hostname.as_ref().and_then(&lookup);
        ResolvedOutputs {
            cdn_url: cdn_domain_name.as_ref().map(|d| format!("https://{}", d)),
            cdn_domain_name,
            origin_url: origin_hostname.as_ref().map(|h| format!("http://{}", h)),
            origin_hostname,
        }
    }
}

/// Concrete deployment outputs; `None` where the node was not applied
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ResolvedOutputs {
    pub cdn_domain_name: Option<String>,
    pub cdn_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_url: Option<String>,
}

/// Topologically ordered nodes for one deployment
#[derive(Debug, Clone, PartialEq)]
pub struct ResourcePlan {
    model: OriginAccessModel,
    nodes: Vec<ResourceDecl>,
    edge_bindings: Vec<EdgeBinding>,
    outputs: DeploymentOutputs,
}

impl ResourcePlan {
    /// Wrap nodes that are already validated and sorted
    pub(crate) fn new(
        model: OriginAccessModel,
        nodes: Vec<ResourceDecl>,
        edge_bindings: Vec<EdgeBinding>,
        outputs: DeploymentOutputs,
    ) -> Self {
        Self {
            model,
            nodes,
            edge_bindings,
            outputs,
        }
    }

    pub fn model(&self) -> OriginAccessModel {
        self.model
    }

    pub fn nodes(&self) -> &[ResourceDecl] {
        &self.nodes
    }

    pub fn node(&self, id: &str) -> Option<&ResourceDecl> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = &ResourceId> {
        self.nodes.iter().map(|n| &n.id)
    }

    /// Position of a node in apply order
    pub fn position(&self, id: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_bindings(&self) -> &[EdgeBinding] {
        &self.edge_bindings
    }

    pub fn outputs(&self) -> &DeploymentOutputs {
        &self.outputs
    }
}
