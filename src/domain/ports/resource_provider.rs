//! ResourceProvider port - the cloud APIs behind the executor
//!
//! Implementations create or update exactly one node per call. They never see
//! unresolved references: the executor hands them attributes with every
//! marker already replaced.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::domain::entities::ResourceDecl;
use crate::error::ProviderError;

/// What a provider reports after applying a node
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppliedResource {
    /// The provider's own identifier for the resource
    pub provider_id: String,
    /// Named outputs other nodes may reference (`arn`, `domain_name`, ...)
    pub outputs: BTreeMap<String, String>,
}

impl AppliedResource {
    pub fn new(provider_id: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            outputs: BTreeMap::new(),
        }
    }

    pub fn with_output(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.outputs.insert(name.into(), value.into());
        self
    }
}

pub trait ResourceProvider: Send + Sync {
    /// Create the node, or update it in place when `prior_id` is known
    fn apply(
        &self,
        node: &ResourceDecl,
        attributes: &Value,
        prior_id: Option<&str>,
    ) -> Result<AppliedResource, ProviderError>;

    /// Identity the deployment runs as
    fn caller_identity(&self) -> Result<String, ProviderError>;
}
