//! Edge function bindings

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{RedirectTable, ResourceId};

/// Distribution event an edge function can attach to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HookPoint {
    ViewerRequest,
    OriginResponse,
}

impl HookPoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ViewerRequest => "viewer-request",
            Self::OriginResponse => "origin-response",
        }
    }

    /// Node id of the function bound at this hook
    pub fn function_id(&self) -> ResourceId {
        ResourceId::new(format!("edge-fn-{}", self.as_str()))
    }

    /// Node id of the function's log group
    pub fn log_group_id(&self) -> ResourceId {
        ResourceId::new(format!("edge-logs-{}", self.as_str()))
    }
}

impl fmt::Display for HookPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which handler artifact a binding deploys
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "handler", rename_all = "kebab-case")]
pub enum EdgeHandler {
    SecurityHeaders,
    Redirects { rules: RedirectTable },
}

impl EdgeHandler {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SecurityHeaders => "security-headers",
            Self::Redirects { .. } => "redirects",
        }
    }
}

/// A function attached to one hook point of the distribution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeBinding {
    pub hook_point: HookPoint,
    pub function_ref: ResourceId,
    pub handler: EdgeHandler,
}

impl EdgeBinding {
    pub fn new(hook_point: HookPoint, handler: EdgeHandler) -> Self {
        Self {
            hook_point,
            function_ref: hook_point.function_id(),
            handler,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_ids_follow_hook_point() {
        let binding = EdgeBinding::new(HookPoint::OriginResponse, EdgeHandler::SecurityHeaders);
        assert_eq!(binding.function_ref, "edge-fn-origin-response");
        assert_eq!(HookPoint::ViewerRequest.log_group_id(), "edge-logs-viewer-request");
    }
}
