//! Edge Function Binder
//!
//! Decides which edge functions attach to the distribution and emits the
//! compute subtree (execution role, log groups, functions) they need.

use std::collections::BTreeSet;

use serde_json::{json, Value};

use crate::domain::entities::{
    DeploymentSpec, EdgeBinding, EdgeHandler, HookPoint, Reference, ResourceDecl, ResourceKind,
};
use crate::domain::value_objects::ResourceId;
use crate::error::{PlanError, PlanResult};

/// Edge functions must be published in this region
pub const EDGE_REGION: &str = "us-east-1";
pub const EDGE_RUNTIME: &str = "nodejs18.x";
pub const EDGE_MEMORY_MB: u32 = 128;
pub const EDGE_TIMEOUT_SECS: u32 = 5;

#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeFunctionBinder;

impl EdgeFunctionBinder {
    pub fn new() -> Self {
        Self
    }

    /// Bindings for the enabled edge features, at most one per hook point
    pub fn bind_edge_functions(&self, spec: &DeploymentSpec) -> PlanResult<Vec<EdgeBinding>> {
        let mut bindings = Vec::new();

        let redirects = spec.redirects();
        if redirects.enabled {
            bindings.push(EdgeBinding::new(
                HookPoint::ViewerRequest,
                EdgeHandler::Redirects {
                    rules: redirects.rules.clone(),
                },
            ));
        }

        if spec.features().security_headers {
            bindings.push(EdgeBinding::new(
                HookPoint::OriginResponse,
                EdgeHandler::SecurityHeaders,
            ));
        }

        check_unique_hooks(&bindings)?;
        Ok(bindings)
    }

    /// Role, log group and function nodes for the given bindings
    pub fn edge_nodes(&self, spec: &DeploymentSpec, bindings: &[EdgeBinding]) -> Vec<ResourceDecl> {
        if bindings.is_empty() {
            return Vec::new();
        }

        let project = &spec.project().name;
        let mut nodes = vec![execution_role(project)];

        for binding in bindings {
            let function_name = format!("{}-{}", project, camel(binding.hook_point));
            let log_group_id = binding.hook_point.log_group_id();

            nodes.push(ResourceDecl::new(
                log_group_id.clone(),
                ResourceKind::EdgeLogGroup,
                json!({
                    "name": format!("/aws/lambda/{}", function_name),
                    "tags": {
                        "Application": project,
                        "Environment": spec.project().environment.as_str(),
                    },
                }),
            ));

            let mut attributes = json!({
                "name": function_name,
                "region": EDGE_REGION,
                "runtime": EDGE_RUNTIME,
                "handler": "index.handler",
                "artifact": binding.handler.name(),
                "memory_size": EDGE_MEMORY_MB,
                "timeout": EDGE_TIMEOUT_SECS,
                "publish": true,
                "role": Reference::new(ResourceId::EDGE_ROLE, "arn").to_value(),
            });
            if let EdgeHandler::Redirects { rules } = &binding.handler {
                attributes["rules"] = json!(rules);
            }

            nodes.push(
                ResourceDecl::new(binding.function_ref.clone(), ResourceKind::EdgeFunction, attributes)
                    .depends_on(ResourceId::EDGE_ROLE)
                    .depends_on(log_group_id),
            );
        }

        nodes
    }

    /// Distribution `function_associations` entries
    pub fn associations(&self, bindings: &[EdgeBinding]) -> Vec<Value> {
        bindings
            .iter()
            .map(|binding| {
                json!({
                    "event_type": binding.hook_point.as_str(),
                    "lambda_arn": Reference::new(binding.function_ref.clone(), "qualified_arn").to_value(),
                })
            })
            .collect()
    }
}

fn check_unique_hooks(bindings: &[EdgeBinding]) -> PlanResult<()> {
    let mut seen = BTreeSet::new();
    for binding in bindings {
        if !seen.insert(binding.hook_point) {
            return Err(PlanError::DuplicateHookPoint {
                hook: binding.hook_point.to_string(),
            });
        }
    }
    Ok(())
}

fn camel(hook: HookPoint) -> &'static str {
    match hook {
        HookPoint::ViewerRequest => "viewerRequest",
        HookPoint::OriginResponse => "originResponse",
    }
}

fn execution_role(project: &str) -> ResourceDecl {
    let log_groups = format!("arn:aws:logs:*:*:log-group:/aws/lambda/*{}*", project);
    ResourceDecl::new(
        ResourceId::EDGE_ROLE,
        ResourceKind::EdgeExecutionRole,
        json!({
            "name": format!("{}-edge-role", project),
            "path": "/",
            "assume_role_policy": {
                "Version": "2012-10-17",
                "Statement": [{
                    "Action": "sts:AssumeRole",
                    "Effect": "Allow",
                    "Principal": {
                        "Service": ["lambda.amazonaws.com", "edgelambda.amazonaws.com"],
                    },
                }],
            },
            "log_policy": {
                "Version": "2012-10-17",
                "Statement": [
                    {
                        "Action": ["logs:CreateLogGroup", "logs:CreateLogStream"],
                        "Effect": "Allow",
                        "Resource": format!("{}:*", log_groups),
                    },
                    {
                        "Action": ["logs:PutLogEvents"],
                        "Effect": "Allow",
                        "Resource": format!("{}:*:*", log_groups),
                    },
                ],
            },
        }),
    )
}
