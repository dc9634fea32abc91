//! Access Audit
//!
//! Fail-closed checks run on every derived policy before a plan is emitted.
//! A violation blocks the whole plan.

use serde_json::Value;

use super::bucket_policy::{PublicAccessBlock, EDGE_READ_ACTIONS, EDGE_SERVICE};
use crate::domain::entities::{
    Effect, PolicyDocument, Principal, Reference, ResourceDecl, ResourceKind, Statement,
};
use crate::domain::value_objects::{OriginAccessModel, ResourceId, SigningIdentityKind};
use crate::error::{PlanError, PlanResult};

const DOCUMENT: &str = "<document>";

/// Audits a policy against the access model it was derived for
#[derive(Debug, Clone)]
pub struct AccessAudit<'a> {
    model: OriginAccessModel,
    distribution: &'a ResourceId,
    deployer: &'a Value,
}

impl<'a> AccessAudit<'a> {
    pub fn new(model: OriginAccessModel, distribution: &'a ResourceId, deployer: &'a Value) -> Self {
        Self {
            model,
            distribution,
            deployer,
        }
    }

    pub fn check(&self, doc: &PolicyDocument) -> PlanResult<()> {
        match doc.transport_denies() {
            1 => {}
            n => {
                return Err(PlanError::policy_violation(
                    DOCUMENT,
                    format!("expected exactly one transport-encryption deny, found {}", n),
                ))
            }
        }
        if !doc.statements().first().is_some_and(Statement::is_transport_deny) {
            return Err(PlanError::policy_violation(
                DOCUMENT,
                "the transport-encryption deny must come first",
            ));
        }

        for statement in doc.allows() {
            self.check_allow(statement)?;
        }
        Ok(())
    }

    fn check_allow(&self, statement: &Statement) -> PlanResult<()> {
        debug_assert_eq!(statement.effect, Effect::Allow);
        let violation = |reason: &str| Err(PlanError::policy_violation(&statement.sid, reason));

        let OriginAccessModel::PrivateSigned(kind) = self.model else {
            return violation("public website policies grant access through ACLs only");
        };

        if statement.actions.iter().any(|a| a == "*" || a == "s3:*") {
            return violation("wildcard actions are never allowed");
        }

        match &statement.principal {
            Principal::Any => violation("allow statement grants access to everyone"),
            Principal::Service(name) => {
                if kind != SigningIdentityKind::AccessControl || name != EDGE_SERVICE {
                    return violation("service principal is not the edge signing identity");
                }
                if !self.is_edge_read(statement) {
                    return violation("edge access must be read-only");
                }
                let scoped = statement.condition.as_ref().is_some_and(|c| {
                    c.key == "AWS:SourceArn"
                        && Reference::from_value(&c.value)
                            .is_some_and(|r| &r.node == self.distribution && r.attr == "arn")
                });
                if !scoped {
                    return violation("edge access must be scoped to this distribution");
                }
                Ok(())
            }
            Principal::Identity(value) => {
                let is_signing_identity = Reference::from_value(value)
                    .is_some_and(|r| r.node == ResourceId::SIGNING_IDENTITY && r.attr == "iam_arn");
                if kind != SigningIdentityKind::LegacyIdentity || !is_signing_identity {
                    return violation("identity principal is not this distribution's signing identity");
                }
                if !self.is_edge_read(statement) {
                    return violation("edge access must be read-only");
                }
                Ok(())
            }
            Principal::Account(value) => {
                if names_wildcard(value) {
                    return violation("account principal must not contain wildcards");
                }
                if value != self.deployer {
                    return violation("account principal is not the deploying identity");
                }
                Ok(())
            }
        }
    }

    fn is_edge_read(&self, statement: &Statement) -> bool {
        statement
            .actions
            .iter()
            .all(|a| EDGE_READ_ACTIONS.contains(&a.as_str()))
    }
}

/// A bucket policy node is only legal next to a fully-set access block
pub fn check_access_block(nodes: &[ResourceDecl]) -> PlanResult<()> {
    let has_policy = nodes.iter().any(|n| n.kind == ResourceKind::BucketPolicy);
    if !has_policy {
        return Ok(());
    }
    let block = nodes
        .iter()
        .find(|n| n.kind == ResourceKind::PublicAccessBlock)
        .map(|n| PublicAccessBlock::from_attributes(&n.attributes));
    match block {
        Some(block) if block.all_set() => Ok(()),
        Some(_) => Err(PlanError::policy_violation(
            DOCUMENT,
            "public access block leaves a flag unset",
        )),
        None => Err(PlanError::policy_violation(
            DOCUMENT,
            "bucket policy planned without a public access block",
        )),
    }
}

/// True when any literal principal string carries a `*`
fn names_wildcard(value: &Value) -> bool {
    match value {
        Value::String(s) => s.contains('*'),
        Value::Array(items) => items.iter().any(names_wildcard),
        _ => false,
    }
}
