//! Bucket Policy Derivation
//!
//! Derives the origin bucket's policy document and its public-access-block
//! settings from the selected origin access model.
//!
//! This is a pure domain policy - no I/O operations.

use serde_json::{json, Value};

use crate::domain::entities::{Condition, Effect, PolicyDocument, Principal, Reference, Statement};
use crate::domain::value_objects::{OriginAccessModel, ResourceId, SigningIdentityKind};

/// Service principal of the edge network
pub const EDGE_SERVICE: &str = "cloudfront.amazonaws.com";

pub const SID_TRANSPORT: &str = "AllowSSLRequestsOnly";
pub const SID_EDGE_READ: &str = "AllowEdgeRead";
pub const SID_DEPLOYER: &str = "AllowDeployerManagement";

/// Actions the signing identity may perform
pub const EDGE_READ_ACTIONS: &[&str] = &["s3:GetObject"];

/// Actions delegated to the deploying identity
pub const DEPLOYER_ACTIONS: &[&str] = &[
    "s3:GetObject",
    "s3:DeleteObject",
    "s3:PutObject",
    "s3:PutBucketWebsite",
    "s3:GetBucketWebsite",
    "s3:DeleteBucketWebsite",
];

/// Storage-layer override that keeps a bucket private
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicAccessBlock {
    pub block_public_acls: bool,
    pub block_public_policy: bool,
    pub ignore_public_acls: bool,
    pub restrict_public_buckets: bool,
}

impl PublicAccessBlock {
    pub fn all_set(&self) -> bool {
        self.block_public_acls
            && self.block_public_policy
            && self.ignore_public_acls
            && self.restrict_public_buckets
    }

    pub fn to_attributes(&self, bucket: &ResourceId) -> Value {
        json!({
            "bucket": Reference::new(bucket.clone(), "name").to_value(),
            "block_public_acls": self.block_public_acls,
            "block_public_policy": self.block_public_policy,
            "ignore_public_acls": self.ignore_public_acls,
            "restrict_public_buckets": self.restrict_public_buckets,
        })
    }

    /// Read the flags back out of node attributes; missing flags count as unset
    pub fn from_attributes(attributes: &Value) -> Self {
        let flag = |key: &str| attributes.get(key).and_then(Value::as_bool).unwrap_or(false);
        Self {
            block_public_acls: flag("block_public_acls"),
            block_public_policy: flag("block_public_policy"),
            ignore_public_acls: flag("ignore_public_acls"),
            restrict_public_buckets: flag("restrict_public_buckets"),
        }
    }
}

/// Derives access policies for the origin bucket
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyEnforcer;

impl PolicyEnforcer {
    pub fn new() -> Self {
        Self
    }

    /// Build the bucket policy in fixed statement order
    ///
    /// `caller` is either a literal principal ARN or a context marker the
    /// executor resolves to the deploying identity.
    pub fn derive_policy(
        &self,
        model: OriginAccessModel,
        bucket: &ResourceId,
        distribution: &ResourceId,
        caller: &Value,
    ) -> PolicyDocument {
        let bucket_arn = Reference::new(bucket.clone(), "arn");
        let objects = bucket_arn.clone().with_suffix("/*");

        let mut statements = vec![Statement {
            sid: SID_TRANSPORT.to_string(),
            effect: Effect::Deny,
            principal: Principal::Any,
            actions: vec!["s3:*".to_string()],
            resources: vec![bucket_arn.to_value(), objects.to_value()],
            condition: Some(Condition::new(
                "Bool",
                "aws:SecureTransport",
                json!("false"),
            )),
        }];

        let OriginAccessModel::PrivateSigned(kind) = model else {
            return PolicyDocument::new(statements);
        };

        let (principal, condition) = match kind {
            SigningIdentityKind::AccessControl => (
                Principal::Service(EDGE_SERVICE.to_string()),
                Some(Condition::new(
                    "StringEquals",
                    "AWS:SourceArn",
                    Reference::new(distribution.clone(), "arn").to_value(),
                )),
            ),
            // A legacy identity is created for this distribution alone.
            SigningIdentityKind::LegacyIdentity => (
                Principal::Identity(
                    Reference::new(ResourceId::SIGNING_IDENTITY, "iam_arn").to_value(),
                ),
                None,
            ),
        };

        statements.push(Statement {
            sid: SID_EDGE_READ.to_string(),
            effect: Effect::Allow,
            principal,
            actions: to_strings(EDGE_READ_ACTIONS),
            resources: vec![objects.to_value()],
            condition,
        });

        statements.push(Statement {
            sid: SID_DEPLOYER.to_string(),
            effect: Effect::Allow,
            principal: Principal::Account(caller.clone()),
            actions: to_strings(DEPLOYER_ACTIONS),
            resources: vec![bucket_arn.to_value(), objects.to_value()],
            condition: None,
        });

        PolicyDocument::new(statements)
    }

    /// Access-block settings planned alongside every private policy
    pub fn public_access_block(&self) -> PublicAccessBlock {
        PublicAccessBlock {
            block_public_acls: true,
            block_public_policy: true,
            ignore_public_acls: true,
            restrict_public_buckets: true,
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
