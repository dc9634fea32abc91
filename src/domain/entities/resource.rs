//! Resource declarations - the nodes of a plan

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::reference::collect_references;
use crate::domain::value_objects::{Fingerprint, ResourceId};

/// Every kind of resource the planner can emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    StorageBucket,
    PublicAccessBlock,
    OriginAccessControl,
    OriginAccessIdentity,
    EdgeExecutionRole,
    EdgeLogGroup,
    EdgeFunction,
    ResponseHeadersPolicy,
    Distribution,
    BucketPolicy,
    DnsRecord,
    DnsAccessRule,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StorageBucket => "storage-bucket",
            Self::PublicAccessBlock => "public-access-block",
            Self::OriginAccessControl => "origin-access-control",
            Self::OriginAccessIdentity => "origin-access-identity",
            Self::EdgeExecutionRole => "edge-execution-role",
            Self::EdgeLogGroup => "edge-log-group",
            Self::EdgeFunction => "edge-function",
            Self::ResponseHeadersPolicy => "response-headers-policy",
            Self::Distribution => "distribution",
            Self::BucketPolicy => "bucket-policy",
            Self::DnsRecord => "dns-record",
            Self::DnsAccessRule => "dns-access-rule",
        }
    }

    /// Outputs a provider reports after applying a node of this kind
    pub fn outputs(&self) -> &'static [&'static str] {
        match self {
            Self::StorageBucket => &["arn", "name", "regional_domain_name", "website_endpoint"],
            Self::PublicAccessBlock => &["id"],
            Self::OriginAccessControl => &["id"],
            Self::OriginAccessIdentity => &["id", "iam_arn", "access_identity_path"],
            Self::EdgeExecutionRole => &["arn", "name"],
            Self::EdgeLogGroup => &["arn", "name"],
            Self::EdgeFunction => &["arn", "qualified_arn"],
            Self::ResponseHeadersPolicy => &["id"],
            Self::Distribution => &["id", "arn", "domain_name"],
            Self::BucketPolicy => &["id"],
            Self::DnsRecord => &["id", "hostname"],
            Self::DnsAccessRule => &["id"],
        }
    }

    /// Whether this kind lives with the secondary DNS provider
    pub fn is_dns(&self) -> bool {
        matches!(self, Self::DnsRecord | Self::DnsAccessRule)
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node in the resource graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDecl {
    pub id: ResourceId,
    pub kind: ResourceKind,
    pub attributes: Value,
    #[serde(default)]
    pub depends_on: BTreeSet<ResourceId>,
}

impl ResourceDecl {
    pub fn new(id: impl Into<ResourceId>, kind: ResourceKind, attributes: Value) -> Self {
        Self {
            id: id.into(),
            kind,
            attributes,
            depends_on: BTreeSet::new(),
        }
    }

    pub fn depends_on(mut self, id: impl Into<ResourceId>) -> Self {
        self.depends_on.insert(id.into());
        self
    }

    /// Declare a dependency on every node the attributes reference
    pub fn depends_on_references(mut self) -> Self {
        self.depends_on.extend(self.references());
        self
    }

    /// Node ids referenced from inside the attributes
    pub fn references(&self) -> BTreeSet<ResourceId> {
        collect_references(&self.attributes)
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Structural fingerprint over kind, attributes and dependencies
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of_json(&json!({
            "kind": self.kind,
            "attributes": self.attributes,
            "depends_on": self.depends_on,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Reference;

    #[test]
    fn references_are_collected_from_attributes() {
        let node = ResourceDecl::new(
            "distribution",
            ResourceKind::Distribution,
            json!({"origin": Reference::new("bucket", "website_endpoint").to_value()}),
        );
        assert!(node.references().contains("bucket"));
        assert!(node.depends_on.is_empty());

        let node = node.depends_on_references();
        assert!(node.depends_on.contains("bucket"));
    }

    #[test]
    fn fingerprint_tracks_dependencies() {
        let a = ResourceDecl::new("dns-record", ResourceKind::DnsRecord, json!({"ttl": 1}));
        let b = a.clone().depends_on("distribution");
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_eq!(b.fingerprint(), b.clone().fingerprint());
    }

    #[test]
    fn kind_serializes_kebab_case() {
        let s = serde_json::to_string(&ResourceKind::OriginAccessControl).unwrap();
        assert_eq!(s, r#""origin-access-control""#);
    }
}
