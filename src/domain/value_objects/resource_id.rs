//! Resource Identifier Value Object
//!
//! Stable, planner-assigned node ids. The executor's state store keys on these
//! across runs, so they must never depend on anything but the spec.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a node in a `ResourcePlan`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub const BUCKET: &'static str = "bucket";
    pub const ACCESS_BLOCK: &'static str = "bucket-access-block";
    pub const SIGNING_IDENTITY: &'static str = "signing-identity";
    pub const EDGE_ROLE: &'static str = "edge-role";
    pub const RESPONSE_HEADERS: &'static str = "response-headers";
    pub const DISTRIBUTION: &'static str = "distribution";
    pub const BUCKET_POLICY: &'static str = "bucket-policy";
    pub const DNS_RECORD: &'static str = "dns-record";
    pub const DNS_ACL: &'static str = "dns-acl";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ResourceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for ResourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ResourceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ResourceId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ResourceId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
