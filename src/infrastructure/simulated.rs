//! Simulated cloud
//!
//! A deterministic in-process stand-in for the storage, edge, and DNS APIs.
//! It answers every port the deploy flow needs and keeps a log of what it
//! was asked to do, so `simulate` can show a full run without credentials.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use serde_json::Value;

use crate::domain::entities::{ResourceDecl, ResourceKind};
use crate::domain::ports::{AppliedResource, CacheInvalidator, ObjectStore, ResourceProvider};
use crate::domain::value_objects::Fingerprint;
use crate::error::ProviderError;

pub const SIMULATED_ACCOUNT: &str = "123456789012";
const REGION: &str = "us-east-1";

/// One stored object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub size: usize,
    pub content_type: String,
}

#[derive(Default)]
pub struct SimulatedCloud {
    applied: Mutex<Vec<String>>,
    objects: Mutex<BTreeMap<(String, String), StoredObject>>,
    invalidations: Mutex<Vec<String>>,
    failures: Mutex<HashMap<String, ProviderError>>,
}

impl SimulatedCloud {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every apply of `id` fail with `error`
    pub fn with_failure(self, id: &str, error: ProviderError) -> Self {
        if let Ok(mut failures) = self.failures.lock() {
            failures.insert(id.to_string(), error);
        }
        self
    }

    /// Node ids in the order they were applied
    pub fn applied(&self) -> Vec<String> {
        self.applied.lock().map(|a| a.clone()).unwrap_or_default()
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.objects
            .lock()
            .ok()?
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().map(|o| o.len()).unwrap_or_default()
    }

    pub fn invalidations(&self) -> Vec<String> {
        self.invalidations
            .lock()
            .map(|i| i.clone())
            .unwrap_or_default()
    }

    fn outputs(node: &ResourceDecl, id: &str) -> AppliedResource {
        let name = node
            .attribute("name")
            .and_then(Value::as_str)
            .unwrap_or(node.id.as_str())
            .to_string();
        let applied = AppliedResource::new(id);
        match node.kind {
            ResourceKind::StorageBucket => AppliedResource::new(name.clone())
                .with_output("arn", format!("arn:aws:s3:::{}", name))
                .with_output("name", name.clone())
                .with_output(
                    "regional_domain_name",
                    format!("{}.s3.{}.amazonaws.com", name, REGION),
                )
                .with_output(
                    "website_endpoint",
                    format!("{}.s3-website-{}.amazonaws.com", name, REGION),
                ),
            ResourceKind::OriginAccessIdentity => applied
                .with_output("id", id)
                .with_output(
                    "iam_arn",
                    format!(
                        "arn:aws:iam::cloudfront:user/CloudFront Origin Access Identity {}",
                        id
                    ),
                )
                .with_output(
                    "access_identity_path",
                    format!("origin-access-identity/cloudfront/{}", id),
                ),
            ResourceKind::EdgeExecutionRole => applied
                .with_output("arn", format!("arn:aws:iam::{}:role/{}", SIMULATED_ACCOUNT, name))
                .with_output("name", name),
            ResourceKind::EdgeLogGroup => applied
                .with_output(
                    "arn",
                    format!("arn:aws:logs:{}:{}:log-group:{}", REGION, SIMULATED_ACCOUNT, name),
                )
                .with_output("name", name),
            ResourceKind::EdgeFunction => {
                let arn = format!(
                    "arn:aws:lambda:{}:{}:function:{}",
                    REGION, SIMULATED_ACCOUNT, name
                );
                applied
                    .with_output("qualified_arn", format!("{}:1", arn))
                    .with_output("arn", arn)
            }
            ResourceKind::Distribution => applied
                .with_output("id", id)
                .with_output(
                    "arn",
                    format!("arn:aws:cloudfront::{}:distribution/{}", SIMULATED_ACCOUNT, id),
                )
                .with_output(
                    "domain_name",
                    format!("d{}.cloudfront.net", id.to_ascii_lowercase()),
                ),
            ResourceKind::DnsRecord => applied.with_output("id", id).with_output("hostname", name),
            ResourceKind::PublicAccessBlock
            | ResourceKind::OriginAccessControl
            | ResourceKind::ResponseHeadersPolicy
            | ResourceKind::BucketPolicy
            | ResourceKind::DnsAccessRule => applied.with_output("id", id),
        }
    }
}

fn contains_marker(value: &Value) -> bool {
    match value {
        Value::Object(map) => {
            map.contains_key("$ref")
                || map.contains_key("$ctx")
                || map.values().any(contains_marker)
        }
        Value::Array(items) => items.iter().any(contains_marker),
        _ => false,
    }
}

impl ResourceProvider for SimulatedCloud {
    fn apply(
        &self,
        node: &ResourceDecl,
        attributes: &Value,
        prior_id: Option<&str>,
    ) -> Result<AppliedResource, ProviderError> {
        if let Some(err) = self
            .failures
            .lock()
            .ok()
            .and_then(|f| f.get(node.id.as_str()).cloned())
        {
            return Err(err);
        }
        if contains_marker(attributes) {
            return Err(ProviderError::Permanent(format!(
                "unresolved reference in attributes of '{}'",
                node.id
            )));
        }

        let id = match prior_id {
            Some(id) => id.to_string(),
            None => Fingerprint::of_bytes(node.id.as_str().as_bytes())
                .short(13)
                .to_ascii_uppercase(),
        };
        tracing::debug!(node = %node.id, kind = %node.kind, id = %id, "simulated apply");
        if let Ok(mut applied) = self.applied.lock() {
            applied.push(node.id.to_string());
        }
        Ok(Self::outputs(node, &id))
    }

    fn caller_identity(&self) -> Result<String, ProviderError> {
        Ok(format!("arn:aws:iam::{}:user/cdnplan", SIMULATED_ACCOUNT))
    }
}

impl ObjectStore for SimulatedCloud {
    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
        content_type: &str,
    ) -> Result<(), ProviderError> {
        let mut objects = self
            .objects
            .lock()
            .map_err(|_| ProviderError::Transient("object store busy".to_string()))?;
        objects.insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                size: body.len(),
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }
}

impl CacheInvalidator for SimulatedCloud {
    fn invalidate(
        &self,
        distribution_id: &str,
        paths: &[String],
        caller_reference: &str,
    ) -> Result<String, ProviderError> {
        let mut invalidations = self
            .invalidations
            .lock()
            .map_err(|_| ProviderError::Transient("invalidator busy".to_string()))?;
        let id = Fingerprint::of_bytes(caller_reference.as_bytes())
            .short(14)
            .to_ascii_uppercase();
        tracing::debug!(distribution_id, ?paths, id = %id, "simulated invalidation");
        invalidations.push(distribution_id.to_string());
        Ok(id)
    }
}
