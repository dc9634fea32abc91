//! Topology planning service
//!
//! Pure domain logic turning a `DeploymentSpec` into an ordered
//! `ResourcePlan`. No I/O, no environment reads, no randomness: planning the
//! same spec twice yields the same plan.
//!
//! Each optional part of the topology is a function from spec to a list of
//! nodes that returns empty when the feature is off; `plan` concatenates them.

use serde_json::{json, Value};

use super::domain_binder::DomainBinder;
use super::edge_binder::EdgeFunctionBinder;
use super::graph::order_nodes;
use crate::domain::entities::{
    context_value, DeploymentOutputs, DeploymentSpec, EdgeBinding, Reference, ResourceDecl,
    ResourceKind, ResourcePlan, CALLER_IDENTITY,
};
use crate::domain::policies::{check_access_block, AccessAudit, PolicyEnforcer};
use crate::domain::value_objects::{
    Fingerprint, OriginAccessModel, ResourceId, SigningIdentityKind,
};
use crate::error::PlanResult;

/// Longest bucket name the storage provider accepts
const MAX_BUCKET_NAME: usize = 63;

/// Plans the resource topology for a deployment
#[derive(Debug, Clone, Copy, Default)]
pub struct TopologyPlanner {
    enforcer: PolicyEnforcer,
    edge: EdgeFunctionBinder,
    domain: DomainBinder,
}

impl TopologyPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plan the full topology
    ///
    /// # Errors
    ///
    /// `SpecInvalid` before any node is emitted, `PolicyViolation` when a
    /// derived policy fails the access audit, `GraphCycle` and friends when
    /// the assembled graph is inconsistent.
    pub fn plan(&self, spec: &DeploymentSpec) -> PlanResult<ResourcePlan> {
        spec.validate()?;

        let model = self.select_model(spec);
        let bindings = self.edge.bind_edge_functions(spec)?;
        let distribution_domain = Reference::new(ResourceId::DISTRIBUTION, "domain_name");

        let mut nodes = self.origin_nodes(spec, model);
        nodes.extend(self.edge.edge_nodes(spec, &bindings));
        nodes.extend(self.header_nodes(spec));
        nodes.push(self.distribution_node(spec, model, &bindings));
        nodes.extend(self.policy_nodes(spec, model)?);
        nodes.extend(self.domain.bind_domain(spec, &distribution_domain));

        check_access_block(&nodes)?;
        let nodes = order_nodes(nodes)?;

        let outputs = DeploymentOutputs {
            cdn_domain_name: distribution_domain,
            origin_hostname: (!model.is_private())
                .then(|| Reference::new(ResourceId::BUCKET, "website_endpoint")),
        };
        Ok(ResourcePlan::new(model, nodes, bindings, outputs))
    }

    /// Private whenever any access restriction, versioning or encryption is requested
    pub fn select_model(&self, spec: &DeploymentSpec) -> OriginAccessModel {
        let features = spec.features();
        let acl_enabled = spec.dns().is_some_and(|dns| dns.acl.enabled);
        if features.restrict_origin_access
            || features.versioning
            || features.encryption_at_rest
            || acl_enabled
        {
            OriginAccessModel::PrivateSigned(features.signing_identity)
        } else {
            OriginAccessModel::PublicWebsite
        }
    }

    /// Deterministic bucket name derived from the project and canonical domain
    pub fn bucket_name(&self, spec: &DeploymentSpec) -> String {
        let project = spec.project();
        let short = project.environment.short();
        let seed = format!(
            "{}|{}|{}",
            project.name,
            project.environment.as_str(),
            spec.primary_domain()
        );
        let suffix = Fingerprint::of_bytes(seed.as_bytes());

        let base = if project.name.ends_with(&format!("-{}", short)) {
            project.name.clone()
        } else {
            format!("{}-{}", project.name, short)
        };
        let tail = format!("-{}", suffix.short(8));
        let keep = MAX_BUCKET_NAME.saturating_sub(tail.len()).min(base.len());
        let base = base[..keep].trim_end_matches('-');
        format!("{}{}", base, tail).to_lowercase()
    }

    fn caller(&self, spec: &DeploymentSpec) -> Value {
        match spec.admin_principal() {
            Some(principal) => json!(principal),
            None => context_value(CALLER_IDENTITY),
        }
    }

    fn origin_nodes(&self, spec: &DeploymentSpec, model: OriginAccessModel) -> Vec<ResourceDecl> {
        let features = spec.features();
        let acl = if model.is_private() {
            "private"
        } else {
            "public-read"
        };
        let mut bucket = json!({
            "name": self.bucket_name(spec),
            "acl": acl,
            "force_destroy": false,
            "tags": {
                "Application": spec.project().name,
                "Environment": spec.project().environment.as_str(),
            },
        });
        if !model.is_private() {
            bucket["website"] = json!({
                "index_document": spec.index_document(),
                "error_document": spec.error_document(),
            });
        }
        if features.versioning {
            bucket["versioning"] = json!({"enabled": true});
        }
        if features.encryption_at_rest {
            bucket["server_side_encryption"] = json!({"sse_algorithm": "AES256"});
        }

        let mut nodes = vec![ResourceDecl::new(
            ResourceId::BUCKET,
            ResourceKind::StorageBucket,
            bucket,
        )];

        let OriginAccessModel::PrivateSigned(kind) = model else {
            return nodes;
        };

        let bucket_id = ResourceId::new(ResourceId::BUCKET);
        nodes.push(
            ResourceDecl::new(
                ResourceId::ACCESS_BLOCK,
                ResourceKind::PublicAccessBlock,
                self.enforcer.public_access_block().to_attributes(&bucket_id),
            )
            .depends_on(bucket_id),
        );

        let project = &spec.project().name;
        nodes.push(match kind {
            SigningIdentityKind::AccessControl => ResourceDecl::new(
                ResourceId::SIGNING_IDENTITY,
                ResourceKind::OriginAccessControl,
                json!({
                    "name": format!("access-control-{}", project),
                    "description": "Cloudfront access control",
                    "origin_type": "s3",
                    "signing_behavior": "always",
                    "signing_protocol": "sigv4",
                }),
            ),
            SigningIdentityKind::LegacyIdentity => ResourceDecl::new(
                ResourceId::SIGNING_IDENTITY,
                ResourceKind::OriginAccessIdentity,
                json!({"comment": format!("access-identity-{}", project)}),
            ),
        });

        nodes
    }

    fn header_nodes(&self, spec: &DeploymentSpec) -> Vec<ResourceDecl> {
        let Some(cors) = spec.cors() else {
            return Vec::new();
        };
        vec![ResourceDecl::new(
            ResourceId::RESPONSE_HEADERS,
            ResourceKind::ResponseHeadersPolicy,
            json!({
                "name": format!("{}-headers", spec.project().name),
                "cors_config": {
                    "access_control_allow_origins": cors.allow_origins,
                    "access_control_allow_methods": cors.allow_methods,
                    "access_control_allow_headers": cors.allow_headers,
                    "access_control_allow_credentials": cors.allow_credentials,
                    "origin_override": cors.origin_override,
                },
            }),
        )]
    }

    fn distribution_node(
        &self,
        spec: &DeploymentSpec,
        model: OriginAccessModel,
        bindings: &[EdgeBinding],
    ) -> ResourceDecl {
        let origin_id = ResourceId::BUCKET;
        let signing = ResourceId::SIGNING_IDENTITY;

        let origin = match model {
            OriginAccessModel::PublicWebsite => json!({
                "origin_id": origin_id,
                "domain_name": Reference::new(origin_id, "website_endpoint").to_value(),
                "custom_origin_config": {
                    "origin_protocol_policy": "http-only",
                    "http_port": 80,
                    "https_port": 443,
                    "origin_ssl_protocols": ["TLSv1.2"],
                },
            }),
            OriginAccessModel::PrivateSigned(SigningIdentityKind::AccessControl) => json!({
                "origin_id": origin_id,
                "domain_name": Reference::new(origin_id, "regional_domain_name").to_value(),
                "origin_access_control_id": Reference::new(signing, "id").to_value(),
            }),
            OriginAccessModel::PrivateSigned(SigningIdentityKind::LegacyIdentity) => json!({
                "origin_id": origin_id,
                "domain_name": Reference::new(origin_id, "regional_domain_name").to_value(),
                "s3_origin_config": {
                    "origin_access_identity":
                        Reference::new(signing, "access_identity_path").to_value(),
                },
            }),
        };

        let cache = spec.cache();
        let mut behavior = json!({
            "target_origin_id": origin_id,
            "viewer_protocol_policy": "redirect-to-https",
            "allowed_methods": ["GET", "HEAD", "OPTIONS"],
            "cached_methods": ["GET", "HEAD", "OPTIONS"],
            "default_ttl": cache.default_ttl,
            "min_ttl": cache.min_ttl,
            "max_ttl": cache.max_ttl,
            "forwarded_values": {
                "query_string": cache.forward_query_string,
                "cookies": {"forward": "all"},
            },
            "function_associations": self.edge.associations(bindings),
        });
        if spec.cors().is_some() {
            behavior["response_headers_policy_id"] =
                Reference::new(ResourceId::RESPONSE_HEADERS, "id").to_value();
        }

        let mut attributes = json!({
            "enabled": true,
            "http_version": "http2",
            "price_class": cache.price_class,
            "default_root_object": spec.index_document(),
            "origin": origin,
            "default_cache_behavior": behavior,
            "custom_error_responses": [{
                "error_code": 404,
                "response_code": 404,
                "response_page_path": format!("/{}", spec.error_document()),
            }],
            "restrictions": {"geo_restriction": "none"},
        });

        match spec.tls().active_certificate() {
            Some(certificate) => {
                attributes["aliases"] = json!(spec.domains());
                attributes["viewer_certificate"] = json!({
                    "acm_certificate_arn": certificate,
                    "ssl_support_method": "sni-only",
                    "minimum_protocol_version": "TLSv1.2_2021",
                });
            }
            None => {
                attributes["aliases"] = json!([]);
                attributes["viewer_certificate"] = json!({"cloudfront_default_certificate": true});
            }
        }

        ResourceDecl::new(ResourceId::DISTRIBUTION, ResourceKind::Distribution, attributes)
            .depends_on(ResourceId::BUCKET)
            .depends_on_references()
    }

    fn policy_nodes(
        &self,
        spec: &DeploymentSpec,
        model: OriginAccessModel,
    ) -> PlanResult<Vec<ResourceDecl>> {
        if !model.is_private() {
            return Ok(Vec::new());
        }

        let bucket = ResourceId::new(ResourceId::BUCKET);
        let distribution = ResourceId::new(ResourceId::DISTRIBUTION);
        let caller = self.caller(spec);

        let document = self
            .enforcer
            .derive_policy(model, &bucket, &distribution, &caller);
        AccessAudit::new(model, &distribution, &caller).check(&document)?;

        let node = ResourceDecl::new(
            ResourceId::BUCKET_POLICY,
            ResourceKind::BucketPolicy,
            json!({
                "bucket": Reference::new(bucket.clone(), "name").to_value(),
                "policy": document.to_json(),
            }),
        )
        .depends_on(bucket)
        .depends_on(distribution)
        .depends_on(ResourceId::ACCESS_BLOCK)
        .depends_on_references();
        Ok(vec![node])
    }
}
