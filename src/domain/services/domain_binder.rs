//! Domain Binder
//!
//! Secondary DNS subtree: an alias record for the canonical domain and an IP
//! allow-list covering every configured domain. Both depend only on the
//! distribution.

use crate::domain::entities::{
    AccessRestriction, AclRule, DeploymentSpec, DomainBinding, RecordType, Reference,
    ResourceDecl, ResourceKind, AUTOMATIC_TTL,
};
use crate::domain::value_objects::ResourceId;

#[derive(Debug, Clone, Copy, Default)]
pub struct DomainBinder;

impl DomainBinder {
    pub fn new() -> Self {
        Self
    }

    /// DNS nodes for the spec; empty when secondary DNS is off
    pub fn bind_domain(
        &self,
        spec: &DeploymentSpec,
        distribution_domain: &Reference,
    ) -> Vec<ResourceDecl> {
        let Some(dns) = spec.dns() else {
            return Vec::new();
        };
        let mut nodes = Vec::new();

        if dns.record_enabled {
            let record = DomainBinding {
                record_type: RecordType::Cname,
                zone_id: dns.zone_id.clone(),
                name: spec.primary_domain().to_string(),
                target: distribution_domain.to_value(),
                proxied: true,
                ttl: AUTOMATIC_TTL,
            };
            nodes.push(
                ResourceDecl::new(
                    ResourceId::DNS_RECORD,
                    ResourceKind::DnsRecord,
                    record.to_attributes(),
                )
                .depends_on(distribution_domain.node.clone()),
            );
        }

        if dns.acl.enabled {
            let restriction = AccessRestriction {
                zone_id: dns.zone_id.clone(),
                description: format!("Restrict access to {} webapp", spec.project().name),
                urls: spec.domains().iter().map(|d| format!("{}/*", d)).collect(),
                rules: dns
                    .acl
                    .rules
                    .iter()
                    .map(|r| AclRule {
                        name: r.name.clone(),
                        match_value: r.value.clone(),
                    })
                    .collect(),
                paused: false,
            };
            nodes.push(
                ResourceDecl::new(
                    ResourceId::DNS_ACL,
                    ResourceKind::DnsAccessRule,
                    restriction.to_attributes(),
                )
                .depends_on(distribution_domain.node.clone()),
            );
        }

        nodes
    }
}
