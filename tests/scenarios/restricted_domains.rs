//! Scenario: IP-Restricted Site on Two Domains
//!
//! Journey: An internal tool is served on two host names and only the
//! office network may reach it.
//!
//! Success Criteria:
//! - One ACL resource covers both domains
//! - Each URL scope is the domain with a trailing wildcard path
//! - The ACL forces the private origin model

use cdnplan::domain::entities::{AclRuleSpec, DeploymentSpec, ResourceKind, SecondaryDnsConfig};
use cdnplan::domain::value_objects::ResourceId;
use cdnplan::TopologyPlanner;

/// SCENARIO: Two domains behind a single admin allow-list rule
#[test]
fn scenario_acl_covers_every_domain() {
    let spec = DeploymentSpec::builder("tool")
        .domains(["a.example.com", "b.example.com"])
        .dns(
            SecondaryDnsConfig::new("zone-123")
                .with_acl(vec![AclRuleSpec::new("admin", "10.0.0.1")]),
        )
        .build()
        .unwrap();

    let plan = TopologyPlanner::new().plan(&spec).unwrap();

    let acl_nodes: Vec<_> = plan
        .nodes()
        .iter()
        .filter(|node| node.kind == ResourceKind::DnsAccessRule)
        .collect();
    assert_eq!(acl_nodes.len(), 1);

    let acl = acl_nodes[0];
    assert_eq!(acl.id.as_str(), ResourceId::DNS_ACL);
    assert_eq!(
        acl.attributes["urls"],
        serde_json::json!(["a.example.com/*", "b.example.com/*"])
    );
    assert_eq!(acl.attributes["configurations"][0]["name"], "admin");
    assert_eq!(acl.attributes["configurations"][0]["value"], "10.0.0.1");

    assert!(plan.model().is_private());
    assert!(plan.contains(ResourceId::BUCKET_POLICY));
    assert!(!plan.contains(ResourceId::DNS_RECORD));
}

/// SCENARIO: The ACL without a zone is rejected before anything is planned
#[test]
fn scenario_acl_requires_zone() {
    let err = DeploymentSpec::builder("tool")
        .domain("a.example.com")
        .dns(SecondaryDnsConfig::new("").with_acl(vec![AclRuleSpec::new("admin", "10.0.0.1")]))
        .build()
        .unwrap_err();

    assert!(err.to_string().contains("dns.zone_id"), "got: {}", err);
}
