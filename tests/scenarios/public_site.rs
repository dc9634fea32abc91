//! Scenario: Public Website
//!
//! Journey: A team publishes a marketing site with TLS and no access
//! restrictions.
//!
//! Success Criteria:
//! - The planner picks the public website model
//! - The plan is just the bucket and the distribution
//! - No bucket policy is emitted
//! - Turning on the DNS record adds one node after the distribution

use cdnplan::domain::entities::{DeploymentSpec, ResourceKind, SecondaryDnsConfig, TlsConfig};
use cdnplan::domain::value_objects::{OriginAccessModel, ResourceId};
use cdnplan::TopologyPlanner;

const CERTIFICATE: &str = "arn:aws:acm:us-east-1:123456789012:certificate/abc";

fn builder() -> cdnplan::domain::entities::DeploymentSpecBuilder {
    DeploymentSpec::builder("site")
        .domain("site.example.com")
        .tls(TlsConfig::enabled(CERTIFICATE))
}

/// SCENARIO: TLS-enabled site without any access-driving flags
#[test]
fn scenario_public_site_plans_two_nodes() {
    let spec = builder().build().unwrap();

    let plan = TopologyPlanner::new().plan(&spec).unwrap();

    assert_eq!(plan.model(), OriginAccessModel::PublicWebsite);
    let ids: Vec<&str> = plan.ids().map(|id| id.as_str()).collect();
    assert_eq!(ids, vec![ResourceId::BUCKET, ResourceId::DISTRIBUTION]);
    assert!(!plan.contains(ResourceId::BUCKET_POLICY));
    assert!(plan
        .nodes()
        .iter()
        .all(|node| node.kind != ResourceKind::BucketPolicy));

    let bucket = plan.node(ResourceId::BUCKET).unwrap();
    assert_eq!(bucket.attributes["acl"], "public-read");
    assert_eq!(bucket.attributes["website"]["index_document"], "index.html");

    let distribution = plan.node(ResourceId::DISTRIBUTION).unwrap();
    assert_eq!(
        distribution.attributes["viewer_certificate"]["acm_certificate_arn"],
        CERTIFICATE
    );
    assert_eq!(
        distribution.attributes["origin"]["custom_origin_config"]["origin_protocol_policy"],
        "http-only"
    );
}

/// SCENARIO: Same site, with the secondary DNS record switched on
#[test]
fn scenario_public_site_with_dns_record() {
    let spec = builder()
        .dns(SecondaryDnsConfig::new("zone-123").with_record(true))
        .build()
        .unwrap();

    let plan = TopologyPlanner::new().plan(&spec).unwrap();

    assert_eq!(plan.model(), OriginAccessModel::PublicWebsite);
    assert_eq!(plan.len(), 3);
    let record = plan.node(ResourceId::DNS_RECORD).unwrap();
    assert_eq!(record.kind, ResourceKind::DnsRecord);
    assert!(record.depends_on.contains(ResourceId::DISTRIBUTION));
    assert!(
        plan.position(ResourceId::DNS_RECORD).unwrap()
            > plan.position(ResourceId::DISTRIBUTION).unwrap()
    );
}
