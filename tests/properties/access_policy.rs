//! Property tests for origin access safety.

use proptest::prelude::*;
use serde_json::Value;

use cdnplan::domain::entities::ResourceKind;
use cdnplan::domain::value_objects::{OriginAccessModel, ResourceId, SigningIdentityKind};
use cdnplan::TopologyPlanner;

use crate::strategies::spec;

fn statements(policy: &Value) -> Vec<Value> {
    policy["policy"]["Statement"]
        .as_array()
        .cloned()
        .unwrap_or_default()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: A private origin never grants anything to everyone.
    ///
    /// The only statement with a `*` principal is the transport deny, and no
    /// account grant names a wildcard identity.
    #[test]
    fn property_private_policy_never_allows_everyone(spec in spec()) {
        let plan = TopologyPlanner::new().plan(&spec).unwrap();
        prop_assume!(plan.model().is_private());

        let policy = plan.node(ResourceId::BUCKET_POLICY).unwrap();
        for statement in statements(&policy.attributes) {
            if statement["Principal"] == "*" {
                prop_assert_eq!(&statement["Effect"], "Deny");
            }
            if statement["Effect"] == "Allow" {
                let account = statement["Principal"]["AWS"].as_str().unwrap_or_default();
                prop_assert!(!account.contains('*'), "wildcard account grant: {}", statement);
            }
        }
    }

    /// PROPERTY: The private model always carries the access block and exactly one transport deny.
    #[test]
    fn property_private_model_blocks_public_access(spec in spec()) {
        let plan = TopologyPlanner::new().plan(&spec).unwrap();
        prop_assume!(plan.model().is_private());

        let block = plan.node(ResourceId::ACCESS_BLOCK).unwrap();
        prop_assert_eq!(block.kind, ResourceKind::PublicAccessBlock);
        for flag in ["block_public_acls", "block_public_policy", "ignore_public_acls", "restrict_public_buckets"] {
            prop_assert_eq!(&block.attributes[flag], true);
        }

        let policy = plan.node(ResourceId::BUCKET_POLICY).unwrap();
        let denies = statements(&policy.attributes)
            .into_iter()
            .filter(|s| s["Effect"] == "Deny" && s["Condition"]["Bool"]["aws:SecureTransport"] == "false")
            .count();
        prop_assert_eq!(denies, 1);
        prop_assert_eq!(&plan.node(ResourceId::BUCKET).unwrap().attributes["acl"], "private");
    }

    /// PROPERTY: With an access-control identity, the edge read grant is scoped to this distribution.
    #[test]
    fn property_edge_read_is_scoped_to_distribution(spec in spec()) {
        let plan = TopologyPlanner::new().plan(&spec).unwrap();
        prop_assume!(plan.model() == OriginAccessModel::PrivateSigned(SigningIdentityKind::AccessControl));

        let policy = plan.node(ResourceId::BUCKET_POLICY).unwrap();
        let policy_text = policy.attributes.to_string();
        prop_assert!(policy.depends_on.contains(ResourceId::DISTRIBUTION));
        prop_assert!(policy_text.contains("AWS:SourceArn"));
    }

    /// PROPERTY: Selecting a model only ever depends on the access-driving flags.
    #[test]
    fn property_model_follows_flags(spec in spec()) {
        let features = spec.features();
        let acl = spec.dns().is_some_and(|dns| dns.acl.enabled);
        let expect_private = features.restrict_origin_access
            || features.versioning
            || features.encryption_at_rest
            || acl;

        let plan = TopologyPlanner::new().plan(&spec).unwrap();
        prop_assert_eq!(plan.model().is_private(), expect_private);
        prop_assert_eq!(plan.contains(ResourceId::BUCKET_POLICY), expect_private);
        prop_assert_eq!(plan.contains(ResourceId::SIGNING_IDENTITY), expect_private);
    }
}
