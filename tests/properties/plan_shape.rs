//! Property tests for plan ordering, TLS wiring and determinism.

use std::collections::{BTreeMap, HashSet};

use proptest::prelude::*;

use cdnplan::domain::services::{AppliedNode, Differ};
use cdnplan::domain::value_objects::ResourceId;
use cdnplan::TopologyPlanner;

use crate::strategies::{spec, CERTIFICATE};

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Every node comes after all of its dependencies.
    #[test]
    fn property_plan_is_topologically_ordered(spec in spec()) {
        let plan = TopologyPlanner::new().plan(&spec).unwrap();

        let mut seen = HashSet::new();
        for node in plan.nodes() {
            for dep in &node.depends_on {
                prop_assert!(seen.contains(dep), "{} precedes its dependency {}", node.id, dep);
            }
            prop_assert!(seen.insert(node.id.clone()), "duplicate node {}", node.id);
        }
    }

    /// PROPERTY: The certificate and aliases are attached if and only if TLS is enabled.
    #[test]
    fn property_tls_controls_certificate(spec in spec()) {
        let plan = TopologyPlanner::new().plan(&spec).unwrap();
        let distribution = &plan.node(ResourceId::DISTRIBUTION).unwrap().attributes;
        let certificate = &distribution["viewer_certificate"];

        if spec.tls().enabled {
            prop_assert_eq!(&certificate["acm_certificate_arn"], CERTIFICATE);
            prop_assert_eq!(distribution["aliases"].as_array().map(Vec::len), Some(spec.domains().len()));
        } else {
            prop_assert_eq!(&certificate["cloudfront_default_certificate"], true);
            prop_assert!(certificate.get("acm_certificate_arn").is_none());
            prop_assert_eq!(distribution["aliases"].as_array().map(Vec::len), Some(0));
        }
    }

    /// PROPERTY: Planning is a pure function of the spec.
    #[test]
    fn property_planning_is_deterministic(spec in spec()) {
        let planner = TopologyPlanner::new();
        let first = planner.plan(&spec).unwrap();
        let second = planner.plan(&spec).unwrap();
        prop_assert_eq!(&first, &second);

        let fingerprints: Vec<_> = first.nodes().iter().map(|n| n.fingerprint()).collect();
        let again: Vec<_> = second.nodes().iter().map(|n| n.fingerprint()).collect();
        prop_assert_eq!(fingerprints, again);
    }

    /// PROPERTY: A plan diffed against its own applied state has nothing to do.
    #[test]
    fn property_replanning_applied_state_is_a_no_op(spec in spec()) {
        let plan = TopologyPlanner::new().plan(&spec).unwrap();
        let applied: BTreeMap<ResourceId, AppliedNode> = plan
            .nodes()
            .iter()
            .map(|node| {
                (
                    node.id.clone(),
                    AppliedNode {
                        fingerprint: node.fingerprint(),
                        attributes: Some(node.attributes.clone()),
                    },
                )
            })
            .collect();

        let diff = Differ::new().plan_diff(&plan, &applied);
        prop_assert_eq!(diff.count("unchanged"), plan.len());
        prop_assert!(diff.orphaned.is_empty());
    }
}
