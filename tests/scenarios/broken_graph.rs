//! Scenario: Inconsistent Dependency Graph
//!
//! Journey: A node set whose dependencies loop back on themselves reaches
//! the ordering step.
//!
//! Success Criteria:
//! - Ordering fails with a cycle error instead of returning a partial order
//! - References without a declared dependency are rejected too

use serde_json::json;

use cdnplan::domain::entities::{Reference, ResourceDecl, ResourceKind};
use cdnplan::domain::services::order_nodes;
use cdnplan::{ErrorKind, PlanError};

/// SCENARIO: Two nodes that depend on each other
#[test]
fn scenario_cycle_is_rejected() {
    let nodes = vec![
        ResourceDecl::new("a", ResourceKind::StorageBucket, json!({})).depends_on("b"),
        ResourceDecl::new("b", ResourceKind::Distribution, json!({})).depends_on("a"),
    ];

    let err = order_nodes(nodes).unwrap_err();

    assert!(matches!(err, PlanError::GraphCycle { .. }), "got: {:?}", err);
    assert_eq!(err.kind(), ErrorKind::GraphCycle);
}

/// SCENARIO: An attribute points at a node it does not depend on
#[test]
fn scenario_undeclared_reference_is_rejected() {
    let nodes = vec![
        ResourceDecl::new("a", ResourceKind::StorageBucket, json!({})),
        ResourceDecl::new(
            "b",
            ResourceKind::Distribution,
            json!({"origin": Reference::new("a", "arn").to_value()}),
        ),
    ];

    let err = order_nodes(nodes).unwrap_err();

    assert!(
        matches!(err, PlanError::UndeclaredReference { ref node, .. } if node == "b"),
        "got: {:?}",
        err
    );
}
