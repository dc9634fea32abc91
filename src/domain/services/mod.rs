//! Domain Services
//!
//! Pure planning logic that operates on domain entities.
//! These services have no I/O dependencies and are easily testable.

mod differ;
mod domain_binder;
mod edge_binder;
pub mod graph;
mod planner;

pub use differ::{AppliedNode, DiffLine, DiffResult, DiffTag, Differ, NodeChange, PlanDiff};
pub use domain_binder::DomainBinder;
pub use edge_binder::{EdgeFunctionBinder, EDGE_REGION, EDGE_RUNTIME};
pub use graph::{order_nodes, DependencyGraph};
pub use planner::TopologyPlanner;
