//! Dependency graph over plan nodes
//!
//! Edges point from a dependency to its dependent. Topological order is
//! unique: among ready nodes the one declared first always goes next.

use std::collections::{BTreeSet, HashMap};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::domain::entities::ResourceDecl;
use crate::domain::value_objects::ResourceId;
use crate::error::{PlanError, PlanResult};

#[derive(Debug, Clone)]
pub struct DependencyGraph {
    graph: DiGraph<ResourceId, ()>,
    index_map: HashMap<ResourceId, NodeIndex>,
}

impl DependencyGraph {
    /// Build the graph, rejecting duplicate ids and dangling dependencies
    pub fn build(nodes: &[ResourceDecl]) -> PlanResult<Self> {
        let mut graph = DiGraph::with_capacity(nodes.len(), nodes.len());
        let mut index_map = HashMap::with_capacity(nodes.len());

        for node in nodes {
            if index_map.contains_key(&node.id) {
                return Err(PlanError::DuplicateNode {
                    node: node.id.to_string(),
                });
            }
            let idx = graph.add_node(node.id.clone());
            index_map.insert(node.id.clone(), idx);
        }

        for node in nodes {
            let to = index_map[&node.id];
            for dependency in &node.depends_on {
                let from = index_map.get(dependency).copied().ok_or_else(|| {
                    PlanError::UnknownDependency {
                        node: node.id.to_string(),
                        dependency: dependency.to_string(),
                    }
                })?;
                graph.add_edge(from, to, ());
            }
        }

        Ok(Self { graph, index_map })
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Node ids in apply order
    ///
    /// Kahn's algorithm where the ready set is ordered by declaration index.
    pub fn toposort(&self) -> PlanResult<Vec<ResourceId>> {
        let mut in_degree: Vec<usize> = self
            .graph
            .node_indices()
            .map(|idx| {
                self.graph
                    .neighbors_directed(idx, Direction::Incoming)
                    .count()
            })
            .collect();

        let mut ready: BTreeSet<usize> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, deg)| **deg == 0)
            .map(|(i, _)| i)
            .collect();

        let mut order = Vec::with_capacity(self.len());
        while let Some(next) = ready.pop_first() {
            let idx = NodeIndex::new(next);
            order.push(self.graph[idx].clone());
            for dependent in self.graph.neighbors_directed(idx, Direction::Outgoing) {
                let deg = &mut in_degree[dependent.index()];
                *deg = deg.saturating_sub(1);
                if *deg == 0 {
                    ready.insert(dependent.index());
                }
            }
        }

        if order.len() != self.len() {
            // Report the first declared node that never became ready.
            let node = in_degree
                .iter()
                .position(|deg| *deg > 0)
                .map(|i| self.graph[NodeIndex::new(i)].to_string())
                .unwrap_or_else(|| "unknown".to_string());
            return Err(PlanError::GraphCycle { node });
        }
        Ok(order)
    }

    /// Every node that transitively depends on `id`, in declaration order
    pub fn dependents_of(&self, id: &ResourceId) -> Vec<ResourceId> {
        let Some(&start) = self.index_map.get(id) else {
            return Vec::new();
        };
        let mut seen = BTreeSet::new();
        let mut stack = vec![start];
        while let Some(idx) = stack.pop() {
            for dependent in self.graph.neighbors_directed(idx, Direction::Outgoing) {
                if seen.insert(dependent.index()) {
                    stack.push(dependent);
                }
            }
        }
        seen.into_iter()
            .map(|i| self.graph[NodeIndex::new(i)].clone())
            .collect()
    }
}

/// Validate references and sort nodes into apply order
pub fn order_nodes(nodes: Vec<ResourceDecl>) -> PlanResult<Vec<ResourceDecl>> {
    for node in &nodes {
        if let Some(reference) = node
            .references()
            .into_iter()
            .find(|r| !node.depends_on.contains(r))
        {
            return Err(PlanError::UndeclaredReference {
                node: node.id.to_string(),
                reference: reference.to_string(),
            });
        }
    }

    let order = DependencyGraph::build(&nodes)?.toposort()?;
    let mut by_id: HashMap<ResourceId, ResourceDecl> =
        nodes.into_iter().map(|n| (n.id.clone(), n)).collect();
    Ok(order
        .into_iter()
        .filter_map(|id| by_id.remove(&id))
        .collect())
}
