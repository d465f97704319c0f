//! Initial community detection via label propagation.
//!
//! The directed graph is projected onto an undirected simple graph (an edge
//! exists iff a dependency exists in either direction), then labels are
//! propagated synchronously: every sweep reads the previous sweep's labels
//! and writes a fresh vector, so update order inside a sweep cannot leak
//! into the result.

use crate::graph::{to_directed_graph, DependencyGraph, NodeId};
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use std::collections::{BTreeMap, HashMap};

/// A detected community: stable id plus member node ids in ascending order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Community {
    pub id: usize,
    pub members: Vec<NodeId>,
}

impl Community {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Partition the graph into communities by label propagation.
///
/// Every node starts with its own label. Each sweep, a node adopts the
/// majority label among its neighbors, ties going to the lowest label.
/// Nodes without neighbors keep their label, so isolated classes survive as
/// singleton communities and every class lands in exactly one community.
/// Stops at the first sweep that changes nothing, or after `max_iterations`
/// sweeps.
pub fn detect_communities(graph: &DependencyGraph, max_iterations: usize) -> Vec<Community> {
    let node_count = graph.node_count();
    if node_count == 0 {
        return Vec::new();
    }

    let projected = undirected_projection(graph);
    let mut labels: Vec<NodeId> = (0..node_count).collect();

    for sweep in 0..max_iterations {
        let mut next = labels.clone();
        let mut changed = false;

        for node in 0..node_count {
            if let Some(label) = majority_label(&projected, &labels, node) {
                if label != labels[node] {
                    changed = true;
                }
                next[node] = label;
            }
        }

        labels = next;
        if !changed {
            log::debug!("label propagation converged after {} sweeps", sweep + 1);
            break;
        }
    }

    group_by_label(&labels)
}

/// Undirected simple projection of the unweighted directed view. Node ids
/// carry over one-to-one, so `NodeIndex::new(id)` addresses the projected
/// node.
fn undirected_projection(graph: &DependencyGraph) -> UnGraph<NodeId, ()> {
    let (directed, _) = to_directed_graph(graph);

    let mut projected = UnGraph::with_capacity(directed.node_count(), directed.edge_count());
    for id in 0..directed.node_count() {
        projected.add_node(id);
    }
    for edge in directed.edge_references() {
        if projected.find_edge(edge.source(), edge.target()).is_none() {
            projected.add_edge(edge.source(), edge.target(), ());
        }
    }
    projected
}

/// Majority label among the node's neighbors, lowest label on ties.
/// `None` when the node has no neighbors.
fn majority_label(
    projected: &UnGraph<NodeId, ()>,
    labels: &[NodeId],
    node: usize,
) -> Option<NodeId> {
    let mut counts: HashMap<NodeId, usize> = HashMap::new();
    for neighbor in projected.neighbors(NodeIndex::new(node)) {
        *counts.entry(labels[neighbor.index()]).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .max_by(|(label_a, count_a), (label_b, count_b)| {
            count_a.cmp(count_b).then(label_b.cmp(label_a))
        })
        .map(|(label, _)| label)
}

/// Group nodes by final label. Community ids are assigned in ascending label
/// order, which makes repeated runs produce identical partitions.
fn group_by_label(labels: &[NodeId]) -> Vec<Community> {
    let mut groups: BTreeMap<NodeId, Vec<NodeId>> = BTreeMap::new();
    for (node, &label) in labels.iter().enumerate() {
        groups.entry(label).or_default().push(node);
    }

    groups
        .into_values()
        .enumerate()
        .map(|(id, members)| Community { id, members })
        .collect()
}
