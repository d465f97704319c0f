//! Pure metrics over node sets.
//!
//! Nothing here mutates the graph; every function is a straight fold over
//! the edge arena. Counts are edge counts: multiple references between the
//! same pair of classes were already collapsed into one weighted edge by the
//! builder.

use crate::graph::builder::{DependencyGraph, NodeId};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};

/// Number of edges from members of `members` whose target is also a member.
pub fn count_internal(graph: &DependencyGraph, members: &HashSet<NodeId>) -> usize {
    members
        .iter()
        .map(|&node| {
            graph
                .outgoing_edges(node)
                .filter(|edge| members.contains(&edge.target))
                .count()
        })
        .sum()
}

/// Number of edges from members of `members` whose target is outside the set.
pub fn count_external(graph: &DependencyGraph, members: &HashSet<NodeId>) -> usize {
    members
        .iter()
        .map(|&node| {
            graph
                .outgoing_edges(node)
                .filter(|edge| !members.contains(&edge.target))
                .count()
        })
        .sum()
}

/// Ratio of internal references to all references leaving the set.
///
/// Defined as 0.0 when the set makes no references at all.
pub fn cohesion(graph: &DependencyGraph, members: &HashSet<NodeId>) -> f64 {
    let internal = count_internal(graph, members);
    let external = count_external(graph, members);
    let total = internal + external;
    if total == 0 {
        0.0
    } else {
        internal as f64 / total as f64
    }
}

/// Unweighted directed view of the graph.
///
/// Vertex payload is the qualified name; an edge records that at least one
/// dependency exists. This is the snapshot shape clustering and modularity
/// work on, and what alternative suggestion providers consume.
pub fn to_directed_graph(
    graph: &DependencyGraph,
) -> (DiGraph<String, ()>, HashMap<String, NodeIndex>) {
    let mut directed = DiGraph::new();
    let mut node_map = HashMap::new();

    for node in graph.nodes() {
        let index = directed.add_node(node.qualified_name.clone());
        node_map.insert(node.qualified_name.clone(), index);
    }
    for edge in graph.edges() {
        directed.add_edge(
            NodeIndex::new(edge.source),
            NodeIndex::new(edge.target),
            (),
        );
    }

    (directed, node_map)
}
