//! Graph construction from weighed declarations.
//!
//! Two-pass build: a pre-pass registers one node per declaration so edge
//! targets resolve regardless of input order, then edges are added from the
//! weigher output. Storage is a flat arena: nodes in a `Vec` indexed by
//! [`NodeId`], edges as source/target/breakdown triples, and a per-node list
//! of outgoing edge indices. Nodes never hold references to other nodes.

use crate::core::{ClassDecl, ClassKind, TypeResolver};
use crate::graph::weighting::{weigh_references, WeightBreakdown};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Index of a node in the graph arena.
pub type NodeId = usize;

/// Vertex for one class-like declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassNode {
    pub qualified_name: String,
    pub simple_name: String,
    pub project_id: String,
    pub kind: ClassKind,
}

/// Directed weighted edge between two classes.
///
/// All references from source to target accumulate into this one edge;
/// `weight` always equals `breakdown.total()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub source: NodeId,
    pub target: NodeId,
    pub weight: u32,
    pub breakdown: WeightBreakdown,
}

/// Flat-arena class dependency graph for one analysis run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DependencyGraph {
    nodes: Vec<ClassNode>,
    ids: HashMap<String, NodeId>,
    edges: Vec<Dependency>,
    outgoing: Vec<Vec<usize>>,
}

impl DependencyGraph {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &ClassNode {
        &self.nodes[id]
    }

    pub fn nodes(&self) -> impl Iterator<Item = &ClassNode> {
        self.nodes.iter()
    }

    /// Node id for a fully qualified name, if the class is in this graph.
    pub fn id_of(&self, qualified_name: &str) -> Option<NodeId> {
        self.ids.get(qualified_name).copied()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Dependency> {
        self.edges.iter()
    }

    /// Outgoing edges of one node.
    pub fn outgoing_edges(&self, id: NodeId) -> impl Iterator<Item = &Dependency> {
        self.outgoing[id].iter().map(|&edge| &self.edges[edge])
    }
}

/// Build the class dependency graph for a full declaration snapshot.
///
/// Self-references and references to types outside the declaration set
/// (external/third-party types) are dropped. Node ids follow the sorted
/// order of qualified names, so identical input yields an identical graph
/// independent of declaration order.
pub fn build_graph(declarations: &[ClassDecl], resolver: &dyn TypeResolver) -> DependencyGraph {
    let mut ordered: Vec<&ClassDecl> = declarations.iter().collect();
    ordered.sort_by(|a, b| a.qualified_name.cmp(&b.qualified_name));
    ordered.dedup_by(|a, b| {
        let duplicate = a.qualified_name == b.qualified_name;
        if duplicate {
            log::warn!("duplicate declaration of {} dropped", a.qualified_name);
        }
        duplicate
    });

    let mut graph = DependencyGraph::default();
    for decl in &ordered {
        let id = graph.nodes.len();
        graph.ids.insert(decl.qualified_name.clone(), id);
        graph.nodes.push(ClassNode {
            qualified_name: decl.qualified_name.clone(),
            simple_name: decl.simple_name.clone(),
            project_id: decl.project_id.clone(),
            kind: decl.kind,
        });
        graph.outgoing.push(Vec::new());
    }

    for decl in &ordered {
        let source = graph.ids[&decl.qualified_name];
        let weights = weigh_references(decl, resolver);

        let mut targets: Vec<(NodeId, WeightBreakdown)> = weights
            .into_iter()
            .filter_map(|(fqn, breakdown)| {
                let target = graph.id_of(&fqn)?;
                (target != source).then_some((target, breakdown))
            })
            .collect();
        targets.sort_by_key(|(target, _)| *target);

        for (target, breakdown) in targets {
            let edge = graph.edges.len();
            graph.edges.push(Dependency {
                source,
                target,
                weight: breakdown.total(),
                breakdown,
            });
            graph.outgoing[source].push(edge);
        }
    }

    log::debug!(
        "built dependency graph: {} classes, {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    graph
}
