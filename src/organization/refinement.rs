//! Boundary refinement: merge undersized communities into their strongest
//! neighbors, then score the stabilized partition.
//!
//! Communities live in an id-addressed arena with membership as id-sets, so
//! "same community" is id equality throughout. The merge loop removes one
//! community per iteration, which bounds it by the initial community count.

use crate::config::AnalysisConfig;
use crate::errors::EngineError;
use crate::graph::builder::Dependency;
use crate::graph::{metrics, DependencyGraph, NodeId};
use crate::organization::community::Community;
use crate::organization::suggestion::{
    BoundaryMetrics, ServiceBoundary, Suggestion, LABEL_PROPAGATION,
};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

type Arena = BTreeMap<usize, BTreeSet<NodeId>>;

/// Refine initial communities into the final boundary list.
///
/// Merges run while the community count exceeds the (configured or derived)
/// target or any community is smaller than `min_community_size`; once both
/// constraints hold the partition is frozen and scored. Degenerate input is
/// not an error: an empty snapshot yields an empty suggestion.
pub fn refine_boundaries(
    graph: &DependencyGraph,
    communities: Vec<Community>,
    config: &AnalysisConfig,
) -> Result<Suggestion, EngineError> {
    let target = config.resolve_target_count(graph.node_count());
    let mut arena: Arena = communities
        .into_iter()
        .filter(|community| !community.is_empty())
        .map(|community| (community.id, community.members.into_iter().collect()))
        .collect();

    merge_undersized(graph, &mut arena, config.min_community_size, target)?;
    finalize(graph, arena)
}

fn merge_undersized(
    graph: &DependencyGraph,
    arena: &mut Arena,
    min_size: usize,
    target: usize,
) -> Result<(), EngineError> {
    loop {
        // No other community exists to merge with.
        if arena.len() <= 1 {
            break;
        }

        let Some(smallest) = smallest_id(arena) else {
            break;
        };
        let smallest_size = arena.get(&smallest).map(|members| members.len()).unwrap_or(0);
        if arena.len() <= target && smallest_size >= min_size {
            break;
        }

        let assignment = assignment_of(arena);
        let into = match strongest_neighbor(graph, &assignment, smallest)? {
            Some(id) => id,
            // Disconnected small communities still make progress by joining
            // the largest one.
            None => match largest_other(arena, smallest) {
                Some(id) => id,
                None => break,
            },
        };

        if let Some(members) = arena.remove(&smallest) {
            arena.entry(into).or_default().extend(members);
        }
        log::debug!(
            "merged community {} into {}, {} communities remain",
            smallest,
            into,
            arena.len()
        );
    }
    Ok(())
}

/// Smallest live community; BTreeMap order makes ties resolve to the lowest id.
fn smallest_id(arena: &Arena) -> Option<usize> {
    arena
        .iter()
        .min_by_key(|(_, members)| members.len())
        .map(|(&id, _)| id)
}

/// Largest community other than `exclude`, lowest id on ties.
fn largest_other(arena: &Arena, exclude: usize) -> Option<usize> {
    arena
        .iter()
        .filter(|(id, _)| **id != exclude)
        .max_by(|(id_a, members_a), (id_b, members_b)| {
            members_a
                .len()
                .cmp(&members_b.len())
                .then(id_b.cmp(id_a))
        })
        .map(|(id, _)| *id)
}

/// Community with the strongest symmetric coupling to `smallest`: the summed
/// weight of edges in either direction between the two. `None` when no edge
/// connects `smallest` to any other community. Ties go to the lowest id.
fn strongest_neighbor(
    graph: &DependencyGraph,
    assignment: &HashMap<NodeId, usize>,
    smallest: usize,
) -> Result<Option<usize>, EngineError> {
    let mut scores: BTreeMap<usize, u64> = BTreeMap::new();
    for edge in graph.edges() {
        let source = community_of(graph, assignment, edge.source, edge)?;
        let target = community_of(graph, assignment, edge.target, edge)?;
        if source == target {
            continue;
        }
        if source == smallest {
            *scores.entry(target).or_insert(0) += u64::from(edge.weight);
        } else if target == smallest {
            *scores.entry(source).or_insert(0) += u64::from(edge.weight);
        }
    }

    Ok(scores
        .into_iter()
        .max_by(|(id_a, score_a), (id_b, score_b)| {
            score_a.cmp(score_b).then(id_b.cmp(id_a))
        })
        .filter(|&(_, score)| score > 0)
        .map(|(id, _)| id))
}

fn assignment_of(arena: &Arena) -> HashMap<NodeId, usize> {
    let mut assignment = HashMap::new();
    for (&id, members) in arena {
        for &node in members {
            assignment.insert(node, id);
        }
    }
    assignment
}

fn community_of(
    graph: &DependencyGraph,
    assignment: &HashMap<NodeId, usize>,
    node: NodeId,
    edge: &Dependency,
) -> Result<usize, EngineError> {
    assignment
        .get(&node)
        .copied()
        .ok_or_else(|| dangling_edge(graph, edge))
}

fn dangling_edge(graph: &DependencyGraph, edge: &Dependency) -> EngineError {
    EngineError::DanglingEdge {
        source_fqn: graph.node(edge.source).qualified_name.clone(),
        target_fqn: graph.node(edge.target).qualified_name.clone(),
    }
}

/// Freeze the arena into named, metric-annotated boundaries plus the global
/// modularity score.
fn finalize(graph: &DependencyGraph, arena: Arena) -> Result<Suggestion, EngineError> {
    if arena.is_empty() {
        return Ok(Suggestion::empty());
    }

    let assignment = assignment_of(&arena);
    let total_edges = graph.edge_count();
    let mut boundaries = Vec::new();
    let mut modularity = 0.0;

    for (&id, members) in &arena {
        let member_set: HashSet<NodeId> = members.iter().copied().collect();
        let internal = metrics::count_internal(graph, &member_set);
        let external = metrics::count_external(graph, &member_set);
        let coupling = coupling_of(graph, &assignment, id, &member_set)?;

        if total_edges > 0 {
            let two_m = (2 * total_edges) as f64;
            let degree = (internal + external) as f64;
            modularity += (internal as f64 - degree * degree / two_m) / two_m;
        }

        boundaries.push(ServiceBoundary {
            suggested_name: suggested_name(graph, members, id),
            class_names: members
                .iter()
                .map(|&node| graph.node(node).qualified_name.clone())
                .collect(),
            metrics: BoundaryMetrics {
                size: members.len(),
                cohesion: metrics::cohesion(graph, &member_set),
                coupling,
                internal_dependencies: internal,
                external_dependencies: external,
            },
        });
    }

    boundaries.sort_by(|a, b| {
        b.metrics
            .size
            .cmp(&a.metrics.size)
            .then_with(|| a.suggested_name.cmp(&b.suggested_name))
    });

    log::info!(
        "refined into {} boundaries, modularity {:.4}",
        boundaries.len(),
        modularity
    );

    Ok(Suggestion {
        algorithm: LABEL_PROPAGATION.to_string(),
        modularity_score: modularity,
        boundaries,
    })
}

/// Distinct other communities referenced by outgoing edges of the members.
fn coupling_of(
    graph: &DependencyGraph,
    assignment: &HashMap<NodeId, usize>,
    id: usize,
    member_set: &HashSet<NodeId>,
) -> Result<usize, EngineError> {
    let mut referenced: BTreeSet<usize> = BTreeSet::new();
    for &node in member_set {
        for edge in graph.outgoing_edges(node) {
            let community = assignment
                .get(&edge.target)
                .copied()
                .ok_or_else(|| dangling_edge(graph, edge))?;
            if community != id {
                referenced.insert(community);
            }
        }
    }
    Ok(referenced.len())
}

/// Name from the plurality package prefix of the members: drop each fqn's
/// last dotted segment, pick the most frequent prefix (lexicographically
/// smallest on ties), capitalize its last segment. Members without a package
/// contribute no prefix; with no prefixes at all the boundary falls back to
/// a numbered cluster name.
fn suggested_name(
    graph: &DependencyGraph,
    members: &BTreeSet<NodeId>,
    community_id: usize,
) -> String {
    let mut prefix_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for &node in members {
        let fqn = graph.node(node).qualified_name.as_str();
        if let Some(split) = fqn.rfind('.') {
            if split > 0 {
                *prefix_counts.entry(&fqn[..split]).or_insert(0) += 1;
            }
        }
    }

    prefix_counts
        .into_iter()
        .max_by(|(prefix_a, count_a), (prefix_b, count_b)| {
            count_a.cmp(count_b).then_with(|| prefix_b.cmp(prefix_a))
        })
        .map(|(prefix, _)| {
            let last_segment = prefix.rsplit('.').next().unwrap_or(prefix);
            format!("{} Service", capitalize(last_segment))
        })
        .unwrap_or_else(|| format!("Service Cluster {}", community_id))
}

fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ClassDecl, ClassKind, MapResolver, TypeRef};
    use crate::graph::build_graph;

    fn graph_of(specs: Vec<(&str, Vec<&str>)>) -> DependencyGraph {
        let mut resolver = MapResolver::new();
        let mut declarations = Vec::new();
        for (fqn, targets) in specs {
            resolver = resolver.with_type(fqn, fqn);
            let mut decl = ClassDecl::new(fqn, "demo", ClassKind::Class);
            for (index, target) in targets.iter().enumerate() {
                resolver = resolver.with_type(*target, *target);
                decl = decl.with_field(format!("f{}", index), TypeRef(target.to_string()));
            }
            declarations.push(decl);
        }
        build_graph(&declarations, &resolver)
    }

    fn community(id: usize, graph: &DependencyGraph, names: &[&str]) -> Community {
        Community {
            id,
            members: names
                .iter()
                .map(|name| graph.id_of(name).expect("node in graph"))
                .collect(),
        }
    }

    fn config(min_size: usize, target: Option<usize>) -> AnalysisConfig {
        AnalysisConfig {
            min_community_size: min_size,
            target_service_count: target,
            ..Default::default()
        }
    }

    #[test]
    fn test_satisfied_constraints_leave_communities_untouched() {
        let graph = graph_of(vec![
            ("a.A1", vec!["a.A2"]),
            ("a.A2", vec!["a.A1"]),
            ("b.B1", vec!["b.B2"]),
            ("b.B2", vec!["b.B1"]),
        ]);
        let communities = vec![
            community(0, &graph, &["a.A1", "a.A2"]),
            community(1, &graph, &["b.B1", "b.B2"]),
        ];

        let suggestion =
            refine_boundaries(&graph, communities, &config(1, Some(2))).unwrap();

        assert_eq!(suggestion.boundaries.len(), 2);
        for boundary in &suggestion.boundaries {
            assert_eq!(boundary.metrics.size, 2);
            assert_eq!(boundary.metrics.cohesion, 1.0);
            assert_eq!(boundary.metrics.coupling, 0);
            assert_eq!(boundary.metrics.external_dependencies, 0);
        }
    }

    #[test]
    fn test_small_community_merges_into_strongest_coupled() {
        // "small" leans on "left" with weight 2 and never touches "right".
        let graph = graph_of(vec![
            ("left.A", vec![]),
            ("left.B", vec![]),
            ("right.C", vec![]),
            ("right.D", vec![]),
            ("small.S", vec!["left.A", "left.A", "left.B"]),
        ]);
        let communities = vec![
            community(0, &graph, &["left.A", "left.B"]),
            community(1, &graph, &["right.C", "right.D"]),
            community(2, &graph, &["small.S"]),
        ];

        let suggestion =
            refine_boundaries(&graph, communities, &config(2, Some(2))).unwrap();

        assert_eq!(suggestion.boundaries.len(), 2);
        let with_small = suggestion
            .boundaries
            .iter()
            .find(|b| b.class_names.contains("small.S"))
            .expect("small.S still assigned");
        assert!(with_small.class_names.contains("left.A"));
        assert!(with_small.class_names.contains("left.B"));
    }

    #[test]
    fn test_disconnected_small_community_falls_back_to_largest() {
        let graph = graph_of(vec![
            ("big.A", vec!["big.B"]),
            ("big.B", vec!["big.A"]),
            ("big.C", vec!["big.A"]),
            ("tiny.X", vec![]),
            ("mid.M1", vec!["mid.M2"]),
            ("mid.M2", vec![]),
        ]);
        let communities = vec![
            community(0, &graph, &["big.A", "big.B", "big.C"]),
            community(1, &graph, &["mid.M1", "mid.M2"]),
            community(2, &graph, &["tiny.X"]),
        ];

        let suggestion =
            refine_boundaries(&graph, communities, &config(2, Some(2))).unwrap();

        let with_tiny = suggestion
            .boundaries
            .iter()
            .find(|b| b.class_names.contains("tiny.X"))
            .expect("tiny.X still assigned");
        assert!(with_tiny.class_names.contains("big.A"));
    }

    #[test]
    fn test_merge_terminates_on_edgeless_singletons() {
        // More singletons than min_community_size allows; zero edges means
        // every merge takes the largest-community fallback.
        let graph = graph_of(vec![
            ("p.A", vec![]),
            ("p.B", vec![]),
            ("p.C", vec![]),
        ]);
        let communities = vec![
            community(0, &graph, &["p.A"]),
            community(1, &graph, &["p.B"]),
            community(2, &graph, &["p.C"]),
        ];

        let suggestion =
            refine_boundaries(&graph, communities, &config(20, None)).unwrap();

        assert_eq!(suggestion.boundaries.len(), 1);
        assert_eq!(suggestion.boundaries[0].metrics.size, 3);
        assert_eq!(suggestion.modularity_score, 0.0);
    }

    #[test]
    fn test_naming_uses_plurality_prefix() {
        let graph = graph_of(vec![
            ("com.shop.order.OrderService", vec![]),
            ("com.shop.order.OrderRepository", vec![]),
            ("com.shop.billing.Invoice", vec![]),
        ]);
        let communities = vec![community(
            0,
            &graph,
            &[
                "com.shop.order.OrderService",
                "com.shop.order.OrderRepository",
                "com.shop.billing.Invoice",
            ],
        )];

        let suggestion =
            refine_boundaries(&graph, communities, &config(1, Some(1))).unwrap();
        assert_eq!(suggestion.boundaries[0].suggested_name, "Order Service");
    }

    #[test]
    fn test_naming_falls_back_without_packages() {
        let graph = graph_of(vec![("Alpha", vec![]), ("Beta", vec![])]);
        let communities = vec![community(3, &graph, &["Alpha", "Beta"])];

        let suggestion =
            refine_boundaries(&graph, communities, &config(1, Some(1))).unwrap();
        assert_eq!(suggestion.boundaries[0].suggested_name, "Service Cluster 3");
    }

    #[test]
    fn test_modularity_of_single_connected_community() {
        // Everything internal: Q = (m - m^2/(2m)) / (2m) = 0.25.
        let graph = graph_of(vec![
            ("a.A", vec!["a.B"]),
            ("a.B", vec!["a.C"]),
            ("a.C", vec!["a.A"]),
        ]);
        let communities = vec![community(0, &graph, &["a.A", "a.B", "a.C"])];

        let suggestion =
            refine_boundaries(&graph, communities, &config(1, Some(1))).unwrap();
        assert!((suggestion.modularity_score - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_empty_input_yields_empty_suggestion() {
        let graph = graph_of(vec![]);
        let suggestion =
            refine_boundaries(&graph, Vec::new(), &AnalysisConfig::default()).unwrap();

        assert!(suggestion.boundaries.is_empty());
        assert_eq!(suggestion.modularity_score, 0.0);
        assert_eq!(suggestion.algorithm, LABEL_PROPAGATION);
    }

    #[test]
    fn test_uncovered_edge_endpoint_is_fatal() {
        let graph = graph_of(vec![("a.A", vec!["a.B"]), ("a.B", vec![])]);
        // a.B is missing from the assignment even though an edge targets it.
        let communities = vec![community(0, &graph, &["a.A"])];

        let result = refine_boundaries(&graph, communities, &config(1, Some(1)));
        assert!(matches!(
            result,
            Err(EngineError::DanglingEdge { .. })
        ));
    }

    #[test]
    fn test_boundaries_ordered_by_size_descending() {
        let graph = graph_of(vec![
            ("a.A1", vec!["a.A2"]),
            ("a.A2", vec![]),
            ("a.A3", vec![]),
            ("b.B1", vec!["b.B2"]),
            ("b.B2", vec![]),
        ]);
        let communities = vec![
            community(0, &graph, &["b.B1", "b.B2"]),
            community(1, &graph, &["a.A1", "a.A2", "a.A3"]),
        ];

        let suggestion =
            refine_boundaries(&graph, communities, &config(1, Some(2))).unwrap();
        let sizes: Vec<usize> = suggestion
            .boundaries
            .iter()
            .map(|b| b.metrics.size)
            .collect();
        assert_eq!(sizes, vec![3, 2]);
    }
}
