//! Pipeline orchestration: declarations in, suggestion out.

use crate::config::AnalysisConfig;
use crate::core::{ClassDecl, TypeResolver};
use crate::errors::EngineError;
use crate::graph::build_graph;
use crate::organization::community::detect_communities;
use crate::organization::refinement::refine_boundaries;
use crate::organization::suggestion::Suggestion;

/// Run the full decomposition pipeline for one project snapshot.
///
/// Builds the weighted class dependency graph, detects initial communities
/// via label propagation, and refines them into the final boundary list.
/// The run owns all of its state; independent snapshots can be analyzed
/// concurrently, each through its own call.
pub fn decompose(
    declarations: &[ClassDecl],
    resolver: &dyn TypeResolver,
    config: &AnalysisConfig,
) -> Result<Suggestion, EngineError> {
    config.validate()?;

    let graph = build_graph(declarations, resolver);
    log::info!(
        "dependency graph: {} classes, {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    let communities = detect_communities(&graph, config.max_iterations);
    log::info!(
        "label propagation produced {} initial communities",
        communities.len()
    );

    refine_boundaries(&graph, communities, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ClassKind, MapResolver};

    #[test]
    fn test_empty_snapshot_yields_empty_suggestion() {
        let suggestion =
            decompose(&[], &MapResolver::new(), &AnalysisConfig::default()).unwrap();
        assert!(suggestion.boundaries.is_empty());
        assert_eq!(suggestion.modularity_score, 0.0);
    }

    #[test]
    fn test_invalid_config_rejected_before_analysis() {
        let config = AnalysisConfig {
            max_iterations: 0,
            ..Default::default()
        };
        let declarations = vec![ClassDecl::new("a.A", "demo", ClassKind::Class)];

        let result = decompose(&declarations, &MapResolver::new(), &config);
        assert!(matches!(result, Err(EngineError::InvalidConfig { .. })));
    }

    #[test]
    fn test_single_class_snapshot() {
        let declarations = vec![ClassDecl::new("com.app.Only", "demo", ClassKind::Class)];
        let config = AnalysisConfig {
            min_community_size: 1,
            ..Default::default()
        };

        let suggestion = decompose(&declarations, &MapResolver::new(), &config).unwrap();
        assert_eq!(suggestion.boundaries.len(), 1);
        assert_eq!(suggestion.boundaries[0].metrics.size, 1);
        assert!(suggestion.boundaries[0].class_names.contains("com.app.Only"));
    }
}
