// Export modules for library usage
pub mod analysis;
pub mod config;
pub mod core;
pub mod errors;
pub mod graph;
pub mod organization;

// Re-export commonly used types
pub use crate::analysis::decompose;

pub use crate::config::AnalysisConfig;

pub use crate::core::{
    BodyRef, ClassDecl, ClassKind, ExprRef, FieldDecl, MapResolver, MethodDecl, Resolution,
    TypeRef, TypeResolver,
};

pub use crate::errors::EngineError;

pub use crate::graph::{
    builder::{build_graph, ClassNode, Dependency, DependencyGraph, NodeId},
    metrics::{cohesion, count_external, count_internal, to_directed_graph},
    weighting::{weigh_references, WeightBreakdown},
};

pub use crate::organization::{
    community::{detect_communities, Community},
    refinement::refine_boundaries,
    suggestion::{BoundaryMetrics, ServiceBoundary, Suggestion},
};
