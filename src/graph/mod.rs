//! Weighted class dependency graph: reference weighing, construction, and
//! pure set metrics.

pub mod builder;
pub mod metrics;
pub mod weighting;

pub use builder::{build_graph, ClassNode, Dependency, DependencyGraph, NodeId};
pub use metrics::{cohesion, count_external, count_internal, to_directed_graph};
pub use weighting::{weigh_references, WeightBreakdown};
