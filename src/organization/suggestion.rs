//! Serializable decomposition output.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Algorithm tag recorded on suggestions produced by this engine.
pub const LABEL_PROPAGATION: &str = "label-propagation";

/// Derived quality metrics for one suggested service.
///
/// Always computed from the graph; never mutated independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryMetrics {
    /// Number of classes in the boundary
    pub size: usize,
    /// Internal references over all references leaving members, 0..=1
    pub cohesion: f64,
    /// Distinct other boundaries this one references
    pub coupling: usize,
    /// Edges staying inside the boundary
    pub internal_dependencies: usize,
    /// Edges leaving the boundary
    pub external_dependencies: usize,
}

/// One suggested service: a named, disjoint set of classes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceBoundary {
    pub suggested_name: String,
    /// Fully qualified class names; sorted so serialized output is stable.
    pub class_names: BTreeSet<String>,
    pub metrics: BoundaryMetrics,
}

/// Result of one decomposition run. Populated once, immutable thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub algorithm: String,
    /// Newman modularity of the final partition; may be negative.
    pub modularity_score: f64,
    /// Boundaries ordered by descending size, then name.
    pub boundaries: Vec<ServiceBoundary>,
}

impl Suggestion {
    /// The well-defined result for a snapshot with nothing to decompose.
    pub fn empty() -> Self {
        Self {
            algorithm: LABEL_PROPAGATION.to_string(),
            modularity_score: 0.0,
            boundaries: Vec::new(),
        }
    }
}
