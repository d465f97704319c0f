//! Typed errors for the decomposition engine.
//!
//! Only genuinely fatal conditions live here. Degenerate input (no classes,
//! no edges) is a well-defined empty result, and per-reference resolution
//! failures are skipped during weighing, so neither surfaces as an error.

use thiserror::Error;

/// Fatal engine failures.
#[derive(Debug, Error)]
pub enum EngineError {
    /// An edge endpoint is missing from the node-to-community assignment.
    /// The graph builder guarantees every edge target exists, so hitting
    /// this means a construction bug and must not be swallowed.
    #[error("dangling edge: {source_fqn} -> {target_fqn} references a class absent from the graph")]
    DanglingEdge {
        source_fqn: String,
        target_fqn: String,
    },

    /// Configuration rejected before any analysis ran.
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl EngineError {
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        EngineError::InvalidConfig {
            reason: reason.into(),
        }
    }
}
