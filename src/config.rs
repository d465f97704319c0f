//! Engine configuration.

use crate::errors::EngineError;
use serde::{Deserialize, Serialize};

/// Tuning knobs for community detection and boundary refinement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Maximum label propagation sweeps before accepting the current labels
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Communities smaller than this get merged into a neighbor
    #[serde(default = "default_min_community_size")]
    pub min_community_size: usize,

    /// Desired number of services; derived from the class count when absent
    #[serde(default)]
    pub target_service_count: Option<usize>,
}

fn default_max_iterations() -> usize {
    100
}

fn default_min_community_size() -> usize {
    20
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            min_community_size: default_min_community_size(),
            target_service_count: None,
        }
    }
}

impl AnalysisConfig {
    // Pure function: Check a count-like knob is at least one
    fn validate_positive(value: usize, name: &str) -> Result<(), EngineError> {
        if value >= 1 {
            Ok(())
        } else {
            Err(EngineError::invalid_config(format!(
                "{} must be at least 1",
                name
            )))
        }
    }

    /// Validate all knobs before any analysis runs.
    pub fn validate(&self) -> Result<(), EngineError> {
        Self::validate_positive(self.max_iterations, "max_iterations")?;
        Self::validate_positive(self.min_community_size, "min_community_size")?;
        if let Some(target) = self.target_service_count {
            Self::validate_positive(target, "target_service_count")?;
        }
        Ok(())
    }

    /// The community count refinement steers toward.
    ///
    /// Uses the configured target when present, otherwise
    /// `clamp(round(sqrt(total_classes / min_community_size)), 2, 15)`.
    pub fn resolve_target_count(&self, total_classes: usize) -> usize {
        if let Some(target) = self.target_service_count {
            return target;
        }
        if total_classes == 0 {
            return 2;
        }
        let raw = (total_classes as f64 / self.min_community_size as f64)
            .sqrt()
            .round() as usize;
        raw.clamp(2, 15)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.max_iterations, 100);
        assert_eq!(config.min_community_size, 20);
        assert_eq!(config.target_service_count, None);
    }

    #[test]
    fn test_serde_fills_missing_fields() {
        let config: AnalysisConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.max_iterations, 100);
        assert_eq!(config.min_community_size, 20);
        assert_eq!(config.target_service_count, None);

        let config: AnalysisConfig =
            serde_json::from_str(r#"{"min_community_size": 5, "target_service_count": 3}"#)
                .unwrap();
        assert_eq!(config.max_iterations, 100);
        assert_eq!(config.min_community_size, 5);
        assert_eq!(config.target_service_count, Some(3));
    }

    #[test]
    fn test_validate_rejects_zero_knobs() {
        let config = AnalysisConfig {
            max_iterations: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = AnalysisConfig {
            min_community_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = AnalysisConfig {
            target_service_count: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        assert!(AnalysisConfig::default().validate().is_ok());
    }

    #[test]
    fn test_target_derivation() {
        let config = AnalysisConfig::default();
        // sqrt(54 / 20) = 1.64 -> rounds to 2
        assert_eq!(config.resolve_target_count(54), 2);
        // sqrt(2000 / 20) = 10
        assert_eq!(config.resolve_target_count(2000), 10);
        // large inputs clamp at 15
        assert_eq!(config.resolve_target_count(100_000), 15);
        // tiny inputs clamp at 2, including the empty snapshot
        assert_eq!(config.resolve_target_count(1), 2);
        assert_eq!(config.resolve_target_count(0), 2);
    }

    #[test]
    fn test_configured_target_wins() {
        let config = AnalysisConfig {
            target_service_count: Some(7),
            ..Default::default()
        };
        assert_eq!(config.resolve_target_count(10_000), 7);
    }
}
