//! Configuration for network analysis

use serde::{Deserialize, Serialize};

use crate::graph::model::EdgePolicy;
use crate::{NetworkError, Result};

/// Per-edge survival probabilities used when estimating route reliability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReliabilityConfig {
    /// Probability that an ordinary edge stays up
    #[serde(default = "default_healthy_reliability")]
    pub healthy: f64,
    /// Probability that an edge marked vulnerable stays up
    #[serde(default = "default_vulnerable_reliability")]
    pub vulnerable: f64,
}

impl Default for ReliabilityConfig {
    fn default() -> Self {
        Self {
            healthy: default_healthy_reliability(),
            vulnerable: default_vulnerable_reliability(),
        }
    }
}

/// Core configuration for the analysis engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisConfig {
    /// A node fails in a cascade round when the share of its original peers it
    /// can still reach drops below this ratio
    #[serde(default = "default_cascade_threshold")]
    pub cascade_threshold: f64,
    /// Whether single node/edge failures also run the cascade they trigger
    #[serde(default)]
    pub follow_cascade: bool,
    /// Which edges routing may use
    #[serde(default)]
    pub edge_policy: EdgePolicy,
    /// Route reliability model
    #[serde(default)]
    pub reliability: ReliabilityConfig,
    /// Upper bound for alternative route enumeration
    #[serde(default = "default_max_alternative_paths")]
    pub max_alternative_paths: usize,
}

fn default_cascade_threshold() -> f64 {
    0.3
}

fn default_healthy_reliability() -> f64 {
    0.95
}

fn default_vulnerable_reliability() -> f64 {
    0.7
}

fn default_max_alternative_paths() -> usize {
    5
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            cascade_threshold: default_cascade_threshold(),
            follow_cascade: false,
            edge_policy: EdgePolicy::default(),
            reliability: ReliabilityConfig::default(),
            max_alternative_paths: default_max_alternative_paths(),
        }
    }
}

impl AnalysisConfig {
    /// Route around vulnerable edges and follow every failure through its cascade
    pub fn strict() -> Self {
        Self {
            follow_cascade: true,
            edge_policy: EdgePolicy::AvoidVulnerable,
            ..Default::default()
        }
    }

    /// Only nodes that lose almost all of their peers fail in a cascade
    pub fn lenient() -> Self {
        Self {
            cascade_threshold: 0.1,
            ..Default::default()
        }
    }

    /// Parse a JSON document, filling missing fields with defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every ratio lies in `[0, 1]`
    pub fn validate(&self) -> Result<()> {
        check_ratio("cascadeThreshold", self.cascade_threshold)?;
        check_ratio("reliability.healthy", self.reliability.healthy)?;
        check_ratio("reliability.vulnerable", self.reliability.vulnerable)?;
        Ok(())
    }
}

fn check_ratio(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(NetworkError::Config(format!(
            "{} must be within [0, 1], got {}",
            name, value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.cascade_threshold, 0.3);
        assert!(!config.follow_cascade);
        assert_eq!(config.edge_policy, EdgePolicy::IncludeVulnerable);
        assert_eq!(config.reliability.healthy, 0.95);
        assert_eq!(config.reliability.vulnerable, 0.7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_fills_missing_fields() {
        let config = AnalysisConfig::from_json(r#"{"cascadeThreshold": 0.5}"#).unwrap();
        assert_eq!(config.cascade_threshold, 0.5);
        assert_eq!(config.max_alternative_paths, 5);

        let json = r#"{"edgePolicy": "avoid_vulnerable", "followCascade": true}"#;
        let config = AnalysisConfig::from_json(json).unwrap();
        assert_eq!(config.edge_policy, EdgePolicy::AvoidVulnerable);
        assert!(config.follow_cascade);
    }

    #[test]
    fn test_from_json_rejects_bad_values() {
        let err = AnalysisConfig::from_json(r#"{"cascadeThreshold": 1.5}"#).unwrap_err();
        assert!(matches!(err, NetworkError::Config(_)));

        let err = AnalysisConfig::from_json("not json").unwrap_err();
        assert!(matches!(err, NetworkError::Serialization(_)));
    }

    #[test]
    fn test_presets() {
        assert_eq!(AnalysisConfig::strict().edge_policy, EdgePolicy::AvoidVulnerable);
        assert!(AnalysisConfig::strict().follow_cascade);
        assert_eq!(AnalysisConfig::lenient().cascade_threshold, 0.1);
    }
}
