//! Configuration for overlap removal

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use super::ranking::DEFAULT_TIER;

/// Errors that can occur when loading a configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Tunable constants injected into the generator
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OverlapConfig {
    /// Severity added for a pair where one rectangle contains the other.
    /// Mixed with raw areas, so it is a tuning knob rather than a scale-free
    /// guarantee.
    pub containment_penalty: f64,

    /// Extra distance added to every separation so that separated
    /// rectangles never end up exactly touching
    pub min_separation: f64,

    /// Opposite-axis overlap a pair needs before the one-shot emission pass
    /// constrains it
    pub emit_overlap_threshold: f64,

    /// Tier for pairs of two leaves
    pub default_tier: u16,

    /// Tier for pairs involving a cluster
    pub cluster_tier: u16,
}

impl Default for OverlapConfig {
    fn default() -> Self {
        Self {
            containment_penalty: 100000.0,
            min_separation: 1e-9,
            emit_overlap_threshold: 0.0005,
            default_tier: DEFAULT_TIER,
            cluster_tier: DEFAULT_TIER,
        }
    }
}

impl OverlapConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load configuration from a TOML string; missing keys keep defaults
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn with_containment_penalty(mut self, penalty: f64) -> Self {
        self.containment_penalty = penalty;
        self
    }

    pub fn with_min_separation(mut self, epsilon: f64) -> Self {
        self.min_separation = epsilon;
        self
    }

    pub fn with_emit_overlap_threshold(mut self, threshold: f64) -> Self {
        self.emit_overlap_threshold = threshold;
        self
    }

    pub fn with_default_tier(mut self, tier: u16) -> Self {
        self.default_tier = tier;
        self
    }

    pub fn with_cluster_tier(mut self, tier: u16) -> Self {
        self.cluster_tier = tier;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OverlapConfig::default();
        assert_eq!(config.containment_penalty, 100000.0);
        assert_eq!(config.min_separation, 1e-9);
        assert_eq!(config.emit_overlap_threshold, 0.0005);
        assert_eq!(config.default_tier, 1);
        assert_eq!(config.cluster_tier, 1);
    }

    #[test]
    fn test_builder_pattern() {
        let config = OverlapConfig::new()
            .with_containment_penalty(10.0)
            .with_cluster_tier(0);
        assert_eq!(config.containment_penalty, 10.0);
        assert_eq!(config.cluster_tier, 0);
        assert_eq!(config.default_tier, 1);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = OverlapConfig::from_toml_str("min_separation = 0.5\ncluster_tier = 0\n")
            .expect("valid toml");
        assert_eq!(config.min_separation, 0.5);
        assert_eq!(config.cluster_tier, 0);
        assert_eq!(config.containment_penalty, 100000.0);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let result = OverlapConfig::from_toml_str("penalty = 3.0\n");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}
