use crate::error::{CompassError, Result};
use crate::types::config::RuleShape;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// One cluster's definition of a match.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ClusterRule {
    AverageThreshold(AverageRule),
    ThresholdCount(BTreeMap<String, f64>),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AverageRule {
    pub min_score: f64,
    pub domains: Vec<String>,
}

impl ClusterRule {
    pub fn shape(&self) -> RuleShape {
        match self {
            Self::AverageThreshold(_) => RuleShape::AverageThreshold,
            Self::ThresholdCount(_) => RuleShape::ThresholdCount,
        }
    }
}

/// Cluster rules keyed by cluster name.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    pub clusters: BTreeMap<String, ClusterRule>,
}

impl RuleSet {
    pub fn load(path: &Path, shape: RuleShape) -> Result<Self> {
        if !path.exists() {
            return Err(CompassError::PathNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        let rules = Self::parse(&content, shape)
            .map_err(|e| CompassError::ConfigParse(format!("{}: {}", path.display(), e)))?;
        tracing::info!(
            path = %path.display(),
            clusters = rules.clusters.len(),
            shape = %shape,
            "loaded cluster rules"
        );
        Ok(rules)
    }

    pub fn parse(content: &str, shape: RuleShape) -> std::result::Result<Self, String> {
        let clusters: BTreeMap<String, ClusterRule> =
            toml::from_str(content).map_err(|e| e.to_string())?;
        let rules = Self { clusters };
        rules.validate(shape)?;
        Ok(rules)
    }

    pub fn validate(&self, shape: RuleShape) -> std::result::Result<(), String> {
        for (cluster, rule) in &self.clusters {
            if rule.shape() != shape {
                return Err(format!(
                    "cluster '{cluster}' uses the {} shape but rule_shape is {shape}",
                    rule.shape()
                ));
            }
            match rule {
                ClusterRule::ThresholdCount(conditions) => {
                    if let Some((domain, threshold)) = conditions
                        .iter()
                        .find(|(_, threshold)| !threshold.is_finite())
                    {
                        return Err(format!(
                            "cluster '{cluster}' has non-finite threshold {threshold} for {domain}"
                        ));
                    }
                }
                ClusterRule::AverageThreshold(rule) => {
                    if !(0.0..=100.0).contains(&rule.min_score) {
                        return Err(format!(
                            "cluster '{cluster}' min_score must be between 0 and 100"
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}
