use serde::Serialize;
use std::collections::BTreeMap;

pub type Score = f64;

/// Domain name to normalized percentage. Domains without answers are absent.
pub type DomainScores = BTreeMap<String, Score>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterMatch {
    pub cluster: String,
    pub fit: Score,
}

impl ClusterMatch {
    pub fn new(cluster: &str, fit: Score) -> Self {
        Self {
            cluster: cluster.to_string(),
            fit,
        }
    }
}

/// Rounds to two decimals and folds negative zero into zero.
pub fn round2(value: Score) -> Score {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}
