use crate::error::{CompassError, Result};
use crate::types::rules::{AverageRule, ClusterRule, RuleSet};
use crate::types::scoring::{round2, ClusterMatch, DomainScores, Score};
use std::collections::BTreeMap;

/// Ranks clusters against the respondent's domain scores.
///
/// Threshold-count rules report the share of thresholds met and are kept when
/// at least one is met. Average-threshold rules report the mean of their
/// domains and are kept when it reaches `min_score`. A domain missing from
/// `scores` counts as 0. Results are ordered by fit descending, then by
/// cluster name.
pub fn match_clusters(scores: &DomainScores, rules: &RuleSet) -> Result<Vec<ClusterMatch>> {
    let mut matches = Vec::new();

    for (cluster, rule) in &rules.clusters {
        let (fit, included) = match rule {
            ClusterRule::ThresholdCount(conditions) => {
                let fit = threshold_fit(cluster, scores, conditions)?;
                (fit, fit > 0.0)
            }
            ClusterRule::AverageThreshold(rule) => {
                let fit = average_fit(cluster, scores, rule)?;
                (fit, fit >= rule.min_score)
            }
        };
        let fit = round2(fit);
        tracing::debug!(cluster = %cluster, fit, included, "evaluated cluster");
        if included {
            matches.push(ClusterMatch::new(cluster, fit));
        }
    }

    // Clusters arrive in name order; the stable sort keeps it for equal fits.
    matches.sort_by(|a, b| b.fit.total_cmp(&a.fit));
    Ok(matches)
}

fn score_of(scores: &DomainScores, domain: &str) -> Score {
    scores.get(domain).copied().unwrap_or(0.0)
}

fn threshold_fit(
    cluster: &str,
    scores: &DomainScores,
    conditions: &BTreeMap<String, Score>,
) -> Result<Score> {
    if conditions.is_empty() {
        return Err(CompassError::Configuration(format!(
            "cluster '{cluster}' has no threshold conditions"
        )));
    }
    let hits = conditions
        .iter()
        .filter(|(domain, threshold)| score_of(scores, domain) >= **threshold)
        .count();
    Ok(hits as f64 / conditions.len() as f64 * 100.0)
}

fn average_fit(cluster: &str, scores: &DomainScores, rule: &AverageRule) -> Result<Score> {
    if rule.domains.is_empty() {
        return Err(CompassError::Configuration(format!(
            "cluster '{cluster}' lists no domains to average"
        )));
    }
    let total: Score = rule
        .domains
        .iter()
        .map(|domain| score_of(scores, domain))
        .sum();
    Ok(total / rule.domains.len() as f64)
}
