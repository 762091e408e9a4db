use crate::error::{CompassError, Result};
use crate::types::question::{Question, SCALE_MAX, SCALE_MIN};
use crate::types::scoring::{round2, DomainScores};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Default, Clone, Copy)]
struct Accumulator {
    raw: f64,
    max_possible: f64,
}

/// Normalizes answered questions into per-domain percentages.
///
/// Each answer contributes `answer * weight` to its domains, where weight is
/// the question weight times the domain weight, against a ceiling of
/// `5 * weight`. The floor is the ceiling divided by five, so an all-minimum
/// domain scores 0 and an all-maximum domain scores 100. Domains with no
/// answered question are left out of the result.
pub fn normalize_scores(
    questions: &[Question],
    answers: &BTreeMap<String, i64>,
) -> Result<DomainScores> {
    let mut totals = BTreeMap::<&str, Accumulator>::new();

    for question in questions {
        let Some(&answer) = answers.get(&question.id) else {
            continue;
        };
        if !(i64::from(SCALE_MIN)..=i64::from(SCALE_MAX)).contains(&answer) {
            return Err(CompassError::InvalidAnswer {
                question: question.id.clone(),
                reason: format!("{answer} is outside the {SCALE_MIN}-{SCALE_MAX} scale"),
            });
        }

        for domain in &question.domains {
            let weight = question.effective_weight(domain);
            let entry = totals.entry(domain.name.as_str()).or_default();
            entry.raw += answer as f64 * weight;
            entry.max_possible += f64::from(SCALE_MAX) * weight;
        }
    }

    let known = questions
        .iter()
        .map(|question| question.id.as_str())
        .collect::<HashSet<_>>();
    for id in answers.keys().filter(|id| !known.contains(id.as_str())) {
        tracing::warn!(question = %id, "answer references unknown question; ignored");
    }

    let mut normalized = DomainScores::new();
    for (domain, totals) in totals {
        let min_possible = totals.max_possible / f64::from(SCALE_MAX);
        let span = totals.max_possible - min_possible;
        if span == 0.0 || !span.is_finite() {
            return Err(CompassError::Configuration(format!(
                "domain '{domain}' has zero total weight"
            )));
        }
        let score = (totals.raw - min_possible) / span * 100.0;
        normalized.insert(domain.to_string(), round2(score));
    }

    tracing::debug!(domains = normalized.len(), "normalized domain scores");
    Ok(normalized)
}
