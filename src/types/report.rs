use crate::types::config::RuleShape;
use crate::types::scoring::{ClusterMatch, DomainScores};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct AssessmentReport {
    pub title: String,
    pub rule_shape: RuleShape,
    pub answered: usize,
    pub total_questions: usize,
    pub scores: DomainScores,
    pub matches: Vec<ClusterMatch>,
}

impl AssessmentReport {
    pub fn has_match(&self) -> bool {
        !self.matches.is_empty()
    }
}
