use crate::types::report::AssessmentReport;

pub fn to_json(report: &AssessmentReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::config::RuleShape;
    use crate::types::scoring::{ClusterMatch, DomainScores};

    #[test]
    fn json_report_contains_scores_and_matches() {
        let mut scores = DomainScores::new();
        scores.insert("Analytical".to_string(), 87.5);
        let report = AssessmentReport {
            title: "Assessment".to_string(),
            rule_shape: RuleShape::ThresholdCount,
            answered: 4,
            total_questions: 5,
            scores,
            matches: vec![ClusterMatch::new("Engineer", 100.0)],
        };

        let rendered = to_json(&report).expect("json should serialize");
        assert!(rendered.contains("\"Analytical\": 87.5"));
        assert!(rendered.contains("\"cluster\": \"Engineer\""));
        assert!(rendered.contains("\"rule_shape\": \"threshold-count\""));
    }
}
