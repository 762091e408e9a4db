pub mod matching;
pub mod normalize;

use crate::config::{self, resolve_path};
use crate::error::Result;
use crate::types::config::CompassConfig;
use crate::types::question::{scale_answers, Answers, QuestionBank, SCALE_MAX};
use crate::types::report::AssessmentReport;
use crate::types::rules::RuleSet;
use crate::types::scoring::DomainScores;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub use matching::match_clusters;
pub use normalize::normalize_scores;

/// Everything a submission is scored against, loaded once per process.
#[derive(Debug, Clone)]
pub struct Assessment {
    pub root: PathBuf,
    pub config: CompassConfig,
    pub has_config_file: bool,
    pub bank: QuestionBank,
    pub rules: RuleSet,
}

impl Assessment {
    pub fn load(root: &Path) -> Result<Self> {
        let loaded = config::load_config(root)?;
        let has_config_file = loaded.is_some();
        let config = loaded.unwrap_or_default();
        Self::load_with_config(root, config, has_config_file)
    }

    pub fn load_with_config(
        root: &Path,
        config: CompassConfig,
        has_config_file: bool,
    ) -> Result<Self> {
        let bank = QuestionBank::load(&resolve_path(root, &config.assessment.question_bank))?;
        let rules = RuleSet::load(
            &resolve_path(root, &config.assessment.rules),
            config.assessment.rule_shape,
        )?;
        Ok(Self {
            root: root.to_path_buf(),
            config,
            has_config_file,
            bank,
            rules,
        })
    }

    /// Scores one submission and ranks the clusters for it.
    pub fn evaluate(&self, answers: &Answers) -> Result<AssessmentReport> {
        let numeric = scale_answers(&self.bank.questions, answers)?;
        let scores = normalize_scores(&self.bank.questions, &numeric)?;
        let matches = match_clusters(&scores, &self.rules)?;
        let answered = self
            .bank
            .questions
            .iter()
            .filter(|question| answers.contains_key(&question.id))
            .count();
        tracing::info!(
            answered,
            domains = scores.len(),
            matches = matches.len(),
            "assessment evaluated"
        );

        Ok(AssessmentReport {
            title: self.config.assessment.title.clone(),
            rule_shape: self.config.assessment.rule_shape,
            answered,
            total_questions: self.bank.questions.len(),
            scores,
            matches,
        })
    }

    /// Surfaces degenerate weights and rules before any respondent sees them.
    pub fn check(&self) -> Result<()> {
        let all_max = self
            .bank
            .questions
            .iter()
            .map(|question| (question.id.clone(), i64::from(SCALE_MAX)))
            .collect::<BTreeMap<_, _>>();
        normalize_scores(&self.bank.questions, &all_max)?;
        match_clusters(&DomainScores::new(), &self.rules)?;
        Ok(())
    }

    pub fn limit(&self, requested: Option<usize>) -> Option<usize> {
        requested.or(self.config.assessment.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::question::Answer;
    use std::fs;
    use tempfile::TempDir;

    fn write_fixture(dir: &Path, rules: &str) {
        fs::write(
            dir.join("question_bank.json"),
            r#"[
  {"id": "Q1", "text": "I like numbers", "domains": [{"name": "Analytical"}]},
  {"id": "Q2", "text": "I like people", "domains": [{"name": "Social", "weight": 2}]},
  {"id": "Q3", "text": "Favourite subject?", "response_type": "mcq", "options": ["Math", "Art"]}
]"#,
        )
        .expect("bank should write");
        fs::write(dir.join("career_rules.toml"), rules).expect("rules should write");
    }

    #[test]
    fn evaluate_runs_the_pipeline_with_defaults() {
        let dir = TempDir::new().expect("temp dir should be created");
        write_fixture(
            dir.path(),
            r#"
["Data Scientist"]
Analytical = 70
Social = 30
"#,
        );

        let assessment = Assessment::load(dir.path()).expect("assessment should load");
        assert!(!assessment.has_config_file);

        let mut answers = Answers::new();
        answers.insert("Q1".to_string(), Answer::Scale(5));
        answers.insert("Q3".to_string(), Answer::Text("Math".to_string()));

        let report = assessment.evaluate(&answers).expect("evaluation should succeed");
        assert_eq!(report.answered, 2);
        assert_eq!(report.total_questions, 3);
        assert_eq!(report.scores.get("Analytical"), Some(&100.0));
        assert!(!report.scores.contains_key("Social"));
        assert_eq!(report.matches.len(), 1);
        assert_eq!(report.matches[0].fit, 50.0);
    }

    #[test]
    fn check_rejects_empty_average_rule() {
        let dir = TempDir::new().expect("temp dir should be created");
        write_fixture(
            dir.path(),
            r#"
[Designer]
min_score = 50
domains = []
"#,
        );
        fs::write(
            dir.path().join(config::DEFAULT_CONFIG_FILE),
            r#"
[assessment]
rule_shape = "average-threshold"
"#,
        )
        .expect("config should write");

        let assessment = Assessment::load(dir.path()).expect("assessment should load");
        assert!(assessment.has_config_file);
        let err = assessment.check().expect_err("check should fail");
        assert!(err.is_configuration());
    }

    #[test]
    fn check_accepts_valid_setup() {
        let dir = TempDir::new().expect("temp dir should be created");
        write_fixture(dir.path(), "[Engineer]\nAnalytical = 60\n");
        let assessment = Assessment::load(dir.path()).expect("assessment should load");
        assert!(assessment.check().is_ok());
    }

    #[test]
    fn requested_limit_overrides_config() {
        let dir = TempDir::new().expect("temp dir should be created");
        write_fixture(dir.path(), "[Engineer]\nAnalytical = 60\n");
        fs::write(
            dir.path().join(config::DEFAULT_CONFIG_FILE),
            "[assessment]\nlimit = 2\n",
        )
        .expect("config should write");
        let assessment = Assessment::load(dir.path()).expect("assessment should load");
        assert_eq!(assessment.limit(None), Some(2));
        assert_eq!(assessment.limit(Some(1)), Some(1));
    }
}
