use crate::error::CompassError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_QUESTION_BANK: &str = "question_bank.json";
pub const DEFAULT_RULES: &str = "career_rules.toml";
pub const DEFAULT_RESPONSE_LOG: &str = ".compass/responses.jsonl";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompassConfig {
    #[serde(default)]
    pub assessment: AssessmentConfig,
    pub sink: Option<SinkConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssessmentConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_question_bank")]
    pub question_bank: String,
    #[serde(default = "default_rules")]
    pub rules: String,
    #[serde(default)]
    pub rule_shape: RuleShape,
    pub limit: Option<usize>,
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            question_bank: default_question_bank(),
            rules: default_rules(),
            rule_shape: RuleShape::default(),
            limit: None,
        }
    }
}

fn default_title() -> String {
    "Psychometric Assessment".to_string()
}

fn default_question_bank() -> String {
    DEFAULT_QUESTION_BANK.to_string()
}

fn default_rules() -> String {
    DEFAULT_RULES.to_string()
}

/// The one cluster rule shape a deployment accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleShape {
    #[default]
    ThresholdCount,
    AverageThreshold,
}

impl fmt::Display for RuleShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ThresholdCount => f.write_str("threshold-count"),
            Self::AverageThreshold => f.write_str("average-threshold"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    File,
    None,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SinkConfig {
    pub kind: Option<SinkKind>,
    pub response_log: Option<String>,
    pub max_log_size_kb: Option<u32>,
    pub retained_logs: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SinkSettings {
    pub enabled: bool,
    pub response_log: String,
    pub max_log_size_kb: u64,
    pub retained_logs: usize,
}

impl Default for SinkSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            response_log: DEFAULT_RESPONSE_LOG.to_string(),
            max_log_size_kb: 1024,
            retained_logs: 3,
        }
    }
}

impl CompassConfig {
    pub fn sink_settings(&self) -> SinkSettings {
        let defaults = SinkSettings::default();
        match &self.sink {
            Some(sink) => SinkSettings {
                enabled: !matches!(sink.kind, Some(SinkKind::None)),
                response_log: sink
                    .response_log
                    .clone()
                    .unwrap_or(defaults.response_log),
                max_log_size_kb: sink
                    .max_log_size_kb
                    .map(u64::from)
                    .unwrap_or(defaults.max_log_size_kb),
                retained_logs: sink
                    .retained_logs
                    .map(|value| value as usize)
                    .unwrap_or(defaults.retained_logs),
            },
            None => defaults,
        }
    }

    pub fn validate(&self) -> Result<(), CompassError> {
        if self.assessment.question_bank.trim().is_empty() {
            return Err(CompassError::ConfigParse(
                "assessment.question_bank must not be empty".to_string(),
            ));
        }
        if self.assessment.rules.trim().is_empty() {
            return Err(CompassError::ConfigParse(
                "assessment.rules must not be empty".to_string(),
            ));
        }
        if self.assessment.limit == Some(0) {
            return Err(CompassError::ConfigParse(
                "assessment.limit must be greater than 0".to_string(),
            ));
        }

        if let Some(sink) = &self.sink {
            if let Some(path) = &sink.response_log {
                if path.trim().is_empty() {
                    return Err(CompassError::ConfigParse(
                        "sink.response_log must not be empty".to_string(),
                    ));
                }
            }
            if sink.max_log_size_kb == Some(0) {
                return Err(CompassError::ConfigParse(
                    "sink.max_log_size_kb must be greater than 0".to_string(),
                ));
            }
            if sink.retained_logs == Some(0) {
                return Err(CompassError::ConfigParse(
                    "sink.retained_logs must be greater than 0".to_string(),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let cfg: CompassConfig = toml::from_str("").expect("empty config should parse");
        assert_eq!(cfg.assessment.question_bank, DEFAULT_QUESTION_BANK);
        assert_eq!(cfg.assessment.rules, DEFAULT_RULES);
        assert_eq!(cfg.assessment.rule_shape, RuleShape::ThresholdCount);
        assert_eq!(cfg.sink_settings(), SinkSettings::default());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
[assessment]
title = "Career Guidance"
question_bank = "bank.json"
rules = "rules.toml"
rule_shape = "average-threshold"
limit = 20

[sink]
kind = "file"
response_log = "logs/responses.jsonl"
max_log_size_kb = 64
retained_logs = 5
"#;
        let cfg: CompassConfig = toml::from_str(toml_str).expect("full config should parse");
        assert_eq!(cfg.assessment.title, "Career Guidance");
        assert_eq!(cfg.assessment.rule_shape, RuleShape::AverageThreshold);
        assert_eq!(cfg.assessment.limit, Some(20));
        assert_eq!(
            cfg.sink_settings(),
            SinkSettings {
                enabled: true,
                response_log: "logs/responses.jsonl".to_string(),
                max_log_size_kb: 64,
                retained_logs: 5,
            }
        );
    }

    #[test]
    fn sink_kind_none_disables_logging() {
        let toml_str = r#"
[sink]
kind = "none"
"#;
        let cfg: CompassConfig = toml::from_str(toml_str).expect("config should parse");
        assert!(!cfg.sink_settings().enabled);
    }

    #[test]
    fn unknown_rule_shape_fails_to_parse() {
        let toml_str = r#"
[assessment]
rule_shape = "weighted"
"#;
        assert!(toml::from_str::<CompassConfig>(toml_str).is_err());
    }

    #[test]
    fn validate_rejects_zero_retention() {
        let toml_str = r#"
[sink]
retained_logs = 0
"#;
        let cfg: CompassConfig = toml::from_str(toml_str).expect("config should parse");
        let err = cfg.validate().expect_err("validation should fail");
        assert!(err
            .to_string()
            .contains("sink.retained_logs must be greater than 0"));
    }

    #[test]
    fn validate_rejects_empty_question_bank_path() {
        let toml_str = r#"
[assessment]
question_bank = " "
"#;
        let cfg: CompassConfig = toml::from_str(toml_str).expect("config should parse");
        let err = cfg.validate().expect_err("validation should fail");
        assert!(err.to_string().contains("assessment.question_bank"));
    }

    #[test]
    fn validate_rejects_zero_limit() {
        let toml_str = r#"
[assessment]
limit = 0
"#;
        let cfg: CompassConfig = toml::from_str(toml_str).expect("config should parse");
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rule_shape_displays_kebab_case() {
        assert_eq!(RuleShape::ThresholdCount.to_string(), "threshold-count");
        assert_eq!(RuleShape::AverageThreshold.to_string(), "average-threshold");
    }
}
