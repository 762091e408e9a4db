use crate::error::{CompassError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Highest value on the Likert-5 scale.
pub const SCALE_MAX: u8 = 5;
/// Lowest value on the Likert-5 scale.
pub const SCALE_MIN: u8 = 1;

pub const LIKERT_LABELS: [&str; 5] = [
    "Strongly Disagree",
    "Disagree",
    "Neutral",
    "Agree",
    "Strongly Agree",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum ResponseType {
    #[default]
    #[serde(rename = "likert-5")]
    Likert5,
    #[serde(rename = "mcq")]
    Mcq,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DomainWeight {
    pub name: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    #[serde(default, alias = "responseType")]
    pub response_type: ResponseType,
    #[serde(default)]
    pub domains: Vec<DomainWeight>,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub options: Vec<String>,
}

fn default_weight() -> f64 {
    1.0
}

impl Question {
    #[cfg(test)]
    pub fn likert(id: &str, text: &str, domains: &[(&str, f64)]) -> Self {
        Self {
            id: id.to_string(),
            text: text.to_string(),
            response_type: ResponseType::Likert5,
            domains: domains
                .iter()
                .map(|(name, weight)| DomainWeight {
                    name: name.to_string(),
                    weight: *weight,
                })
                .collect(),
            weight: default_weight(),
            options: Vec::new(),
        }
    }

    /// Weight a single domain entry carries once the question's own weight is applied.
    pub fn effective_weight(&self, domain: &DomainWeight) -> f64 {
        self.weight * domain.weight
    }
}

/// A raw answer as collected from the respondent.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Answer {
    Scale(i64),
    Text(String),
}

pub type Answers = BTreeMap<String, Answer>;

/// Parses a Likert answer given as a number or as one of the scale labels.
pub fn parse_likert(line: &str) -> Option<u8> {
    if let Ok(value) = line.trim().parse::<u8>() {
        return (SCALE_MIN..=SCALE_MAX).contains(&value).then_some(value);
    }
    let wanted = normalize_label(line);
    LIKERT_LABELS
        .iter()
        .position(|label| normalize_label(label) == wanted)
        .map(|position| SCALE_MIN + position as u8)
}

fn normalize_label(label: &str) -> String {
    label
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Resolves raw answers into the numeric scale input the normalizer accepts.
///
/// Likert questions take a number or a scale label; anything else is an
/// `InvalidAnswer`. Choice questions must be answered with text and are not
/// scored.
pub fn scale_answers(questions: &[Question], answers: &Answers) -> Result<BTreeMap<String, i64>> {
    let mut numeric = BTreeMap::new();
    for (id, answer) in answers {
        let Some(question) = questions.iter().find(|question| &question.id == id) else {
            // Unknown ids are left for the normalizer to report.
            if let Answer::Scale(value) = answer {
                numeric.insert(id.clone(), *value);
            } else {
                tracing::warn!(question = %id, "answer references unknown question; ignored");
            }
            continue;
        };

        match (question.response_type, answer) {
            (ResponseType::Likert5, Answer::Scale(value)) => {
                numeric.insert(id.clone(), *value);
            }
            (ResponseType::Likert5, Answer::Text(text)) => {
                let value = parse_likert(text).ok_or_else(|| CompassError::InvalidAnswer {
                    question: id.clone(),
                    reason: format!("'{text}' is not a {SCALE_MIN}-{SCALE_MAX} scale answer"),
                })?;
                numeric.insert(id.clone(), i64::from(value));
            }
            (ResponseType::Mcq, Answer::Scale(value)) => {
                return Err(CompassError::InvalidAnswer {
                    question: id.clone(),
                    reason: format!("choice questions take text, got {value}"),
                });
            }
            (ResponseType::Mcq, Answer::Text(_)) => {
                tracing::debug!(question = %id, "choice answer kept out of scoring");
            }
        }
    }
    Ok(numeric)
}

/// Reads a submitted answers file: a JSON object of question id to answer.
pub fn load_answers(path: &Path) -> Result<Answers> {
    if !path.exists() {
        return Err(CompassError::PathNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    let answers: Answers = serde_json::from_str(&content)?;
    tracing::debug!(path = %path.display(), answers = answers.len(), "loaded answers");
    Ok(answers)
}

#[derive(Debug, Clone)]
pub struct QuestionBank {
    pub questions: Vec<Question>,
    pub digest: String,
}

impl QuestionBank {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CompassError::PathNotFound(path.display().to_string()));
        }
        let bytes = std::fs::read(path)?;
        let questions: Vec<Question> = serde_json::from_slice(&bytes).map_err(|e| {
            CompassError::QuestionBank(format!("{}: {}", path.display(), e))
        })?;
        let bank = Self::from_questions(questions, sha256_hex(&bytes))?;
        tracing::info!(
            path = %path.display(),
            questions = bank.questions.len(),
            "loaded question bank"
        );
        Ok(bank)
    }

    pub fn from_questions(questions: Vec<Question>, digest: String) -> Result<Self> {
        validate_questions(&questions)?;
        Ok(Self { questions, digest })
    }

    /// Questions in presentation order, optionally capped.
    pub fn presented(&self, limit: Option<usize>) -> &[Question] {
        let end = limit
            .map(|limit| limit.min(self.questions.len()))
            .unwrap_or(self.questions.len());
        &self.questions[..end]
    }

    /// Distinct domain names in first-seen order.
    pub fn domains(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.questions
            .iter()
            .flat_map(|question| question.domains.iter())
            .map(|domain| domain.name.as_str())
            .filter(|name| seen.insert(*name))
            .collect()
    }
}

fn validate_questions(questions: &[Question]) -> Result<()> {
    let mut ids = HashSet::new();
    for question in questions {
        let id = question.id.trim();
        if id.is_empty() {
            return Err(CompassError::QuestionBank(
                "question ids must be non-empty".to_string(),
            ));
        }
        if !ids.insert(id) {
            return Err(CompassError::QuestionBank(format!(
                "duplicate question id: {id}"
            )));
        }
        if !question.weight.is_finite() || question.weight <= 0.0 {
            return Err(CompassError::QuestionBank(format!(
                "question {id} has invalid weight {}",
                question.weight
            )));
        }
        for domain in &question.domains {
            if domain.name.trim().is_empty() {
                return Err(CompassError::QuestionBank(format!(
                    "question {id} declares a domain with an empty name"
                )));
            }
            if !domain.weight.is_finite() || domain.weight <= 0.0 {
                return Err(CompassError::QuestionBank(format!(
                    "question {id} has invalid weight {} for domain {}",
                    domain.weight, domain.name
                )));
            }
        }
        if matches!(question.response_type, ResponseType::Likert5) && !question.options.is_empty()
        {
            return Err(CompassError::QuestionBank(format!(
                "question {id} is likert-5 and cannot declare options"
            )));
        }
    }
    Ok(())
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    format!("{digest:x}")
}
