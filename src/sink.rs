use crate::config::resolve_path;
use crate::error::CompassError;
use crate::types::config::{CompassConfig, RuleShape, SinkSettings};
use crate::types::question::Answers;
use crate::types::report::AssessmentReport;
use crate::types::scoring::{ClusterMatch, DomainScores};
use chrono::Utc;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// One logged submission: the raw answers plus what they scored.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionRecord {
    pub timestamp: String,
    pub respondent: Option<String>,
    pub bank_digest: String,
    pub rule_shape: RuleShape,
    pub answers: Answers,
    pub scores: DomainScores,
    pub matches: Vec<ClusterMatch>,
}

impl SubmissionRecord {
    pub fn new(
        respondent: Option<&str>,
        bank_digest: &str,
        answers: &Answers,
        report: &AssessmentReport,
    ) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            respondent: respondent.map(str::to_string),
            bank_digest: bank_digest.to_string(),
            rule_shape: report.rule_shape,
            answers: answers.clone(),
            scores: report.scores.clone(),
            matches: report.matches.clone(),
        }
    }
}

/// Where finished submissions go. Owned by the shell, never by the scoring core.
pub trait ResultSink {
    fn record(&mut self, record: &SubmissionRecord) -> Result<(), CompassError>;
}

pub struct NullSink;

impl ResultSink for NullSink {
    fn record(&mut self, _record: &SubmissionRecord) -> Result<(), CompassError> {
        Ok(())
    }
}

/// Appends submissions as JSON lines, rotating the log once it grows too large.
pub struct FileSink {
    path: PathBuf,
    max_log_size_kb: u64,
    retained_logs: usize,
}

impl FileSink {
    pub fn new(root: &Path, settings: &SinkSettings) -> Self {
        Self {
            path: resolve_path(root, &settings.response_log),
            max_log_size_kb: settings.max_log_size_kb.max(1),
            retained_logs: settings.retained_logs.max(1),
        }
    }

    fn rotate_if_needed(&self) -> Result<(), CompassError> {
        let max_bytes = self.max_log_size_kb * 1024;
        let metadata = match std::fs::metadata(&self.path) {
            Ok(metadata) => metadata,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(error) => return Err(CompassError::Io(error)),
        };

        if metadata.len() <= max_bytes {
            return Ok(());
        }

        let parent = self.path.parent().unwrap_or_else(|| Path::new("."));
        let stem = self
            .path
            .file_stem()
            .and_then(|value| value.to_str())
            .unwrap_or("responses");
        let extension = self
            .path
            .extension()
            .and_then(|value| value.to_str())
            .unwrap_or("jsonl");
        let stamp = Utc::now().format("%Y%m%dT%H%M%S%.9fZ");
        let rotated = parent.join(format!("{stem}-{stamp}.{extension}"));
        std::fs::rename(&self.path, &rotated).map_err(CompassError::Io)?;
        tracing::info!(rotated = %rotated.display(), "rotated response log");
        self.prune_rotated_logs(parent, stem, extension)
    }

    fn prune_rotated_logs(
        &self,
        parent: &Path,
        stem: &str,
        extension: &str,
    ) -> Result<(), CompassError> {
        let prefix = format!("{stem}-");
        let suffix = format!(".{extension}");
        let mut rotated = std::fs::read_dir(parent)
            .map_err(CompassError::Io)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                path.file_name()
                    .and_then(|value| value.to_str())
                    .map(|name| name.starts_with(&prefix) && name.ends_with(&suffix))
                    .unwrap_or(false)
            })
            .collect::<Vec<_>>();

        rotated.sort();
        while rotated.len() > self.retained_logs {
            let stale = rotated.remove(0);
            std::fs::remove_file(stale).map_err(CompassError::Io)?;
        }
        Ok(())
    }
}

impl ResultSink for FileSink {
    fn record(&mut self, record: &SubmissionRecord) -> Result<(), CompassError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(CompassError::Io)?;
        }

        let line = serde_json::to_string(record)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| CompassError::Sink(format!("{}: {}", self.path.display(), e)))?;
        writeln!(file, "{line}").map_err(CompassError::Io)?;
        file.flush().map_err(CompassError::Io)?;
        tracing::debug!(path = %self.path.display(), "recorded submission");

        self.rotate_if_needed()
    }
}

pub fn from_config(root: &Path, config: &CompassConfig) -> Box<dyn ResultSink> {
    let settings = config.sink_settings();
    if settings.enabled {
        Box::new(FileSink::new(root, &settings))
    } else {
        Box::new(NullSink)
    }
}
