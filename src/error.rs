use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompassError {
    #[error("path does not exist: {0}")]
    PathNotFound(String),

    #[error("config parse error: {0}")]
    ConfigParse(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("question bank error: {0}")]
    QuestionBank(String),

    #[error("invalid answer for {question}: {reason}")]
    InvalidAnswer { question: String, reason: String },

    #[error("result sink error: {0}")]
    Sink(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CompassError {
    /// Errors caused by the static assessment setup rather than by the run.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::ConfigParse(_) | Self::QuestionBank(_) | Self::Toml(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CompassError>;
