use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "compass",
    version,
    about = "Psychometric self-assessment and career cluster matching CLI"
)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Answer the questionnaire interactively
    Assess(AssessCommand),
    /// Score a prepared answers file
    Score(ScoreCommand),
    /// List the question bank
    Questions(QuestionsCommand),
    /// Check the configuration, question bank and cluster rules
    Validate(ValidateCommand),
}

#[derive(Args)]
pub struct AssessCommand {
    pub path: PathBuf,
    #[arg(short, long, value_enum, default_value = "md")]
    pub format: ReportFormat,
    /// Present only the first N questions
    #[arg(long)]
    pub limit: Option<usize>,
    #[arg(long)]
    pub respondent: Option<String>,
}

#[derive(Args)]
pub struct ScoreCommand {
    pub path: PathBuf,
    /// JSON object of question id to answer
    #[arg(long)]
    pub answers: PathBuf,
    #[arg(short, long, value_enum, default_value = "md")]
    pub format: ReportFormat,
    #[arg(long)]
    pub respondent: Option<String>,
}

#[derive(Args)]
pub struct QuestionsCommand {
    pub path: PathBuf,
}

#[derive(Args)]
pub struct ValidateCommand {
    pub path: PathBuf,
}

#[derive(Clone, ValueEnum)]
pub enum ReportFormat {
    Json,
    Md,
}
