mod assess;
mod cli;
mod config;
mod error;
mod report;
mod session;
mod sink;
mod types;

use crate::assess::Assessment;
use crate::error::CompassError;
use crate::types::question::{Answers, ResponseType};
use clap::Parser;
use std::io::Write;
use std::path::Path;
use tracing_subscriber::EnvFilter;

pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const NO_MATCH: i32 = 1;
    pub const CONFIGURATION: i32 = 2;
    pub const RUNTIME_FAILURE: i32 = 3;
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_assessment(path: &Path) -> Result<Assessment, CompassError> {
    if !path.exists() {
        return Err(CompassError::PathNotFound(path.display().to_string()));
    }
    let assessment = Assessment::load(path)?;
    if !assessment.has_config_file {
        eprintln!("warning: no compass.toml found in {}", path.display());
    }
    Ok(assessment)
}

/// Renders the result first, then hands it to the sink. A failing sink is
/// reported but never changes what was shown or the exit code.
fn finish(
    assessment: &Assessment,
    answers: &Answers,
    format: &cli::ReportFormat,
    respondent: Option<&str>,
) -> Result<i32, CompassError> {
    let assessment_report = assessment.evaluate(answers)?;

    let output_format = match format {
        cli::ReportFormat::Json => report::OutputFormat::Json,
        cli::ReportFormat::Md => report::OutputFormat::Md,
    };
    let rendered = report::render(&assessment_report, output_format)?;
    println!("{rendered}");

    let record = sink::SubmissionRecord::new(
        respondent,
        &assessment.bank.digest,
        answers,
        &assessment_report,
    );
    let mut result_sink = sink::from_config(&assessment.root, &assessment.config);
    if let Err(e) = result_sink.record(&record) {
        tracing::warn!(error = %e, "failed to record submission");
        eprintln!("warning: submission was not logged: {e}");
    }

    if assessment_report.has_match() {
        Ok(exit_code::SUCCESS)
    } else {
        Ok(exit_code::NO_MATCH)
    }
}

fn run(cli: cli::Cli) -> Result<i32, CompassError> {
    match cli.command {
        cli::Commands::Assess(cmd) => {
            let assessment = load_assessment(&cmd.path)?;
            let questions = assessment
                .bank
                .presented(assessment.limit(cmd.limit));

            // JSON reports own stdout; the questionnaire goes to stderr instead.
            let mut prompts: Box<dyn Write> = match cmd.format {
                cli::ReportFormat::Json => Box::new(std::io::stderr().lock()),
                cli::ReportFormat::Md => Box::new(std::io::stdout().lock()),
            };
            writeln!(prompts, "# {}", assessment.config.assessment.title)?;
            writeln!(
                prompts,
                "Please respond to the following items (leave empty to skip)."
            )?;

            let stdin = std::io::stdin();
            let answers = session::collect_answers(questions, &mut stdin.lock(), &mut prompts)?;
            writeln!(prompts)?;
            drop(prompts);

            finish(
                &assessment,
                &answers,
                &cmd.format,
                cmd.respondent.as_deref(),
            )
        }
        cli::Commands::Score(cmd) => {
            let assessment = load_assessment(&cmd.path)?;
            let answers = types::question::load_answers(&cmd.answers)?;
            finish(
                &assessment,
                &answers,
                &cmd.format,
                cmd.respondent.as_deref(),
            )
        }
        cli::Commands::Questions(cmd) => {
            let assessment = load_assessment(&cmd.path)?;
            for question in &assessment.bank.questions {
                let kind = match question.response_type {
                    ResponseType::Likert5 => "likert-5",
                    ResponseType::Mcq => "mcq",
                };
                let domains = question
                    .domains
                    .iter()
                    .map(|domain| format!("{}:{}", domain.name, domain.weight))
                    .collect::<Vec<_>>();
                println!(
                    "{} [{}] {} ({})",
                    question.id,
                    kind,
                    question.text,
                    if domains.is_empty() {
                        "unscored".to_string()
                    } else {
                        domains.join(", ")
                    }
                );
            }
            Ok(exit_code::SUCCESS)
        }
        cli::Commands::Validate(cmd) => {
            let assessment = load_assessment(&cmd.path)?;
            assessment.check()?;
            println!(
                "valid: {} questions, {} domains, {} clusters ({})",
                assessment.bank.questions.len(),
                assessment.bank.domains().len(),
                assessment.rules.clusters.len(),
                assessment.config.assessment.rule_shape
            );
            Ok(exit_code::SUCCESS)
        }
    }
}

fn main() {
    let cli = cli::Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
        }
        Err(e) => {
            eprintln!("error: {}", e);
            if e.is_configuration() {
                std::process::exit(exit_code::CONFIGURATION);
            }
            std::process::exit(exit_code::RUNTIME_FAILURE);
        }
    }
}
