use crate::error::Result;
use crate::types::question::{
    parse_likert, Answer, Answers, Question, ResponseType, LIKERT_LABELS, SCALE_MAX, SCALE_MIN,
};
use std::io::{BufRead, Write};

/// Walks the respondent through the questionnaire and collects every answer
/// before anything is scored. Empty input skips a question; end of input
/// leaves the remaining questions unanswered.
pub fn collect_answers<R: BufRead, W: Write>(
    questions: &[Question],
    input: &mut R,
    output: &mut W,
) -> Result<Answers> {
    let mut answers = Answers::new();

    'questions: for (index, question) in questions.iter().enumerate() {
        writeln!(output)?;
        writeln!(
            output,
            "[{}/{}] {}: {}",
            index + 1,
            questions.len(),
            question.id,
            question.text
        )?;
        print_choices(question, output)?;

        loop {
            write!(output, "> ")?;
            output.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                tracing::info!(
                    remaining = questions.len() - index,
                    "input closed before the questionnaire finished"
                );
                break 'questions;
            }

            let line = line.trim();
            if line.is_empty() {
                tracing::debug!(question = %question.id, "question skipped");
                continue 'questions;
            }

            match parse_answer(question, line) {
                Some(answer) => {
                    answers.insert(question.id.clone(), answer);
                    continue 'questions;
                }
                None => writeln!(output, "{}", invalid_hint(question))?,
            }
        }
    }

    Ok(answers)
}

fn print_choices<W: Write>(question: &Question, output: &mut W) -> Result<()> {
    match question.response_type {
        ResponseType::Likert5 => {
            for (value, label) in (SCALE_MIN..=SCALE_MAX).zip(LIKERT_LABELS) {
                writeln!(output, "  {value}. {label}")?;
            }
        }
        ResponseType::Mcq => {
            for (position, option) in question.options.iter().enumerate() {
                writeln!(output, "  {}. {}", position + 1, option)?;
            }
        }
    }
    Ok(())
}

fn invalid_hint(question: &Question) -> String {
    match question.response_type {
        ResponseType::Likert5 => format!(
            "please answer {SCALE_MIN}-{SCALE_MAX} or a label such as 'agree'; leave empty to skip"
        ),
        ResponseType::Mcq => "please pick one of the listed options; leave empty to skip".into(),
    }
}

/// Parses one line of input for `question`, or `None` when it is not a valid answer.
pub fn parse_answer(question: &Question, line: &str) -> Option<Answer> {
    match question.response_type {
        ResponseType::Likert5 => parse_likert(line).map(|value| Answer::Scale(i64::from(value))),
        ResponseType::Mcq => parse_choice(&question.options, line).map(Answer::Text),
    }
}

fn parse_choice(options: &[String], line: &str) -> Option<String> {
    // Free text when the question offers no fixed options.
    if options.is_empty() {
        return Some(line.to_string());
    }
    if let Ok(position) = line.parse::<usize>() {
        return position
            .checked_sub(1)
            .and_then(|index| options.get(index))
            .cloned();
    }
    options
        .iter()
        .find(|option| option.eq_ignore_ascii_case(line))
        .cloned()
}
