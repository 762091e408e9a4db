use crate::types::report::AssessmentReport;

pub const NO_MATCH_MESSAGE: &str = "No matching career cluster for these answers.";

pub fn to_markdown(report: &AssessmentReport) -> String {
    let mut output = String::new();
    output.push_str(&format!("# {}\n\n", report.title));
    output.push_str(&format!(
        "Answered {} of {} questions.\n\n",
        report.answered, report.total_questions
    ));

    output.push_str("## Your Normalized Trait Scores\n\n");
    if report.scores.is_empty() {
        output.push_str("- none\n\n");
    } else {
        for (domain, score) in &report.scores {
            output.push_str(&format!("- {domain}: {score:.2}\n"));
        }
        output.push('\n');
    }

    output.push_str("## Top Career Cluster Matches\n\n");
    if report.matches.is_empty() {
        output.push_str(&format!("{NO_MATCH_MESSAGE}\n"));
    } else {
        for cluster_match in &report.matches {
            output.push_str(&format!(
                "- **{}**: {:.2}% match\n",
                cluster_match.cluster, cluster_match.fit
            ));
        }
    }

    output
}
