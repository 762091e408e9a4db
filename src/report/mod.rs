pub mod json;
pub mod md;

use crate::error::CompassError;
use crate::types::report::AssessmentReport;

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Json,
    Md,
}

pub fn render(report: &AssessmentReport, format: OutputFormat) -> Result<String, CompassError> {
    match format {
        OutputFormat::Json => json::to_json(report).map_err(CompassError::Json),
        OutputFormat::Md => Ok(md::to_markdown(report)),
    }
}
