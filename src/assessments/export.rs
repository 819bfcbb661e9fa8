//! CSV scorecard rendering for download links and the command line.

use std::io::Write;

use super::domain::{Assessment, SectionType};
use super::scoring::{self, RatingTier};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("scorecard rendering failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("scorecard produced invalid utf-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Write the per-section scorecard, one row per catalog section plus an
/// overall row. Sections not yet saved render with zero scores so every
/// export carries the full catalog shape.
pub fn write_scorecard<W: Write>(assessment: &Assessment, writer: W) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["section", "label", "score", "max_score", "completed"])?;

    for section_type in SectionType::ordered() {
        let (score, max_score, completed) = match assessment.sections.get(&section_type) {
            Some(section) => (section.score, section.max_score, section.completed),
            None => (0, scoring::section_max_score(section_type), false),
        };
        csv_writer.write_record([
            section_type.key().to_string(),
            section_type.label().to_string(),
            score.to_string(),
            max_score.to_string(),
            completed.to_string(),
        ])?;
    }

    let rating = RatingTier::for_score(assessment.overall_score);
    csv_writer.write_record([
        "overall".to_string(),
        rating.label().to_string(),
        assessment.overall_score.to_string(),
        assessment.max_possible_score.to_string(),
        (assessment.completed_sections == assessment.total_sections).to_string(),
    ])?;

    csv_writer.flush()?;
    Ok(())
}

/// Render the scorecard into a string for HTTP responses.
pub fn scorecard_csv(assessment: &Assessment) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    write_scorecard(assessment, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}
