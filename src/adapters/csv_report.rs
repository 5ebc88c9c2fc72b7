//! CSV report: one row per track and indicator.

use crate::domain::error::ChecklistError;
use crate::domain::evaluate::Evaluation;
use crate::ports::report_port::ReportPort;
use std::io;

pub struct CsvReportAdapter;

const HEADER: [&str; 12] = [
    "as_of",
    "track_id",
    "track",
    "category",
    "indicator_id",
    "indicator",
    "score",
    "max_score",
    "label",
    "failure",
    "track_total",
    "position_pct",
];

fn csv_error(e: csv::Error) -> ChecklistError {
    ChecklistError::Data {
        reason: format!("CSV write error: {}", e),
    }
}

pub fn write_csv<W: io::Write>(evaluation: &Evaluation, writer: W) -> Result<(), ChecklistError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER).map_err(csv_error)?;

    let as_of = evaluation.as_of.to_string();
    for track in &evaluation.tracks {
        let track_total = format!("{:.2}", track.grand_total);
        let position = format!("{:.1}", track.position_pct);
        for outcome in &track.outcomes {
            let category = outcome.category.to_string();
            let score = format!("{:.2}", outcome.score);
            let max_score = format!("{:.2}", outcome.max_score);
            wtr.write_record([
                as_of.as_str(),
                track.track_id.as_str(),
                track.track_name.as_str(),
                category.as_str(),
                outcome.id.as_str(),
                outcome.name.as_str(),
                score.as_str(),
                max_score.as_str(),
                outcome.label.as_str(),
                outcome.failure.as_deref().unwrap_or_default(),
                track_total.as_str(),
                position.as_str(),
            ])
            .map_err(csv_error)?;
        }
    }
    wtr.flush()?;
    Ok(())
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, evaluation: &Evaluation, output_path: &str) -> Result<(), ChecklistError> {
        let file = std::fs::File::create(output_path)?;
        write_csv(evaluation, file)
    }
}
