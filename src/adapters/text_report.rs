//! Plain-text summary report.
//!
//! One block per track (category totals, assessments, each indicator's label
//! and drill-down numbers) followed by a cross-track comparison table.

use crate::domain::error::ChecklistError;
use crate::domain::evaluate::Evaluation;
use crate::domain::indicator::{Category, IndicatorOutcome};
use crate::domain::scoring::TrackBreakdown;
use crate::ports::report_port::ReportPort;
use std::fmt::Write as _;
use std::fs;

pub struct TextReportAdapter;

fn format_outcome(out: &mut String, outcome: &IndicatorOutcome) {
    let _ = writeln!(
        out,
        "    {:<28} {:>3.1}/{:<3.1} {}",
        outcome.name, outcome.score, outcome.max_score, outcome.label
    );
    if let Some(reason) = &outcome.failure {
        let _ = writeln!(out, "      ! {}", reason);
    }
    for detail in &outcome.details {
        let _ = writeln!(out, "      {:<26} {:.2}", detail.name, detail.value);
    }
}

fn format_track(out: &mut String, track: &TrackBreakdown) {
    let _ = writeln!(out, "=== {} ===", track.track_name);
    for category in Category::ALL {
        let Some(total) = track.category(category) else {
            continue;
        };
        let _ = writeln!(
            out,
            "  {:<10} {:>4.1}/{:<4.1} ({:>3.0}%)  {}",
            category.to_string(),
            total.total,
            total.max,
            total.percentage(),
            total.assessment()
        );
        for outcome in track.outcomes.iter().filter(|o| o.category == category) {
            format_outcome(out, outcome);
        }
    }
    let _ = writeln!(
        out,
        "  Total      {:>4.1}/{:<4.1}  -> recommended position {:.0}%",
        track.grand_total, track.grand_max, track.position_pct
    );
    out.push('\n');
}

fn format_comparison(out: &mut String, evaluation: &Evaluation) {
    let _ = writeln!(out, "=== Comparison ===");
    let _ = writeln!(
        out,
        "  {:<16} {:>9} {:>9} {:>9} {:>7} {:>9}",
        "Track", "Liquidity", "Sentiment", "Trend", "Total", "Position"
    );
    for track in &evaluation.tracks {
        let total = |c| track.category(c).map(|t| t.total).unwrap_or(0.0);
        let _ = writeln!(
            out,
            "  {:<16} {:>9.1} {:>9.1} {:>9.1} {:>7.1} {:>8.0}%",
            track.track_name,
            total(Category::Liquidity),
            total(Category::Sentiment),
            total(Category::Trend),
            track.grand_total,
            track.position_pct
        );
    }
}

pub fn render_text(evaluation: &Evaluation) -> String {
    let mut out = String::new();
    let month_end = evaluation
        .reference_month_end
        .map(|d| d.to_string())
        .unwrap_or_else(|| "n/a".to_string());
    let _ = writeln!(
        out,
        "Market checklist as of {} (monthly returns to {})\n",
        evaluation.as_of, month_end
    );
    for track in &evaluation.tracks {
        format_track(&mut out, track);
    }
    if evaluation.tracks.len() > 1 {
        format_comparison(&mut out, evaluation);
    }
    out
}

impl ReportPort for TextReportAdapter {
    fn write(&self, evaluation: &Evaluation, output_path: &str) -> Result<(), ChecklistError> {
        fs::write(output_path, render_text(evaluation))?;
        Ok(())
    }
}
