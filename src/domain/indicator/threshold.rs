//! Level-threshold indicators.
//!
//! `surprise_momentum` splits its point in two halves: one for the level
//! being above the threshold, one for positive month-over-month change.
//! `breadth` awards the full point when the share of stocks above their
//! 50-day average exceeds the threshold.

use crate::domain::indicator::{binary, IndicatorOutcome};

pub const SURPRISE_THRESHOLD: f64 = 0.0;
pub const BREADTH_THRESHOLD: f64 = 50.0;

/// `(current - prior) / |prior| * 100`, defined as 0 when `prior` is 0.
pub fn month_over_month_pct(current: f64, prior: f64) -> f64 {
    if prior == 0.0 {
        0.0
    } else {
        (current - prior) / prior.abs() * 100.0
    }
}

pub fn surprise_momentum(current: f64, prior: f64, threshold: f64) -> IndicatorOutcome {
    let level_score = if current > threshold { 0.5 } else { 0.0 };
    let mom = month_over_month_pct(current, prior);
    let momentum_score = if mom > 0.0 { 0.5 } else { 0.0 };

    let label = match (level_score > 0.0, momentum_score > 0.0) {
        (true, true) => "Above threshold, improving",
        (true, false) => "Above threshold, not improving",
        (false, true) => "Below threshold, improving",
        (false, false) => "Below threshold, not improving",
    };

    IndicatorOutcome::scored(level_score + momentum_score, 1.0, label)
        .with_detail("current", current)
        .with_detail("previous", prior)
        .with_detail("month-over-month %", mom)
        .with_detail("level points", level_score)
        .with_detail("momentum points", momentum_score)
}

/// Where a breadth reading came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreadthSource {
    Series,
    Manual,
}

pub fn breadth(value: f64, threshold: f64, source: BreadthSource) -> IndicatorOutcome {
    let positive = value > threshold;
    let label = match (positive, source) {
        (true, BreadthSource::Series) => "Bullish",
        (false, BreadthSource::Series) => "Bearish",
        (true, BreadthSource::Manual) => "Bullish (manual)",
        (false, BreadthSource::Manual) => "Bearish (manual)",
    };
    IndicatorOutcome::scored(binary(positive), 1.0, label)
        .with_detail("% above 50-day MA", value)
        .with_detail("threshold", threshold)
}
