//! Moving-average crossover on a single series or on the ratio of two.
//!
//! Score is 1 when the short average is strictly above the long one.

use crate::domain::error::ChecklistError;
use crate::domain::indicator::{binary, AverageKind, IndicatorOutcome, MaPeriods};
use crate::domain::time_series::{moving_average, ratio, volume_weighted_average, TimeSeries};

pub fn trailing_average(
    prices: &TimeSeries,
    volumes: Option<&TimeSeries>,
    period: usize,
    kind: AverageKind,
) -> Result<f64, ChecklistError> {
    match kind {
        AverageKind::Simple => moving_average(prices, period),
        AverageKind::VolumeWeighted => match volumes {
            Some(v) => volume_weighted_average(prices, v, period),
            None => Err(ChecklistError::InsufficientHistory {
                required: period,
                available: 0,
            }),
        },
    }
}

fn cross_outcome(
    short: f64,
    long: f64,
    periods: &MaPeriods,
    labels: (&str, &str),
) -> IndicatorOutcome {
    let positive = short > long;
    let label = if positive { labels.0 } else { labels.1 };
    IndicatorOutcome::scored(binary(positive), 1.0, label)
        .with_detail(format!("{}-period average", periods.short), short)
        .with_detail(format!("{}-period average", periods.long), long)
}

pub fn evaluate_ma_cross(
    prices: &TimeSeries,
    volumes: Option<&TimeSeries>,
    periods: &MaPeriods,
) -> Result<IndicatorOutcome, ChecklistError> {
    let short = trailing_average(prices, volumes, periods.short, periods.kind)?;
    let long = trailing_average(prices, volumes, periods.long, periods.kind)?;
    Ok(cross_outcome(short, long, periods, ("Bullish", "Bearish")))
}

/// Crossover on `numerator / denominator`, e.g. cyclical vs defensive sector
/// proxies. Always uses simple averages; a ratio has no volume.
pub fn evaluate_ratio_cross(
    numerator: &TimeSeries,
    denominator: &TimeSeries,
    periods: &MaPeriods,
) -> Result<IndicatorOutcome, ChecklistError> {
    let quotient = ratio(numerator, denominator);
    let short = moving_average(&quotient, periods.short)?;
    let long = moving_average(&quotient, periods.long)?;
    let outcome = cross_outcome(short, long, periods, ("Risk-On", "Risk-Off"));
    match quotient.latest() {
        Ok(latest) => Ok(outcome.with_detail("latest ratio", latest)),
        Err(_) => Ok(outcome),
    }
}
