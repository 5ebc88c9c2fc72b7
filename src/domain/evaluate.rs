//! One checklist evaluation over a static snapshot.
//!
//! [`evaluate`] is pure: the same checklist, snapshot, inputs and date always
//! produce the same [`Evaluation`]. Indicator failures are contained; each
//! failing indicator scores 0 and carries its reason, nothing else changes.

use crate::domain::calendar::latest_completed_month_end;
use crate::domain::checklist::{Checklist, IndicatorDef, IndicatorSpec};
use crate::domain::error::ChecklistError;
use crate::domain::indicator::ma_cross::{evaluate_ma_cross, evaluate_ratio_cross};
use crate::domain::indicator::relative_return::evaluate_relative_return;
use crate::domain::indicator::stage::evaluate_stage;
use crate::domain::indicator::threshold::{breadth, surprise_momentum, BreadthSource};
use crate::domain::indicator::{manual, Category, IndicatorOutcome};
use crate::domain::manual_input::{ManualInputs, TrackInputs};
use crate::domain::scoring::TrackBreakdown;
use crate::domain::snapshot::MarketSnapshot;
use crate::domain::time_series::TimeSeries;
use chrono::NaiveDate;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub as_of: NaiveDate,
    /// Month end used to anchor monthly returns; `None` when `as_of` is too
    /// close to the start of the calendar to have one.
    pub reference_month_end: Option<NaiveDate>,
    pub tracks: Vec<TrackBreakdown>,
}

impl Evaluation {
    pub fn track(&self, id: &str) -> Option<&TrackBreakdown> {
        self.tracks.iter().find(|t| t.track_id == id)
    }
}

struct Context<'a> {
    checklist: &'a Checklist,
    snapshot: &'a MarketSnapshot,
    inputs: &'a ManualInputs,
    as_of: NaiveDate,
    reference_month_end: Option<NaiveDate>,
}

impl Context<'_> {
    /// Close series for `symbol` cut at the evaluation date.
    fn close(&self, symbol: &str) -> Result<TimeSeries, ChecklistError> {
        Ok(self.snapshot.close(symbol)?.truncated_at(self.as_of))
    }

    fn volume(&self, symbol: &str) -> Option<TimeSeries> {
        self.snapshot.volume(symbol).map(|v| v.truncated_at(self.as_of))
    }

    fn reference_month_end(&self) -> Result<NaiveDate, ChecklistError> {
        self.reference_month_end
            .ok_or(ChecklistError::MissingAnchorDate { date: self.as_of })
    }
}

fn compute(
    def: &IndicatorDef,
    ctx: &Context<'_>,
    track: &TrackInputs,
) -> Result<IndicatorOutcome, ChecklistError> {
    match &def.spec {
        IndicatorSpec::RelativeReturn { asset, bill_yield } => evaluate_relative_return(
            &ctx.close(asset.symbol())?,
            &ctx.close(bill_yield.symbol())?,
            &ctx.checklist.horizons,
            &ctx.checklist.weights,
            ctx.reference_month_end()?,
        ),
        IndicatorSpec::MaCross {
            instrument,
            periods,
        } => {
            let volumes = ctx.volume(instrument.symbol());
            evaluate_ma_cross(&ctx.close(instrument.symbol())?, volumes.as_ref(), periods)
        }
        IndicatorSpec::RatioCross {
            numerator,
            denominator,
            periods,
        } => evaluate_ratio_cross(
            &ctx.close(numerator.symbol())?,
            &ctx.close(denominator.symbol())?,
            periods,
        ),
        IndicatorSpec::SurpriseMomentum { threshold } => Ok(surprise_momentum(
            ctx.inputs.surprise_current,
            ctx.inputs.surprise_previous,
            *threshold,
        )),
        IndicatorSpec::Breadth {
            instrument,
            threshold,
        } => {
            let fetched = instrument
                .as_ref()
                .and_then(|i| ctx.close(i.symbol()).ok())
                .and_then(|s| s.latest().ok());
            Ok(match fetched {
                Some(value) => breadth(value, *threshold, BreadthSource::Series),
                None => breadth(ctx.inputs.breadth_pct, *threshold, BreadthSource::Manual),
            })
        }
        IndicatorSpec::Stage {
            instrument,
            periods,
        } => match ctx.close(instrument.symbol()) {
            Ok(prices) => Ok(evaluate_stage(&prices, periods, track.stage_override)),
            Err(e) => {
                let mut outcome =
                    evaluate_stage(&TimeSeries::default(), periods, track.stage_override);
                if outcome.failure.is_some() {
                    outcome.failure = Some(e.to_string());
                }
                Ok(outcome)
            }
        },
        IndicatorSpec::TrendStatus => Ok(manual::trend_status(ctx.inputs.trend_status)),
        IndicatorSpec::MomentumStage => Ok(manual::momentum_stage(track.momentum_stage)),
    }
}

fn evaluate_indicator(
    def: &IndicatorDef,
    ctx: &Context<'_>,
    track: &TrackInputs,
) -> IndicatorOutcome {
    let mut outcome = match compute(def, ctx, track) {
        Ok(outcome) => outcome,
        Err(e) => IndicatorOutcome::insufficient(def.spec.max_score(), e.to_string()),
    };
    outcome.id = def.id.clone();
    outcome.name = def.name.clone();
    outcome.category = def.category;

    match &outcome.failure {
        Some(reason) => log::warn!("{}: {} ({})", def.id, outcome.label, reason),
        None => log::debug!("{}: {} -> {}", def.id, outcome.label, outcome.score),
    }
    outcome
}

/// Evaluate every track of `checklist`. Shared indicators are computed once
/// and cloned into each track.
pub fn evaluate(
    checklist: &Checklist,
    snapshot: &MarketSnapshot,
    inputs: &ManualInputs,
    as_of: NaiveDate,
) -> Evaluation {
    let ctx = Context {
        checklist,
        snapshot,
        inputs,
        as_of,
        reference_month_end: latest_completed_month_end(as_of),
    };

    let shared: HashMap<&str, IndicatorOutcome> = checklist
        .indicators()
        .iter()
        .filter(|d| checklist.is_shared(&d.id))
        .map(|d| (d.id.as_str(), evaluate_indicator(d, &ctx, &TrackInputs::default())))
        .collect();

    let maxima: Vec<(Category, f64)> = Category::ALL
        .iter()
        .map(|&c| (c, checklist.category_max(c)))
        .collect();

    let tracks = checklist
        .tracks()
        .iter()
        .map(|track| {
            let track_inputs = inputs.track(&track.id);
            let outcomes = checklist
                .indicators()
                .iter()
                .map(|base| match shared.get(base.id.as_str()) {
                    Some(outcome) => outcome.clone(),
                    None => {
                        let def = track.override_for(&base.id).unwrap_or(base);
                        evaluate_indicator(def, &ctx, &track_inputs)
                    }
                })
                .collect();
            let breakdown = TrackBreakdown::build(&track.id, &track.name, &maxima, outcomes);
            log::info!(
                "{}: {:.1}/{} -> {:.0}% position",
                track.name,
                breakdown.grand_total,
                breakdown.grand_max,
                breakdown.position_pct
            );
            breakdown
        })
        .collect();

    Evaluation {
        as_of,
        reference_month_end: ctx.reference_month_end,
        tracks,
    }
}
