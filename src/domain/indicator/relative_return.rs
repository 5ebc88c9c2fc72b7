//! Relative-return comparison: a risk asset's blended multi-horizon return
//! against the return from rolling a short-term bill at its quoted yield.

use crate::domain::error::ChecklistError;
use crate::domain::indicator::{binary, IndicatorOutcome};
use crate::domain::returns::{
    compounded_yield_return, monthly_return, weighted_blend, BlendWeights, Horizons,
};
use crate::domain::time_series::TimeSeries;
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendedReturns {
    pub returns: [f64; 3],
    pub blended: f64,
}

impl BlendedReturns {
    pub fn new(returns: [f64; 3], weights: &BlendWeights) -> Self {
        Self {
            returns,
            blended: weighted_blend(returns[0], returns[1], returns[2], weights),
        }
    }
}

pub fn blended_price_returns(
    prices: &TimeSeries,
    horizons: &Horizons,
    weights: &BlendWeights,
    reference_date: NaiveDate,
) -> Result<BlendedReturns, ChecklistError> {
    let [a, b, c] = horizons.as_array();
    let returns = [
        monthly_return(prices, a, reference_date)?,
        monthly_return(prices, b, reference_date)?,
        monthly_return(prices, c, reference_date)?,
    ];
    Ok(BlendedReturns::new(returns, weights))
}

pub fn blended_yield_returns(
    yields: &TimeSeries,
    horizons: &Horizons,
    weights: &BlendWeights,
    reference_date: NaiveDate,
) -> Result<BlendedReturns, ChecklistError> {
    let [a, b, c] = horizons.as_array();
    let returns = [
        compounded_yield_return(yields, a, reference_date)?,
        compounded_yield_return(yields, b, reference_date)?,
        compounded_yield_return(yields, c, reference_date)?,
    ];
    Ok(BlendedReturns::new(returns, weights))
}

/// 1 if the risk asset's blend beats the reference blend, else 0.
pub fn score_relative_return(
    risk: &BlendedReturns,
    reference: &BlendedReturns,
    horizons: &Horizons,
) -> IndicatorOutcome {
    let positive = risk.blended > reference.blended;
    let label = if positive {
        "Outperforming"
    } else {
        "Underperforming"
    };
    let [a, b, c] = horizons.as_array();

    IndicatorOutcome::scored(binary(positive), 1.0, label)
        .with_detail(format!("asset {a}m %"), risk.returns[0])
        .with_detail(format!("asset {b}m %"), risk.returns[1])
        .with_detail(format!("asset {c}m %"), risk.returns[2])
        .with_detail("asset blended %", risk.blended)
        .with_detail(format!("reference {a}m %"), reference.returns[0])
        .with_detail(format!("reference {b}m %"), reference.returns[1])
        .with_detail(format!("reference {c}m %"), reference.returns[2])
        .with_detail("reference blended %", reference.blended)
}

pub fn evaluate_relative_return(
    prices: &TimeSeries,
    yields: &TimeSeries,
    horizons: &Horizons,
    weights: &BlendWeights,
    reference_date: NaiveDate,
) -> Result<IndicatorOutcome, ChecklistError> {
    let risk = blended_price_returns(prices, horizons, weights, reference_date)?;
    let reference = blended_yield_returns(yields, horizons, weights, reference_date)?;
    Ok(score_relative_return(&risk, &reference, horizons))
}
