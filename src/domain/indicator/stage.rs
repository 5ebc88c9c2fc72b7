//! Multi-moving-average trend stage classification.
//!
//! Price and three averages of increasing length are compared in a fixed
//! order; the first matching rule wins, so exactly one stage is returned for
//! any set of defined inputs.

use crate::domain::error::ChecklistError;
use crate::domain::indicator::IndicatorOutcome;
use crate::domain::time_series::{moving_average, TimeSeries};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrendStage {
    StrongUptrend,
    EarlyUptrend,
    StrongPullback,
    OtherDowntrend,
    /// An average could not be computed.
    Error,
}

impl TrendStage {
    pub const CLASSIFIED: [TrendStage; 4] = [
        TrendStage::StrongUptrend,
        TrendStage::EarlyUptrend,
        TrendStage::StrongPullback,
        TrendStage::OtherDowntrend,
    ];

    pub fn score(&self) -> f64 {
        match self {
            TrendStage::StrongUptrend => 1.0,
            TrendStage::EarlyUptrend | TrendStage::StrongPullback => 0.5,
            TrendStage::OtherDowntrend | TrendStage::Error => 0.0,
        }
    }

    /// Parses the four selectable stages (used for manual overrides).
    pub fn parse(s: &str) -> Option<TrendStage> {
        let key: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match key.as_str() {
            "stronguptrend" => Some(TrendStage::StrongUptrend),
            "earlyuptrend" => Some(TrendStage::EarlyUptrend),
            "strongpullback" => Some(TrendStage::StrongPullback),
            "otherdowntrend" | "other" | "downtrend" => Some(TrendStage::OtherDowntrend),
            _ => None,
        }
    }
}

impl fmt::Display for TrendStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendStage::StrongUptrend => write!(f, "Strong Uptrend"),
            TrendStage::EarlyUptrend => write!(f, "Early Uptrend"),
            TrendStage::StrongPullback => write!(f, "Strong Pullback"),
            TrendStage::OtherDowntrend => write!(f, "Other/Downtrend"),
            TrendStage::Error => write!(f, "Error"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StagePeriods {
    pub short: usize,
    pub mid: usize,
    pub long: usize,
}

impl Default for StagePeriods {
    fn default() -> Self {
        Self {
            short: 50,
            mid: 150,
            long: 200,
        }
    }
}

impl StagePeriods {
    pub fn new(short: usize, mid: usize, long: usize) -> Option<Self> {
        (short > 0 && short < mid && mid < long).then_some(Self { short, mid, long })
    }
}

pub fn classify(price: f64, ma_short: f64, ma_mid: f64, ma_long: f64) -> TrendStage {
    if price > ma_short && ma_short > ma_mid && ma_mid > ma_long {
        TrendStage::StrongUptrend
    } else if price > ma_short && ma_short > ma_mid && ma_mid < ma_long {
        TrendStage::EarlyUptrend
    } else if price > ma_short && ma_short < ma_mid && ma_mid > ma_long {
        TrendStage::StrongPullback
    } else {
        TrendStage::OtherDowntrend
    }
}

struct StageInputs {
    price: f64,
    short: f64,
    mid: f64,
    long: f64,
}

fn stage_inputs(
    prices: &TimeSeries,
    periods: &StagePeriods,
) -> Result<StageInputs, ChecklistError> {
    Ok(StageInputs {
        price: prices.latest()?,
        short: moving_average(prices, periods.short)?,
        mid: moving_average(prices, periods.mid)?,
        long: moving_average(prices, periods.long)?,
    })
}

/// Classifies the latest price of `prices`. Never fails: missing averages
/// produce [`TrendStage::Error`] with score 0 and the reason attached.
///
/// `manual_override` replaces the computed stage; the computed one stays in
/// the details as its stage number.
pub fn evaluate_stage(
    prices: &TimeSeries,
    periods: &StagePeriods,
    manual_override: Option<TrendStage>,
) -> IndicatorOutcome {
    let (computed, inputs, failure) = match stage_inputs(prices, periods) {
        Ok(inputs) => (
            classify(inputs.price, inputs.short, inputs.mid, inputs.long),
            Some(inputs),
            None,
        ),
        Err(e) => (TrendStage::Error, None, Some(e.to_string())),
    };

    let stage = manual_override.unwrap_or(computed);
    let label = match manual_override {
        Some(s) if s != computed => format!("{} (manual, computed {})", s, computed),
        _ => stage.to_string(),
    };

    let mut outcome = IndicatorOutcome::scored(stage.score(), 1.0, label);
    if manual_override.is_none() {
        outcome.failure = failure;
    }
    if let Some(i) = inputs {
        outcome = outcome
            .with_detail("price", i.price)
            .with_detail(format!("MA{}", periods.short), i.short)
            .with_detail(format!("MA{}", periods.mid), i.mid)
            .with_detail(format!("MA{}", periods.long), i.long);
    }
    outcome.with_detail("computed stage", stage_number(computed))
}

fn stage_number(stage: TrendStage) -> f64 {
    match stage {
        TrendStage::StrongUptrend => 1.0,
        TrendStage::EarlyUptrend => 2.0,
        TrendStage::StrongPullback => 3.0,
        TrendStage::OtherDowntrend => 4.0,
        TrendStage::Error => 0.0,
    }
}
