//! Month-end anchored returns and three-horizon blending.

use crate::domain::calendar::month_end_offset;
use crate::domain::error::ChecklistError;
use crate::domain::time_series::{value_as_of, TimeSeries};
use chrono::NaiveDate;

const WEIGHT_TOLERANCE: f64 = 1e-9;

/// Month end `months_back` months before the month of `reference_date`.
fn anchor(reference_date: NaiveDate, months_back: u32) -> Result<NaiveDate, ChecklistError> {
    i32::try_from(months_back)
        .ok()
        .and_then(|m| month_end_offset(reference_date, -m))
        .ok_or(ChecklistError::MissingAnchorDate {
            date: reference_date,
        })
}

/// Percentage return from the month end `months_back` months before the
/// reference month to the reference month end.
pub fn monthly_return(
    series: &TimeSeries,
    months_back: u32,
    reference_date: NaiveDate,
) -> Result<f64, ChecklistError> {
    let end = value_as_of(series, anchor(reference_date, 0)?)?;
    let start = value_as_of(series, anchor(reference_date, months_back)?)?;
    if start == 0.0 {
        return Err(ChecklistError::InvalidSeries {
            reason: "zero price at return anchor".into(),
        });
    }
    Ok((end / start - 1.0) * 100.0)
}

/// Percentage return from reinvesting at an annualized rate each month for
/// `months_back` months, walking back from the reference month.
///
/// `yields` holds annualized percentage rates (5.25 means 5.25%/yr).
pub fn compounded_yield_return(
    yields: &TimeSeries,
    months_back: u32,
    reference_date: NaiveDate,
) -> Result<f64, ChecklistError> {
    let mut growth = 1.0;
    for i in 0..months_back {
        let annual = value_as_of(yields, anchor(reference_date, i)?)?;
        growth *= 1.0 + annual / 12.0 / 100.0;
    }
    Ok((growth - 1.0) * 100.0)
}

/// Horizons, in months, for the three blended returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Horizons {
    pub short: u32,
    pub mid: u32,
    pub long: u32,
}

impl Default for Horizons {
    fn default() -> Self {
        Self {
            short: 3,
            mid: 6,
            long: 11,
        }
    }
}

impl Horizons {
    pub fn as_array(&self) -> [u32; 3] {
        [self.short, self.mid, self.long]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendWeights {
    short: f64,
    mid: f64,
    long: f64,
}

impl BlendWeights {
    pub fn new(short: f64, mid: f64, long: f64) -> Result<Self, ChecklistError> {
        let sum = short + mid + long;
        if !sum.is_finite() || (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(ChecklistError::InvalidWeights { sum });
        }
        Ok(Self { short, mid, long })
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.short, self.mid, self.long]
    }
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self {
            short: 0.33,
            mid: 0.33,
            long: 0.34,
        }
    }
}

pub fn weighted_blend(short: f64, mid: f64, long: f64, weights: &BlendWeights) -> f64 {
    short * weights.short + mid * weights.mid + long * weights.long
}
