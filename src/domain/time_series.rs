//! Date-indexed numeric series and the trailing-window helpers built on it.
//!
//! A [`TimeSeries`] holds one observation per date in strictly increasing
//! order. Gaps (weekends, holidays, month-only sampling) are allowed; lookups
//! resolve to the latest observation at or before the requested date.

use crate::domain::error::ChecklistError;
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimeSeries {
    points: Vec<Observation>,
}

impl TimeSeries {
    /// Build a series from observations already in date order.
    pub fn new(points: Vec<Observation>) -> Result<Self, ChecklistError> {
        for pair in points.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(ChecklistError::InvalidSeries {
                    reason: format!(
                        "dates must be strictly increasing ({} follows {})",
                        pair[1].date, pair[0].date
                    ),
                });
            }
        }
        if let Some(bad) = points.iter().find(|p| !p.value.is_finite()) {
            return Err(ChecklistError::InvalidSeries {
                reason: format!("non-finite value on {}", bad.date),
            });
        }
        Ok(Self { points })
    }

    /// Sort by date first; duplicate dates are still rejected.
    pub fn from_unsorted(mut points: Vec<Observation>) -> Result<Self, ChecklistError> {
        points.sort_by_key(|p| p.date);
        Self::new(points)
    }

    pub fn from_pairs<I>(pairs: I) -> Result<Self, ChecklistError>
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(date, value)| Observation { date, value })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Observation] {
        &self.points
    }

    pub fn first(&self) -> Option<&Observation> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&Observation> {
        self.points.last()
    }

    pub fn latest(&self) -> Result<f64, ChecklistError> {
        self.points
            .last()
            .map(|p| p.value)
            .ok_or(ChecklistError::InsufficientHistory {
                required: 1,
                available: 0,
            })
    }

    /// Observations up to and including `date`.
    pub fn truncated_at(&self, date: NaiveDate) -> TimeSeries {
        let end = self.points.partition_point(|p| p.date <= date);
        TimeSeries {
            points: self.points[..end].to_vec(),
        }
    }

    fn tail(&self, period: usize) -> Result<&[Observation], ChecklistError> {
        if period == 0 {
            return Err(ChecklistError::InvalidPeriod { period });
        }
        if self.points.len() < period {
            return Err(ChecklistError::InsufficientHistory {
                required: period,
                available: self.points.len(),
            });
        }
        Ok(&self.points[self.points.len() - period..])
    }
}

/// Arithmetic mean of the last `period` observations (by position, not by
/// calendar days).
pub fn moving_average(series: &TimeSeries, period: usize) -> Result<f64, ChecklistError> {
    let window = series.tail(period)?;
    Ok(window.iter().map(|p| p.value).sum::<f64>() / period as f64)
}

/// Σ(price·volume)/Σ(volume) over the trailing `period` observations the two
/// series share a date for.
pub fn volume_weighted_average(
    prices: &TimeSeries,
    volumes: &TimeSeries,
    period: usize,
) -> Result<f64, ChecklistError> {
    if period == 0 {
        return Err(ChecklistError::InvalidPeriod { period });
    }
    let available = prices.len().min(volumes.len());
    if available < period {
        return Err(ChecklistError::InsufficientHistory {
            required: period,
            available,
        });
    }

    let aligned = align(prices, volumes);
    if aligned.len() < period {
        return Err(ChecklistError::InsufficientHistory {
            required: period,
            available: aligned.len(),
        });
    }

    let window = &aligned[aligned.len() - period..];
    let total_volume: f64 = window.iter().map(|(_, _, v)| v).sum();
    if total_volume == 0.0 {
        return Err(ChecklistError::ZeroVolume);
    }
    let notional: f64 = window.iter().map(|(_, p, v)| p * v).sum();
    Ok(notional / total_volume)
}

/// Latest observation with date <= `target`.
pub fn value_as_of(series: &TimeSeries, target: NaiveDate) -> Result<f64, ChecklistError> {
    let end = series.points.partition_point(|p| p.date <= target);
    if end == 0 {
        return Err(ChecklistError::MissingAnchorDate { date: target });
    }
    Ok(series.points[end - 1].value)
}

/// Element-wise `numerator / denominator` on common dates. Dates with a zero
/// denominator are dropped.
pub fn ratio(numerator: &TimeSeries, denominator: &TimeSeries) -> TimeSeries {
    let points = align(numerator, denominator)
        .into_iter()
        .filter(|(_, _, d)| *d != 0.0)
        .map(|(date, n, d)| Observation {
            date,
            value: n / d,
        })
        .collect();
    TimeSeries { points }
}

fn align(left: &TimeSeries, right: &TimeSeries) -> Vec<(NaiveDate, f64, f64)> {
    let mut out = Vec::with_capacity(left.len().min(right.len()));
    let (mut i, mut j) = (0, 0);
    while i < left.points.len() && j < right.points.len() {
        let (l, r) = (&left.points[i], &right.points[j]);
        match l.date.cmp(&r.date) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push((l.date, l.value, r.value));
                i += 1;
                j += 1;
            }
        }
    }
    out
}
