//! User-entered judgment inputs.
//!
//! The checklist never owns these; the caller loads them (see
//! [`crate::ports::manual_input_port`]) and passes them to each evaluation.

use crate::domain::error::ChecklistError;
use crate::domain::indicator::manual::{MomentumStage, TrendStatus};
use crate::domain::indicator::stage::TrendStage;
use std::collections::BTreeMap;

pub const DEFAULT_BREADTH_PCT: f64 = 50.0;

const STAGE_CHOICES: &str = "strong uptrend, early uptrend, strong pullback, other/downtrend";

/// Inputs scoped to one track.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrackInputs {
    pub stage_override: Option<TrendStage>,
    pub momentum_stage: MomentumStage,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ManualInputs {
    pub surprise_current: f64,
    pub surprise_previous: f64,
    pub breadth_pct: f64,
    pub trend_status: TrendStatus,
    pub tracks: BTreeMap<String, TrackInputs>,
}

impl Default for ManualInputs {
    fn default() -> Self {
        Self {
            surprise_current: 0.0,
            surprise_previous: 0.0,
            breadth_pct: DEFAULT_BREADTH_PCT,
            trend_status: TrendStatus::default(),
            tracks: BTreeMap::new(),
        }
    }
}

impl ManualInputs {
    pub fn track(&self, track_id: &str) -> TrackInputs {
        self.tracks.get(track_id).copied().unwrap_or_default()
    }

    /// Set one input by key. Track-scoped keys (`stage_override`,
    /// `momentum_stage`) need `track`.
    pub fn set(
        &mut self,
        key: &str,
        value: &str,
        track: Option<&str>,
    ) -> Result<(), ChecklistError> {
        match key {
            "surprise_current" => self.surprise_current = parse_number(key, value)?,
            "surprise_previous" => self.surprise_previous = parse_number(key, value)?,
            "breadth" => {
                let pct = parse_number(key, value)?;
                if !(0.0..=100.0).contains(&pct) {
                    return Err(invalid(key, "must be between 0 and 100"));
                }
                self.breadth_pct = pct;
            }
            "trend_status" => {
                self.trend_status = TrendStatus::parse(value)
                    .ok_or_else(|| invalid(key, "expected uptrend, sideways or downtrend"))?;
            }
            "stage_override" => {
                let track = track.ok_or_else(|| invalid(key, "requires a track"))?;
                let stage = match value.trim().to_lowercase().as_str() {
                    "" | "auto" | "none" => None,
                    other => Some(TrendStage::parse(other).ok_or_else(|| {
                        invalid(key, &format!("expected auto or one of: {STAGE_CHOICES}"))
                    })?),
                };
                self.tracks.entry(track.to_string()).or_default().stage_override = stage;
            }
            "momentum_stage" => {
                let track = track.ok_or_else(|| invalid(key, "requires a track"))?;
                let stage = MomentumStage::parse(value).ok_or_else(|| {
                    invalid(key, "expected accelerating, steady, fading or declining")
                })?;
                self.tracks.entry(track.to_string()).or_default().momentum_stage = stage;
            }
            _ => return Err(invalid(key, "unknown input")),
        }
        Ok(())
    }
}

fn invalid(key: &str, reason: &str) -> ChecklistError {
    ChecklistError::InvalidInput {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_number(key: &str, value: &str) -> Result<f64, ChecklistError> {
    match value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(invalid(key, "expected a number")),
    }
}
