//! Manual categorical judgments and their fixed score tables.

use crate::domain::indicator::IndicatorOutcome;
use std::fmt;

fn normalize(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TrendStatus {
    Uptrend,
    #[default]
    Sideways,
    Downtrend,
}

impl TrendStatus {
    pub const ALL: [TrendStatus; 3] = [
        TrendStatus::Uptrend,
        TrendStatus::Sideways,
        TrendStatus::Downtrend,
    ];

    pub fn score(&self) -> f64 {
        match self {
            TrendStatus::Uptrend => 1.0,
            TrendStatus::Sideways => 0.5,
            TrendStatus::Downtrend => 0.0,
        }
    }

    pub fn parse(s: &str) -> Option<TrendStatus> {
        match normalize(s).as_str() {
            "uptrend" | "up" => Some(TrendStatus::Uptrend),
            "sideways" | "range" => Some(TrendStatus::Sideways),
            "downtrend" | "down" => Some(TrendStatus::Downtrend),
            _ => None,
        }
    }
}

impl fmt::Display for TrendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendStatus::Uptrend => write!(f, "Uptrend"),
            TrendStatus::Sideways => write!(f, "Sideways"),
            TrendStatus::Downtrend => write!(f, "Downtrend"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MomentumStage {
    Accelerating,
    #[default]
    Steady,
    Fading,
    Declining,
}

impl MomentumStage {
    pub const ALL: [MomentumStage; 4] = [
        MomentumStage::Accelerating,
        MomentumStage::Steady,
        MomentumStage::Fading,
        MomentumStage::Declining,
    ];

    pub fn score(&self) -> f64 {
        match self {
            MomentumStage::Accelerating => 1.0,
            MomentumStage::Steady | MomentumStage::Fading => 0.5,
            MomentumStage::Declining => 0.0,
        }
    }

    pub fn parse(s: &str) -> Option<MomentumStage> {
        match normalize(s).as_str() {
            "accelerating" => Some(MomentumStage::Accelerating),
            "steady" => Some(MomentumStage::Steady),
            "fading" => Some(MomentumStage::Fading),
            "declining" => Some(MomentumStage::Declining),
            _ => None,
        }
    }
}

impl fmt::Display for MomentumStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MomentumStage::Accelerating => write!(f, "Accelerating"),
            MomentumStage::Steady => write!(f, "Steady"),
            MomentumStage::Fading => write!(f, "Fading"),
            MomentumStage::Declining => write!(f, "Declining"),
        }
    }
}

pub fn trend_status(status: TrendStatus) -> IndicatorOutcome {
    IndicatorOutcome::scored(status.score(), 1.0, status.to_string())
}

pub fn momentum_stage(stage: MomentumStage) -> IndicatorOutcome {
    IndicatorOutcome::scored(stage.score(), 1.0, stage.to_string())
}
