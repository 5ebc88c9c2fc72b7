//! Indicator evaluators.
//!
//! Every evaluator is a pure function of its inputs returning an
//! [`IndicatorOutcome`]: a score within `[0, max_score]`, a short label, and
//! the raw numbers behind the decision for drill-down display.
//! - `relative_return`: blended risk-asset returns vs reinvested bill yield
//! - `ma_cross`: short vs long average on a price or a ratio of two prices
//! - `threshold`: manual surprise index with momentum split, breadth level
//! - `stage`: price vs three moving averages, four ordered states
//! - `manual`: categorical judgments mapped through a fixed score table

pub mod ma_cross;
pub mod manual;
pub mod relative_return;
pub mod stage;
pub mod threshold;

use std::fmt;

/// Label used for any indicator that could not be computed.
pub const INSUFFICIENT_DATA: &str = "insufficient data";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Liquidity,
    Sentiment,
    Trend,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Liquidity, Category::Sentiment, Category::Trend];

    pub fn parse(s: &str) -> Option<Category> {
        match s.trim().to_lowercase().as_str() {
            "liquidity" => Some(Category::Liquidity),
            "sentiment" => Some(Category::Sentiment),
            "trend" => Some(Category::Trend),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Liquidity => write!(f, "Liquidity"),
            Category::Sentiment => write!(f, "Sentiment"),
            Category::Trend => write!(f, "Trend"),
        }
    }
}

/// How a trailing average is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AverageKind {
    #[default]
    Simple,
    VolumeWeighted,
}

/// Short/long window pair for a crossover. `short < long` is enforced by
/// [`MaPeriods::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaPeriods {
    pub short: usize,
    pub long: usize,
    pub kind: AverageKind,
}

impl MaPeriods {
    pub fn new(short: usize, long: usize) -> Option<Self> {
        (short > 0 && short < long).then_some(Self {
            short,
            long,
            kind: AverageKind::Simple,
        })
    }

    pub fn volume_weighted(self) -> Self {
        Self {
            kind: AverageKind::VolumeWeighted,
            ..self
        }
    }
}

impl fmt::Display for MaPeriods {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            AverageKind::Simple => write!(f, "MA({},{})", self.short, self.long),
            AverageKind::VolumeWeighted => write!(f, "VWAP({},{})", self.short, self.long),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Detail {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorOutcome {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub score: f64,
    pub max_score: f64,
    pub label: String,
    pub details: Vec<Detail>,
    /// Set when the indicator could not be computed; the score is then 0.
    pub failure: Option<String>,
}

impl IndicatorOutcome {
    /// Outcome with no identity yet; the evaluation layer stamps id, name and
    /// category onto it.
    pub fn scored(score: f64, max_score: f64, label: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            category: Category::Liquidity,
            score,
            max_score,
            label: label.into(),
            details: Vec::new(),
            failure: None,
        }
    }

    pub fn insufficient(max_score: f64, reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            ..Self::scored(0.0, max_score, INSUFFICIENT_DATA)
        }
    }

    pub fn with_detail(mut self, name: impl Into<String>, value: f64) -> Self {
        self.details.push(Detail {
            name: name.into(),
            value,
        });
        self
    }

    pub fn detail(&self, name: &str) -> Option<f64> {
        self.details.iter().find(|d| d.name == name).map(|d| d.value)
    }

    pub fn is_positive(&self) -> bool {
        self.score > 0.0
    }

    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }
}

/// Binary score: 1 when the comparison holds.
pub(crate) fn binary(positive: bool) -> f64 {
    if positive { 1.0 } else { 0.0 }
}
