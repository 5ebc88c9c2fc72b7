//! Category totals, per-track breakdowns, and the score-to-position mapping.

use crate::domain::indicator::{Category, IndicatorOutcome};

/// Grand total -> recommended position %, in key order. The drop from 9 to
/// 10 is intentional and must not be smoothed.
pub const POSITION_ANCHORS: [(f64, f64); 6] = [
    (5.0, 40.0),
    (6.0, 50.0),
    (7.0, 60.0),
    (8.0, 80.0),
    (9.0, 100.0),
    (10.0, 90.0),
];

const LOWEST_ANCHOR: (f64, f64) = POSITION_ANCHORS[0];
const FULL_POSITION_FROM: f64 = 9.0;

/// Round to the nearest half point, halves away from zero.
pub fn quantize_half(score: f64) -> f64 {
    (score * 2.0).round() / 2.0
}

pub fn position_percentage(total_score: f64) -> f64 {
    let q = quantize_half(total_score.max(0.0));

    if let Some(&(_, pct)) = POSITION_ANCHORS.iter().find(|(s, _)| *s == q) {
        return pct;
    }
    if q >= FULL_POSITION_FROM {
        return 100.0;
    }
    if q < LOWEST_ANCHOR.0 {
        return q / LOWEST_ANCHOR.0 * LOWEST_ANCHOR.1;
    }

    let upper = POSITION_ANCHORS
        .iter()
        .position(|(s, _)| *s > q)
        .unwrap_or(POSITION_ANCHORS.len() - 1);
    let (lo_s, lo_p) = POSITION_ANCHORS[upper - 1];
    let (hi_s, hi_p) = POSITION_ANCHORS[upper];
    let fraction = (q - lo_s) / (hi_s - lo_s);
    lo_p + fraction * (hi_p - lo_p)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryTotal {
    pub category: Category,
    pub total: f64,
    pub max: f64,
}

impl CategoryTotal {
    pub fn percentage(&self) -> f64 {
        if self.max > 0.0 {
            self.total / self.max * 100.0
        } else {
            0.0
        }
    }

    pub fn assessment(&self) -> &'static str {
        let t = self.total;
        match self.category {
            Category::Liquidity => {
                if t >= 3.0 {
                    "Strong Liquidity"
                } else if t >= 2.0 {
                    "Moderate Liquidity"
                } else if t >= 1.0 {
                    "Weak Liquidity"
                } else {
                    "Poor Liquidity"
                }
            }
            Category::Sentiment => {
                if t >= 3.5 {
                    "Very Positive Sentiment"
                } else if t >= 2.5 {
                    "Positive Sentiment"
                } else if t >= 1.5 {
                    "Neutral Sentiment"
                } else {
                    "Negative Sentiment"
                }
            }
            Category::Trend => {
                if t >= 2.5 {
                    "Strong Trend"
                } else if t >= 1.5 {
                    "Moderate Trend"
                } else if t >= 0.5 {
                    "Weak Trend"
                } else {
                    "Poor Trend"
                }
            }
        }
    }
}

/// Sum of the category's outcomes, clamped to `[0, max]`.
pub fn category_total(
    category: Category,
    max: f64,
    outcomes: &[IndicatorOutcome],
) -> CategoryTotal {
    let sum: f64 = outcomes
        .iter()
        .filter(|o| o.category == category)
        .map(|o| o.score)
        .sum();
    CategoryTotal {
        category,
        total: sum.clamp(0.0, max),
        max,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackBreakdown {
    pub track_id: String,
    pub track_name: String,
    pub categories: Vec<CategoryTotal>,
    pub grand_total: f64,
    pub grand_max: f64,
    pub position_pct: f64,
    pub outcomes: Vec<IndicatorOutcome>,
}

impl TrackBreakdown {
    /// Totals each category and derives the grand total and position.
    pub fn build(
        track_id: &str,
        track_name: &str,
        maxima: &[(Category, f64)],
        outcomes: Vec<IndicatorOutcome>,
    ) -> Self {
        let categories: Vec<CategoryTotal> = maxima
            .iter()
            .map(|&(c, max)| category_total(c, max, &outcomes))
            .collect();
        let grand_total: f64 = categories.iter().map(|c| c.total).sum();
        let grand_max: f64 = categories.iter().map(|c| c.max).sum();
        Self {
            track_id: track_id.to_string(),
            track_name: track_name.to_string(),
            position_pct: position_percentage(grand_total),
            categories,
            grand_total,
            grand_max,
            outcomes,
        }
    }

    pub fn category(&self, category: Category) -> Option<&CategoryTotal> {
        self.categories.iter().find(|c| c.category == category)
    }

    pub fn outcome(&self, id: &str) -> Option<&IndicatorOutcome> {
        self.outcomes.iter().find(|o| o.id == id)
    }
}
