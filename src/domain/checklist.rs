//! Checklist definition: the indicators, their categories, and the tracks
//! that share or override them.
//!
//! An indicator is *shared* when no track overrides it and it reads no
//! track-scoped manual input; shared indicators are evaluated once per
//! evaluation and reused by every track.

use crate::domain::error::ChecklistError;
use crate::domain::indicator::stage::StagePeriods;
use crate::domain::indicator::threshold::{BREADTH_THRESHOLD, SURPRISE_THRESHOLD};
use crate::domain::indicator::{AverageKind, Category, MaPeriods};
use crate::domain::returns::{BlendWeights, Horizons};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Grand maximum every checklist must add up to.
pub const GRAND_MAX: f64 = 10.0;

/// An instrument identifier with optional fallbacks, tried in order by the
/// snapshot loader. The first symbol is canonical.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Instrument {
    symbols: Vec<String>,
}

impl Instrument {
    /// Parses `SYM` or `SYM1|SYM2|SYM3`.
    pub fn parse(s: &str) -> Option<Instrument> {
        let symbols: Vec<String> = s
            .split('|')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        (!symbols.is_empty()).then_some(Instrument { symbols })
    }

    /// Canonical symbol. `parse` and `From` never build an empty list.
    pub fn symbol(&self) -> &str {
        self.symbols.first().map(String::as_str).unwrap_or_default()
    }

    pub fn alternatives(&self) -> &[String] {
        &self.symbols
    }
}

impl From<&str> for Instrument {
    fn from(s: &str) -> Self {
        Instrument::parse(s).unwrap_or_else(|| Instrument {
            symbols: vec![s.to_string()],
        })
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbols.join("|"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorSpec {
    RelativeReturn {
        asset: Instrument,
        bill_yield: Instrument,
    },
    MaCross {
        instrument: Instrument,
        periods: MaPeriods,
    },
    RatioCross {
        numerator: Instrument,
        denominator: Instrument,
        periods: MaPeriods,
    },
    SurpriseMomentum {
        threshold: f64,
    },
    Breadth {
        instrument: Option<Instrument>,
        threshold: f64,
    },
    Stage {
        instrument: Instrument,
        periods: StagePeriods,
    },
    TrendStatus,
    MomentumStage,
}

impl IndicatorSpec {
    pub fn max_score(&self) -> f64 {
        1.0
    }

    /// Reads manual inputs that differ per track.
    pub fn is_track_scoped(&self) -> bool {
        matches!(self, IndicatorSpec::Stage { .. } | IndicatorSpec::MomentumStage)
    }

    /// Instruments this indicator needs, with whether volume is needed too.
    pub fn requirements(&self) -> Vec<(&Instrument, bool)> {
        match self {
            IndicatorSpec::RelativeReturn { asset, bill_yield } => {
                vec![(asset, false), (bill_yield, false)]
            }
            IndicatorSpec::MaCross {
                instrument,
                periods,
            } => vec![(instrument, periods.kind == AverageKind::VolumeWeighted)],
            IndicatorSpec::RatioCross {
                numerator,
                denominator,
                ..
            } => vec![(numerator, false), (denominator, false)],
            IndicatorSpec::Breadth {
                instrument: Some(i),
                ..
            } => vec![(i, false)],
            IndicatorSpec::Stage { instrument, .. } => vec![(instrument, false)],
            IndicatorSpec::Breadth {
                instrument: None, ..
            }
            | IndicatorSpec::SurpriseMomentum { .. }
            | IndicatorSpec::TrendStatus
            | IndicatorSpec::MomentumStage => vec![],
        }
    }

    /// Short description for listings.
    pub fn describe(&self) -> String {
        match self {
            IndicatorSpec::RelativeReturn { asset, bill_yield } => {
                format!("{} blended return vs {} reinvested", asset, bill_yield)
            }
            IndicatorSpec::MaCross {
                instrument,
                periods,
            } => format!("{} {}", instrument, periods),
            IndicatorSpec::RatioCross {
                numerator,
                denominator,
                periods,
            } => format!("{}/{} {}", numerator, denominator, periods),
            IndicatorSpec::SurpriseMomentum { threshold } => {
                format!("manual surprise index > {} and rising", threshold)
            }
            IndicatorSpec::Breadth {
                instrument,
                threshold,
            } => match instrument {
                Some(i) => format!("{} > {} (manual fallback)", i, threshold),
                None => format!("manual breadth > {}", threshold),
            },
            IndicatorSpec::Stage {
                instrument,
                periods,
            } => format!(
                "{} stage MA{}/{}/{}",
                instrument, periods.short, periods.mid, periods.long
            ),
            IndicatorSpec::TrendStatus => "manual trend status".to_string(),
            IndicatorSpec::MomentumStage => "manual momentum stage".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorDef {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub spec: IndicatorSpec,
}

impl IndicatorDef {
    pub fn new(id: &str, name: &str, category: Category, spec: IndicatorSpec) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            category,
            spec,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackDef {
    pub id: String,
    pub name: String,
    /// Replacements for base indicators, matched by id.
    pub overrides: Vec<IndicatorDef>,
}

impl TrackDef {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            overrides: Vec::new(),
        }
    }

    pub fn with_override(mut self, def: IndicatorDef) -> Self {
        self.overrides.retain(|o| o.id != def.id);
        self.overrides.push(def);
        self
    }

    pub fn override_for(&self, id: &str) -> Option<&IndicatorDef> {
        self.overrides.iter().find(|o| o.id == id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Checklist {
    indicators: Vec<IndicatorDef>,
    tracks: Vec<TrackDef>,
    pub horizons: Horizons,
    pub weights: BlendWeights,
}

impl Checklist {
    pub fn new(
        indicators: Vec<IndicatorDef>,
        tracks: Vec<TrackDef>,
        horizons: Horizons,
        weights: BlendWeights,
    ) -> Result<Self, ChecklistError> {
        let mut ids = HashSet::new();
        for def in &indicators {
            if !ids.insert(def.id.as_str()) {
                return Err(invalid("indicators", &def.id, "duplicate indicator id"));
            }
        }

        if tracks.is_empty() {
            return Err(invalid("tracks", "track", "at least one track is required"));
        }
        let mut track_ids = HashSet::new();
        for track in &tracks {
            if !track_ids.insert(track.id.as_str()) {
                return Err(invalid("tracks", &track.id, "duplicate track id"));
            }
            for o in &track.overrides {
                let base = indicators
                    .iter()
                    .find(|d| d.id == o.id)
                    .ok_or_else(|| invalid(&track.id, &o.id, "overrides an unknown indicator"))?;
                if base.category != o.category {
                    return Err(invalid(&track.id, &o.id, "override changes the category"));
                }
                if base.category == Category::Liquidity {
                    return Err(invalid(
                        &track.id,
                        &o.id,
                        "liquidity indicators are shared by every track",
                    ));
                }
            }
        }

        let grand: f64 = indicators.iter().map(|d| d.spec.max_score()).sum();
        if (grand - GRAND_MAX).abs() > 1e-9 {
            return Err(invalid(
                "indicators",
                "max_score",
                &format!("category maxima must add up to {GRAND_MAX}, got {grand}"),
            ));
        }

        Ok(Self {
            indicators,
            tracks,
            horizons,
            weights,
        })
    }

    /// Three liquidity, four sentiment and three trend indicators over three
    /// benchmark tracks (S&P 500, Nasdaq 100, Hang Seng).
    pub fn reference() -> Self {
        let rotation = MaPeriods {
            short: 3,
            long: 8,
            kind: AverageKind::Simple,
        };
        let indicators = vec![
            IndicatorDef::new(
                "bond_vs_bill",
                "BND vs 3M T-Bill",
                Category::Liquidity,
                IndicatorSpec::RelativeReturn {
                    asset: "BND".into(),
                    bill_yield: "^IRX".into(),
                },
            ),
            IndicatorDef::new(
                "inflation_bond_cross",
                "TIP MA Cross",
                Category::Liquidity,
                IndicatorSpec::MaCross {
                    instrument: "TIP".into(),
                    periods: MaPeriods {
                        short: 5,
                        long: 20,
                        kind: AverageKind::Simple,
                    },
                },
            ),
            IndicatorDef::new(
                "crypto_cross",
                "IBIT MA Cross",
                Category::Liquidity,
                IndicatorSpec::MaCross {
                    instrument: "IBIT".into(),
                    periods: rotation,
                },
            ),
            IndicatorDef::new(
                "surprise_index",
                "Citi Surprise Index",
                Category::Sentiment,
                IndicatorSpec::SurpriseMomentum {
                    threshold: SURPRISE_THRESHOLD,
                },
            ),
            IndicatorDef::new(
                "breadth",
                "R3000 Above 50-Day MA",
                Category::Sentiment,
                IndicatorSpec::Breadth {
                    instrument: Instrument::parse("$R3FI|R3FI|^R3FI"),
                    threshold: BREADTH_THRESHOLD,
                },
            ),
            IndicatorDef::new(
                "sector_rotation",
                "XLY/XLP Ratio",
                Category::Sentiment,
                IndicatorSpec::RatioCross {
                    numerator: "XLY".into(),
                    denominator: "XLP".into(),
                    periods: rotation,
                },
            ),
            IndicatorDef::new(
                "growth_leaders",
                "FFTY MA Cross",
                Category::Sentiment,
                IndicatorSpec::MaCross {
                    instrument: "FFTY".into(),
                    periods: rotation,
                },
            ),
            IndicatorDef::new(
                "index_stage",
                "Index Trend Stage",
                Category::Trend,
                IndicatorSpec::Stage {
                    instrument: "^GSPC".into(),
                    periods: StagePeriods::default(),
                },
            ),
            IndicatorDef::new(
                "trend_status",
                "Trend Status",
                Category::Trend,
                IndicatorSpec::TrendStatus,
            ),
            IndicatorDef::new(
                "momentum_stage",
                "Momentum Stage",
                Category::Trend,
                IndicatorSpec::MomentumStage,
            ),
        ];

        let stage_on = |symbol: &str| {
            IndicatorDef::new(
                "index_stage",
                "Index Trend Stage",
                Category::Trend,
                IndicatorSpec::Stage {
                    instrument: symbol.into(),
                    periods: StagePeriods::default(),
                },
            )
        };
        let tracks = vec![
            TrackDef::new("spx", "S&P 500"),
            TrackDef::new("ndx", "Nasdaq 100").with_override(stage_on("^NDX")),
            TrackDef::new("hsi", "Hang Seng")
                .with_override(stage_on("^HSI"))
                .with_override(IndicatorDef::new(
                    "sector_rotation",
                    "HK Tech/Tracker Ratio",
                    Category::Sentiment,
                    IndicatorSpec::RatioCross {
                        numerator: "3033.HK".into(),
                        denominator: "2800.HK".into(),
                        periods: rotation,
                    },
                )),
        ];

        Self {
            indicators,
            tracks,
            horizons: Horizons::default(),
            weights: BlendWeights::default(),
        }
    }

    pub fn indicators(&self) -> &[IndicatorDef] {
        &self.indicators
    }

    pub fn tracks(&self) -> &[TrackDef] {
        &self.tracks
    }

    pub fn is_shared(&self, id: &str) -> bool {
        let Some(def) = self.indicators.iter().find(|d| d.id == id) else {
            return false;
        };
        !def.spec.is_track_scoped() && self.tracks.iter().all(|t| t.override_for(id).is_none())
    }

    pub fn category_max(&self, category: Category) -> f64 {
        self.indicators
            .iter()
            .filter(|d| d.category == category)
            .map(|d| d.spec.max_score())
            .sum()
    }

    /// Every instrument any track needs, keyed by canonical symbol. Volume is
    /// requested if any indicator needs it for that instrument.
    pub fn requirements(&self) -> Vec<(Instrument, bool)> {
        let mut by_symbol: BTreeMap<String, (Instrument, bool)> = BTreeMap::new();
        let defs = self
            .indicators
            .iter()
            .chain(self.tracks.iter().flat_map(|t| t.overrides.iter()));
        for def in defs {
            for (instrument, volume) in def.spec.requirements() {
                let entry = by_symbol
                    .entry(instrument.symbol().to_string())
                    .or_insert_with(|| (instrument.clone(), false));
                entry.1 |= volume;
            }
        }
        by_symbol.into_values().collect()
    }
}

fn invalid(section: &str, key: &str, reason: &str) -> ChecklistError {
    ChecklistError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
