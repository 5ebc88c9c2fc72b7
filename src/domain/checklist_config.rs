//! Builds a [`Checklist`] from INI configuration.
//!
//! Every key is optional and defaults to the reference checklist. Track
//! sections are named `track.<id>`; when none exist the reference tracks are
//! used.

use crate::domain::checklist::{Checklist, IndicatorDef, IndicatorSpec, Instrument, TrackDef};
use crate::domain::error::ChecklistError;
use crate::domain::indicator::stage::StagePeriods;
use crate::domain::indicator::threshold::{BREADTH_THRESHOLD, SURPRISE_THRESHOLD};
use crate::domain::indicator::{AverageKind, Category, MaPeriods};
use crate::domain::returns::{BlendWeights, Horizons};
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_LOOKBACK_DAYS: i64 = 450;
/// A century of daily history.
pub const MAX_LOOKBACK_DAYS: i64 = 36_525;
/// Longest return horizon, in months.
pub const MAX_HORIZON_MONTHS: u32 = 1_200;
const TRACK_PREFIX: &str = "track.";

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> ChecklistError {
    ChecklistError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn parse_list<T: std::str::FromStr>(
    section: &str,
    key: &str,
    raw: &str,
    expected: usize,
) -> Result<Vec<T>, ChecklistError> {
    let values: Vec<T> = raw
        .split(',')
        .map(|t| t.trim().parse::<T>())
        .collect::<Result<_, _>>()
        .map_err(|_| {
            invalid(
                section,
                key,
                format!("expected {expected} comma-separated numbers"),
            )
        })?;
    if values.len() != expected {
        return Err(invalid(
            section,
            key,
            format!("expected {expected} values, got {}", values.len()),
        ));
    }
    Ok(values)
}

/// `short,long` with an optional `:vwap` suffix.
pub fn parse_ma_periods(
    section: &str,
    key: &str,
    raw: &str,
) -> Result<MaPeriods, ChecklistError> {
    let (list, vwap) = match raw.trim().rsplit_once(':') {
        Some((list, kind)) if kind.trim().eq_ignore_ascii_case("vwap") => (list, true),
        Some((_, kind)) => {
            return Err(invalid(
                section,
                key,
                format!("unknown average kind '{}'", kind.trim()),
            ));
        }
        None => (raw, false),
    };
    let values = parse_list::<usize>(section, key, list, 2)?;
    let periods = MaPeriods::new(values[0], values[1]).ok_or_else(|| {
        invalid(
            section,
            key,
            "short period must be positive and below long period",
        )
    })?;
    Ok(if vwap { periods.volume_weighted() } else { periods })
}

fn parse_stage_periods(
    section: &str,
    key: &str,
    raw: &str,
) -> Result<StagePeriods, ChecklistError> {
    let v = parse_list::<usize>(section, key, raw, 3)?;
    StagePeriods::new(v[0], v[1], v[2])
        .ok_or_else(|| invalid(section, key, "periods must be positive and increasing"))
}

fn instrument(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: &str,
) -> Result<Instrument, ChecklistError> {
    match config.get_string(section, key) {
        Some(raw) => {
            Instrument::parse(&raw).ok_or_else(|| invalid(section, key, "empty symbol"))
        }
        None => Ok(Instrument::from(default)),
    }
}

fn ma_periods(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: (usize, usize),
) -> Result<MaPeriods, ChecklistError> {
    match config.get_string(section, key) {
        Some(raw) => parse_ma_periods(section, key, &raw),
        None => MaPeriods::new(default.0, default.1)
            .ok_or_else(|| invalid(section, key, "bad default")),
    }
}

/// Ratio crosses have no volume to weight by.
fn simple_ma_periods(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: (usize, usize),
) -> Result<MaPeriods, ChecklistError> {
    let periods = ma_periods(config, section, key, default)?;
    if periods.kind != AverageKind::Simple {
        return Err(invalid(section, key, "ratio crossovers support simple averages only"));
    }
    Ok(periods)
}

fn stage_periods(
    config: &dyn ConfigPort,
    section: &str,
) -> Result<StagePeriods, ChecklistError> {
    match config.get_string(section, "stage_periods") {
        Some(raw) => parse_stage_periods(section, "stage_periods", &raw),
        None => Ok(StagePeriods::default()),
    }
}

fn threshold(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, ChecklistError> {
    match config.get_string(section, key) {
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| invalid(section, key, "expected a number")),
        None => Ok(default),
    }
}

fn rotation_def(
    numerator: Instrument,
    denominator: Instrument,
    periods: MaPeriods,
    name: String,
) -> IndicatorDef {
    IndicatorDef {
        id: "sector_rotation".to_string(),
        name,
        category: Category::Sentiment,
        spec: IndicatorSpec::RatioCross {
            numerator,
            denominator,
            periods,
        },
    }
}

fn leaders_def(instrument: Instrument, periods: MaPeriods) -> IndicatorDef {
    IndicatorDef {
        id: "growth_leaders".to_string(),
        name: format!("{} MA Cross", instrument.symbol()),
        category: Category::Sentiment,
        spec: IndicatorSpec::MaCross {
            instrument,
            periods,
        },
    }
}

fn stage_def(instrument: Instrument, periods: StagePeriods) -> IndicatorDef {
    IndicatorDef {
        id: "index_stage".to_string(),
        name: format!("{} Trend Stage", instrument.symbol()),
        category: Category::Trend,
        spec: IndicatorSpec::Stage {
            instrument,
            periods,
        },
    }
}

fn build_indicators(config: &dyn ConfigPort) -> Result<Vec<IndicatorDef>, ChecklistError> {
    let bond = instrument(config, "liquidity", "bond", "BND")?;
    let bill = instrument(config, "liquidity", "bill_yield", "^IRX")?;
    let inflation = instrument(config, "liquidity", "inflation_bond", "TIP")?;
    let inflation_periods = ma_periods(config, "liquidity", "inflation_periods", (5, 20))?;
    let crypto = instrument(config, "liquidity", "crypto", "IBIT")?;
    let crypto_periods = ma_periods(config, "liquidity", "crypto_periods", (3, 8))?;

    let surprise_threshold = threshold(
        config,
        "sentiment",
        "surprise_threshold",
        SURPRISE_THRESHOLD,
    )?;
    let breadth = match config.get_string("sentiment", "breadth") {
        Some(raw) if raw.trim().eq_ignore_ascii_case("manual") => None,
        Some(raw) => Some(
            Instrument::parse(&raw)
                .ok_or_else(|| invalid("sentiment", "breadth", "empty symbol"))?,
        ),
        None => Instrument::parse("$R3FI|R3FI|^R3FI"),
    };
    let breadth_threshold =
        threshold(config, "sentiment", "breadth_threshold", BREADTH_THRESHOLD)?;
    let cyclical = instrument(config, "sentiment", "cyclical", "XLY")?;
    let defensive = instrument(config, "sentiment", "defensive", "XLP")?;
    let rotation_periods = simple_ma_periods(config, "sentiment", "rotation_periods", (3, 8))?;
    let leaders = instrument(config, "sentiment", "leaders", "FFTY")?;
    let leaders_periods = ma_periods(config, "sentiment", "leaders_periods", (3, 8))?;

    let index = instrument(config, "trend", "index", "^GSPC")?;
    let index_stage_periods = stage_periods(config, "trend")?;

    Ok(vec![
        IndicatorDef {
            id: "bond_vs_bill".into(),
            name: format!("{} vs {}", bond.symbol(), bill.symbol()),
            category: Category::Liquidity,
            spec: IndicatorSpec::RelativeReturn {
                asset: bond,
                bill_yield: bill,
            },
        },
        IndicatorDef {
            id: "inflation_bond_cross".into(),
            name: format!("{} MA Cross", inflation.symbol()),
            category: Category::Liquidity,
            spec: IndicatorSpec::MaCross {
                instrument: inflation,
                periods: inflation_periods,
            },
        },
        IndicatorDef {
            id: "crypto_cross".into(),
            name: format!("{} MA Cross", crypto.symbol()),
            category: Category::Liquidity,
            spec: IndicatorSpec::MaCross {
                instrument: crypto,
                periods: crypto_periods,
            },
        },
        IndicatorDef::new(
            "surprise_index",
            "Economic Surprise Index",
            Category::Sentiment,
            IndicatorSpec::SurpriseMomentum {
                threshold: surprise_threshold,
            },
        ),
        IndicatorDef::new(
            "breadth",
            "Stocks Above 50-Day MA",
            Category::Sentiment,
            IndicatorSpec::Breadth {
                instrument: breadth,
                threshold: breadth_threshold,
            },
        ),
        rotation_def(
            cyclical.clone(),
            defensive.clone(),
            rotation_periods,
            format!("{}/{} Ratio", cyclical.symbol(), defensive.symbol()),
        ),
        leaders_def(leaders, leaders_periods),
        stage_def(index, index_stage_periods),
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
    ])
}

fn build_track(
    config: &dyn ConfigPort,
    section: &str,
    base: &[IndicatorDef],
) -> Result<TrackDef, ChecklistError> {
    let id = section.trim_start_matches(TRACK_PREFIX).to_string();
    if id.is_empty() {
        return Err(invalid(section, "name", "track id is empty"));
    }
    let name = config
        .get_string(section, "name")
        .unwrap_or_else(|| id.to_uppercase());
    let mut track = TrackDef::new(&id, &name);

    let has = |key: &str| config.get_string(section, key).is_some();

    if has("index") || has("stage_periods") {
        let index = match config.get_string(section, "index") {
            Some(_) => instrument(config, section, "index", "")?,
            None => base_stage_instrument(base),
        };
        track = track.with_override(stage_def(index, stage_periods(config, section)?));
    }

    if has("cyclical") || has("defensive") || has("rotation_periods") {
        let (base_num, base_den, base_periods) = base_rotation(base);
        let numerator = match config.get_string(section, "cyclical") {
            Some(_) => instrument(config, section, "cyclical", "")?,
            None => base_num,
        };
        let denominator = match config.get_string(section, "defensive") {
            Some(_) => instrument(config, section, "defensive", "")?,
            None => base_den,
        };
        let periods = simple_ma_periods(
            config,
            section,
            "rotation_periods",
            (base_periods.short, base_periods.long),
        )?;
        let name = format!("{}/{} Ratio", numerator.symbol(), denominator.symbol());
        track = track.with_override(rotation_def(numerator, denominator, periods, name));
    }

    if has("leaders") || has("leaders_periods") {
        let (base_instrument, base_periods) = base_leaders(base);
        let leaders = match config.get_string(section, "leaders") {
            Some(_) => instrument(config, section, "leaders", "")?,
            None => base_instrument,
        };
        let periods = match config.get_string(section, "leaders_periods") {
            Some(raw) => parse_ma_periods(section, "leaders_periods", &raw)?,
            None => base_periods,
        };
        track = track.with_override(leaders_def(leaders, periods));
    }

    Ok(track)
}

fn base_stage_instrument(base: &[IndicatorDef]) -> Instrument {
    base.iter()
        .find_map(|d| match &d.spec {
            IndicatorSpec::Stage { instrument, .. } => Some(instrument.clone()),
            _ => None,
        })
        .unwrap_or_else(|| Instrument::from("^GSPC"))
}

fn base_rotation(base: &[IndicatorDef]) -> (Instrument, Instrument, MaPeriods) {
    base.iter()
        .find_map(|d| match &d.spec {
            IndicatorSpec::RatioCross {
                numerator,
                denominator,
                periods,
            } => Some((numerator.clone(), denominator.clone(), *periods)),
            _ => None,
        })
        .unwrap_or_else(|| {
            (
                Instrument::from("XLY"),
                Instrument::from("XLP"),
                MaPeriods {
                    short: 3,
                    long: 8,
                    kind: Default::default(),
                },
            )
        })
}

fn base_leaders(base: &[IndicatorDef]) -> (Instrument, MaPeriods) {
    base.iter()
        .find_map(|d| match (&d.id[..], &d.spec) {
            ("growth_leaders", IndicatorSpec::MaCross { instrument, periods }) => {
                Some((instrument.clone(), *periods))
            }
            _ => None,
        })
        .unwrap_or_else(|| {
            (
                Instrument::from("FFTY"),
                MaPeriods {
                    short: 3,
                    long: 8,
                    kind: Default::default(),
                },
            )
        })
}

fn build_blend(
    config: &dyn ConfigPort,
) -> Result<(Horizons, BlendWeights), ChecklistError> {
    let horizons = match config.get_string("checklist", "horizons") {
        Some(raw) => {
            let v = parse_list::<u32>("checklist", "horizons", &raw, 3)?;
            if v.iter().any(|&m| m == 0 || m > MAX_HORIZON_MONTHS) {
                return Err(invalid(
                    "checklist",
                    "horizons",
                    format!("horizons must be between 1 and {MAX_HORIZON_MONTHS} months"),
                ));
            }
            Horizons {
                short: v[0],
                mid: v[1],
                long: v[2],
            }
        }
        None => Horizons::default(),
    };
    let weights = match config.get_string("checklist", "weights") {
        Some(raw) => {
            let v = parse_list::<f64>("checklist", "weights", &raw, 3)?;
            BlendWeights::new(v[0], v[1], v[2])
                .map_err(|e| invalid("checklist", "weights", e.to_string()))?
        }
        None => BlendWeights::default(),
    };
    Ok((horizons, weights))
}

pub fn build_checklist(config: &dyn ConfigPort) -> Result<Checklist, ChecklistError> {
    let indicators = build_indicators(config)?;
    let (horizons, weights) = build_blend(config)?;

    let mut track_sections: Vec<String> = config
        .sections()
        .into_iter()
        .filter(|s| s.starts_with(TRACK_PREFIX))
        .collect();
    track_sections.sort();

    let tracks = if track_sections.is_empty() {
        Checklist::reference().tracks().to_vec()
    } else {
        track_sections
            .iter()
            .map(|s| build_track(config, s, &indicators))
            .collect::<Result<Vec<_>, _>>()?
    };

    Checklist::new(indicators, tracks, horizons, weights)
}

pub fn lookback_days(config: &dyn ConfigPort) -> Result<i64, ChecklistError> {
    let Some(raw) = config.get_string("checklist", "lookback_days") else {
        return Ok(DEFAULT_LOOKBACK_DAYS);
    };
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|days| (1..=MAX_LOOKBACK_DAYS).contains(days))
        .ok_or_else(|| {
            invalid(
                "checklist",
                "lookback_days",
                format!("expected a whole number of days between 1 and {MAX_LOOKBACK_DAYS}"),
            )
        })
}
