//! Per-refresh bundle of fetched series.
//!
//! The loader resolves each instrument's fallback symbols against the data
//! port and stores whatever it finds under the canonical symbol. Instruments
//! that cannot be fetched are left out; indicators depending on them report
//! insufficient data instead of failing the refresh.

use crate::domain::checklist::Instrument;
use crate::domain::error::ChecklistError;
use crate::domain::time_series::TimeSeries;
use crate::ports::data_port::{DataPort, SeriesField};
use chrono::NaiveDate;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct MarketSnapshot {
    closes: HashMap<String, TimeSeries>,
    volumes: HashMap<String, TimeSeries>,
}

impl MarketSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_close(mut self, symbol: &str, series: TimeSeries) -> Self {
        self.closes.insert(symbol.to_string(), series);
        self
    }

    pub fn with_volume(mut self, symbol: &str, series: TimeSeries) -> Self {
        self.volumes.insert(symbol.to_string(), series);
        self
    }

    pub fn close(&self, symbol: &str) -> Result<&TimeSeries, ChecklistError> {
        self.closes.get(symbol).ok_or_else(|| ChecklistError::NoData {
            instrument: symbol.to_string(),
        })
    }

    pub fn volume(&self, symbol: &str) -> Option<&TimeSeries> {
        self.volumes.get(symbol)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.closes.contains_key(symbol)
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }
}

/// Symbols that could not be resolved to any series.
#[derive(Debug, Clone, PartialEq)]
pub struct MissingInstrument {
    pub instrument: String,
    pub reason: String,
}

pub struct SnapshotLoad {
    pub snapshot: MarketSnapshot,
    pub missing: Vec<MissingInstrument>,
}

fn fetch_first_available(
    data_port: &dyn DataPort,
    instrument: &Instrument,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<(String, TimeSeries), String> {
    let mut last_reason = "no data".to_string();
    for symbol in instrument.alternatives() {
        match data_port.fetch_series(symbol, SeriesField::Close, start_date, end_date) {
            Ok(Some(series)) if !series.is_empty() => {
                if symbol != instrument.symbol() {
                    log::info!("{}: using fallback symbol {}", instrument.symbol(), symbol);
                }
                return Ok((symbol.clone(), series));
            }
            Ok(_) => {
                log::debug!("{}: no data", symbol);
                last_reason = "no data".to_string();
            }
            Err(e) => {
                log::debug!("{}: {}", symbol, e);
                last_reason = e.to_string();
            }
        }
    }
    Err(last_reason)
}

pub fn load_snapshot(
    data_port: &dyn DataPort,
    requirements: &[(Instrument, bool)],
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> SnapshotLoad {
    let mut snapshot = MarketSnapshot::new();
    let mut missing = Vec::new();

    for (instrument, needs_volume) in requirements {
        let canonical = instrument.symbol();
        let (resolved, closes) =
            match fetch_first_available(data_port, instrument, start_date, end_date) {
                Ok(found) => found,
                Err(reason) => {
                    log::warn!("skipping {} ({})", instrument, reason);
                    missing.push(MissingInstrument {
                        instrument: instrument.to_string(),
                        reason,
                    });
                    continue;
                }
            };
        log::debug!("{}: {} observations", resolved, closes.len());
        snapshot.closes.insert(canonical.to_string(), closes);

        if *needs_volume {
            match data_port.fetch_series(&resolved, SeriesField::Volume, start_date, end_date) {
                Ok(Some(volumes)) => {
                    snapshot.volumes.insert(canonical.to_string(), volumes);
                }
                Ok(None) => log::warn!("{}: no volume data", resolved),
                Err(e) => log::warn!("{}: volume unavailable ({})", resolved, e),
            }
        }
    }

    SnapshotLoad { snapshot, missing }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct StubPort {
        closes: HashMap<String, TimeSeries>,
        failing: Vec<String>,
    }

    impl DataPort for StubPort {
        fn fetch_series(
            &self,
            symbol: &str,
            field: SeriesField,
            _start_date: NaiveDate,
            _end_date: NaiveDate,
        ) -> Result<Option<TimeSeries>, ChecklistError> {
            if self.failing.iter().any(|s| s == symbol) {
                return Err(ChecklistError::Data {
                    reason: "timeout".into(),
                });
            }
            match field {
                SeriesField::Close => Ok(self.closes.get(symbol).cloned()),
                SeriesField::Volume => Ok(None),
            }
        }

        fn list_symbols(&self) -> Result<Vec<String>, ChecklistError> {
            Ok(self.closes.keys().cloned().collect())
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn one_point() -> TimeSeries {
        TimeSeries::from_pairs(vec![(d(2024, 1, 2), 55.0)]).unwrap()
    }

    #[test]
    fn fallback_symbol_stored_under_canonical() {
        let port = StubPort {
            closes: HashMap::from([("^R3FI".to_string(), one_point())]),
            failing: vec!["$R3FI".to_string()],
        };
        let reqs = vec![(Instrument::parse("$R3FI|R3FI|^R3FI").unwrap(), false)];
        let load = load_snapshot(&port, &reqs, d(2024, 1, 1), d(2024, 1, 31));
        assert!(load.missing.is_empty());
        assert_eq!(load.snapshot.close("$R3FI").unwrap().latest().unwrap(), 55.0);
        assert!(!load.snapshot.contains("^R3FI"));
    }

    #[test]
    fn unavailable_instrument_is_missing() {
        let port = StubPort {
            closes: HashMap::new(),
            failing: vec!["TIP".to_string()],
        };
        let reqs = vec![(Instrument::from("TIP"), false), (Instrument::from("IBIT"), false)];
        let load = load_snapshot(&port, &reqs, d(2024, 1, 1), d(2024, 1, 31));
        assert_eq!(load.missing.len(), 2);
        assert_eq!(load.missing[0].reason, "data error: timeout");
        assert_eq!(load.missing[1].reason, "no data");
        assert!(matches!(
            load.snapshot.close("TIP"),
            Err(ChecklistError::NoData { .. })
        ));
    }
}
