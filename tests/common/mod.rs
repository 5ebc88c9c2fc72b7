#![allow(dead_code)]

use chrono::NaiveDate;
use market_checklist::domain::error::ChecklistError;
use market_checklist::domain::time_series::TimeSeries;
use market_checklist::ports::data_port::{DataPort, SeriesField};
use std::cell::RefCell;
use std::collections::HashMap;

pub struct MockDataPort {
    pub closes: HashMap<String, TimeSeries>,
    pub volumes: HashMap<String, TimeSeries>,
    pub errors: HashMap<String, String>,
    pub calls: RefCell<Vec<(String, SeriesField)>>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            closes: HashMap::new(),
            volumes: HashMap::new(),
            errors: HashMap::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_series(mut self, symbol: &str, series: TimeSeries) -> Self {
        self.closes.insert(symbol.to_string(), series);
        self
    }

    pub fn with_volume(mut self, symbol: &str, series: TimeSeries) -> Self {
        self.volumes.insert(symbol.to_string(), series);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }

    pub fn close_calls(&self, symbol: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|(s, f)| s == symbol && *f == SeriesField::Close)
            .count()
    }
}

impl DataPort for MockDataPort {
    fn fetch_series(
        &self,
        symbol: &str,
        field: SeriesField,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Option<TimeSeries>, ChecklistError> {
        self.calls.borrow_mut().push((symbol.to_string(), field));
        if let Some(reason) = self.errors.get(symbol) {
            return Err(ChecklistError::Data {
                reason: reason.clone(),
            });
        }
        let source = match field {
            SeriesField::Close => &self.closes,
            SeriesField::Volume => &self.volumes,
        };
        Ok(source.get(symbol).map(|s| {
            TimeSeries::new(
                s.points()
                    .iter()
                    .copied()
                    .filter(|p| p.date >= start_date && p.date <= end_date)
                    .collect(),
            )
            .unwrap()
        }))
    }

    fn list_symbols(&self) -> Result<Vec<String>, ChecklistError> {
        let mut symbols: Vec<String> = self.closes.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// One observation per calendar day from `start` through `end`, valued by
/// `value(day_index)`.
pub fn daily_series(start: NaiveDate, end: NaiveDate, value: impl Fn(usize) -> f64) -> TimeSeries {
    let days = (end - start).num_days().max(0) as usize;
    TimeSeries::from_pairs(
        (0..=days).map(|i| (start + chrono::Duration::days(i as i64), value(i))),
    )
    .unwrap()
}

pub const HISTORY_START: (i32, u32, u32) = (2023, 1, 2);
pub const AS_OF: (i32, u32, u32) = (2024, 6, 14);

pub fn history_start() -> NaiveDate {
    date(HISTORY_START.0, HISTORY_START.1, HISTORY_START.2)
}

pub fn as_of() -> NaiveDate {
    date(AS_OF.0, AS_OF.1, AS_OF.2)
}

pub fn rising(start_value: f64, step: f64) -> TimeSeries {
    daily_series(history_start(), as_of(), |i| start_value + step * i as f64)
}

pub fn falling(start_value: f64, step: f64) -> TimeSeries {
    daily_series(history_start(), as_of(), |i| start_value - step * i as f64)
}

pub fn flat(value: f64) -> TimeSeries {
    daily_series(history_start(), as_of(), |_| value)
}

/// Data for every reference instrument: everything bullish except the Hang
/// Seng stage and rotation pair; `^NDX` is left out.
pub fn market_data() -> MockDataPort {
    MockDataPort::new()
        .with_series("BND", rising(70.0, 0.1))
        .with_series("^IRX", flat(5.0))
        .with_series("TIP", rising(100.0, 0.05))
        .with_series("IBIT", rising(20.0, 0.1))
        .with_series("$R3FI", flat(65.0))
        .with_series("XLY", rising(150.0, 0.2))
        .with_series("XLP", flat(70.0))
        .with_series("FFTY", rising(25.0, 0.05))
        .with_series("^GSPC", rising(3800.0, 3.0))
        .with_series("^HSI", falling(22000.0, 10.0))
        .with_series("3033.HK", falling(4.0, 0.001))
        .with_series("2800.HK", flat(18.0))
}
