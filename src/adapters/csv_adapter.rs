//! CSV file data adapter.
//!
//! One file per instrument under a base directory, named after the sanitized
//! symbol (`^GSPC` -> `_GSPC.csv`). Files carry a `date,close[,volume]` header;
//! blank cells are treated as missing observations and skipped.

use crate::domain::error::ChecklistError;
use crate::domain::time_series::{Observation, TimeSeries};
use crate::ports::data_port::{DataPort, SeriesField};
use chrono::NaiveDate;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

/// File stem for `symbol`: anything outside `[A-Za-z0-9._-]` becomes `_`.
pub fn sanitize_symbol(symbol: &str) -> String {
    symbol
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", sanitize_symbol(symbol)))
    }
}

fn data_error(reason: String) -> ChecklistError {
    ChecklistError::Data { reason }
}

impl DataPort for CsvAdapter {
    fn fetch_series(
        &self,
        symbol: &str,
        field: SeriesField,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Option<TimeSeries>, ChecklistError> {
        let path = self.csv_path(symbol);
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(data_error(format!("failed to read {}: {}", path.display(), e)));
            }
        };

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| data_error(format!("{}: CSV header error: {}", path.display(), e)))?
            .clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let date_col = column("date")
            .ok_or_else(|| data_error(format!("{}: missing date column", path.display())))?;
        let value_col = match field {
            SeriesField::Close => column("close")
                .ok_or_else(|| data_error(format!("{}: missing close column", path.display())))?,
            SeriesField::Volume => match column("volume") {
                Some(c) => c,
                None => return Ok(None),
            },
        };

        let mut points = Vec::new();
        for result in rdr.records() {
            let record = result
                .map_err(|e| data_error(format!("{}: CSV parse error: {}", path.display(), e)))?;

            let date_str = record.get(date_col).unwrap_or_default().trim();
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                data_error(format!("{}: invalid date '{}': {}", path.display(), date_str, e))
            })?;
            if date < start_date || date > end_date {
                continue;
            }

            let raw = record.get(value_col).unwrap_or_default().trim();
            if raw.is_empty() {
                continue;
            }
            let value: f64 = raw.parse().map_err(|e| {
                data_error(format!(
                    "{}: invalid value '{}' on {}: {}",
                    path.display(),
                    raw,
                    date,
                    e
                ))
            })?;
            points.push(Observation { date, value });
        }

        if points.is_empty() {
            return Ok(None);
        }
        TimeSeries::from_unsorted(points)
            .map(Some)
            .map_err(|e| data_error(format!("{}: {}", path.display(), e)))
    }

    fn list_symbols(&self) -> Result<Vec<String>, ChecklistError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| {
            data_error(format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ))
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| data_error(format!("directory entry error: {}", e)))?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(stem) = name_str.strip_suffix(".csv") {
                symbols.push(stem.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
