//! Market-data access port.

use crate::domain::error::ChecklistError;
use crate::domain::time_series::TimeSeries;
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesField {
    Close,
    Volume,
}

pub trait DataPort {
    /// `Ok(None)` is the explicit "no data" answer for an unknown symbol or
    /// an empty range; `Err` is reserved for retrieval failures.
    fn fetch_series(
        &self,
        symbol: &str,
        field: SeriesField,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Option<TimeSeries>, ChecklistError>;

    fn list_symbols(&self) -> Result<Vec<String>, ChecklistError>;
}
