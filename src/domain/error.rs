//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for market-checklist.
#[derive(Debug, thiserror::Error)]
pub enum ChecklistError {
    #[error("insufficient history: need {required} observations, have {available}")]
    InsufficientHistory { required: usize, available: usize },

    #[error("no observation at or before {date}")]
    MissingAnchorDate { date: NaiveDate },

    #[error("invalid period {period}: must be positive")]
    InvalidPeriod { period: usize },

    #[error("blend weights must sum to 1.0, got {sum}")]
    InvalidWeights { sum: f64 },

    #[error("total volume over window is zero")]
    ZeroVolume,

    #[error("invalid time series: {reason}")]
    InvalidSeries { reason: String },

    #[error("no data for {instrument}")]
    NoData { instrument: String },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid manual input {key}: {reason}")]
    InvalidInput { key: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ChecklistError {
    /// True for conditions that only zero a single indicator's contribution.
    pub fn is_data_shortfall(&self) -> bool {
        matches!(
            self,
            ChecklistError::InsufficientHistory { .. }
                | ChecklistError::MissingAnchorDate { .. }
                | ChecklistError::NoData { .. }
                | ChecklistError::ZeroVolume
        )
    }
}

impl From<&ChecklistError> for std::process::ExitCode {
    fn from(err: &ChecklistError) -> Self {
        let code: u8 = match err {
            ChecklistError::Io(_) => 1,
            ChecklistError::ConfigParse { .. }
            | ChecklistError::ConfigMissing { .. }
            | ChecklistError::ConfigInvalid { .. }
            | ChecklistError::InvalidWeights { .. }
            | ChecklistError::InvalidPeriod { .. } => 2,
            ChecklistError::NoData { .. }
            | ChecklistError::Data { .. }
            | ChecklistError::InvalidSeries { .. }
            | ChecklistError::InsufficientHistory { .. }
            | ChecklistError::MissingAnchorDate { .. }
            | ChecklistError::ZeroVolume => 3,
            ChecklistError::InvalidInput { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
