//! Error types for Pulse Analytics

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur during analytics computation
#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("Invalid goal target for {goal_type}: {target} (must be a positive number)")]
    NonPositiveTarget { goal_type: String, target: f64 },

    #[error("Invalid period: start {start} is after end {end}")]
    InvertedDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Invalid period length: {0} days")]
    EmptyPeriod(u32),

    #[error("Invalid period: {days} days ending {end} is out of the supported date range")]
    PeriodOutOfRange { end: NaiveDate, days: u32 },

    #[error("Invalid trend window: {0} (must be at least 1)")]
    InvalidTrendWindow(usize),

    #[error("Invalid trend threshold: {0}% (must be a finite, non-negative percentage)")]
    InvalidTrendThreshold(f64),

    #[error("Invalid chart reference: {0} (must be a positive number)")]
    InvalidChartReference(f64),

    #[error("Unknown metric type: {0}")]
    UnknownMetricType(String),

    #[error("Failed to parse input: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid record at index {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },
}

impl AnalyticsError {
    /// Whether this error reports a caller configuration mistake rather than bad input data
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            AnalyticsError::NonPositiveTarget { .. }
                | AnalyticsError::InvertedDateRange { .. }
                | AnalyticsError::EmptyPeriod(_)
                | AnalyticsError::PeriodOutOfRange { .. }
                | AnalyticsError::InvalidTrendWindow(_)
                | AnalyticsError::InvalidTrendThreshold(_)
                | AnalyticsError::InvalidChartReference(_)
        )
    }
}
