//! Error taxonomy for return computations.
//!
//! Every check aborts the computation it guards. Nothing is clamped or
//! coerced, and no partial result is returned.

use chrono::NaiveDate;
use thiserror::Error;

/// Result type for return computations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors raised by the return, decomposition, scenario and drawdown engines.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A weight series left gaps after being reindexed onto the target dates
    #[error("Alignment error: {0}")]
    Alignment(String),

    /// A value violates an economic or algebraic precondition
    #[error("Domain error: {0}")]
    Domain(String),

    /// A required date is absent from a series
    #[error("Lookup error: {date} not found in '{series}'")]
    Lookup {
        /// Date that was looked up
        date: NaiveDate,
        /// Name of the series that was searched
        series: String,
    },

    /// A required value is missing
    #[error("Missing data in '{series}' on {date}: {reason}")]
    MissingData {
        /// Name of the series holding the gap
        series: String,
        /// Date of the missing value
        date: NaiveDate,
        /// What needed the value
        reason: String,
    },

    /// Not enough observations for the requested computation
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Price input error
    #[error("Price data error: {0}")]
    Data(#[from] nadir_data::DataError),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}

/// Category of an [`AnalysisError`], for callers that only need to branch on
/// the kind of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`AnalysisError::Alignment`]
    Alignment,
    /// See [`AnalysisError::Domain`]
    Domain,
    /// See [`AnalysisError::Lookup`]
    Lookup,
    /// See [`AnalysisError::MissingData`]
    MissingData,
    /// See [`AnalysisError::InsufficientData`]
    InsufficientData,
    /// Input data or dataframe failure
    Data,
}

impl AnalysisError {
    /// The category of this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Alignment(_) => ErrorKind::Alignment,
            Self::Domain(_) => ErrorKind::Domain,
            Self::Lookup { .. } => ErrorKind::Lookup,
            Self::MissingData { .. } => ErrorKind::MissingData,
            Self::InsufficientData(_) => ErrorKind::InsufficientData,
            Self::Data(_) | Self::Polars(_) => ErrorKind::Data,
        }
    }

    pub(crate) fn lookup(date: NaiveDate, series: &str) -> Self {
        Self::Lookup {
            date,
            series: series.to_string(),
        }
    }

    pub(crate) fn missing(series: &str, date: NaiveDate, reason: impl Into<String>) -> Self {
        Self::MissingData {
            series: series.to_string(),
            date,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let date = NaiveDate::from_ymd_opt(2024, 8, 5).unwrap();
        assert_eq!(
            AnalysisError::Alignment("gap".into()).kind(),
            ErrorKind::Alignment
        );
        assert_eq!(AnalysisError::Domain("w".into()).kind(), ErrorKind::Domain);
        assert_eq!(AnalysisError::lookup(date, "SPX").kind(), ErrorKind::Lookup);
        assert_eq!(
            AnalysisError::missing("SPX", date, "nan").kind(),
            ErrorKind::MissingData
        );
    }

    #[test]
    fn test_messages_name_the_date() {
        let date = NaiveDate::from_ymd_opt(2024, 8, 5).unwrap();
        let msg = AnalysisError::lookup(date, "SPX_exNVDA").to_string();
        assert!(msg.contains("2024-08-05"));
        assert!(msg.contains("SPX_exNVDA"));
    }
}
