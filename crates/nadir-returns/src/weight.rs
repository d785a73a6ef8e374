//! Constituent weight, constant or per date.

use crate::error::{AnalysisError, Result};
use crate::series::TimeSeries;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The constituent's fractional weight in the index.
///
/// Deserializes from either a bare number or a `{"YYYY-MM-DD": w, ...}` map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Weight {
    /// One weight applied to every date.
    Constant(f64),
    /// A weight per date; dates absent from the map are gaps after alignment.
    TimeVarying(BTreeMap<NaiveDate, f64>),
}

impl From<f64> for Weight {
    fn from(w: f64) -> Self {
        Self::Constant(w)
    }
}

impl From<&TimeSeries> for Weight {
    fn from(series: &TimeSeries) -> Self {
        Self::TimeVarying(series.iter().collect())
    }
}

impl Weight {
    /// Broadcast or reindex the weight onto `dates` and validate it.
    ///
    /// Checks run in order over the whole aligned series: any gap, then any
    /// value at or above one, then any negative value.
    ///
    /// # Errors
    /// - [`AnalysisError::Alignment`] if a date has no (or a `NaN`) weight
    /// - [`AnalysisError::Domain`] if a weight is `>= 1` or `< 0`
    pub fn align(&self, dates: &[NaiveDate]) -> Result<AlignedWeights> {
        let values: Vec<f64> = match self {
            Self::Constant(w) => vec![*w; dates.len()],
            Self::TimeVarying(map) => dates
                .iter()
                .map(|d| map.get(d).copied().unwrap_or(f64::NAN))
                .collect(),
        };

        let offending = |pred: fn(f64) -> bool| {
            dates
                .iter()
                .zip(&values)
                .find(|(_, w)| pred(**w))
                .map(|(d, w)| (*d, *w))
        };

        if let Some((date, _)) = offending(f64::is_nan) {
            return Err(AnalysisError::Alignment(format!(
                "weight is missing on {} after alignment",
                date
            )));
        }
        if let Some((date, w)) = offending(|w| w >= 1.0) {
            return Err(AnalysisError::Domain(format!(
                "weight {} on {} must be strictly less than 1",
                w, date
            )));
        }
        if let Some((date, w)) = offending(|w| w < 0.0) {
            return Err(AnalysisError::Domain(format!(
                "weight {} on {} must be non-negative",
                w, date
            )));
        }

        Ok(AlignedWeights {
            dates: dates.to_vec(),
            values,
        })
    }
}

/// A validated weight per date, every value in `[0, 1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedWeights {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl AlignedWeights {
    /// Dates the weights were aligned to.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Weight values, one per date.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Weight at position `i`.
    pub fn at(&self, i: usize) -> f64 {
        self.values[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use rstest::rstest;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, day).unwrap()
    }

    #[test]
    fn test_constant_broadcasts() {
        let aligned = Weight::Constant(0.07).align(&[d(1), d(2), d(5)]).unwrap();
        assert_eq!(aligned.values(), &[0.07, 0.07, 0.07]);
        assert_eq!(aligned.dates(), &[d(1), d(2), d(5)]);
    }

    #[test]
    fn test_time_varying_reindexes() {
        let w = Weight::TimeVarying(BTreeMap::from([(d(1), 0.05), (d(2), 0.06), (d(9), 0.5)]));
        let aligned = w.align(&[d(1), d(2)]).unwrap();
        assert_eq!(aligned.values(), &[0.05, 0.06]);
    }

    #[test]
    fn test_gap_after_alignment() {
        let w = Weight::TimeVarying(BTreeMap::from([(d(1), 0.05)]));
        let err = w.align(&[d(1), d(2)]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Alignment);
        assert!(err.to_string().contains("2024-08-02"));
    }

    #[rstest]
    #[case(1.0)]
    #[case(1.5)]
    #[case(-0.01)]
    fn test_out_of_range_is_domain_error(#[case] w: f64) {
        let err = Weight::Constant(w).align(&[d(1)]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Domain);
    }

    #[test]
    fn test_nan_constant_is_alignment_error() {
        let err = Weight::Constant(f64::NAN).align(&[d(1)]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Alignment);
    }

    #[test]
    fn test_zero_weight_is_valid() {
        assert!(Weight::Constant(0.0).align(&[d(1)]).is_ok());
    }

    #[test]
    fn test_deserialize_both_forms() {
        let constant: Weight = serde_json::from_str("0.07").unwrap();
        assert_eq!(constant, Weight::Constant(0.07));

        let varying: Weight =
            serde_json::from_str(r#"{"2024-08-01": 0.05, "2024-08-02": 0.06}"#).unwrap();
        assert_eq!(
            varying,
            Weight::TimeVarying(BTreeMap::from([(d(1), 0.05), (d(2), 0.06)]))
        );
    }
}
