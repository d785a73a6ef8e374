//! Date-indexed series and tables.
//!
//! [`TimeSeries`] is an ordered mapping from trading date to a float. A `NaN`
//! value marks a missing observation; accessors such as [`TimeSeries::get`]
//! surface that as `None` so callers never do arithmetic on the sentinel.
//! All transformations return new series and leave `self` untouched.

use crate::error::{AnalysisError, Result};
use chrono::NaiveDate;
use nadir_data::prices::{DATE_COLUMN, DATE_FORMAT};
use polars::prelude::*;

/// Named, date-indexed float series with strictly increasing dates.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    name: String,
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

/// A series of simple returns.
pub type ReturnSeries = TimeSeries;

/// A series of growth-of-$1 levels.
pub type GrowthSeries = TimeSeries;

impl TimeSeries {
    /// Create a series from parallel date and value vectors.
    ///
    /// # Errors
    /// [`AnalysisError::Alignment`] if the lengths differ or the dates are not
    /// strictly increasing.
    pub fn new(name: impl Into<String>, dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        let name = name.into();
        if dates.len() != values.len() {
            return Err(AnalysisError::Alignment(format!(
                "series '{}' has {} dates but {} values",
                name,
                dates.len(),
                values.len()
            )));
        }
        if let Some(pair) = dates.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(AnalysisError::Alignment(format!(
                "series '{}' dates are not strictly increasing at {}",
                name, pair[1]
            )));
        }
        Ok(Self {
            name,
            dates,
            values,
        })
    }

    /// Create a series from `(date, value)` pairs, sorting them by date.
    pub fn from_pairs(
        name: impl Into<String>,
        pairs: impl IntoIterator<Item = (NaiveDate, f64)>,
    ) -> Result<Self> {
        let mut pairs: Vec<_> = pairs.into_iter().collect();
        pairs.sort_by_key(|(date, _)| *date);
        let (dates, values) = pairs.into_iter().unzip();
        Self::new(name, dates, values)
    }

    pub(crate) fn from_parts(name: String, dates: Vec<NaiveDate>, values: Vec<f64>) -> Self {
        debug_assert_eq!(dates.len(), values.len());
        Self {
            name,
            dates,
            values,
        }
    }

    /// Series name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return a copy of this series under a new name.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    /// Trading dates, ascending.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Raw values, with `NaN` for missing observations.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of observations.
    pub const fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the series has no observations.
    pub const fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// First date, if any.
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    /// Position of `date` in the index.
    pub fn position(&self, date: NaiveDate) -> Option<usize> {
        self.dates.binary_search(&date).ok()
    }

    /// Position of `date`, failing with [`AnalysisError::Lookup`] when absent.
    pub fn require_position(&self, date: NaiveDate) -> Result<usize> {
        self.position(date)
            .ok_or_else(|| AnalysisError::lookup(date, &self.name))
    }

    /// Value on `date`, or `None` when the date is absent or the value missing.
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.position(date)
            .map(|i| self.values[i])
            .filter(|v| !v.is_nan())
    }

    /// Value on `date`, failing when the date is absent or the value missing.
    pub fn require_value(&self, date: NaiveDate, reason: &str) -> Result<f64> {
        let pos = self.require_position(date)?;
        let value = self.values[pos];
        if value.is_nan() {
            return Err(AnalysisError::missing(&self.name, date, reason));
        }
        Ok(value)
    }

    /// Values reindexed onto `dates`, with `NaN` where this series has no entry.
    pub fn reindex(&self, dates: &[NaiveDate]) -> Vec<f64> {
        dates
            .iter()
            .map(|d| self.position(*d).map_or(f64::NAN, |i| self.values[i]))
            .collect()
    }

    /// Iterate over `(date, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }

    /// Number of missing observations.
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_nan()).count()
    }

    /// Apply `f` to every value, keeping dates and name.
    pub fn map_values(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            name: self.name.clone(),
            dates: self.dates.clone(),
            values: self.values.iter().map(|v| f(*v)).collect(),
        }
    }

    /// Convert to a two-column `DataFrame`: `[date, <name>]`, nulls for missing.
    pub fn to_frame(&self) -> Result<DataFrame> {
        SeriesTable::from_series(vec![self.clone()])?.to_frame()
    }
}

/// Several series sharing one date index.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesTable {
    dates: Vec<NaiveDate>,
    columns: Vec<TimeSeries>,
}

/// A table of return series.
pub type ReturnTable = SeriesTable;

impl SeriesTable {
    /// Create an empty table over `dates`.
    pub const fn new(dates: Vec<NaiveDate>) -> Self {
        Self {
            dates,
            columns: Vec::new(),
        }
    }

    /// Assemble a table from series that share one date index.
    ///
    /// An empty input yields an empty table with no dates.
    pub fn from_series(columns: Vec<TimeSeries>) -> Result<Self> {
        let dates = columns
            .first()
            .map(|s| s.dates.clone())
            .unwrap_or_default();
        let mut table = Self::new(dates);
        for column in columns {
            table.push(column)?;
        }
        Ok(table)
    }

    /// Append a column.
    ///
    /// # Errors
    /// [`AnalysisError::Alignment`] if the column's dates differ from the
    /// table's, [`AnalysisError::Domain`] if the name is already taken.
    pub fn push(&mut self, column: TimeSeries) -> Result<()> {
        if column.dates != self.dates {
            return Err(AnalysisError::Alignment(format!(
                "column '{}' does not share the table's date index",
                column.name
            )));
        }
        if self.columns.iter().any(|c| c.name == column.name) {
            return Err(AnalysisError::Domain(format!(
                "duplicate column name '{}'",
                column.name
            )));
        }
        self.columns.push(column);
        Ok(())
    }

    /// Shared date index.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Number of rows.
    pub const fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the table has no rows.
    pub const fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Number of columns.
    pub const fn width(&self) -> usize {
        self.columns.len()
    }

    /// Column names in insertion order.
    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(TimeSeries::name).collect()
    }

    /// Column by name.
    pub fn column(&self, name: &str) -> Option<&TimeSeries> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column by name, failing with [`AnalysisError::Domain`] when absent.
    pub fn require_column(&self, name: &str) -> Result<&TimeSeries> {
        self.column(name).ok_or_else(|| {
            AnalysisError::Domain(format!(
                "no column '{}' (have: {})",
                name,
                self.names().join(", ")
            ))
        })
    }

    /// Iterate over the columns in insertion order.
    pub fn columns(&self) -> impl Iterator<Item = &TimeSeries> {
        self.columns.iter()
    }

    /// Convert to a `DataFrame`: `[date, <col1>, <col2>, ...]`, nulls for missing.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let dates: Vec<String> = self
            .dates
            .iter()
            .map(|d| d.format(DATE_FORMAT).to_string())
            .collect();

        let mut frame_columns: Vec<Column> = Vec::with_capacity(self.columns.len() + 1);
        frame_columns.push(Series::new(DATE_COLUMN.into(), dates).into());
        for column in &self.columns {
            let values: Vec<Option<f64>> = column
                .values
                .iter()
                .map(|v| if v.is_nan() { None } else { Some(*v) })
                .collect();
            frame_columns.push(Series::new(column.name.as_str().into(), values).into());
        }

        let df = DataFrame::new(frame_columns)?
            .lazy()
            .with_column(col(DATE_COLUMN).cast(DataType::Date))
            .collect()?;

        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, day).unwrap()
    }

    #[test]
    fn test_rejects_unsorted_dates() {
        let result = TimeSeries::new("r", vec![d(2), d(1)], vec![0.0, 0.0]);
        assert_eq!(result.unwrap_err().kind(), crate::ErrorKind::Alignment);
    }

    #[test]
    fn test_from_pairs_sorts() {
        let s = TimeSeries::from_pairs("r", [(d(3), 0.3), (d(1), 0.1)]).unwrap();
        assert_eq!(s.dates(), &[d(1), d(3)]);
        assert_eq!(s.values(), &[0.1, 0.3]);
    }

    #[test]
    fn test_get_hides_missing() {
        let s = TimeSeries::new("r", vec![d(1), d(2)], vec![0.01, f64::NAN]).unwrap();
        assert_eq!(s.get(d(1)), Some(0.01));
        assert_eq!(s.get(d(2)), None);
        assert_eq!(s.get(d(9)), None);
        assert_eq!(s.missing_count(), 1);
    }

    #[test]
    fn test_require_value_errors() {
        let s = TimeSeries::new("r", vec![d(1), d(2)], vec![0.01, f64::NAN]).unwrap();
        assert_eq!(
            s.require_value(d(5), "test").unwrap_err().kind(),
            crate::ErrorKind::Lookup
        );
        assert_eq!(
            s.require_value(d(2), "test").unwrap_err().kind(),
            crate::ErrorKind::MissingData
        );
    }

    #[test]
    fn test_reindex_fills_nan() {
        let s = TimeSeries::new("w", vec![d(1), d(3)], vec![0.1, 0.3]).unwrap();
        let aligned = s.reindex(&[d(1), d(2), d(3)]);
        assert_eq!(aligned[0], 0.1);
        assert!(aligned[1].is_nan());
        assert_eq!(aligned[2], 0.3);
    }

    #[test]
    fn test_table_rejects_misaligned_and_duplicate_columns() {
        let a = TimeSeries::new("a", vec![d(1), d(2)], vec![0.0, 0.0]).unwrap();
        let b = TimeSeries::new("b", vec![d(1)], vec![0.0]).unwrap();
        let mut table = SeriesTable::from_series(vec![a.clone()]).unwrap();

        assert_eq!(
            table.push(b).unwrap_err().kind(),
            crate::ErrorKind::Alignment
        );
        assert_eq!(table.push(a).unwrap_err().kind(), crate::ErrorKind::Domain);
    }

    #[test]
    fn test_table_to_frame() {
        let a = TimeSeries::new("a", vec![d(1), d(2)], vec![0.01, f64::NAN]).unwrap();
        let b = TimeSeries::new("b", vec![d(1), d(2)], vec![0.02, 0.03]).unwrap();
        let df = SeriesTable::from_series(vec![a, b])
            .unwrap()
            .to_frame()
            .unwrap();

        assert_eq!(df.get_column_names(), vec!["date", "a", "b"]);
        assert_eq!(df.column("a").unwrap().null_count(), 1);
        assert_eq!(df.height(), 2);
    }
}
